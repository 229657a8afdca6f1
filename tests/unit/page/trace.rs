use super::*;
use crate::foundation::core::{SceneName, VizKey};
use crate::page::runtime::Record;
use crate::scene::illustration::MountOp;
use crate::scene::orchestrator::Outcome;
use crate::viz::data::OfflineDataSource;

fn scenes(timeline: &[TimelineEntry]) -> Vec<SceneName> {
    timeline
        .iter()
        .filter_map(|e| match &e.record {
            Record::Lifecycle(Outcome::SceneChanged { to: Some(scene), .. }) => Some(*scene),
            _ => None,
        })
        .collect()
}

#[test]
fn parses_and_replays_a_json_trace() {
    let json = r#"{
        "steps": [
            { "action": "scroll", "y": 4500 },
            { "action": "key", "key": "?" },
            { "action": "toggle_audio" },
            { "action": "click", "target": "egg-zone" },
            { "action": "tick", "at_ms": 100 }
        ]
    }"#;
    let trace = Trace::from_reader(json.as_bytes()).unwrap();
    assert_eq!(trace.steps.len(), 5);
    assert_eq!(trace.steps[2], TraceStep::ToggleAudio);

    let mut page = Page::standard(&OfflineDataSource).unwrap();
    let timeline = replay(&mut page, &trace);
    assert_eq!(scenes(&timeline), vec![SceneName::Cosmos, SceneName::Forest]);
    assert!(timeline.iter().any(|e| matches!(e.record, Record::Help { .. })));
    assert!(timeline.iter().any(|e| matches!(
        e.record,
        Record::Illustration(MountOp::Attach {
            scene: SceneName::Forest,
            ..
        })
    )));
    assert!(!page.is_muted());
    assert_eq!(page.dom().find_by_class(page.dom().root(), "falling-leaf").len(), 1);
    assert_eq!(page.clock(), Millis(100.0));
    assert!(page.timeline().is_empty());
}

#[test]
fn malformed_trace_is_a_validation_error() {
    let err = Trace::from_reader(r#"{ "steps": [ { "action": "fly" } ] }"#.as_bytes()).unwrap_err();
    assert!(err.to_string().contains("invalid trace"));
}

#[test]
fn sweep_visits_every_scene_in_order() {
    let mut page = Page::standard(&OfflineDataSource).unwrap();
    let trace = Trace::sweep(&page, 300.0, 16.0);
    assert_eq!(trace.steps.first(), Some(&TraceStep::Scroll { y: 0.0 }));
    assert!(trace.steps.contains(&TraceStep::Scroll { y: 7200.0 }));

    let timeline = replay(&mut page, &trace);
    assert_eq!(
        scenes(&timeline),
        vec![
            SceneName::Cosmos,
            SceneName::Dawn,
            SceneName::Orbit,
            SceneName::City,
            SceneName::Forest,
            SceneName::Air,
            SceneName::Lab,
        ]
    );
    for viz in VizKey::ALL {
        assert!(page.orchestrator().has_mounted(viz), "{viz} not mounted");
    }
}

#[test]
fn missing_targets_are_skipped() {
    let trace = Trace {
        steps: vec![
            TraceStep::Batch {
                entries: vec![
                    TraceEntry {
                        target: "section-landing".to_string(),
                        ratio: 0.0,
                    },
                    TraceEntry {
                        target: "section-surge".to_string(),
                        ratio: 0.8,
                    },
                    TraceEntry {
                        target: "nowhere".to_string(),
                        ratio: 0.9,
                    },
                ],
            },
            TraceStep::Click {
                target: "nowhere".to_string(),
            },
            TraceStep::Jump {
                section: "section-nowhere".to_string(),
            },
        ],
    };
    let mut page = Page::standard(&OfflineDataSource).unwrap();
    replay(&mut page, &trace);
    assert_eq!(page.current_scene(), Some(SceneName::Orbit));
    assert!(page.orchestrator().has_mounted(VizKey::Planets));
}
