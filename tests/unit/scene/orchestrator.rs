use super::*;
use crate::viz::contract::VizOptions;
use crate::viz::data::OfflineDataSource;

fn id(s: &str) -> SectionId {
    SectionId::new(s)
}

fn entered(s: &str) -> ScrollEvent {
    ScrollEvent::SectionEntered { section: id(s) }
}

fn dominant(s: &str) -> ScrollEvent {
    ScrollEvent::SectionDominant { section: id(s) }
}

fn step(s: &str, n: i64) -> ScrollEvent {
    ScrollEvent::StepReached {
        section: id(s),
        step: Step(n),
    }
}

fn page(with_mounts: bool) -> (Document, VizRegistry, SceneOrchestrator) {
    let mut dom = Document::new();
    let mut vizzes = VizRegistry::standard();
    if with_mounts {
        let body = dom.body();
        for key in VizKey::ALL {
            let mount = key.mount_id();
            dom.append_new(body, "div", &[("id", mount.as_str())]).unwrap();
        }
        assert!(vizzes
            .init_all(&mut dom, &VizOptions::default(), &OfflineDataSource)
            .is_empty());
    }
    let orch = SceneOrchestrator::new(SceneRegistry::standard(), TransitionTiming::default());
    (dom, vizzes, orch)
}

#[test]
fn dominance_switches_scene_once() {
    let (mut dom, mut vizzes, mut orch) = page(true);
    let out = orch.handle_batch(&mut dom, &mut vizzes, &[dominant("section-fade")]);
    assert!(out.contains(&Outcome::SceneChanged {
        from: None,
        to: Some(SceneName::Forest)
    }));
    assert_eq!(dom.attr(dom.body(), "data-scene"), Some("forest"));

    let again = orch.handle_batch(&mut dom, &mut vizzes, &[dominant("section-fade")]);
    assert!(again.is_empty());
    assert_eq!(orch.scene_writes(), 1);
    assert_eq!(orch.current_section(), Some(&id("section-fade")));
}

#[test]
fn unknown_section_changes_section_but_not_scene() {
    let (mut dom, mut vizzes, mut orch) = page(true);
    orch.handle_batch(&mut dom, &mut vizzes, &[dominant("section-surge")]);
    let out = orch.handle_batch(&mut dom, &mut vizzes, &[dominant("section-credits")]);
    assert_eq!(
        out,
        vec![Outcome::SectionChanged {
            from: Some(id("section-surge")),
            to: id("section-credits"),
        }]
    );
    assert_eq!(orch.current_scene(), Some(SceneName::Orbit));
    assert_eq!(orch.previous_section(), Some(&id("section-surge")));
}

#[test]
fn entry_mounts_once() {
    let (mut dom, mut vizzes, mut orch) = page(true);
    let mut mounts = 0;
    for _ in 0..5 {
        let out = orch.handle_batch(&mut dom, &mut vizzes, &[entered("section-surge")]);
        mounts += out
            .iter()
            .filter(|o| matches!(o, Outcome::Mounted { .. }))
            .count();
    }
    assert_eq!(mounts, 1);
    assert!(orch.has_mounted(VizKey::Planets));
    assert!(vizzes.get(VizKey::Planets).unwrap().is_mounted());
}

#[test]
fn controller_already_mounted_flips_guard_silently() {
    let (mut dom, mut vizzes, mut orch) = page(true);
    vizzes.get_mut(VizKey::Ranking).unwrap().mount(&mut dom).unwrap();
    let out = orch.handle_batch(&mut dom, &mut vizzes, &[entered("section-fade")]);
    assert_eq!(out, vec![Outcome::SectionEntered { section: id("section-fade") }]);
    assert!(orch.has_mounted(VizKey::Ranking));
}

#[test]
fn steps_in_a_batch_run_ascending() {
    let (mut dom, mut vizzes, mut orch) = page(true);
    let out = orch.handle_batch(
        &mut dom,
        &mut vizzes,
        &[step("section-surge", 4), entered("section-surge"), step("section-surge", 3)],
    );
    let steps: Vec<i64> = out
        .iter()
        .filter_map(|o| match o {
            Outcome::StepReached { step, .. } => Some(step.0),
            _ => None,
        })
        .collect();
    assert_eq!(steps, vec![3, 4]);
    assert!(matches!(out[1], Outcome::Mounted { viz: VizKey::Planets, .. }));
    assert_eq!(
        vizzes.get(VizKey::Planets).unwrap().state().current_step,
        Some(Step(4))
    );
}

#[test]
fn steps_without_visualization_are_reported() {
    let (mut dom, mut vizzes, mut orch) = page(true);
    let out = orch.handle_batch(&mut dom, &mut vizzes, &[step("section-landing", 99)]);
    assert_eq!(
        out,
        vec![Outcome::StepReached {
            section: id("section-landing"),
            step: Step(99),
            viz: None,
        }]
    );
}

#[test]
fn failed_mount_is_retried_when_section_becomes_current() {
    let (mut dom, mut vizzes, mut orch) = page(false);
    let out = orch.handle_batch(&mut dom, &mut vizzes, &[entered("section-ignite")]);
    assert!(matches!(out[1], Outcome::MountFailed { viz: VizKey::Stopwatch, .. }));
    assert!(!orch.has_mounted(VizKey::Stopwatch));

    let body = dom.body();
    dom.append_new(body, "div", &[("id", "viz-stopwatch")]).unwrap();
    vizzes
        .get_mut(VizKey::Stopwatch)
        .unwrap()
        .init(&mut dom, "viz-stopwatch", VizOptions::default(), &OfflineDataSource)
        .unwrap();

    let out = orch.handle_batch(&mut dom, &mut vizzes, &[dominant("section-ignite")]);
    assert!(out.iter().any(|o| matches!(o, Outcome::Mounted { viz: VizKey::Stopwatch, .. })));
    assert_eq!(orch.current_scene(), Some(SceneName::Dawn));
}

#[test]
fn controller_mounted_elsewhere_clears_failure() {
    let (mut dom, mut vizzes, mut orch) = page(false);
    orch.handle_batch(&mut dom, &mut vizzes, &[entered("section-ignite")]);
    assert!(orch.has_failed(VizKey::Stopwatch));

    let body = dom.body();
    dom.append_new(body, "div", &[("id", "viz-stopwatch")]).unwrap();
    let controller = vizzes.get_mut(VizKey::Stopwatch).unwrap();
    controller
        .init(&mut dom, "viz-stopwatch", VizOptions::default(), &OfflineDataSource)
        .unwrap();
    controller.mount(&mut dom).unwrap();

    let out = orch.handle_batch(&mut dom, &mut vizzes, &[dominant("section-ignite")]);
    assert!(!out.iter().any(|o| matches!(o, Outcome::Mounted { .. } | Outcome::MountFailed { .. })));
    assert!(orch.has_mounted(VizKey::Stopwatch));
    assert!(!orch.has_failed(VizKey::Stopwatch));
}

#[test]
fn failed_mount_keeps_scene_state_consistent() {
    let (mut dom, mut vizzes, mut orch) = page(false);
    let out = orch.handle_batch(
        &mut dom,
        &mut vizzes,
        &[entered("section-spillover"), dominant("section-spillover")],
    );
    assert!(out.iter().any(|o| matches!(o, Outcome::MountFailed { .. })));
    assert_eq!(orch.current_scene(), Some(SceneName::City));
}

#[test]
fn force_scene_is_dev_only() {
    let (mut dom, _, orch) = page(false);
    let mut orch = orch.with_production(true);
    assert!(matches!(
        orch.force_scene(&mut dom, Some(SceneName::Lab)),
        Err(TidesError::Setup(_))
    ));
    assert_eq!(orch.current_scene(), None);

    let mut orch = orch.with_production(false);
    let change = orch.force_scene(&mut dom, Some(SceneName::Lab)).unwrap();
    assert_eq!(change.map(|c| c.current), Some(Some(SceneName::Lab)));
    assert!(orch.force_scene(&mut dom, Some(SceneName::Lab)).unwrap().is_none());
}

#[test]
fn outcomes_serialize_tagged() {
    let json = serde_json::to_value(Outcome::Mounted {
        viz: VizKey::Emotion,
        section: id("section-takeaway"),
    })
    .unwrap();
    assert_eq!(
        json,
        serde_json::json!({ "outcome": "mounted", "viz": "emotion", "section": "section-takeaway" })
    );
}
