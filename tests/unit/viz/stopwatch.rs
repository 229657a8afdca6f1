use super::*;
use crate::viz::contract::{VizController, VizOptions};
use crate::viz::data::{MemoryDataSource, OfflineDataSource};

fn mounted(reduced_motion: bool) -> (Document, StopwatchViz) {
    let mut dom = Document::new();
    let body = dom.body();
    dom.append_new(body, "div", &[("id", "viz-stopwatch")]).unwrap();
    let mut viz = StopwatchViz::default();
    let options = VizOptions {
        reduced_motion,
        ..VizOptions::default()
    };
    viz.init(&mut dom, "viz-stopwatch", options, &OfflineDataSource)
        .unwrap();
    viz.mount(&mut dom).unwrap();
    (dom, viz)
}

#[test]
fn bins_parse_from_pairs() {
    let mut src = MemoryDataSource::new();
    src.insert("data/duration_engagement.json", "[[5, 100], [10, 250]]")
        .unwrap();
    let mut dom = Document::new();
    let body = dom.body();
    dom.append_new(body, "div", &[("id", "viz-stopwatch")]).unwrap();
    let mut viz = StopwatchViz::default();
    viz.init(&mut dom, "viz-stopwatch", VizOptions::default(), &src)
        .unwrap();
    assert_eq!(
        viz.data().unwrap()[1],
        DurationBin {
            seconds: 10.0,
            views: 250.0
        }
    );
}

#[test]
fn renders_one_sector_per_bin() {
    let (dom, viz) = mounted(true);
    let root = viz.root().unwrap();
    assert_eq!(dom.find_by_class(root, "sector").len(), 12);
    assert_eq!(dom.find_by_class(root, "tick").len(), 60);
    assert_eq!(viz.live_tasks(), 0);
}

#[test]
fn reveal_runs_to_completion_then_stops() {
    let (mut dom, mut viz) = mounted(false);
    assert_eq!(viz.live_tasks(), 1);
    let first = viz.chart().sectors().next().unwrap();
    assert_eq!(dom.attr(first, "opacity"), Some("0"));

    viz.tick(&mut dom, Millis(0.0)).unwrap();
    viz.tick(&mut dom, Millis(2000.0)).unwrap();
    assert_eq!(dom.attr(first, "opacity"), Some("0.6"));
    assert_eq!(viz.live_tasks(), 0);
}

#[test]
fn step_one_highlights_optimal_range() {
    let (mut dom, mut viz) = mounted(true);
    viz.update(&mut dom, Step(1), &UpdateOptions::default())
        .unwrap();
    assert_eq!(viz.state().highlights, vec!["15s", "20s", "25s", "30s"]);
    let lit: Vec<_> = viz
        .chart()
        .sectors()
        .filter(|n| dom.attr(*n, "opacity") == Some("0.9"))
        .collect();
    assert_eq!(lit.len(), 4);
}

#[test]
fn step_two_adds_velocity_panel_once() {
    let (mut dom, mut viz) = mounted(true);
    let root = viz.root().unwrap();
    viz.update(&mut dom, Step(2), &UpdateOptions::default())
        .unwrap();
    viz.update(&mut dom, Step(2), &UpdateOptions::default())
        .unwrap();
    let panels = dom.find_by_class(root, "stopwatch-velocity");
    assert_eq!(panels.len(), 1);
    assert_eq!(
        dom.text(panels[0]),
        Some("Peak velocity: 892.3K views at 15s")
    );
}

#[test]
fn glow_sweep_removes_itself() {
    let (mut dom, mut viz) = mounted(false);
    viz.tick(&mut dom, Millis(1000.0)).unwrap();
    viz.on_transition_in(&mut dom);
    let root = viz.root().unwrap();
    assert_eq!(dom.find_by_class(root, "glow-sweep").len(), 1);
    viz.tick(&mut dom, Millis(2000.0)).unwrap();
    viz.tick(&mut dom, Millis(3000.0)).unwrap();
    assert!(dom.find_by_class(root, "glow-sweep").is_empty());
    assert_eq!(viz.live_tasks(), 0);
}

#[test]
fn unmount_cancels_running_animations() {
    let (mut dom, mut viz) = mounted(false);
    viz.on_transition_in(&mut dom);
    assert_eq!(viz.live_tasks(), 2);
    viz.unmount(&mut dom).unwrap();
    assert_eq!(viz.live_tasks(), 0);
    assert_eq!(dom.listener_count(), 0);
}

#[test]
fn sector_paths_are_closed() {
    let d = sector_path(30.0, 100.0, TAU / 4.0);
    assert!(d.starts_with('M'));
    assert!(d.contains("-100"));
    assert!(d.ends_with('Z'));
}
