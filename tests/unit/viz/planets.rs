use std::cell::RefCell;
use std::rc::Rc;

use super::*;
use crate::viz::contract::{VizController, VizOptions};
use crate::viz::data::OfflineDataSource;

fn mounted(reduced_motion: bool) -> (Document, PlanetsViz) {
    let mut dom = Document::new();
    let body = dom.body();
    dom.append_new(body, "div", &[("id", "viz-planets")]).unwrap();
    let mut viz = PlanetsViz::default();
    let options = VizOptions {
        reduced_motion,
        ..VizOptions::default()
    };
    viz.init(&mut dom, "viz-planets", options, &OfflineDataSource)
        .unwrap();
    viz.mount(&mut dom).unwrap();
    (dom, viz)
}

#[test]
fn draws_default_year_with_buttons() {
    let (dom, viz) = mounted(true);
    let root = viz.root().unwrap();
    assert_eq!(viz.chart().year(), "2019");
    assert_eq!(dom.find_by_class(root, "planet").len(), 4);
    assert_eq!(dom.find_by_class(root, "year-btn").len(), 4);
    let active: Vec<_> = dom
        .find_by_class(root, "year-btn")
        .into_iter()
        .filter(|b| dom.has_class(*b, "active"))
        .collect();
    assert_eq!(active.len(), 1);
    assert_eq!(dom.attr(active[0], "data-year"), Some("2019"));
}

#[test]
fn orbit_runs_only_without_reduced_motion() {
    let (_, still) = mounted(true);
    assert_eq!(still.live_tasks(), 0);

    let (mut dom, mut moving) = mounted(false);
    assert_eq!(moving.live_tasks(), 1);
    let lizzo = moving.chart().planet("Lizzo").unwrap();
    let before = dom.attr(lizzo, "transform").map(str::to_string);
    moving.tick(&mut dom, Millis(5000.0)).unwrap();
    assert_ne!(dom.attr(lizzo, "transform").map(str::to_string), before);

    moving.set_reduced_motion(&mut dom, true).unwrap();
    assert_eq!(moving.live_tasks(), 0);
}

#[test]
fn step_three_highlights_top_two() {
    let (mut dom, mut viz) = mounted(true);
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    viz.on(
        VizEventKind::ArtistHighlight,
        Box::new(move |e| sink.borrow_mut().push(e.data.clone())),
    );
    viz.update(&mut dom, Step(3), &UpdateOptions::default())
        .unwrap();
    assert_eq!(viz.state().highlights, vec!["Billie Eilish", "Lil Nas X"]);
    let eilish = viz.chart().planet("Billie Eilish").unwrap();
    let lizzo = viz.chart().planet("Lizzo").unwrap();
    assert_eq!(dom.attr(eilish, "opacity"), Some("1"));
    assert_eq!(dom.attr(lizzo, "opacity"), Some("0.3"));
    assert_eq!(seen.borrow()[0]["artists"][0], "Billie Eilish");
}

#[test]
fn step_four_switches_to_2022() {
    let (mut dom, mut viz) = mounted(true);
    viz.update(&mut dom, Step(4), &UpdateOptions::default())
        .unwrap();
    assert_eq!(viz.chart().year(), "2022");
    assert!(viz.chart().planet("Kate Bush").is_some());
    assert!(viz.chart().planet("Lizzo").is_none());
    let root = viz.root().unwrap();
    assert_eq!(dom.find_by_class(root, "planet").len(), 4);
}

#[test]
fn year_button_click_switches_year() {
    let (mut dom, mut viz) = mounted(true);
    let root = viz.root().unwrap();
    let btn = dom
        .find_by_class(root, "year-btn")
        .into_iter()
        .find(|b| dom.attr(*b, "data-year") == Some("2021"))
        .unwrap();
    for interaction in dom.dispatch(btn, DomEventKind::Click) {
        if let Interaction::Viz { action, .. } = interaction {
            viz.interact(&mut dom, &action).unwrap();
        }
    }
    assert_eq!(viz.chart().year(), "2021");
    assert!(dom.has_class(btn, "active"));
}

#[test]
fn unknown_year_is_ignored() {
    let (mut dom, mut viz) = mounted(true);
    viz.interact(&mut dom, "year:1999").unwrap();
    assert_eq!(viz.chart().year(), "2019");
}

#[test]
fn transition_out_fades_orbits() {
    let (mut dom, mut viz) = mounted(true);
    let root = viz.root().unwrap();
    viz.on_transition_out(&mut dom);
    for orbit in dom.find_by_class(root, "planet-orbit") {
        assert_eq!(dom.attr(orbit, "opacity"), Some("0"));
    }
    viz.on_transition_in(&mut dom);
    for orbit in dom.find_by_class(root, "planet-orbit") {
        assert_eq!(dom.attr(orbit, "opacity"), Some("0.3"));
    }
}
