use std::cell::RefCell;
use std::rc::Rc;

use super::*;
use crate::viz::contract::{VizController, VizOptions};
use crate::viz::data::OfflineDataSource;

fn mounted() -> (Document, CommunityViz) {
    let mut dom = Document::new();
    let body = dom.body();
    dom.append_new(body, "div", &[("id", "viz-community")]).unwrap();
    let mut viz = CommunityViz::default();
    viz.init(&mut dom, "viz-community", VizOptions::default(), &OfflineDataSource)
        .unwrap();
    viz.mount(&mut dom).unwrap();
    (dom, viz)
}

#[test]
fn connected_includes_both_link_directions() {
    let net = CommunityChart::sample_data();
    let sound1: Vec<_> = net.connected("sound1").into_iter().collect();
    assert_eq!(sound1, vec!["BookTok", "FitTok", "sound1"]);
    assert_eq!(net.connected("nobody").len(), 1);
}

#[test]
fn layout_is_deterministic_and_complete() {
    let net = CommunityChart::sample_data();
    let a = layout(&net, 800.0, 600.0);
    let b = layout(&net, 800.0, 600.0);
    assert_eq!(a, b);
    assert_eq!(a.len(), net.nodes.len());
}

#[test]
fn renders_links_and_nodes() {
    let (dom, viz) = mounted();
    let root = viz.root().unwrap();
    assert_eq!(dom.find_by_class(root, "link").len(), 5);
    assert_eq!(dom.find_by_class(root, "node").len(), 7);
    assert_eq!(dom.find_by_class(root, "sound-rect").len(), 3);
    assert_eq!(dom.listeners_within(root), 14);
}

#[test]
fn step_five_filters_to_booktok() {
    let (mut dom, mut viz) = mounted();
    viz.update(&mut dom, Step(5), &UpdateOptions::default())
        .unwrap();
    let book = viz.chart().node("BookTok").unwrap();
    let clean = viz.chart().node("CleanTok").unwrap();
    assert_eq!(dom.attr(book, "opacity"), Some("1"));
    assert_eq!(dom.attr(clean, "opacity"), Some("0.2"));
    assert_eq!(viz.state().highlights, vec!["BookTok", "sound1", "sound2"]);
}

#[test]
fn step_six_glows_sounds() {
    let (mut dom, mut viz) = mounted();
    let root = viz.root().unwrap();
    viz.update(&mut dom, Step(6), &UpdateOptions::default())
        .unwrap();
    for rect in dom.find_by_class(root, "sound-rect") {
        assert!(dom.has_class(rect, "glow"));
    }
    assert_eq!(viz.state().highlights, vec!["sound1", "sound2", "sound3"]);
}

#[test]
fn hovering_a_sound_emits_hover_audio() {
    let (mut dom, mut viz) = mounted();
    let heard = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&heard);
    viz.on(
        VizEventKind::HoverAudio,
        Box::new(move |e| sink.borrow_mut().push(e.data.clone())),
    );
    let sound = viz.chart().node("sound2").unwrap();
    for interaction in dom.dispatch(sound, DomEventKind::MouseEnter) {
        if let Interaction::Viz { action, .. } = interaction {
            viz.interact(&mut dom, &action).unwrap();
        }
    }
    assert_eq!(heard.borrow().len(), 1);
    assert_eq!(heard.borrow()[0]["name"], "Viral Beat");
    let fit = viz.chart().node("FitTok").unwrap();
    assert_eq!(dom.attr(fit, "opacity"), Some("0.3"));

    viz.interact(&mut dom, "unhover").unwrap();
    assert_eq!(dom.attr(fit, "opacity"), Some("1"));
}

#[test]
fn hovering_a_community_is_silent() {
    let (mut dom, mut viz) = mounted();
    let heard = Rc::new(RefCell::new(0));
    let sink = Rc::clone(&heard);
    viz.on(
        VizEventKind::HoverAudio,
        Box::new(move |_| *sink.borrow_mut() += 1),
    );
    viz.interact(&mut dom, "hover:FoodTok").unwrap();
    assert_eq!(*heard.borrow(), 0);
}
