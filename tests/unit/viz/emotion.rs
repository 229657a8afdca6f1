use std::cell::RefCell;
use std::rc::Rc;

use super::*;
use crate::viz::contract::{VizController, VizOptions};
use crate::viz::data::OfflineDataSource;

fn mounted(reduced_motion: bool) -> (Document, EmotionViz) {
    let mut dom = Document::new();
    let body = dom.body();
    dom.append_new(body, "div", &[("id", "viz-emotion")]).unwrap();
    let mut viz = EmotionViz::default();
    let options = VizOptions {
        reduced_motion,
        ..VizOptions::default()
    };
    viz.init(&mut dom, "viz-emotion", options, &OfflineDataSource)
        .unwrap();
    viz.mount(&mut dom).unwrap();
    (dom, viz)
}

#[test]
fn settle_separates_overlapping_bubbles() {
    let targets = [Point::new(100.0, 100.0), Point::new(100.0, 100.0), Point::new(105.0, 100.0)];
    let radii = [10.0, 10.0, 10.0];
    let placed = settle(&targets, &radii);
    for i in 0..placed.len() {
        for j in (i + 1)..placed.len() {
            let d = (placed[j] - placed[i]).hypot();
            assert!(d > 15.0, "bubbles {i} and {j} overlap: {d}");
        }
    }
    assert_eq!(placed, settle(&targets, &radii));
}

#[test]
fn settle_keeps_isolated_bubbles_on_target() {
    let targets = [Point::new(0.0, 0.0), Point::new(500.0, 0.0)];
    let placed = settle(&targets, &[10.0, 10.0]);
    assert_eq!(placed, targets.to_vec());
}

#[test]
fn renders_one_bubble_per_token() {
    let (dom, viz) = mounted(true);
    let root = viz.root().unwrap();
    assert_eq!(dom.find_by_class(root, "bubble").len(), 10);
    assert_eq!(dom.listeners_within(root), 10);
    assert_eq!(viz.live_tasks(), 0);
}

#[test]
fn entry_animation_lands_on_layout() {
    let (mut dom, mut viz) = mounted(false);
    let love = viz.chart().bubble("love").unwrap();
    assert_eq!(dom.attr(love, "transform"), Some("translate(400, 300)"));
    viz.tick(&mut dom, Millis(5000.0)).unwrap();
    assert_ne!(dom.attr(love, "transform"), Some("translate(400, 300)"));
    assert_eq!(viz.live_tasks(), 0);
}

#[test]
fn step_nine_switches_to_sentiment_layer() {
    let (mut dom, mut viz) = mounted(true);
    let root = viz.root().unwrap();
    viz.update(&mut dom, Step(9), &UpdateOptions::default())
        .unwrap();
    assert_eq!(viz.chart().layer(), EmotionLayer::Sentiment);
    let svg = dom.find_by_tag(root, "svg")[0];
    assert_eq!(dom.attr(svg, "data-layer"), Some("sentiment"));
    let sad = viz.chart().bubble("sad").unwrap();
    let circle = dom.find_by_tag(sad, "circle")[0];
    assert_eq!(dom.attr(circle, "fill"), Some("#EF4444"));
}

#[test]
fn step_ten_highlights_high_engagement() {
    let (mut dom, mut viz) = mounted(true);
    viz.update(&mut dom, Step(10), &UpdateOptions::default())
        .unwrap();
    assert_eq!(
        viz.state().highlights,
        vec!["amazing", "love", "angry", "beautiful"]
    );
    let wow = viz.chart().bubble("wow").unwrap();
    assert_eq!(dom.attr(wow, "opacity"), Some("0.3"));
}

#[test]
fn bubble_click_emits_token() {
    let (mut dom, mut viz) = mounted(true);
    let clicks = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&clicks);
    viz.on(
        VizEventKind::BubbleClick,
        Box::new(move |e| sink.borrow_mut().push(e.data.clone())),
    );
    let angry = viz.chart().bubble("angry").unwrap();
    for interaction in dom.dispatch(angry, DomEventKind::Click) {
        if let Interaction::Viz { action, .. } = interaction {
            viz.interact(&mut dom, &action).unwrap();
        }
    }
    assert_eq!(clicks.borrow().len(), 1);
    assert_eq!(clicks.borrow()[0]["emotion"], "anger");
}

#[test]
fn reduced_motion_emphasizes_outlines() {
    let (mut dom, mut viz) = mounted(false);
    viz.set_reduced_motion(&mut dom, true).unwrap();
    assert_eq!(viz.live_tasks(), 0);
    let fear = viz.chart().bubble("fear").unwrap();
    let circle = dom.find_by_tag(fear, "circle")[0];
    assert_eq!(dom.attr(circle, "stroke-width"), Some("3"));
}
