use super::*;
use crate::dom::svg::to_markup;

#[test]
fn factories_are_deterministic_and_detached() {
    for build in [forest::build as IllustrationFactory, city::build, lab::build] {
        let mut a = Document::new();
        let mut b = Document::new();
        let ra = build(&mut a).unwrap();
        let rb = build(&mut b).unwrap();
        assert!(!a.is_attached(ra));
        assert_eq!(a.parent(ra), None);
        assert_eq!(a.tag(ra), Some("svg"));
        assert_eq!(a.attr(ra, "aria-hidden"), Some("true"));
        assert_eq!(to_markup(&a, ra), to_markup(&b, rb));
    }
}

#[test]
fn repeated_builds_in_one_document_give_distinct_roots() {
    let mut dom = Document::new();
    let first = forest::build(&mut dom).unwrap();
    let second = forest::build(&mut dom).unwrap();
    assert_ne!(first, second);
    assert_eq!(to_markup(&dom, first), to_markup(&dom, second));
}

#[test]
fn city_has_one_building_per_column() {
    let mut dom = Document::new();
    let svg = city::build(&mut dom).unwrap();
    assert_eq!(dom.find_by_class(svg, "bldg").len(), 28);
    let tallest = dom
        .find_by_class(svg, "bldg")
        .into_iter()
        .filter_map(|b| dom.attr(b, "height").and_then(|h| h.parse::<f64>().ok()))
        .fold(0.0_f64, f64::max);
    assert!(tallest < 320.0);
}

#[test]
fn lab_exposes_liquid_for_the_bubble_egg() {
    let mut dom = Document::new();
    let svg = lab::build(&mut dom).unwrap();
    let liquid = dom.first_by_class(svg, lab::LIQUID_CLASS).unwrap();
    assert_eq!(dom.attr(liquid, "fill"), Some(lab::LIQUID_FILL));
    assert_eq!(dom.find_by_class(svg, "lab-bubble").len(), 12);
}

#[test]
fn forest_layers_pines_back_to_front() {
    let mut dom = Document::new();
    let svg = forest::build(&mut dom).unwrap();
    let pines = dom.find_by_class(svg, "pine");
    assert_eq!(pines.len(), 41 + 24 + 16);
    assert_eq!(dom.attr(pines[0], "opacity"), Some("0.4"));
    assert_eq!(dom.attr(*pines.last().unwrap(), "opacity"), Some("0.95"));
}

#[test]
fn only_three_scenes_have_illustrations() {
    let with: Vec<SceneName> = SceneName::ALL
        .into_iter()
        .filter(|s| factory_for(*s).is_some())
        .collect();
    assert_eq!(with, vec![SceneName::City, SceneName::Forest, SceneName::Lab]);
}
