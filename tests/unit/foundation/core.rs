use super::*;

#[test]
fn scene_names_round_trip_through_attribute_values() {
    for scene in SceneName::ALL {
        assert_eq!(scene.as_str().parse::<SceneName>().unwrap(), scene);
    }
    assert_eq!(" Forest ".parse::<SceneName>().unwrap(), SceneName::Forest);
    assert!("jungle".parse::<SceneName>().is_err());
}

#[test]
fn qa_digits_map_in_narrative_order() {
    assert_eq!(SceneName::from_digit(1), Some(SceneName::Cosmos));
    assert_eq!(SceneName::from_digit(7), Some(SceneName::Lab));
    assert_eq!(SceneName::from_digit(0), None);
    assert_eq!(SceneName::from_digit(8), None);
}

#[test]
fn section_id_strips_selector_prefix() {
    assert_eq!(SectionId::new("#section-fade").as_str(), "section-fade");
    assert_eq!(SectionId::from("section-fade").as_str(), "section-fade");
}

#[test]
fn step_parse_accepts_whitespace_and_negatives() {
    assert_eq!(Step::parse(" 3 ").unwrap(), Step(3));
    assert_eq!(Step::parse("-2").unwrap(), Step(-2));
    assert!(Step::parse("three").is_err());
    assert!(Step::parse("").is_err());
}

#[test]
fn viz_mount_ids_follow_convention() {
    assert_eq!(VizKey::Planets.mount_id(), "viz-planets");
    assert_eq!("ranking".parse::<VizKey>().unwrap(), VizKey::Ranking);
}

#[test]
fn millis_after_ignores_bad_delays() {
    assert_eq!(Millis(10.0).after(5.0), Millis(15.0));
    assert_eq!(Millis(10.0).after(-5.0), Millis(10.0));
    assert_eq!(Millis(10.0).after(f64::NAN), Millis(10.0));
}
