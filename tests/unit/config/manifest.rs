use super::*;

#[test]
fn standard_manifest_is_valid() {
    let m = PageManifest::standard();
    m.validate().unwrap();
    assert_eq!(m.sections.len(), 7);
    assert_eq!(m.document_height(), 8100.0);
    let fade = m.section(&SectionId::new("section-fade")).unwrap();
    assert_eq!(fade.scene, Some(SceneName::Forest));
    assert_eq!(fade.viz, Some(VizKey::Ranking));
    assert_eq!(fade.steps[1].annotation.as_deref(), Some("30% of trends see revival"));
    assert_eq!(
        m.section_for_viz(VizKey::Planets).unwrap().id.as_str(),
        "section-surge"
    );
}

#[test]
fn standard_sections_can_become_dominant() {
    let m = PageManifest::standard();
    for s in &m.sections {
        assert!(m.viewport.height / s.height > m.thresholds.dominance, "{}", s.id);
    }
}

#[test]
fn json_round_trip_keeps_easing_identifier() {
    let m = PageManifest::standard();
    let json = m.to_json_pretty().unwrap();
    assert!(json.contains("cubic-bezier(0.4, 0.0, 0.2, 1)"));
    let back = PageManifest::from_reader(json.as_bytes()).unwrap();
    assert_eq!(back, m);
}

#[test]
fn unknown_easing_is_rejected_at_parse() {
    let json = r#"{
        "sections": [],
        "transition": { "duration_ms": 400, "easing": "wobble" }
    }"#;
    let err = PageManifest::from_reader(json.as_bytes()).unwrap_err();
    assert!(err.to_string().contains("wobble"));
}

#[test]
fn minimal_json_fills_defaults() {
    let json = r##"{ "sections": [ { "id": "#a", "top": 0, "height": 800, "scene": "cosmos" } ] }"##;
    let m = PageManifest::from_reader(json.as_bytes()).unwrap();
    m.validate().unwrap();
    assert_eq!(m.sections[0].id.as_str(), "a");
    assert_eq!(m.thresholds, Thresholds::default());
    assert_eq!(m.transition.duration_ms, 400.0);
    assert!(!m.production);
}

fn rejects(mutate: impl FnOnce(&mut PageManifest), needle: &str) {
    let mut m = PageManifest::standard();
    mutate(&mut m);
    let err = m.validate().unwrap_err().to_string();
    assert!(err.contains(needle), "{err}");
}

#[test]
fn validate_rejects_bad_manifests() {
    rejects(|m| m.sections[1].id = SectionId::new("section-landing"), "duplicate section id");
    rejects(|m| m.thresholds.dominance = 1.5, "dominance");
    rejects(|m| m.thresholds.entry = 0.3, "entry threshold");
    rejects(|m| m.sections[2].height = f64::NAN, "height");
    rejects(|m| m.sections[2].top = -1.0, "top");
    rejects(|m| m.sections[3].steps[1].step = Step(5), "duplicate step 5");
    rejects(|m| m.sections[4].scene = Some(SceneName::City), "more than one section");
    rejects(|m| m.sections[4].viz = Some(VizKey::Community), "more than one section");
    rejects(|m| m.viewport.height = 0.0, "viewport");
}
