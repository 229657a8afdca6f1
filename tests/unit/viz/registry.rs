use super::*;
use crate::viz::data::OfflineDataSource;

#[test]
fn standard_registers_every_family_under_its_key() {
    let reg = VizRegistry::standard();
    assert_eq!(reg.len(), 6);
    assert_eq!(reg.keys().collect::<Vec<_>>(), VizKey::ALL.to_vec());
    for key in VizKey::ALL {
        assert_eq!(reg.get(key).unwrap().key(), key);
    }
}

#[test]
fn register_replaces_same_key() {
    let mut reg = VizRegistry::new();
    assert!(reg.register(Box::new(PlanetsViz::default())).is_none());
    assert!(reg.register(Box::new(PlanetsViz::default())).is_some());
    assert_eq!(reg.len(), 1);
}

#[test]
fn init_all_reports_missing_mount_points_only() {
    let mut dom = Document::new();
    let body = dom.body();
    for key in [VizKey::Stopwatch, VizKey::Planets] {
        let id = key.mount_id();
        dom.append_new(body, "div", &[("id", id.as_str())]).unwrap();
    }
    let mut reg = VizRegistry::standard();
    let failures = reg.init_all(&mut dom, &VizOptions::default(), &OfflineDataSource);
    let failed: Vec<VizKey> = failures.iter().map(|(k, _)| *k).collect();
    assert_eq!(
        failed,
        vec![
            VizKey::Community,
            VizKey::Ranking,
            VizKey::Emotion,
            VizKey::Ingredients
        ]
    );
    assert!(matches!(failures[0].1, TidesError::Setup(_)));
    assert!(reg.get(VizKey::Stopwatch).unwrap().is_data_ready());
    assert!(!reg.get(VizKey::Ranking).unwrap().is_data_ready());
}
