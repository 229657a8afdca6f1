use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        TidesError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(TidesError::setup("x").to_string().contains("setup error:"));
    assert!(
        TidesError::lifecycle("x")
            .to_string()
            .contains("lifecycle error:")
    );
    assert!(TidesError::data("x").to_string().contains("data error:"));
    assert!(
        TidesError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = TidesError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
