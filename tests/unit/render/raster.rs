use super::*;

#[test]
fn city_renders_at_requested_width() {
    let raster = render_scene(SceneName::City, Some(360)).unwrap();
    assert_eq!((raster.width, raster.height), (360, 90));
    assert_eq!(raster.rgba.len(), 360 * 90 * 4);
    assert!(raster.covered() > 0);
}

#[test]
fn natural_size_follows_the_view_box() {
    let tree = parse_svg(&scene_markup(SceneName::Forest).unwrap()).unwrap();
    let raster = rasterize(&tree, None).unwrap();
    assert_eq!((raster.width, raster.height), (1440, 400));
    // Ground band is opaque.
    assert_eq!(raster.pixel(720, 390).map(|px| px[3]), Some(255));
    assert_eq!(raster.pixel(1440, 0), None);
}

#[test]
fn scenes_without_illustration_are_rejected() {
    let err = render_scene(SceneName::Air, None).unwrap_err();
    assert!(matches!(err, TidesError::Setup(_)));
}

#[test]
fn zero_width_is_rejected() {
    let tree = parse_svg(&scene_markup(SceneName::Lab).unwrap()).unwrap();
    assert!(matches!(rasterize(&tree, Some(0)), Err(TidesError::Validation(_))));
}

#[test]
fn broken_markup_surfaces_parse_error() {
    let err = parse_svg("<svg").unwrap_err();
    assert!(err.to_string().contains("parse svg tree"));
}

#[test]
fn png_is_written_with_parent_dirs() {
    let dir = std::env::temp_dir().join(format!("tides-raster-{}", std::process::id()));
    let path = dir.join("nested").join("lab.png");
    render_scene(SceneName::Lab, Some(144)).unwrap().write_png(&path).unwrap();
    let decoded = image::open(&path).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (144, 36));
    std::fs::remove_dir_all(&dir).unwrap();
}
