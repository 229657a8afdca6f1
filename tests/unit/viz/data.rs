use super::*;

#[test]
fn normalize_path_slash_normalization() {
    assert_eq!(normalize_rel_path("data/a.json").unwrap(), "data/a.json");
    assert_eq!(normalize_rel_path("data\\a.json").unwrap(), "data/a.json");
    assert_eq!(normalize_rel_path("/data/./a.json").unwrap(), "data/a.json");
    assert!(normalize_rel_path("../a.json").is_err());
    assert!(normalize_rel_path("/").is_err());
    assert!(normalize_rel_path("").is_err());
}

#[test]
fn memory_source_serves_registered_files() {
    let mut src = MemoryDataSource::new();
    src.insert("data/x.json", b"[1,2,3]".to_vec()).unwrap();
    let (v, origin): (Vec<u32>, _) = load_or_fallback(&src, "/data/x.json", Vec::new);
    assert_eq!(v, vec![1, 2, 3]);
    assert_eq!(origin, DataOrigin::Remote);
}

#[test]
fn offline_source_falls_back() {
    let (v, origin): (Vec<u32>, _) = load_or_fallback(&OfflineDataSource, "data/x.json", || vec![9]);
    assert_eq!(v, vec![9]);
    assert_eq!(origin, DataOrigin::Fallback);
}

#[test]
fn malformed_json_falls_back() {
    let mut src = MemoryDataSource::new();
    src.insert("data/x.json", b"{not json".to_vec()).unwrap();
    let (v, origin): (Vec<u32>, _) = load_or_fallback(&src, "data/x.json", || vec![7]);
    assert_eq!(v, vec![7]);
    assert_eq!(origin, DataOrigin::Fallback);
}

#[test]
fn fs_source_reads_relative_to_root() {
    let dir = std::path::PathBuf::from("target").join("fs_data_source");
    std::fs::create_dir_all(dir.join("data")).unwrap();
    std::fs::write(dir.join("data").join("y.json"), b"[4]").unwrap();

    let src = FsDataSource::new(&dir);
    assert_eq!(src.load("data/y.json").unwrap(), b"[4]".to_vec());
    assert!(src.load("data/missing.json").is_err());
    assert!(src.load("../escape.json").is_err());
}
