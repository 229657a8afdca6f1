//! Dataset loading for visualization controllers.
//!
//! Controllers do all of their I/O inside `init`. A failed fetch or a malformed file is a *data
//! error*: it is logged and the controller's built-in sample dataset is used instead, so a
//! controller is always usable after `init`.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::de::DeserializeOwned;

use crate::foundation::error::{TidesError, TidesResult};

/// Where controllers fetch their datasets from.
pub trait DataSource {
    /// Read the raw bytes of a site-relative path such as `data/artists_by_year.json`.
    fn load(&self, rel_path: &str) -> TidesResult<Vec<u8>>;
}

/// Normalize and validate site-relative data paths.
///
/// The normalized result uses `/` separators, removes `.` segments, and rejects parent traversals
/// (`..`). A single leading `/` means "site root" and is dropped.
pub fn normalize_rel_path(source: &str) -> TidesResult<String> {
    let s = source.replace('\\', "/");
    let s = s.strip_prefix('/').unwrap_or(&s);
    if s.is_empty() {
        return Err(TidesError::validation("data path must be non-empty"));
    }

    let mut out = Vec::<&str>::new();
    for part in s.split('/') {
        if part.is_empty() || part == "." {
            continue;
        }
        if part == ".." {
            return Err(TidesError::validation("data paths must not contain '..'"));
        }
        out.push(part);
    }

    if out.is_empty() {
        return Err(TidesError::validation("data path must contain a file name"));
    }

    Ok(out.join("/"))
}

/// Reads datasets from a directory acting as the site root.
#[derive(Clone, Debug)]
pub struct FsDataSource {
    root: PathBuf,
}

impl FsDataSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl DataSource for FsDataSource {
    fn load(&self, rel_path: &str) -> TidesResult<Vec<u8>> {
        let rel = normalize_rel_path(rel_path)?;
        let path = self.root.join(&rel);
        std::fs::read(&path)
            .map_err(|e| TidesError::data(format!("read '{}': {e}", path.display())))
    }
}

/// In-memory datasets keyed by normalized path.
#[derive(Clone, Debug, Default)]
pub struct MemoryDataSource {
    files: BTreeMap<String, Vec<u8>>,
}

impl MemoryDataSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a file; invalid paths are rejected.
    pub fn insert(&mut self, rel_path: &str, bytes: impl Into<Vec<u8>>) -> TidesResult<()> {
        self.files.insert(normalize_rel_path(rel_path)?, bytes.into());
        Ok(())
    }
}

impl DataSource for MemoryDataSource {
    fn load(&self, rel_path: &str) -> TidesResult<Vec<u8>> {
        let rel = normalize_rel_path(rel_path)?;
        self.files
            .get(&rel)
            .cloned()
            .ok_or_else(|| TidesError::data(format!("no dataset at '{rel}'")))
    }
}

/// A source that is never reachable; every controller falls back to sample data.
#[derive(Clone, Copy, Debug, Default)]
pub struct OfflineDataSource;

impl DataSource for OfflineDataSource {
    fn load(&self, rel_path: &str) -> TidesResult<Vec<u8>> {
        Err(TidesError::data(format!("offline: '{rel_path}' unavailable")))
    }
}

/// How a dataset was obtained.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DataOrigin {
    Remote,
    Fallback,
}

/// Load and parse a JSON dataset, substituting `fallback()` on any data error.
pub fn load_or_fallback<T, F>(source: &dyn DataSource, rel_path: &str, fallback: F) -> (T, DataOrigin)
where
    T: DeserializeOwned,
    F: FnOnce() -> T,
{
    let parsed = source.load(rel_path).and_then(|bytes| {
        serde_json::from_slice::<T>(&bytes)
            .map_err(|e| TidesError::data(format!("parse '{rel_path}': {e}")))
    });
    match parsed {
        Ok(data) => (data, DataOrigin::Remote),
        Err(err) => {
            tracing::warn!(path = rel_path, error = %err, "dataset unavailable, using sample data");
            (fallback(), DataOrigin::Fallback)
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/viz/data.rs"]
mod tests;
