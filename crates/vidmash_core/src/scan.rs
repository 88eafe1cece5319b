use crate::error::Result;
use crate::types::{MediaFile, MediaKind};
use std::path::Path;

/// List media files of one kind directly inside `dir`, sorted by path so
/// the enumeration order is stable across runs. Subdirectories are not
/// descended into.
pub fn scan_media(dir: &Path, kind: MediaKind) -> Result<Vec<MediaFile>> {
    let mut found = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        if MediaKind::from_path(&path) == Some(kind) {
            found.push(MediaFile::new(path, kind));
        }
    }
    found.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(found)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
