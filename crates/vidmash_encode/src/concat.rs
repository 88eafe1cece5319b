use crate::error::Result;
use std::path::{Path, PathBuf};

/// Normalize and escape one path component for the concat-demux list's
/// single-quoted syntax: backslashes become forward slashes, and each
/// `'` becomes `'\''` so the quoted form stays valid. Backslashes are
/// handled first so the escape sequence itself is never rewritten.
pub fn escape_component(raw: &str) -> String {
    raw.replace('\\', "/").replace('\'', "'\\''")
}

/// Render one `file '...'` line, resolving `path` to an absolute form so
/// the encoder can locate it regardless of its working directory.
pub fn concat_entry(path: &Path) -> Result<String> {
    let absolute = std::path::absolute(path)?;
    Ok(format!(
        "file '{}'",
        escape_component(&absolute.to_string_lossy())
    ))
}

/// Write a concat-demux list: one newline-terminated entry per item, in
/// the exact input order. Order is load-bearing, it becomes concat order.
/// Creates or overwrites the file at `list_path`.
pub fn write_concat_list(list_path: &Path, items: &[PathBuf]) -> Result<()> {
    let mut body = String::new();
    for item in items {
        body.push_str(&concat_entry(item)?);
        body.push('\n');
    }
    std::fs::write(list_path, body)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
