//! Writers for on-disk document fixtures.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Remove the common leading indentation from an inline YAML literal.
///
/// Blank lines are ignored when measuring the indentation.
#[must_use]
pub fn dedent(text: &str) -> String {
    let indent = text
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.len() - line.trim_start().len())
        .min()
        .unwrap_or(0);
    text.lines()
        .map(|line| line.get(indent..).unwrap_or_else(|| line.trim_start()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Write `contents` (dedented) to `dir/relative`, creating parent directories.
///
/// # Errors
///
/// Returns an error if a directory or the file cannot be created.
pub fn write_document(dir: &Path, relative: &str, contents: &str) -> Result<PathBuf> {
    let path = dir.join(relative);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create {}", parent.display()))?;
    }
    std::fs::write(&path, dedent(contents)).with_context(|| format!("write {}", path.display()))?;
    Ok(path)
}
