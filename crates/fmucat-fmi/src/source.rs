//! Model file enumeration

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Lazily list every `*.fmu` below `root`, recursively.
///
/// Unreadable directories are logged and skipped. A missing root yields
/// nothing.
pub fn fmu_files(root: &Path) -> Result<impl Iterator<Item = PathBuf>> {
    let root_str = root
        .to_str()
        .with_context(|| format!("Non UTF-8 model directory: {}", root.display()))?;
    let pattern = format!("{}/**/*.fmu", glob::Pattern::escape(root_str));
    let paths = glob::glob(&pattern).with_context(|| format!("Invalid glob pattern: {pattern}"))?;

    Ok(paths.filter_map(|entry| match entry {
        Ok(path) if path.is_file() => Some(path),
        Ok(_) => None,
        Err(e) => {
            log::warn!("Skipping unreadable path {}: {}", e.path().display(), e.error());
            None
        }
    }))
}
