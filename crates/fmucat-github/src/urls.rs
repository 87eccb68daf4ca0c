//! Plain-text URL list reader
//!
//! One URL per line. The link catalog written by the search stage is also
//! accepted: its `Url` header line is skipped and quoted fields unwrapped.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::{Context, Result};
use fmucat_store::Record;

use crate::records::LinkRecord;

/// Lazily read the URL list at `path`.
pub fn read_url_list(path: &Path) -> Result<impl Iterator<Item = String>> {
    let file = File::open(path).with_context(|| format!("Cannot read URL list {}", path.display()))?;
    let display = path.display().to_string();
    let lines = BufReader::new(file).lines().map_while(move |line| match line {
        Ok(line) => Some(line),
        Err(e) => {
            log::warn!("{display}: stopped reading: {e}");
            None
        }
    });
    Ok(url_lines(lines))
}

/// URLs from raw lines: trimmed, blanks and a leading header dropped.
pub fn url_lines<I: IntoIterator<Item = String>>(lines: I) -> impl Iterator<Item = String> {
    lines.into_iter().enumerate().filter_map(|(i, line)| {
        let line = line.trim();
        if line.is_empty() || (i == 0 && line == LinkRecord::COLUMNS[0]) {
            return None;
        }
        Some(unquote(line))
    })
}

fn unquote(field: &str) -> String {
    match field.strip_prefix('"').and_then(|f| f.strip_suffix('"')) {
        Some(inner) => inner.replace("\"\"", "\""),
        None => field.to_string(),
    }
}
