//! Keyed, append-only result table persisted as CSV
//!
//! File layout: one header row (`Record::COLUMNS`), then one row per record
//! in ascending key order. Saves go to `<file>.tmp` and are renamed over the
//! previous file, so the table on disk is always a complete earlier save.
//! One process per table file; there is no locking.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::record::{Outcome, Record};
use crate::summary::{Failure, Summary};

/// Errors from loading or saving a result table.
///
/// All of them are fatal for a run: a table that cannot be read must not be
/// silently replaced by an empty one.
#[derive(Debug)]
pub enum StoreError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Unparsable row or value
    Csv {
        path: PathBuf,
        source: csv::Error,
    },
    /// Header row does not match the record schema
    Schema {
        path: PathBuf,
        expected: Vec<String>,
        found: Vec<String>,
    },
    /// A key occurs twice, in the file or via `add_result`
    DuplicateKey { key: String },
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "{}: {source}", path.display()),
            Self::Csv { path, source } => write!(f, "{}: {source}", path.display()),
            Self::Schema {
                path,
                expected,
                found,
            } => write!(
                f,
                "{}: header {:?} does not match expected columns {:?}",
                path.display(),
                found,
                expected
            ),
            Self::DuplicateKey { key } => write!(f, "duplicate key in result table: {key}"),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Csv { source, .. } => Some(source),
            Self::Schema { .. } | Self::DuplicateKey { .. } => None,
        }
    }
}

impl StoreError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    fn csv(path: &Path, source: csv::Error) -> Self {
        Self::Csv {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Counters for the current process. Never persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub succeeded: usize,
    pub failed: usize,
    /// Items whose key was already recorded (or already complete on disk)
    pub skipped: usize,
}

impl SessionStats {
    /// Records added this session
    pub fn processed(&self) -> usize {
        self.succeeded + self.failed
    }

    /// Counts accumulated since `earlier`
    pub fn since(&self, earlier: &SessionStats) -> SessionStats {
        SessionStats {
            succeeded: self.succeeded - earlier.succeeded,
            failed: self.failed - earlier.failed,
            skipped: self.skipped - earlier.skipped,
        }
    }
}

/// Durable, key-ordered table of records of one schema.
#[derive(Debug)]
pub struct KeyedResultStore<R> {
    path: PathBuf,
    rows: BTreeMap<String, R>,
    stats: SessionStats,
}

impl<R: Record> KeyedResultStore<R> {
    /// Load the table at `path`, or start an empty one if the file is absent.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let mut rows = BTreeMap::new();

        if !path.exists() {
            log::debug!("{}: no table yet, starting empty", path.display());
            return Ok(Self {
                path,
                rows,
                stats: SessionStats::default(),
            });
        }

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_path(&path)
            .map_err(|e| StoreError::csv(&path, e))?;

        let header = reader
            .headers()
            .map_err(|e| StoreError::csv(&path, e))?
            .clone();
        if !header.iter().eq(R::COLUMNS.iter().copied()) {
            return Err(StoreError::Schema {
                path,
                expected: R::COLUMNS.iter().map(|c| c.to_string()).collect(),
                found: header.iter().map(String::from).collect(),
            });
        }

        for row in reader.deserialize::<R>() {
            let record = row.map_err(|e| StoreError::csv(&path, e))?;
            let key = record.key().to_string();
            if rows.contains_key(&key) {
                return Err(StoreError::DuplicateKey { key });
            }
            rows.insert(key, record);
        }

        log::debug!("{}: loaded {} records", path.display(), rows.len());
        Ok(Self {
            path,
            rows,
            stats: SessionStats::default(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Check for `key` before processing an item.
    ///
    /// A hit counts as a skipped duplicate in the session stats.
    pub fn contains_key(&mut self, key: &str) -> bool {
        let found = self.rows.contains_key(key);
        if found {
            self.stats.skipped += 1;
        }
        found
    }

    /// Look up a record without touching the counters.
    pub fn get(&self, key: &str) -> Option<&R> {
        self.rows.get(key)
    }

    /// Count a duplicate detected outside the table (e.g. a file already on disk).
    pub fn record_skip(&mut self) {
        self.stats.skipped += 1;
    }

    /// Append one record. The key must not be present yet; callers check
    /// with [`contains_key`](Self::contains_key) first.
    ///
    /// The record is kept as a reload would return it, so `Some("")` fields
    /// become `None` here rather than after the next save.
    pub fn add_result(&mut self, record: R) -> Result<(), StoreError> {
        let record = as_persisted(&record).map_err(|e| StoreError::csv(&self.path, e))?;
        let key = record.key().to_string();
        if self.rows.contains_key(&key) {
            return Err(StoreError::DuplicateKey { key });
        }
        match record.outcome() {
            Outcome::Succeeded => self.stats.succeeded += 1,
            Outcome::Failed => self.stats.failed += 1,
        }
        self.rows.insert(key, record);
        Ok(())
    }

    /// Write the whole table in key order, replacing the file atomically.
    ///
    /// Safe to call repeatedly, mid-run as a checkpoint or at the end.
    pub fn save(&self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;
        }

        let tmp = tmp_path(&self.path);
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_path(&tmp)
            .map_err(|e| StoreError::csv(&tmp, e))?;
        writer
            .write_record(R::COLUMNS)
            .map_err(|e| StoreError::csv(&tmp, e))?;
        for record in self.rows.values() {
            writer
                .serialize(record)
                .map_err(|e| StoreError::csv(&tmp, e))?;
        }
        writer.flush().map_err(|e| StoreError::io(&tmp, e))?;
        drop(writer);

        fs::rename(&tmp, &self.path).map_err(|e| StoreError::io(&self.path, e))?;
        log::debug!("{}: saved {} records", self.path.display(), self.rows.len());
        Ok(())
    }

    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    /// Records in key order.
    pub fn records(&self) -> impl Iterator<Item = &R> {
        self.rows.values()
    }

    /// Session counts plus every failed record in the whole table.
    pub fn summary(&self) -> Summary {
        let failures: Vec<Failure> = self
            .rows
            .values()
            .filter(|r| r.outcome().is_failed())
            .map(|r| Failure {
                key: r.key().to_string(),
                message: r.diagnostic().unwrap_or("failed").to_string(),
            })
            .collect();
        Summary {
            session: self.stats,
            total: self.rows.len(),
            total_succeeded: self.rows.len() - failures.len(),
            failures,
        }
    }
}

/// Pass `record` through one CSV row, the same way `save` and `load` do.
fn as_persisted<R: Record>(record: &R) -> Result<R, csv::Error> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    writer.write_record(R::COLUMNS)?;
    writer.serialize(record)?;
    let row = writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))?;

    csv::Reader::from_reader(row.as_slice())
        .deserialize()
        .next()
        .unwrap_or_else(|| {
            Err(csv::Error::from(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                "record serialized to no row",
            )))
        })
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut s = path.as_os_str().to_owned();
    s.push(".tmp");
    PathBuf::from(s)
}

#[cfg(test)]
pub(crate) mod testing {
    use serde::{Deserialize, Serialize};

    use crate::record::{Outcome, Record};

    /// Small record exercising every column type.
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct Sample {
        #[serde(rename = "Name")]
        pub name: String,
        #[serde(rename = "Ok")]
        pub ok: Option<bool>,
        #[serde(rename = "Note")]
        pub note: Option<String>,
        #[serde(rename = "Size")]
        pub size: Option<i64>,
    }

    impl Sample {
        pub fn good(name: &str, size: i64) -> Self {
            Self {
                name: name.to_string(),
                ok: Some(true),
                note: None,
                size: Some(size),
            }
        }

        pub fn bad(name: &str, note: &str) -> Self {
            Self {
                name: name.to_string(),
                ok: Some(false),
                note: Some(note.to_string()),
                size: None,
            }
        }
    }

    impl Record for Sample {
        const COLUMNS: &'static [&'static str] = &["Name", "Ok", "Note", "Size"];

        fn key(&self) -> &str {
            &self.name
        }

        fn outcome(&self) -> Outcome {
            if self.ok == Some(true) {
                Outcome::Succeeded
            } else {
                Outcome::Failed
            }
        }

        fn diagnostic(&self) -> Option<&str> {
            self.note.as_deref()
        }
    }
}
