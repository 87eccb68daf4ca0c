//! Record schema contract

use serde::Serialize;
use serde::de::DeserializeOwned;

/// Result class of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Carries domain metadata
    Succeeded,
    /// Carries a short diagnostic, metadata columns null
    Failed,
}

impl Outcome {
    pub fn is_failed(self) -> bool {
        self == Self::Failed
    }
}

/// One row of a result table.
///
/// Implementors are plain serde structs whose fields are `String` (the key)
/// or `Option<String>` / `Option<bool>` / `Option<i64>`. Field order must
/// match [`Record::COLUMNS`], which is written as the CSV header and checked
/// on load. An empty CSV field is the null marker, so `Some("")` is stored
/// (and reloads) as `None`.
pub trait Record: Serialize + DeserializeOwned {
    /// CSV header, key column first.
    const COLUMNS: &'static [&'static str];

    /// Unique, immutable key.
    fn key(&self) -> &str;

    fn outcome(&self) -> Outcome;

    /// Diagnostic message for failed records.
    fn diagnostic(&self) -> Option<&str>;
}
