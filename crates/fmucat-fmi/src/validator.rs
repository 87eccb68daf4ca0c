//! File validation processor

use std::path::{Path, PathBuf};

use fmucat_core::call_boundary;
use fmucat_store::ItemProcessor;

use crate::inspector::{FmuArchive, ModelInspector};
use crate::record::ModelRecord;

/// Longest diagnostic kept in the catalog, in characters.
pub const MAX_REASON_CHARS: usize = 80;
/// Appended when a diagnostic was shortened.
pub const TRUNCATION_MARKER: &str = "...";

/// Reduce a diagnostic to one line of at most [`MAX_REASON_CHARS`]
/// characters, marking any cut with [`TRUNCATION_MARKER`].
pub fn one_line_reason(message: &str) -> String {
    let message = message.trim();
    let first = message.lines().next().unwrap_or_default().trim_end();
    let mut out: String = first
        .chars()
        .take(MAX_REASON_CHARS)
        .map(|c| if c == '\r' { ' ' } else { c })
        .collect();

    let cut = first.chars().count() > MAX_REASON_CHARS || first.len() < message.len();
    if cut {
        out.push_str(TRUNCATION_MARKER);
    }
    if out.is_empty() {
        out.push_str("unknown error");
    }
    out
}

/// Validates one model file per item and records its metadata.
pub struct FileValidator<I = FmuArchive> {
    inspector: I,
}

impl FileValidator {
    pub fn new() -> Self {
        Self {
            inspector: FmuArchive,
        }
    }
}

impl Default for FileValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: ModelInspector> FileValidator<I> {
    pub fn with_inspector(inspector: I) -> Self {
        Self { inspector }
    }

    fn inspect(&self, path: &Path, key: String) -> ModelRecord {
        let problems = match call_boundary(|| self.inspector.validate(path)) {
            Ok(problems) => problems,
            Err(msg) => return ModelRecord::invalid(key, one_line_reason(&msg)),
        };
        if let Some(first) = problems.first() {
            return ModelRecord::invalid(key, one_line_reason(first));
        }
        match call_boundary(|| self.inspector.describe(path)) {
            Ok(md) => ModelRecord::valid(key, &md),
            Err(msg) => ModelRecord::invalid(key, one_line_reason(&msg)),
        }
    }
}

impl<I: ModelInspector> ItemProcessor for FileValidator<I> {
    type Item = PathBuf;
    type Record = ModelRecord;

    fn key(&self, item: &PathBuf) -> String {
        item.to_string_lossy().into_owned()
    }

    fn process(&mut self, item: PathBuf, key: String) -> ModelRecord {
        self.inspect(&item, key)
    }
}

#[cfg(test)]
mod tests {
    use anyhow::{Result, bail};

    use super::*;
    use crate::inspector::testing::{VALID_XML, write_fmu};
    use crate::model::ModelDescription;

    #[test]
    fn short_message_unchanged() {
        assert_eq!(one_line_reason("Missing modelDescription.xml"), "Missing modelDescription.xml");
    }

    #[test]
    fn long_message_cut_to_80_plus_marker() {
        let long = "x".repeat(200);
        let reason = one_line_reason(&long);
        assert_eq!(reason, format!("{}...", "x".repeat(80)));
        assert_eq!(reason.chars().count(), MAX_REASON_CHARS + TRUNCATION_MARKER.len());
    }

    #[test]
    fn exactly_80_is_kept_whole() {
        let msg = "y".repeat(80);
        assert_eq!(one_line_reason(&msg), msg);
    }

    #[test]
    fn multiline_keeps_first_line_with_marker() {
        let reason = one_line_reason("Failed to parse\n  at line 3\n  column 7");
        assert_eq!(reason, "Failed to parse...");
        assert!(!reason.contains('\n'));
    }

    #[test]
    fn counts_characters_not_bytes() {
        let msg = "é".repeat(90);
        assert_eq!(one_line_reason(&msg), format!("{}...", "é".repeat(80)));
    }

    #[test]
    fn blank_message_gets_placeholder() {
        assert_eq!(one_line_reason("  \n"), "unknown error");
    }

    struct Scripted {
        problems: Vec<String>,
        describe_panics: bool,
    }

    impl ModelInspector for Scripted {
        fn validate(&self, _: &Path) -> Result<Vec<String>> {
            Ok(self.problems.clone())
        }

        fn describe(&self, _: &Path) -> Result<ModelDescription> {
            if self.describe_panics {
                panic!("index out of range in model structure");
            }
            bail!("unreachable for this test")
        }
    }

    struct Failing;

    impl ModelInspector for Failing {
        fn validate(&self, _: &Path) -> Result<Vec<String>> {
            bail!("zip: invalid central directory\nsecond line")
        }

        fn describe(&self, _: &Path) -> Result<ModelDescription> {
            unreachable!()
        }
    }

    fn validate_with<I: ModelInspector>(inspector: I) -> ModelRecord {
        let mut v = FileValidator::with_inspector(inspector);
        let item = PathBuf::from("downloads/o/r/m.fmu");
        let key = v.key(&item);
        v.process(item, key)
    }

    #[test]
    fn first_problem_becomes_reason() {
        let record = validate_with(Scripted {
            problems: vec!["Missing attribute guid".into(), "second".into()],
            describe_panics: false,
        });
        assert!(!record.valid);
        assert_eq!(record.invalid_reason.as_deref(), Some("Missing attribute guid"));
        assert_eq!(record.filename, "downloads/o/r/m.fmu");
    }

    #[test]
    fn inspector_error_becomes_failed_record() {
        let record = validate_with(Failing);
        assert!(!record.valid);
        assert_eq!(
            record.invalid_reason.as_deref(),
            Some("zip: invalid central directory...")
        );
    }

    #[test]
    fn inspector_panic_becomes_failed_record() {
        let record = validate_with(Scripted {
            problems: vec![],
            describe_panics: true,
        });
        assert!(!record.valid);
        assert_eq!(
            record.invalid_reason.as_deref(),
            Some("panic: index out of range in model structure")
        );
    }

    #[test]
    fn real_archive_yields_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("o/r/gain.fmu");
        write_fmu(&path, &[("modelDescription.xml", VALID_XML)]);

        let mut v = FileValidator::new();
        let key = v.key(&path);
        let record = v.process(path, key);
        assert!(record.valid);
        assert_eq!(record.invalid_reason, None);
        assert_eq!(record.fmi_version.as_deref(), Some("2.0"));
        assert_eq!(record.co_simulation, Some(true));
        assert_eq!(record.model_exchange, Some(false));
        assert_eq!(
            (record.param_count, record.input_count, record.output_count),
            (Some(1), Some(1), Some(1))
        );
        assert_eq!(
            record.generation_tool.as_deref(),
            Some("OpenModelica Compiler v1.22.0")
        );
    }
}
