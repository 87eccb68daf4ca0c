//! Model inspection seam
//!
//! [`ModelInspector`] is the boundary between the validation stage and
//! whatever understands model files. [`FmuArchive`] reads FMU zip archives
//! directly; tests substitute their own inspectors.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use zip::ZipArchive;
use zip::result::ZipError;

use crate::model::ModelDescription;
use crate::parser::parse_model_description;

const MODEL_DESCRIPTION: &str = "modelDescription.xml";

pub trait ModelInspector {
    /// Validity problems of the file, empty when valid.
    ///
    /// `Err` means the file could not be inspected at all.
    fn validate(&self, path: &Path) -> Result<Vec<String>>;

    /// Metadata of a file that passed [`validate`](Self::validate).
    fn describe(&self, path: &Path) -> Result<ModelDescription>;
}

/// Inspects FMU archives on disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct FmuArchive;

impl FmuArchive {
    /// Raw `modelDescription.xml`, or `None` when the archive lacks it.
    pub fn read_model_description(path: &Path) -> Result<Option<String>> {
        let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
        let mut archive = ZipArchive::new(file).context("Not a valid FMU archive")?;
        let mut entry = match archive.by_name(MODEL_DESCRIPTION) {
            Ok(entry) => entry,
            Err(ZipError::FileNotFound) => return Ok(None),
            Err(e) => return Err(e).context("Failed to read archive entry"),
        };
        let mut xml = String::new();
        entry
            .read_to_string(&mut xml)
            .context("Failed to read modelDescription.xml")?;
        Ok(Some(xml))
    }
}

impl ModelInspector for FmuArchive {
    fn validate(&self, path: &Path) -> Result<Vec<String>> {
        let Some(xml) = Self::read_model_description(path)? else {
            return Ok(vec![format!("Missing {MODEL_DESCRIPTION}")]);
        };
        match parse_model_description(&xml) {
            Ok(md) => Ok(md.problems()),
            Err(e) => Ok(vec![format!("Failed to parse {MODEL_DESCRIPTION}: {e:#}")]),
        }
    }

    fn describe(&self, path: &Path) -> Result<ModelDescription> {
        let xml = Self::read_model_description(path)?
            .with_context(|| format!("Missing {MODEL_DESCRIPTION}"))?;
        parse_model_description(&xml)
    }
}
