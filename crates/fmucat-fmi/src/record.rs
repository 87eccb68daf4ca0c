//! Model catalog row

use fmucat_store::{Outcome, Record};
use serde::{Deserialize, Serialize};

use crate::model::ModelDescription;

/// One validated (or rejected) model file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelRecord {
    #[serde(rename = "Filename")]
    pub filename: String,
    #[serde(rename = "Valid")]
    pub valid: bool,
    #[serde(rename = "Invalid Reason")]
    pub invalid_reason: Option<String>,
    #[serde(rename = "FMI Version")]
    pub fmi_version: Option<String>,
    #[serde(rename = "Co-Simulation")]
    pub co_simulation: Option<bool>,
    #[serde(rename = "Model Exchange")]
    pub model_exchange: Option<bool>,
    #[serde(rename = "Param Count")]
    pub param_count: Option<i64>,
    #[serde(rename = "Input Count")]
    pub input_count: Option<i64>,
    #[serde(rename = "Output Count")]
    pub output_count: Option<i64>,
    #[serde(rename = "Generation Tool")]
    pub generation_tool: Option<String>,
}

impl ModelRecord {
    pub fn valid(filename: String, md: &ModelDescription) -> Self {
        let counts = md.causality_counts();
        Self {
            filename,
            valid: true,
            invalid_reason: None,
            fmi_version: non_empty(md.fmi_version.as_deref()),
            co_simulation: Some(md.co_simulation),
            model_exchange: Some(md.model_exchange),
            param_count: Some(counts.parameters as i64),
            input_count: Some(counts.inputs as i64),
            output_count: Some(counts.outputs as i64),
            generation_tool: non_empty(md.generation_tool.as_deref()),
        }
    }

    pub fn invalid(filename: String, reason: String) -> Self {
        Self {
            filename,
            valid: false,
            invalid_reason: Some(reason),
            fmi_version: None,
            co_simulation: None,
            model_exchange: None,
            param_count: None,
            input_count: None,
            output_count: None,
            generation_tool: None,
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|s| !s.is_empty()).map(str::to_owned)
}

impl Record for ModelRecord {
    const COLUMNS: &'static [&'static str] = &[
        "Filename",
        "Valid",
        "Invalid Reason",
        "FMI Version",
        "Co-Simulation",
        "Model Exchange",
        "Param Count",
        "Input Count",
        "Output Count",
        "Generation Tool",
    ];

    fn key(&self) -> &str {
        &self.filename
    }

    fn outcome(&self) -> Outcome {
        if self.valid {
            Outcome::Succeeded
        } else {
            Outcome::Failed
        }
    }

    fn diagnostic(&self) -> Option<&str> {
        self.invalid_reason.as_deref()
    }
}
