//! Parsed FMU model description

use std::collections::HashSet;
use std::fmt;

/// Variable role declared by the `causality` attribute.
///
/// FMI 1.0 uses `internal`/`none` where later versions use `local`;
/// both spellings are kept as parsed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Causality {
    Parameter,
    CalculatedParameter,
    StructuralParameter,
    Input,
    Output,
    Local,
    Independent,
    Internal,
    None,
    Unknown(String),
}

impl Causality {
    pub fn parse(s: &str) -> Self {
        match s {
            "parameter" => Self::Parameter,
            "calculatedParameter" => Self::CalculatedParameter,
            "structuralParameter" => Self::StructuralParameter,
            "input" => Self::Input,
            "output" => Self::Output,
            "local" => Self::Local,
            "independent" => Self::Independent,
            "internal" => Self::Internal,
            "none" => Self::None,
            other => Self::Unknown(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Parameter => "parameter",
            Self::CalculatedParameter => "calculatedParameter",
            Self::StructuralParameter => "structuralParameter",
            Self::Input => "input",
            Self::Output => "output",
            Self::Local => "local",
            Self::Independent => "independent",
            Self::Internal => "internal",
            Self::None => "none",
            Self::Unknown(s) => s,
        }
    }
}

impl fmt::Display for Causality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of `<ModelVariables>`.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelVariable {
    pub name: String,
    pub causality: Causality,
}

/// Variable counts for the roles the catalog tracks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CausalityCounts {
    pub parameters: usize,
    pub inputs: usize,
    pub outputs: usize,
}

/// Contents of `modelDescription.xml` relevant to the catalog.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelDescription {
    pub fmi_version: Option<String>,
    pub model_name: Option<String>,
    /// `guid` (FMI 1.0/2.0) or `instantiationToken` (FMI 3.0)
    pub guid: Option<String>,
    pub generation_tool: Option<String>,
    pub co_simulation: bool,
    pub model_exchange: bool,
    pub variables: Vec<ModelVariable>,
}

impl ModelDescription {
    /// Major FMI version ("1", "2", "3"), if the attribute is present.
    pub fn major_version(&self) -> Option<&str> {
        self.fmi_version
            .as_deref()
            .and_then(|v| v.split('.').next())
            .filter(|m| !m.is_empty())
    }

    pub fn causality_counts(&self) -> CausalityCounts {
        let mut counts = CausalityCounts::default();
        for var in &self.variables {
            match var.causality {
                Causality::Parameter => counts.parameters += 1,
                Causality::Input => counts.inputs += 1,
                Causality::Output => counts.outputs += 1,
                _ => {}
            }
        }
        counts
    }

    /// Structural problems, in document order. Empty when the model is usable.
    pub fn problems(&self) -> Vec<String> {
        let mut problems = Vec::new();

        let major = self.major_version();
        match (&self.fmi_version, major) {
            (None, _) => problems.push("Missing attribute fmiVersion".to_string()),
            (Some(_), Some("1" | "2" | "3")) => {}
            (Some(v), _) => problems.push(format!("Unsupported FMI version {v}")),
        }

        if self.model_name.as_deref().map_or(true, str::is_empty) {
            problems.push("Missing attribute modelName".to_string());
        }
        if self.guid.as_deref().map_or(true, str::is_empty) {
            let attr = if major == Some("3") {
                "instantiationToken"
            } else {
                "guid"
            };
            problems.push(format!("Missing attribute {attr}"));
        }
        if !self.co_simulation && !self.model_exchange {
            problems.push(
                "The model description must contain at least one CoSimulation or ModelExchange element"
                    .to_string(),
            );
        }

        let mut seen = HashSet::new();
        for var in &self.variables {
            if var.name.is_empty() {
                problems.push("Variable without a name".to_string());
                continue;
            }
            if !seen.insert(var.name.as_str()) {
                problems.push(format!("Variable name \"{}\" is not unique", var.name));
            }
            if let Causality::Unknown(c) = &var.causality {
                problems.push(format!(
                    "Variable \"{}\" has unknown causality \"{c}\"",
                    var.name
                ));
            }
        }

        problems
    }
}
