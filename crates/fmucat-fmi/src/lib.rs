//! fmucat-fmi: FMU model validation
//!
//! Opens FMU archives, parses `modelDescription.xml` with quick-xml and
//! turns the result into one [`ModelRecord`] per file. The validation stage
//! walks the download directory for `*.fmu` files and records every archive
//! in the model catalog, valid or not.
//!
//! # Example
//!
//! ```ignore
//! use fmucat_fmi::{Config, run};
//!
//! let config = Config::new("downloads", "fmu_models.csv");
//! let stage = run(&config, &progress)?;
//! stage.summary.print("validate");
//! ```

pub mod config;
pub mod inspector;
pub mod model;
pub mod parser;
pub mod record;
pub mod runner;
pub mod source;
pub mod validator;

pub use config::Config;
pub use inspector::{FmuArchive, ModelInspector};
pub use model::{Causality, CausalityCounts, ModelDescription, ModelVariable};
pub use parser::parse_model_description;
pub use record::ModelRecord;
pub use runner::run;
pub use source::fmu_files;
pub use validator::{FileValidator, one_line_reason};
