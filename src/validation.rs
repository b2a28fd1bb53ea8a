//! Structural checks for `config.json`.
//!
//! Runs on the raw document rather than the typed [`crate::Config`] so a file
//! missing whole sections still produces a full report instead of the first
//! deserialization error. Errors make the configuration invalid; warnings are
//! informational only.

use crate::config::ConfigDocument;
use serde_json::Value;
use std::io::{self, Write};

/// Top-level sections every configuration must declare.
pub const REQUIRED_SECTIONS: &[&str] = &[
    "paths",
    "generators",
    "campaigns",
    "tunes",
    "parton_showers",
];

/// Keys expected under `paths`.
pub const REQUIRED_PATHS: &[&str] = &[
    "cards_dir",
    "campaigns_dir",
    "fragments_dir",
    "skeletons_dir",
    "eos_base_path",
];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Ordered errors and warnings collected from one validation pass.
pub struct ValidationReport {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Print the human-readable report.
    pub fn write_to(&self, out: &mut impl Write) -> io::Result<()> {
        if !self.errors.is_empty() {
            writeln!(out, "Validation FAILED:")?;
            for error in &self.errors {
                writeln!(out, "  ERROR: {error}")?;
            }
        }
        if !self.warnings.is_empty() {
            writeln!(out, "Warnings:")?;
            for warning in &self.warnings {
                writeln!(out, "  WARNING: {warning}")?;
            }
        }
        if self.errors.is_empty() && self.warnings.is_empty() {
            writeln!(out, "Configuration is valid!")?;
        }
        Ok(())
    }
}

/// Check a configuration document for required sections and descriptive fields.
pub fn validate_config(document: &ConfigDocument) -> ValidationReport {
    // Collect everything instead of stopping at the first problem so one run
    // shows every gap in the file.
    let mut report = ValidationReport::default();

    for key in REQUIRED_SECTIONS {
        if document.section(key).is_none() {
            report.errors.push(format!("Missing required key: {key}"));
        }
    }

    if let Some(paths) = document.section("paths") {
        for key in REQUIRED_PATHS {
            if paths.get(key).is_none() {
                report.errors.push(format!("Missing required path: {key}"));
            }
        }
    }

    match document.section("dataset_schema") {
        Some(schema) => {
            if schema.get("mandatory_attributes").is_none() {
                report
                    .errors
                    .push("dataset_schema missing 'mandatory_attributes'".to_string());
            }
            if schema.get("optional_attributes").is_none() {
                report
                    .errors
                    .push("dataset_schema missing 'optional_attributes'".to_string());
            }
        }
        None => report
            .errors
            .push("Missing dataset_schema in config".to_string()),
    }

    if let Some(Value::Object(generators)) = document.section("generators") {
        for (name, info) in generators {
            if info.get("description").is_none() {
                report
                    .warnings
                    .push(format!("Generator {name} missing description"));
            }
        }
    }

    if let Some(Value::Object(campaigns)) = document.section("campaigns") {
        for (name, info) in campaigns {
            if info.get("tune").is_none() {
                report.warnings.push(format!("Campaign {name} missing tune"));
            }
            if info.get("beam").is_none() {
                report
                    .warnings
                    .push(format!("Campaign {name} missing beam energy"));
            }
        }
    }

    tracing::debug!(
        errors = report.errors.len(),
        warnings = report.warnings.len(),
        "validated {}",
        document.path.display()
    );
    report
}
