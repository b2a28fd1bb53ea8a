//! Audit of per-dataset card files against the configured attribute schema.
//!
//! Cards live at `<cards_dir>/<generator>/<process>/<dataset>/<dataset>.json`.
//! The expected file name is always derived from the dataset directory name;
//! a card stored under any other stem counts as missing.

use crate::config::{AttributeSchema, Config};
use anyhow::{Context, Result};
use serde_json::Value;
use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FindingKind {
    /// The dataset directory has no `<dataset>.json`.
    MissingFile,
    /// The card could not be read or is not a JSON object.
    InvalidJson(String),
    /// Mandatory attributes absent from the card.
    MissingKeys(BTreeSet<String>),
    /// Attributes outside the schema; reported but never fatal.
    UnknownKeys(BTreeSet<String>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardFinding {
    pub path: PathBuf,
    pub kind: FindingKind,
}

impl CardFinding {
    pub fn is_error(&self) -> bool {
        !matches!(self.kind, FindingKind::UnknownKeys(_))
    }
}

impl fmt::Display for CardFinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = self.path.display();
        match &self.kind {
            FindingKind::MissingFile => write!(f, "MISSING: {path}"),
            FindingKind::InvalidJson(detail) => write!(f, "JSON ERROR in {path}: {detail}"),
            FindingKind::MissingKeys(keys) => {
                write!(f, "MISSING KEYS in {path}: {}", join_keys(keys))
            }
            FindingKind::UnknownKeys(keys) => {
                write!(f, "UNKNOWN KEYS in {path}: {}", join_keys(keys))
            }
        }
    }
}

fn join_keys(keys: &BTreeSet<String>) -> String {
    keys.iter().map(String::as_str).collect::<Vec<_>>().join(", ")
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Findings from one walk of the card tree, in visit order.
pub struct CardCheckReport {
    /// Card files that existed and were opened.
    pub checked: usize,
    pub findings: Vec<CardFinding>,
}

impl CardCheckReport {
    /// Number of findings that fail the run; a card missing several keys
    /// counts once.
    pub fn error_count(&self) -> usize {
        self.findings.iter().filter(|f| f.is_error()).count()
    }

    pub fn is_clean(&self) -> bool {
        self.error_count() == 0
    }

    pub fn write_to(&self, out: &mut impl Write) -> io::Result<()> {
        for finding in &self.findings {
            writeln!(out, "{finding}")?;
        }
        writeln!(out)?;
        writeln!(
            out,
            "Checked {} card files, found {} errors.",
            self.checked,
            self.error_count()
        )
    }
}

/// Why a card audit could not start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaProblem {
    MissingSchema,
    IncompleteSchema,
}

impl fmt::Display for SchemaProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaProblem::MissingSchema => f.write_str("Missing dataset_schema in config"),
            SchemaProblem::IncompleteSchema => {
                f.write_str("dataset_schema missing required keys")
            }
        }
    }
}

/// Outcome of `check-cards`: either a report or the reason no walk happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CardCheck {
    Walked(CardCheckReport),
    Skipped(SchemaProblem),
}

impl CardCheck {
    pub fn is_clean(&self) -> bool {
        match self {
            CardCheck::Walked(report) => report.is_clean(),
            CardCheck::Skipped(_) => false,
        }
    }

    pub fn write_to(&self, out: &mut impl Write) -> io::Result<()> {
        match self {
            CardCheck::Walked(report) => report.write_to(out),
            CardCheck::Skipped(problem) => writeln!(out, "ERROR: {problem}"),
        }
    }
}

/// Audit every card under `cards_dir` for the generators in `config`.
pub fn check_cards(config: &Config) -> Result<CardCheck> {
    let Some(dataset_schema) = config.dataset_schema.as_ref() else {
        return Ok(CardCheck::Skipped(SchemaProblem::MissingSchema));
    };
    let schema = match dataset_schema.attribute_schema() {
        Ok(schema) => schema,
        Err(err) => {
            tracing::debug!("{err}");
            return Ok(CardCheck::Skipped(SchemaProblem::IncompleteSchema));
        }
    };
    let generators: Vec<&str> = config.generators.names().collect();
    check_card_tree(&config.paths.cards_dir, &generators, &schema).map(CardCheck::Walked)
}

/// Walk `<cards_dir>/<generator>/<process>/<dataset>/` for the given generators.
///
/// Generators without a directory are skipped. Loose files at the process or
/// dataset level are ignored; only directories are descended into.
pub fn check_card_tree(
    cards_dir: &Path,
    generators: &[&str],
    schema: &AttributeSchema,
) -> Result<CardCheckReport> {
    let mut report = CardCheckReport::default();

    for generator in generators {
        let generator_dir = cards_dir.join(generator);
        if !generator_dir.exists() {
            tracing::debug!(
                path = %generator_dir.display(),
                "no card tree for generator {generator}; skipping"
            );
            continue;
        }

        for process_dir in sorted_subdirs(&generator_dir)? {
            for dataset_dir in sorted_subdirs(&process_dir)? {
                check_dataset_dir(&dataset_dir, schema, &mut report);
            }
        }
    }

    Ok(report)
}

fn check_dataset_dir(dataset_dir: &Path, schema: &AttributeSchema, report: &mut CardCheckReport) {
    let Some(dataset) = dataset_dir.file_name() else {
        return;
    };
    let mut card_name = dataset.to_os_string();
    card_name.push(".json");
    let card_path = dataset_dir.join(card_name);

    if !card_path.is_file() {
        report.findings.push(CardFinding {
            path: card_path,
            kind: FindingKind::MissingFile,
        });
        return;
    }

    report.checked += 1;
    let present = match card_keys(&card_path) {
        Ok(keys) => keys,
        Err(detail) => {
            report.findings.push(CardFinding {
                path: card_path,
                kind: FindingKind::InvalidJson(detail),
            });
            return;
        }
    };

    let diff = schema.compare(&present);
    if !diff.missing.is_empty() {
        report.findings.push(CardFinding {
            path: card_path.clone(),
            kind: FindingKind::MissingKeys(diff.missing),
        });
    }
    if !diff.unknown.is_empty() {
        report.findings.push(CardFinding {
            path: card_path,
            kind: FindingKind::UnknownKeys(diff.unknown),
        });
    }
}

/// Top-level keys of a card, or a human-readable reason it is unusable.
fn card_keys(path: &Path) -> Result<BTreeSet<String>, String> {
    let data = fs::read_to_string(path).map_err(|err| format!("unable to read: {err}"))?;
    match serde_json::from_str::<Value>(&data) {
        Ok(Value::Object(map)) => Ok(map.into_iter().map(|(key, _)| key).collect()),
        Ok(_) => Err("expected a JSON object".to_string()),
        Err(err) => Err(err.to_string()),
    }
}

fn sorted_subdirs(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut dirs = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("listing {}", dir.display()))? {
        let path = entry
            .with_context(|| format!("listing {}", dir.display()))?
            .path();
        if path.is_dir() {
            dirs.push(path);
        }
    }
    dirs.sort();
    Ok(dirs)
}
