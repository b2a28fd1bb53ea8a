//! Shared library for the gridpack configuration manager.
//!
//! `config.json` describes the generators, campaigns, physics processes,
//! tunes and parton showers used to produce gridpacks, plus the attribute
//! schema every per-dataset card must follow. The modules here load that file
//! once, validate its structure, audit existing cards, and scaffold new card
//! and EOS directories. The `gridpack` binary is a thin dispatcher over these
//! functions; each takes the loaded configuration explicitly.

pub mod cards;
pub mod config;
pub mod listing;
pub mod materialize;
pub mod validation;

pub use cards::{
    CardCheck, CardCheckReport, CardFinding, FindingKind, check_card_tree, check_cards,
};
pub use config::{
    AttributeDiff, AttributeSchema, Config, ConfigDocument, DatasetSchema, Section,
    load_config_document, resolve_config_path,
};
pub use materialize::{CardPlan, DirPlan, plan_cards, plan_dirs};
pub use validation::{ValidationReport, validate_config};
