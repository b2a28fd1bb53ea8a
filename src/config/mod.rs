//! Gridpack configuration wiring.
//!
//! `config.json` is read once per invocation into a raw JSON object
//! ([`ConfigDocument`]) so structurally broken files can still be reported on
//! by the validator. Every other action works on the typed [`Config`]
//! projection, which checks the section shapes once at load time.

pub mod loader;
pub mod model;

pub use loader::{
    CONFIG_ROOT_ENV, ConfigDocument, DEFAULT_CONFIG_FILE, load_config_document,
    resolve_config_path,
};
pub use model::{
    AttributeDiff, AttributeSchema, Beam, Campaign, Config, DatasetSchema, Generator, PartonShower,
    Paths, Section,
};
