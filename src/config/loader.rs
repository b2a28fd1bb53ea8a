//! Locating and reading `config.json`.
//!
//! Loading is all-or-nothing: a missing file, unreadable file, malformed JSON
//! or a non-object top level all fail before any action runs.

use anyhow::{Context, Result, bail};
use serde_json::{Map, Value};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// File name used when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "config.json";

/// Runtime override for the directory relative config paths resolve against.
pub const CONFIG_ROOT_ENV: &str = "GRIDPACK_ROOT";

#[derive(Debug, Clone)]
/// Raw configuration document plus the path it was read from.
pub struct ConfigDocument {
    pub path: PathBuf,
    pub root: Map<String, Value>,
}

impl ConfigDocument {
    /// Wrap an in-memory object, mostly useful for tests and tooling.
    pub fn from_value(path: impl Into<PathBuf>, value: Value) -> Result<Self> {
        let path = path.into();
        match value {
            Value::Object(root) => Ok(Self { path, root }),
            _ => bail!(
                "Config file {} must contain a JSON object at the top level",
                path.display()
            ),
        }
    }

    /// Top-level section by name, if present.
    pub fn section(&self, key: &str) -> Option<&Value> {
        self.root.get(key)
    }
}

/// Resolve a `--config` argument to a concrete path.
///
/// Absolute paths are returned unchanged. Relative paths are anchored next to
/// the program: `GRIDPACK_ROOT` when it names a directory, then the directory
/// of the running executable, then the build-time hint baked in by `build.rs`.
/// When the file exists in none of those, the executable directory is used so
/// the loader can name a concrete missing path.
pub fn resolve_config_path(raw: &Path) -> PathBuf {
    if raw.is_absolute() {
        return raw.to_path_buf();
    }

    if let Some(root) = env::var_os(CONFIG_ROOT_ENV).filter(|value| !value.is_empty()) {
        let root = PathBuf::from(root);
        if root.is_dir() {
            return root.join(raw);
        }
        tracing::warn!(
            root = %root.display(),
            "{CONFIG_ROOT_ENV} does not name a directory; ignoring it"
        );
    }

    let exe_dir = env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf));

    if let Some(dir) = exe_dir.as_deref() {
        let candidate = dir.join(raw);
        if candidate.is_file() {
            return candidate;
        }
    }

    if let Some(hint) = option_env!("GRIDPACK_ROOT_HINT") {
        let candidate = Path::new(hint).join(raw);
        if candidate.is_file() {
            return candidate;
        }
    }

    match exe_dir {
        Some(dir) => dir.join(raw),
        None => raw.to_path_buf(),
    }
}

/// Read and parse the configuration document at `path`.
pub fn load_config_document(path: &Path) -> Result<ConfigDocument> {
    if !path.is_file() {
        bail!("Config file not found: {}", path.display());
    }
    let data =
        fs::read_to_string(path).with_context(|| format!("reading config {}", path.display()))?;
    let value: Value = serde_json::from_str(&data)
        .with_context(|| format!("parsing config {}", path.display()))?;
    let document = ConfigDocument::from_value(path, value)?;
    tracing::debug!(
        path = %document.path.display(),
        sections = document.root.len(),
        "loaded configuration"
    );
    Ok(document)
}
