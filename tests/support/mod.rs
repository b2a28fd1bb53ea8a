#![allow(dead_code)]

use anyhow::{Context, Result};
use gridpack::{Config, ConfigDocument, load_config_document};
use serde_json::{Value, json};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// Throwaway gridpack workspace: config.json, skeletons/, cards/ and an EOS root.
pub struct Workspace {
    pub temp: TempDir,
}

impl Workspace {
    pub fn new() -> Result<Self> {
        let temp = TempDir::new().context("failed to allocate workspace")?;
        let workspace = Self { temp };
        workspace.write_config(&workspace.default_config())?;
        Ok(workspace)
    }

    pub fn root(&self) -> &Path {
        self.temp.path()
    }

    pub fn config_path(&self) -> PathBuf {
        self.root().join("config.json")
    }

    pub fn cards_dir(&self) -> PathBuf {
        self.root().join("cards")
    }

    pub fn skeletons_dir(&self) -> PathBuf {
        self.root().join("skeletons")
    }

    pub fn eos_dir(&self) -> PathBuf {
        self.root().join("eos")
    }

    /// Configuration with two generators, one campaign and two processes.
    pub fn default_config(&self) -> Value {
        json!({
            "paths": {
                "cards_dir": self.cards_dir(),
                "campaigns_dir": self.root().join("campaigns"),
                "fragments_dir": self.root().join("fragments"),
                "skeletons_dir": self.skeletons_dir(),
                "eos_base_path": self.eos_dir()
            },
            "generators": {
                "madgraph": {
                    "description": "MadGraph5_aMC@NLO",
                    "skeleton_files": ["skeleton_cfg.dat", "skeleton.json"]
                },
                "powheg": {
                    "description": "POWHEG BOX",
                    "skeleton_files": ["skeleton.input"]
                }
            },
            "campaigns": {
                "Run3Summer23": {"tune": "CP5", "beam": 6800}
            },
            "physics_processes": ["ttbar", "wjets"],
            "tunes": {"CP5": "Configuration.Generator.Pythia8CP5Settings_cfi"},
            "parton_showers": {"pythia8": {"description": "Pythia 8"}},
            "dataset_schema": {
                "mandatory_attributes": {"a": {"type": "string"}, "b": {"type": "string"}},
                "optional_attributes": {"c": {"type": "string"}}
            }
        })
    }

    pub fn write_config(&self, value: &Value) -> Result<()> {
        fs::write(self.config_path(), serde_json::to_string_pretty(value)?)
            .context("failed to write config.json")
    }

    pub fn load_config(&self) -> Result<Config> {
        let document = load_config_document(&self.config_path())?;
        Config::from_document(&document)
    }

    pub fn document(&self, value: Value) -> Result<ConfigDocument> {
        ConfigDocument::from_value(self.config_path(), value)
    }

    pub fn write_skeleton(&self, generator: &str, name: &str, contents: &str) -> Result<PathBuf> {
        let dir = self.skeletons_dir().join(generator);
        fs::create_dir_all(&dir)?;
        let path = dir.join(name);
        fs::write(&path, contents)?;
        Ok(path)
    }

    pub fn card_dir(&self, generator: &str, process: &str, dataset: &str) -> PathBuf {
        self.cards_dir().join(generator).join(process).join(dataset)
    }

    pub fn write_card(&self, generator: &str, process: &str, dataset: &str, body: &Value) -> Result<PathBuf> {
        let dir = self.card_dir(generator, process, dataset);
        fs::create_dir_all(&dir)?;
        let path = dir.join(format!("{dataset}.json"));
        fs::write(&path, serde_json::to_string(body)?)?;
        Ok(path)
    }

    /// Run the compiled binary against this workspace's config.json.
    pub fn run(&self, args: &[&str]) -> Result<Output> {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_gridpack"));
        cmd.arg("--config").arg(self.config_path()).args(args);
        cmd.env_remove("RUST_LOG");
        cmd.output()
            .with_context(|| format!("failed to run command: {:?}", cmd))
    }
}

pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}
