//! Directory and card scaffolding.
//!
//! Both actions are split into a plan (pure, computed from the configuration
//! and existence checks) and an `apply` step that touches the filesystem only
//! when the caller passes `--doit`. Card scaffolding keeps the legacy naming
//! contract: the `skeleton` substring of each template file name and every
//! `$process` token in its contents are replaced by the dataset name.

use crate::config::Config;
use anyhow::{Context, Result, bail};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Substring of skeleton file names replaced by the dataset name.
pub const SKELETON_FILENAME_TOKEN: &str = "skeleton";

/// Placeholder inside skeleton files replaced by the dataset name.
pub const PROCESS_PLACEHOLDER: &str = "$process";

#[derive(Debug, Clone, PartialEq, Eq)]
/// Directories under the EOS base path that do not exist yet.
pub struct DirPlan {
    pub missing: Vec<PathBuf>,
}

/// List `<eos_base_path>/<campaign>/<generator>/<process>` paths that are missing.
pub fn plan_dirs(config: &Config) -> DirPlan {
    let base = &config.paths.eos_base_path;
    let mut missing = Vec::new();
    for campaign in config.campaigns.names() {
        for generator in config.generators.names() {
            for process in &config.physics_processes {
                let path = base.join(campaign).join(generator).join(process);
                if !path.exists() {
                    missing.push(path);
                }
            }
        }
    }
    DirPlan { missing }
}

impl DirPlan {
    /// Report the plan and, when `doit` is set, create every missing directory.
    pub fn apply(&self, doit: bool, out: &mut impl Write) -> Result<()> {
        for path in &self.missing {
            if doit {
                fs::create_dir_all(path)
                    .with_context(|| format!("creating {}", path.display()))?;
                tracing::info!(path = %path.display(), "created directory");
                writeln!(out, "Created: {}", path.display())?;
            } else {
                writeln!(out, "Would create: {}", path.display())?;
            }
        }

        if self.missing.is_empty() {
            writeln!(out, "All directories already exist.")?;
        } else if !doit {
            writeln!(out)?;
            writeln!(
                out,
                "Run with --doit to create {} directories.",
                self.missing.len()
            )?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// One skeleton template and where its customized copy goes.
pub struct CardFile {
    pub source: PathBuf,
    pub skeleton_name: String,
    pub destination_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Validated request to seed a new dataset card directory.
pub struct CardPlan {
    pub dataset: String,
    pub target_dir: PathBuf,
    pub files: Vec<CardFile>,
}

/// File name a skeleton template is copied to for `dataset`.
pub fn destination_name(skeleton_name: &str, dataset: &str) -> String {
    skeleton_name.replace(SKELETON_FILENAME_TOKEN, dataset)
}

/// Skeleton contents customized for `dataset`.
pub fn substitute_placeholder(contents: &str, dataset: &str) -> String {
    contents.replace(PROCESS_PLACEHOLDER, dataset)
}

/// Check the preconditions for a new card directory and map its files.
///
/// Fails when any name is empty, when the generator is unknown, when the
/// target dataset directory already exists, or when the generator has no
/// skeleton directory.
pub fn plan_cards(
    config: &Config,
    generator: &str,
    process: &str,
    dataset: &str,
) -> Result<CardPlan> {
    // An empty name would collapse the <generator>/<process>/<dataset> layout.
    if generator.is_empty() || process.is_empty() || dataset.is_empty() {
        bail!("make-cards requires --generator, --process, and --dataset");
    }
    let generator_info = config.generator(generator)?;

    let target_dir = config
        .paths
        .cards_dir
        .join(generator)
        .join(process)
        .join(dataset);
    let skeleton_dir = config.paths.skeletons_dir.join(generator);

    if target_dir.exists() {
        bail!("Path already exists: {}", target_dir.display());
    }
    if !skeleton_dir.exists() {
        bail!("Skeleton path not found: {}", skeleton_dir.display());
    }

    let files = generator_info
        .skeleton_files
        .iter()
        .map(|name| CardFile {
            source: skeleton_dir.join(name),
            skeleton_name: name.clone(),
            destination_name: destination_name(name, dataset),
        })
        .collect();

    Ok(CardPlan {
        dataset: dataset.to_string(),
        target_dir,
        files,
    })
}

impl CardPlan {
    pub fn write_summary(&self, out: &mut impl Write) -> io::Result<()> {
        writeln!(out, "Creating card directory: {}", self.target_dir.display())?;
        for file in &self.files {
            writeln!(out, "  {} -> {}", file.skeleton_name, file.destination_name)?;
        }
        Ok(())
    }

    /// Report the mapping and, when `doit` is set, write the customized copies.
    pub fn apply(&self, doit: bool, out: &mut impl Write) -> Result<()> {
        self.write_summary(out)?;
        if !doit {
            writeln!(out)?;
            writeln!(out, "Run with --doit to create the directory.")?;
            return Ok(());
        }

        self.materialize()?;
        writeln!(
            out,
            "Card directory created: {}",
            self.target_dir.display()
        )?;
        Ok(())
    }

    /// Write the card directory.
    ///
    /// Every skeleton is read before the target directory is created, so an
    /// unreadable template leaves the card tree untouched.
    pub fn materialize(&self) -> Result<()> {
        let mut rendered = Vec::with_capacity(self.files.len());
        for file in &self.files {
            let contents = fs::read_to_string(&file.source)
                .with_context(|| format!("reading skeleton {}", file.source.display()))?;
            rendered.push((
                self.target_dir.join(&file.destination_name),
                substitute_placeholder(&contents, &self.dataset),
            ));
        }

        fs::create_dir_all(&self.target_dir)
            .with_context(|| format!("creating {}", self.target_dir.display()))?;
        for (destination, contents) in rendered {
            write_card_file(&destination, &contents)?;
        }
        tracing::info!(
            path = %self.target_dir.display(),
            files = self.files.len(),
            "card directory created"
        );
        Ok(())
    }
}

fn write_card_file(destination: &Path, contents: &str) -> Result<()> {
    fs::write(destination, contents)
        .with_context(|| format!("writing {}", destination.display()))?;
    tracing::debug!(path = %destination.display(), "wrote card file");
    Ok(())
}
