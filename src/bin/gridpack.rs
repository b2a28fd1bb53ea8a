//! Command-line entry point for the gridpack configuration manager.
//!
//! Loads `config.json` (next to the binary unless `--config` says otherwise)
//! and runs exactly one action. Listing and scaffolding actions exit 0 on
//! success; `validate-config` and `check-cards` exit 1 when they find errors.
//! Fatal problems (unreadable config, bad `make-cards` preconditions) are
//! printed to stderr and exit 1 before anything is written.

use anyhow::{Result, bail};
use clap::builder::NonEmptyStringValueParser;
use clap::{ArgAction, Parser, ValueEnum};
use gridpack::{
    Config, check_cards, listing, load_config_document, plan_cards, plan_dirs,
    resolve_config_path, validate_config,
};
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Gridpack files configuration manager.
#[derive(Parser, Debug)]
#[command(name = "gridpack", version, about)]
struct Cli {
    /// Action to perform.
    #[arg(short, long, value_enum)]
    action: Action,

    /// Path to config file; relative paths resolve next to the program.
    #[arg(short, long, default_value = gridpack::config::DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Actually perform the action (for make-dirs, make-cards).
    #[arg(long)]
    doit: bool,

    /// Generator name (for make-cards).
    #[arg(
        short,
        long,
        required_if_eq("action", "make-cards"),
        value_parser = NonEmptyStringValueParser::new()
    )]
    generator: Option<String>,

    /// Process name (for make-cards).
    #[arg(
        short,
        long,
        required_if_eq("action", "make-cards"),
        value_parser = NonEmptyStringValueParser::new()
    )]
    process: Option<String>,

    /// Dataset name (for make-cards).
    #[arg(
        short,
        long,
        required_if_eq("action", "make-cards"),
        value_parser = NonEmptyStringValueParser::new()
    )]
    dataset: Option<String>,

    /// Log more to stderr. Repeat for more detail (-v, -vv, -vvv).
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Action {
    ListGenerators,
    ListCampaigns,
    ListProcesses,
    ListTunes,
    ListPartonShowers,
    ValidateConfig,
    MakeDirs,
    MakeCards,
    CheckCards,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            eprintln!("ERROR: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

/// Run the selected action; `Ok(false)` means the action found problems.
fn run(cli: &Cli) -> Result<bool> {
    let config_path = resolve_config_path(&cli.config);
    tracing::debug!(path = %config_path.display(), "resolved config path");
    let document = load_config_document(&config_path)?;
    // validate-config reports on the raw document; everything else needs the
    // typed sections.
    let typed = || Config::from_document(&document);

    let stdout = io::stdout();
    let mut out = stdout.lock();

    let clean = match cli.action {
        Action::ListGenerators => listing::list_generators(&typed()?, &mut out).map(|()| true)?,
        Action::ListCampaigns => listing::list_campaigns(&typed()?, &mut out).map(|()| true)?,
        Action::ListProcesses => listing::list_processes(&typed()?, &mut out).map(|()| true)?,
        Action::ListTunes => listing::list_tunes(&typed()?, &mut out).map(|()| true)?,
        Action::ListPartonShowers => {
            listing::list_parton_showers(&typed()?, &mut out).map(|()| true)?
        }
        Action::ValidateConfig => {
            let report = validate_config(&document);
            report.write_to(&mut out)?;
            report.is_valid()
        }
        Action::MakeDirs => {
            plan_dirs(&typed()?).apply(cli.doit, &mut out)?;
            true
        }
        Action::MakeCards => {
            let (Some(generator), Some(process), Some(dataset)) =
                (&cli.generator, &cli.process, &cli.dataset)
            else {
                bail!("make-cards requires --generator, --process, and --dataset");
            };
            plan_cards(&typed()?, generator, process, dataset)?.apply(cli.doit, &mut out)?;
            true
        }
        Action::CheckCards => {
            let outcome = check_cards(&typed()?)?;
            outcome.write_to(&mut out)?;
            outcome.is_clean()
        }
    };
    out.flush()?;
    Ok(clean)
}
