//! Read-only listings of configuration sections.

use crate::config::Config;
use std::io::{self, Write};

const RULE_WIDTH: usize = 40;
const NOT_SET: &str = "N/A";

fn header(out: &mut impl Write, title: &str) -> io::Result<()> {
    writeln!(out, "{title}")?;
    writeln!(out, "{}", "-".repeat(RULE_WIDTH))
}

pub fn list_generators(config: &Config, out: &mut impl Write) -> io::Result<()> {
    header(out, "Available Generators:")?;
    for (name, info) in &config.generators {
        let description = info.description.as_deref().unwrap_or(NOT_SET);
        writeln!(out, "  {name}: {description}")?;
    }
    Ok(())
}

pub fn list_campaigns(config: &Config, out: &mut impl Write) -> io::Result<()> {
    header(out, "Available Campaigns:")?;
    for (name, info) in &config.campaigns {
        let tune = info.tune.as_deref().unwrap_or(NOT_SET);
        let beam = info
            .beam
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_else(|| NOT_SET.to_string());
        writeln!(out, "  {name}: tune={tune}, beam={beam} GeV")?;
    }
    Ok(())
}

pub fn list_processes(config: &Config, out: &mut impl Write) -> io::Result<()> {
    header(out, "Available Physics Processes:")?;
    for process in &config.physics_processes {
        writeln!(out, "  {process}")?;
    }
    Ok(())
}

pub fn list_tunes(config: &Config, out: &mut impl Write) -> io::Result<()> {
    header(out, "Available Tunes:")?;
    for (name, import) in &config.tunes {
        writeln!(out, "  {name}: {import}")?;
    }
    Ok(())
}

pub fn list_parton_showers(config: &Config, out: &mut impl Write) -> io::Result<()> {
    header(out, "Available Parton Shower Configurations:")?;
    for (name, info) in &config.parton_showers {
        let description = info.description.as_deref().unwrap_or(NOT_SET);
        writeln!(out, "  {name}: {description}")?;
    }
    Ok(())
}
