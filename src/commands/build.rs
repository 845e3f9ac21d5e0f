//! `autobuild build` handler.

use anyhow::Result;
use colored::*;
use std::path::{Path, PathBuf};

use crate::actions::{BuildActions, DryRunActions, SystemActions};
use crate::build::{BuildAttemptResult, run_build};
use crate::config::{BuildOverrides, load_config};
use crate::units::{BuildableUnit, discover_units};

#[derive(Debug, Clone, Default)]
pub struct BuildCommand {
    /// Source root holding `autobuild.toml`; also searched for units
    pub root: PathBuf,
    /// Explicit solutions, projects or directories
    pub units: Vec<PathBuf>,
    pub overrides: BuildOverrides,
    pub report: Option<PathBuf>,
    pub dry_run: bool,
}

pub fn handle_build(cmd: BuildCommand) -> Result<BuildAttemptResult> {
    let mut config = load_config(&cmd.root)?;
    config.build.apply(cmd.overrides);

    let units = resolve_units(&cmd.root, &cmd.units);
    println!(
        "{} Building {} project(s)/solution(s) under {}",
        "🚀".cyan(),
        units.len(),
        cmd.root.display()
    );
    if !config.build.restore {
        println!("   {} Package restore disabled", "→".dimmed());
    }

    let actions: Box<dyn BuildActions> = if cmd.dry_run {
        Box::new(DryRunActions::new())
    } else {
        Box::new(SystemActions::new())
    };

    let result = run_build(actions.as_ref(), &config, &units);
    result.print_summary();

    if let Some(report) = &cmd.report {
        result.write_report(report)?;
        println!("   {} Report written to {}", "📄".blue(), report.display());
    }

    Ok(result)
}

/// Explicit entries win; directories among them are searched.
fn resolve_units(root: &Path, explicit: &[PathBuf]) -> Vec<BuildableUnit> {
    if explicit.is_empty() {
        return discover_units(root);
    }

    let mut units = Vec::new();
    for path in explicit {
        if path.is_dir() {
            units.extend(discover_units(path));
        } else {
            if BuildableUnit::kind_of(path).is_none() {
                println!(
                    "{} {} is not a solution or project file, building it anyway",
                    "!".yellow(),
                    path.display()
                );
            }
            units.push(BuildableUnit::load(path));
        }
    }
    units
}
