//! `autobuild units` handler.

use anyhow::Result;
use colored::*;
use std::path::Path;

use crate::units::{BuildableUnit, UnitKind, discover_units};

pub fn list_units(root: &Path) -> Result<()> {
    let units = discover_units(root);
    if units.is_empty() {
        println!(
            "{} No solutions or projects found under {}",
            "x".red(),
            root.display()
        );
        return Ok(());
    }

    println!("{}", "Buildable units:".bold());
    for unit in &units {
        println!("   {}", describe(unit));
    }
    Ok(())
}

fn describe(unit: &BuildableUnit) -> String {
    let kind = match unit.kind {
        UnitKind::Solution => "solution".cyan(),
        UnitKind::Project => "project".blue(),
    };

    let mut line = format!("{} {}", kind, unit.display_name());
    if let (Some(configuration), Some(platform)) =
        (&unit.default_configuration, &unit.default_platform)
    {
        line.push_str(&format!(" [{}|{}]", configuration, platform).dimmed().to_string());
    }
    if let Some(version) = unit.tools_version {
        line.push_str(&format!(" (tools {})", version).dimmed().to_string());
    }
    line
}
