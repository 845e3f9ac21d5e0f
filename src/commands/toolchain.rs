//! `autobuild toolchain` handler.

use anyhow::Result;
use colored::*;

use crate::actions::BuildActions;
use crate::toolchain;

/// Toolchain subcommand operations
#[derive(Clone, Debug)]
pub enum ToolchainOp {
    /// List every environment setup script found on this host
    List,
}

pub fn handle_toolchain_command(actions: &dyn BuildActions, op: &ToolchainOp) -> Result<()> {
    match op {
        ToolchainOp::List => list_toolchains(actions),
    }
    Ok(())
}

fn list_toolchains(actions: &dyn BuildActions) {
    let found = toolchain::discover_all(actions);
    if found.is_empty() {
        println!("{} No vcvarsall.bat or VsDevCmd.bat found.", "x".red());
        if !actions.is_windows() {
            println!("   Environment setup scripts only exist on Windows hosts.");
        }
        return;
    }

    let newest = toolchain::Ranking::Highest.select(&found, None).cloned();
    println!("{}", "Available Toolchains:".bold());
    for d in &found {
        let line = format!("{:>4}  {}", d.version, d.path.display());
        if newest.as_ref() == Some(d) {
            println!("{} {}", line.green().bold(), "(default)".dimmed());
        } else {
            println!("{}", line);
        }
    }
}
