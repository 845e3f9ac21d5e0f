//! # autobuild CLI Entry Point
//!
//! Parses CLI arguments using clap and routes commands to the handlers in
//! [`autobuild::commands`].
//!
//! ## Command Structure
//!
//! - `build` - restore and build every unit, exit 1 if any failed
//! - `units` - list what `build` would pick up
//! - `toolchain list` - list discovered environment setup scripts
//! - `completion` - shell completion scripts

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{Shell, generate};
use std::path::PathBuf;

use autobuild::actions::SystemActions;
use autobuild::commands;
use autobuild::config::BuildOverrides;
use autobuild::toolchain::Ranking;

#[derive(Parser)]
#[command(name = "autobuild")]
#[command(about = "Restore and build every MSBuild project or solution", version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Restore and build solutions/projects
    Build {
        /// Solutions, projects or directories (default: discover under --root)
        units: Vec<PathBuf>,
        /// Source root holding autobuild.toml
        #[arg(long, default_value = ".")]
        root: PathBuf,
        /// Visual Studio major version whose setup script to call (e.g. 16)
        #[arg(long)]
        tools_version: Option<String>,
        /// Skip the package restore phase
        #[arg(long)]
        no_restore: bool,
        /// MSBuild target [default: rebuild]
        #[arg(long)]
        target: Option<String>,
        /// MSBuild platform (overrides the solution default)
        #[arg(long)]
        platform: Option<String>,
        /// MSBuild configuration (overrides the solution default)
        #[arg(long)]
        configuration: Option<String>,
        /// Extra raw MSBuild argument (repeatable)
        #[arg(long = "arg", allow_hyphen_values = true)]
        arguments: Vec<String>,
        /// How to pick a setup script version (exact, nearest, highest)
        #[arg(long)]
        ranking: Option<Ranking>,
        /// Write a JSON report of the pass to this file
        #[arg(long)]
        report: Option<PathBuf>,
        /// Print commands instead of running them
        #[arg(long)]
        dry_run: bool,
    },
    /// List the solutions/projects a build would pick up
    Units {
        #[arg(long, default_value = ".")]
        root: PathBuf,
    },
    /// Inspect environment setup scripts
    Toolchain {
        #[command(subcommand)]
        op: ToolchainOp,
    },
    /// Generate shell completion scripts
    Completion { shell: Shell },
}

#[derive(Subcommand)]
enum ToolchainOp {
    /// List all discovered setup scripts
    List,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Build {
            units,
            root,
            tools_version,
            no_restore,
            target,
            platform,
            configuration,
            arguments,
            ranking,
            report,
            dry_run,
        } => {
            let result = commands::build::handle_build(commands::build::BuildCommand {
                root,
                units,
                overrides: BuildOverrides {
                    tools_version,
                    no_restore,
                    target,
                    platform,
                    configuration,
                    arguments,
                    ranking,
                },
                report,
                dry_run,
            })?;
            if !result.is_success() {
                std::process::exit(1);
            }
            Ok(())
        }
        Commands::Units { root } => commands::units::list_units(&root),
        Commands::Toolchain { op } => {
            let local_op = match op {
                ToolchainOp::List => commands::toolchain::ToolchainOp::List,
            };
            commands::toolchain::handle_toolchain_command(&SystemActions::new(), &local_op)
        }
        Commands::Completion { shell } => {
            let mut cmd = Cli::command();
            let bin_name = cmd.get_name().to_string();
            generate(shell, &mut cmd, bin_name, &mut std::io::stdout());
            Ok(())
        }
    }
}
