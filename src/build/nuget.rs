//! Package restore with on-demand nuget.exe acquisition.
//!
//! The restore chain for one unit is, in order of preference:
//!
//! 1. `nuget restore` with the current tool
//! 2. download nuget.exe once per pass, then retry with the downloaded tool
//! 3. `msbuild /t:restore`
//!
//! The chain is wrapped in [`BuildScript::attempt`]: a failed restore never
//! marks the unit as failed, the build step decides that.

use super::msbuild::{self, Host};
use crate::script::{BuildScript, CommandBuilder, SUCCESS};
use crate::units::BuildableUnit;
use colored::*;
use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

/// System-wide command used before any download.
pub const SYSTEM_NUGET: &str = "nuget";

/// Which nuget a restore invokes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NugetCommand {
    /// `nuget` from `PATH`
    System,
    /// nuget.exe fetched during this pass
    Downloaded(PathBuf),
}

/// Restore tool state shared by every unit of one pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NugetToolState {
    /// A download has been attempted during this pass
    pub downloaded: bool,
    pub command: NugetCommand,
    pub download_path: PathBuf,
}

impl NugetToolState {
    pub fn new(download_path: PathBuf) -> Self {
        Self {
            downloaded: false,
            command: NugetCommand::System,
            download_path,
        }
    }
}

/// Composes per-unit restore scripts against shared tool state.
#[derive(Debug, Clone)]
pub struct RestorePlan {
    host: Host,
    url: String,
    state: Rc<RefCell<NugetToolState>>,
}

impl RestorePlan {
    pub fn new(host: Host, url: &str, state: Rc<RefCell<NugetToolState>>) -> Self {
        Self {
            host,
            url: url.to_string(),
            state,
        }
    }

    /// The restore step for `unit`.
    ///
    /// The chain is picked when the step runs, so a download made while
    /// restoring an earlier unit is reused instead of repeated.
    pub fn script(&self, unit: &BuildableUnit) -> BuildScript {
        let plan = self.clone();
        let unit = unit.clone();
        BuildScript::defer(move || plan.chain(&unit))
    }

    fn chain(&self, unit: &BuildableUnit) -> BuildScript {
        let msbuild_restore = msbuild::restore_script(self.host, unit);
        if self.host.apple_silicon {
            return BuildScript::attempt(msbuild_restore);
        }

        let state = self.state.borrow();
        let nuget_restore = nuget_restore_script(self.host, &state.command, unit);
        if state.downloaded {
            return BuildScript::attempt(nuget_restore.fallback(msbuild_restore));
        }

        let download_and_retry = self.download_script(&state.download_path).bind({
            let shared = Rc::clone(&self.state);
            let host = self.host;
            let unit = unit.clone();
            move |code| {
                let mut state = shared.borrow_mut();
                state.downloaded = true;
                if code != SUCCESS {
                    return BuildScript::failure();
                }
                state.command = NugetCommand::Downloaded(state.download_path.clone());
                nuget_restore_script(host, &state.command, &unit)
            }
        });

        BuildScript::attempt(
            nuget_restore
                .fallback(download_and_retry)
                .fallback(msbuild_restore),
        )
    }

    fn download_script(&self, path: &std::path::Path) -> BuildScript {
        let announce_path = path.to_path_buf();
        let done_path = path.to_path_buf();
        BuildScript::create(move |_| {
            println!(
                "   {} Attempting to download nuget.exe to {}",
                "⬇".blue(),
                announce_path.display()
            );
            SUCCESS
        })
        .sequence(BuildScript::download(self.url.clone(), path))
        .on_failure(|_| println!("{} Continuing without a downloaded nuget.exe", "!".yellow()))
        .bind(move |code| {
            if code == SUCCESS {
                println!("   {} Downloaded {}", "✓".green(), done_path.display());
            }
            BuildScript::status(code)
        })
    }
}

fn nuget_restore_script(host: Host, command: &NugetCommand, unit: &BuildableUnit) -> BuildScript {
    let mut cmd = CommandBuilder::new(host.windows);
    match command {
        NugetCommand::System => cmd.run_command(SYSTEM_NUGET, false),
        NugetCommand::Downloaded(path) if host.windows => {
            cmd.run_command(&path.to_string_lossy(), true)
        }
        // Mono runs the Windows-only nuget.exe elsewhere
        NugetCommand::Downloaded(path) => cmd
            .run_command("mono", false)
            .quote_argument(&path.to_string_lossy()),
    };
    cmd.argument("restore")
        .quote_argument(&unit.path.to_string_lossy())
        .argument("-DisableParallelProcessing")
        .script()
}
