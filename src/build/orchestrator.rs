//! One restore-and-build pass over every unit.
//!
//! Per unit, in order:
//!
//! ```text
//! attempt(nuget restore | (download nuget.exe >>= retry) | msbuild /t:restore)
//!   & on_failure([setup script &&] msbuild <unit>, record unit)
//! ```
//!
//! Unit scripts are joined with `sequence`, so a failing unit never stops the
//! ones after it.

use super::msbuild::{self, Host};
use super::nuget::{NugetToolState, RestorePlan};
use super::report::{BuildAttemptResult, FailureAggregator};
use crate::actions::BuildActions;
use crate::config::AutobuildConfig;
use crate::script::{BuildScript, FAILURE, SUCCESS};
use crate::toolchain::{self, ToolchainDescriptor};
use crate::units::BuildableUnit;
use colored::*;
use std::cell::RefCell;
use std::rc::Rc;

/// Drives a single pass. Create a new one for every pass: the failure list
/// and the nuget state are never reset.
pub struct Orchestrator<'a> {
    actions: &'a dyn BuildActions,
    config: &'a AutobuildConfig,
    host: Host,
    toolchain: Option<ToolchainDescriptor>,
    nuget: Rc<RefCell<NugetToolState>>,
    failures: FailureAggregator,
}

impl<'a> Orchestrator<'a> {
    /// Discovers the toolchain once for the whole pass.
    pub fn new(
        actions: &'a dyn BuildActions,
        config: &'a AutobuildConfig,
        units: &[BuildableUnit],
    ) -> Self {
        let toolchain = toolchain::select_toolchain(
            actions,
            config.build.tools_version.as_deref(),
            units,
            config.build.ranking,
        );
        Self::with_toolchain(actions, config, toolchain)
    }

    pub fn with_toolchain(
        actions: &'a dyn BuildActions,
        config: &'a AutobuildConfig,
        toolchain: Option<ToolchainDescriptor>,
    ) -> Self {
        Self {
            actions,
            config,
            host: Host {
                windows: actions.is_windows(),
                apple_silicon: actions.is_running_on_apple_silicon(),
            },
            toolchain,
            nuget: Rc::new(RefCell::new(NugetToolState::new(
                config.nuget.download_path(),
            ))),
            failures: FailureAggregator::new(),
        }
    }

    pub fn toolchain(&self) -> Option<&ToolchainDescriptor> {
        self.toolchain.as_ref()
    }

    pub fn nuget_state(&self) -> NugetToolState {
        self.nuget.borrow().clone()
    }

    pub fn failures(&self) -> &FailureAggregator {
        &self.failures
    }

    /// Builds the script for the whole pass; `None` when there is nothing
    /// to build.
    pub fn compose(&self, units: &[BuildableUnit]) -> Option<BuildScript> {
        if units.is_empty() {
            return None;
        }

        let restore = RestorePlan::new(self.host, self.config.nuget.url(), Rc::clone(&self.nuget));
        let mut pass = BuildScript::success();

        for (index, unit) in units.iter().enumerate() {
            let mut unit_script = announce(unit, index, units.len());

            if self.config.build.restore {
                unit_script = unit_script.sequence(restore.script(unit));
            }

            let failures = self.failures.clone();
            let failed = unit.clone();
            let build = msbuild::build_script(
                self.host,
                unit,
                &self.config.build,
                self.toolchain.as_ref(),
            )
            .on_failure(move |status| failures.record(&failed, status));

            pass = pass.sequence(unit_script.sequence(build));
        }

        Some(pass)
    }

    /// Runs the pass to completion.
    pub fn run(&self, units: &[BuildableUnit]) -> BuildAttemptResult {
        let Some(script) = self.compose(units) else {
            println!("{} No projects or solutions to build", "x".red());
            return BuildAttemptResult {
                status: FAILURE,
                failed: Vec::new(),
            };
        };

        let status = script.run(self.actions);
        BuildAttemptResult {
            status,
            failed: self.failures.failed_units(),
        }
    }
}

fn announce(unit: &BuildableUnit, index: usize, total: usize) -> BuildScript {
    let name = unit.display_name();
    BuildScript::create(move |_| {
        println!(
            "\n{} [{}/{}] {}",
            "📦".blue(),
            index + 1,
            total,
            name.bold()
        );
        SUCCESS
    })
}

/// Discovers the toolchain, then restores and builds every unit.
pub fn run_build(
    actions: &dyn BuildActions,
    config: &AutobuildConfig,
    units: &[BuildableUnit],
) -> BuildAttemptResult {
    Orchestrator::new(actions, config, units).run(units)
}
