mod msbuild;
mod nuget;
mod orchestrator;
mod report;

pub use msbuild::Host;
pub use nuget::{NugetCommand, NugetToolState, RestorePlan, SYSTEM_NUGET};
pub use orchestrator::{Orchestrator, run_build};
pub use report::{BuildAttemptResult, FailureAggregator};
