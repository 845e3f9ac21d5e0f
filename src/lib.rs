//! # autobuild - Resilient MSBuild/NuGet Autobuilder
//!
//! autobuild restores and builds every solution or project in a source tree
//! on behalf of an automated build-and-analyze pipeline, and reports which
//! ones failed.
//!
//! ## Features
//!
//! - **Layered restore**: system `nuget`, then a one-time on-demand
//!   `nuget.exe` download, then `msbuild /t:restore`
//! - **Toolchain discovery**: finds `vcvarsall.bat` / `VsDevCmd.bat` via the
//!   legacy install locations and vswhere
//! - **Failure isolation**: a failing unit never stops the others
//! - **Script algebra**: every step is a composable [`script::BuildScript`]
//!
//! ## Quick Start
//!
//! ```bash
//! # Build everything under the current directory
//! autobuild build
//!
//! # Pin Visual Studio 2019 tools and skip restore
//! autobuild build --tools-version 16 --no-restore src/App.sln
//! ```
//!
//! ## Module Organization
//!
//! - [`script`] - Build script algebra and command construction
//! - [`toolchain`] - Environment setup script discovery and ranking
//! - [`build`] - Restore/build orchestration and failure aggregation
//! - [`units`] - Solution/project discovery
//! - [`actions`] - Host process, filesystem and download primitives

/// Host collaborators (processes, files, downloads).
pub mod actions;

/// Restore/build orchestration.
pub mod build;

/// CLI command handlers extracted from main.
pub mod commands;

/// Configuration file parsing (`autobuild.toml`).
pub mod config;

/// Composable build scripts.
pub mod script;

/// Toolchain detection and selection.
pub mod toolchain;

/// Buildable unit discovery.
pub mod units;

#[cfg(test)]
mod testutil;
