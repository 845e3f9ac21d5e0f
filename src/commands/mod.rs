//! CLI command handlers
//!
//! Keeps `main.rs` down to argument parsing and dispatch.

pub mod build;
pub mod toolchain;
pub mod units;
