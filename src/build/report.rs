//! Failure aggregation and the pass result.

use crate::script::SUCCESS;
use crate::units::BuildableUnit;
use anyhow::{Context, Result};
use colored::*;
use serde::Serialize;
use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// Append-only list of units whose build step failed.
///
/// Filled as a side effect of running the composed pass; clones share the
/// same list.
#[derive(Debug, Clone, Default)]
pub struct FailureAggregator {
    failed: Rc<RefCell<Vec<BuildableUnit>>>,
}

impl FailureAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, unit: &BuildableUnit, status: i32) {
        println!(
            "{} Build failed for {} (exit code {})",
            "x".red(),
            unit.display_name().bold(),
            status
        );
        let mut failed = self.failed.borrow_mut();
        if !failed.contains(unit) {
            failed.push(unit.clone());
        }
    }

    pub fn failed_units(&self) -> Vec<BuildableUnit> {
        self.failed.borrow().clone()
    }
}

/// Outcome of one build pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildAttemptResult {
    pub status: i32,
    /// In processing order, each unit at most once
    pub failed: Vec<BuildableUnit>,
}

#[derive(Serialize)]
struct Report<'a> {
    status: i32,
    success: bool,
    failed: Vec<&'a Path>,
}

impl BuildAttemptResult {
    pub fn is_success(&self) -> bool {
        self.status == SUCCESS
    }

    pub fn failed_paths(&self) -> Vec<PathBuf> {
        self.failed.iter().map(|u| u.path.clone()).collect()
    }

    pub fn print_summary(&self) {
        println!();
        if self.is_success() {
            println!("{} All projects and solutions built", "✓".green());
            return;
        }

        if self.failed.is_empty() {
            println!("{} Build pass failed (status {})", "x".red(), self.status);
            return;
        }

        println!(
            "{} {} project(s) or solution(s) failed to build:",
            "x".red(),
            self.failed.len()
        );
        for unit in &self.failed {
            println!("   - {}", unit.display_name());
        }
    }

    pub fn to_json(&self) -> Result<String> {
        let report = Report {
            status: self.status,
            success: self.is_success(),
            failed: self.failed.iter().map(|u| u.path.as_path()).collect(),
        };
        Ok(serde_json::to_string_pretty(&report)?)
    }

    pub fn write_report(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_json()?)
            .with_context(|| format!("Failed to write report to {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_keeps_order_and_dedups() {
        let aggregator = FailureAggregator::new();
        let a = BuildableUnit::project("A.csproj");
        let b = BuildableUnit::project("B.csproj");
        aggregator.record(&b, 1);
        aggregator.record(&a, 1);
        aggregator.clone().record(&b, 2);
        assert_eq!(aggregator.failed_units(), vec![b, a]);
    }

    #[test]
    fn test_json_report() {
        let result = BuildAttemptResult {
            status: 1,
            failed: vec![BuildableUnit::solution("src/App.sln")],
        };
        let json: serde_json::Value = serde_json::from_str(&result.to_json().unwrap()).unwrap();
        assert_eq!(json["status"], 1);
        assert_eq!(json["success"], false);
        assert_eq!(json["failed"][0], "src/App.sln");
    }

    #[test]
    fn test_write_report() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        let result = BuildAttemptResult {
            status: 0,
            failed: Vec::new(),
        };
        result.write_report(&path).unwrap();
        assert!(std::fs::read_to_string(&path).unwrap().contains("\"success\": true"));
        assert!(result.failed_paths().is_empty());
    }
}
