//! Buildable units (solutions and projects).
//!
//! Units are read-only inputs to the orchestrator. When none are named on the
//! command line they are discovered under the source root: the shallowest
//! solutions win, otherwise the shallowest project files.

use regex::Regex;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

const SOLUTION_EXTENSIONS: &[&str] = &["sln"];
const PROJECT_EXTENSIONS: &[&str] = &["csproj", "vbproj", "fsproj", "vcxproj"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitKind {
    Solution,
    Project,
}

/// One compilable target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildableUnit {
    pub path: PathBuf,
    pub kind: UnitKind,
    pub default_configuration: Option<String>,
    pub default_platform: Option<String>,
    /// Visual Studio / tools major version the unit was authored for
    pub tools_version: Option<u32>,
}

impl BuildableUnit {
    fn new(path: impl Into<PathBuf>, kind: UnitKind) -> Self {
        Self {
            path: path.into(),
            kind,
            default_configuration: None,
            default_platform: None,
            tools_version: None,
        }
    }

    pub fn solution(path: impl Into<PathBuf>) -> Self {
        Self::new(path, UnitKind::Solution)
    }

    pub fn project(path: impl Into<PathBuf>) -> Self {
        Self::new(path, UnitKind::Project)
    }

    pub fn with_defaults(mut self, configuration: &str, platform: &str) -> Self {
        self.default_configuration = Some(configuration.to_string());
        self.default_platform = Some(platform.to_string());
        self
    }

    pub fn with_tools_version(mut self, version: Option<u32>) -> Self {
        self.tools_version = version;
        self
    }

    /// Classifies a file by extension; `None` if it is not buildable.
    pub fn kind_of(path: &Path) -> Option<UnitKind> {
        let ext = path.extension()?.to_string_lossy().to_lowercase();
        if SOLUTION_EXTENSIONS.contains(&ext.as_str()) {
            Some(UnitKind::Solution)
        } else if PROJECT_EXTENSIONS.contains(&ext.as_str()) {
            Some(UnitKind::Project)
        } else {
            None
        }
    }

    /// Reads a unit and its declared defaults from disk.
    ///
    /// Unreadable files still produce a unit, just without metadata;
    /// MSBuild will report the real problem.
    pub fn load(path: &Path) -> Self {
        let kind = Self::kind_of(path).unwrap_or(UnitKind::Project);
        let content = fs::read_to_string(path).unwrap_or_default();
        let unit = Self::new(path, kind);

        match kind {
            UnitKind::Solution => {
                let info = parse_solution(&content);
                Self {
                    default_configuration: info.configuration,
                    default_platform: info.platform,
                    tools_version: info.visual_studio_version,
                    ..unit
                }
            }
            UnitKind::Project => unit.with_tools_version(parse_project_tools_version(&content)),
        }
    }

    pub fn display_name(&self) -> String {
        self.path.display().to_string()
    }
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct SolutionInfo {
    pub configuration: Option<String>,
    pub platform: Option<String>,
    pub visual_studio_version: Option<u32>,
}

/// Extracts the first solution configuration and the Visual Studio version.
pub fn parse_solution(content: &str) -> SolutionInfo {
    let (configuration, platform) = first_solution_configuration(content).unzip();
    SolutionInfo {
        configuration,
        platform,
        visual_studio_version: capture_u32(r"(?m)^\s*VisualStudioVersion\s*=\s*(\d+)", content),
    }
}

fn first_solution_configuration(content: &str) -> Option<(String, String)> {
    let section = Regex::new(
        r"(?s)GlobalSection\(SolutionConfigurationPlatforms\)\s*=\s*preSolution(.*?)EndGlobalSection",
    )
    .ok()?;
    let entry = Regex::new(r"(?m)^\s*([^|=\r\n]+?)\|([^=\r\n]+?)\s*=").ok()?;

    let body = section.captures(content)?.get(1)?.as_str();
    let caps = entry.captures(body)?;
    Some((
        caps.get(1)?.as_str().trim().to_string(),
        caps.get(2)?.as_str().trim().to_string(),
    ))
}

/// `<Project ToolsVersion="15.0" ...>` -> 15
pub fn parse_project_tools_version(content: &str) -> Option<u32> {
    capture_u32(r#"ToolsVersion\s*=\s*"(\d+)"#, content)
}

fn capture_u32(pattern: &str, content: &str) -> Option<u32> {
    let re = Regex::new(pattern).ok()?;
    re.captures(content)?.get(1)?.as_str().parse().ok()
}

/// Finds the units to build under `root`.
pub fn discover_units(root: &Path) -> Vec<BuildableUnit> {
    let mut solutions = Vec::new();
    let mut projects = Vec::new();

    for entry in WalkDir::new(root)
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_ignored_dir(e.path()))
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
    {
        match BuildableUnit::kind_of(entry.path()) {
            Some(UnitKind::Solution) => solutions.push((entry.depth(), entry.into_path())),
            Some(UnitKind::Project) => projects.push((entry.depth(), entry.into_path())),
            None => {}
        }
    }

    let chosen = if solutions.is_empty() {
        shallowest(projects)
    } else {
        shallowest(solutions)
    };
    chosen.iter().map(|p| BuildableUnit::load(p)).collect()
}

fn shallowest(found: Vec<(usize, PathBuf)>) -> Vec<PathBuf> {
    let Some(min_depth) = found.iter().map(|(d, _)| *d).min() else {
        return Vec::new();
    };
    let mut paths: Vec<PathBuf> = found
        .into_iter()
        .filter(|(d, _)| *d == min_depth)
        .map(|(_, p)| p)
        .collect();
    paths.sort();
    paths
}

fn is_ignored_dir(path: &Path) -> bool {
    path.file_name()
        .map(|n| {
            let n = n.to_string_lossy();
            n == ".git" || n == "bin" || n == "obj" || n == "node_modules"
        })
        .unwrap_or(false)
}
