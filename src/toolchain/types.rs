use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

/// A discovered environment setup script (`vcvarsall.bat`, `VsDevCmd.bat`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ToolchainDescriptor {
    /// Absolute path to the setup script
    pub path: PathBuf,

    /// Visual Studio major version (10, 11, 12, 14, 15, 16, 17, ...)
    pub version: u32,
}

impl ToolchainDescriptor {
    pub fn new(path: impl Into<PathBuf>, version: u32) -> Self {
        Self {
            path: path.into(),
            version,
        }
    }
}

/// How to pick one descriptor for a requested version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Ranking {
    /// Only the exact version
    Exact,
    /// The exact version, else the oldest newer one
    #[default]
    Nearest,
    /// Always the newest, whatever was requested
    Highest,
}

impl Ranking {
    /// Picks a descriptor. Without a requested version every policy
    /// returns the newest candidate.
    pub fn select<'a>(
        self,
        candidates: &'a [ToolchainDescriptor],
        wanted: Option<u32>,
    ) -> Option<&'a ToolchainDescriptor> {
        let Some(wanted) = wanted else {
            return newest(candidates);
        };

        match self {
            Ranking::Exact => oldest(candidates.iter().filter(|d| d.version == wanted)),
            Ranking::Nearest => oldest(candidates.iter().filter(|d| d.version >= wanted)),
            Ranking::Highest => newest(candidates),
        }
    }
}

/// Ties on version resolve to the lexically smallest path.
fn newest(candidates: &[ToolchainDescriptor]) -> Option<&ToolchainDescriptor> {
    candidates
        .iter()
        .max_by(|a, b| a.version.cmp(&b.version).then_with(|| b.path.cmp(&a.path)))
}

fn oldest<'a>(
    candidates: impl Iterator<Item = &'a ToolchainDescriptor>,
) -> Option<&'a ToolchainDescriptor> {
    candidates.min_by(|a, b| a.version.cmp(&b.version).then_with(|| a.path.cmp(&b.path)))
}

impl FromStr for Ranking {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "exact" => Ok(Ranking::Exact),
            "nearest" => Ok(Ranking::Nearest),
            "highest" | "latest" => Ok(Ranking::Highest),
            other => Err(format!(
                "unknown ranking '{}' (expected exact, nearest or highest)",
                other
            )),
        }
    }
}

/// Error type for toolchain discovery
#[derive(Debug)]
pub enum DiscoveryError {
    /// The configured tools version is not an integer
    InvalidToolsVersion(String),
    /// vswhere ran but its output was unusable
    VsWhere(String),
    /// IO error
    Io(std::io::Error),
}

impl std::fmt::Display for DiscoveryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DiscoveryError::InvalidToolsVersion(raw) => write!(
                f,
                "The format of ToolsVersion '{}' is incorrect. Please specify an integer.",
                raw
            ),
            DiscoveryError::VsWhere(msg) => write!(f, "vswhere error: {}", msg),
            DiscoveryError::Io(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl std::error::Error for DiscoveryError {}

impl From<std::io::Error> for DiscoveryError {
    fn from(e: std::io::Error) -> Self {
        DiscoveryError::Io(e)
    }
}
