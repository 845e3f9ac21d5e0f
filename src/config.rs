//! `autobuild.toml` parsing and command-line overrides.

use crate::toolchain::Ranking;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "autobuild.toml";
pub const DEFAULT_TARGET: &str = "rebuild";
pub const NUGET_URL: &str = "https://dist.nuget.org/win-x86-commandline/latest/nuget.exe";

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(default)]
pub struct AutobuildConfig {
    pub build: BuildConfig,
    pub nuget: NugetConfig,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct BuildConfig {
    /// Visual Studio major version whose setup script should be called
    #[serde(alias = "ToolsVersion")]
    pub tools_version: Option<String>,
    /// Run the package restore phase before building
    pub restore: bool,
    pub target: Option<String>,
    pub platform: Option<String>,
    pub configuration: Option<String>,
    /// Raw extra MSBuild arguments
    pub arguments: Vec<String>,
    pub ranking: Ranking,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            tools_version: None,
            restore: true,
            target: None,
            platform: None,
            configuration: None,
            arguments: Vec::new(),
            ranking: Ranking::default(),
        }
    }
}

impl BuildConfig {
    pub fn target(&self) -> &str {
        self.target.as_deref().unwrap_or(DEFAULT_TARGET)
    }

    /// Applies command-line values on top of the file.
    pub fn apply(&mut self, overrides: BuildOverrides) {
        if overrides.tools_version.is_some() {
            self.tools_version = overrides.tools_version;
        }
        if overrides.no_restore {
            self.restore = false;
        }
        if overrides.target.is_some() {
            self.target = overrides.target;
        }
        if overrides.platform.is_some() {
            self.platform = overrides.platform;
        }
        if overrides.configuration.is_some() {
            self.configuration = overrides.configuration;
        }
        if !overrides.arguments.is_empty() {
            self.arguments = overrides.arguments;
        }
        if let Some(ranking) = overrides.ranking {
            self.ranking = ranking;
        }
    }
}

/// Values given on the command line; `None`/empty leaves the file value.
#[derive(Debug, Default, Clone)]
pub struct BuildOverrides {
    pub tools_version: Option<String>,
    pub no_restore: bool,
    pub target: Option<String>,
    pub platform: Option<String>,
    pub configuration: Option<String>,
    pub arguments: Vec<String>,
    pub ranking: Option<Ranking>,
}

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(default)]
pub struct NugetConfig {
    pub url: Option<String>,
    pub download_dir: Option<PathBuf>,
}

impl NugetConfig {
    pub fn url(&self) -> &str {
        self.url.as_deref().unwrap_or(NUGET_URL)
    }

    /// Where an on-demand nuget.exe is stored.
    pub fn download_path(&self) -> PathBuf {
        self.download_dir
            .clone()
            .unwrap_or_else(|| {
                dirs::home_dir()
                    .unwrap_or_else(std::env::temp_dir)
                    .join(".autobuild")
                    .join("tools")
            })
            .join("nuget.exe")
    }
}

/// Loads `autobuild.toml` from `root`; a missing file means defaults.
pub fn load_config(root: &Path) -> Result<AutobuildConfig> {
    let path = root.join(CONFIG_FILE);
    if !path.exists() {
        return Ok(AutobuildConfig::default());
    }

    let content = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {} - check file permissions", path.display()))?;
    parse_config(&content)
        .with_context(|| format!("Failed to parse {} - check for syntax errors", path.display()))
}

pub fn parse_config(content: &str) -> Result<AutobuildConfig> {
    Ok(toml::from_str(content)?)
}
