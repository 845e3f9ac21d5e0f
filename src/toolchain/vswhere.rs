//! Visual Studio 2017+ discovery through vswhere.

use super::types::DiscoveryError;
use crate::actions::BuildActions;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// An installation reported by vswhere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VsInstallation {
    pub install_path: PathBuf,
    pub major_version: u32,
}

/// Where the Visual Studio installer puts vswhere.exe.
pub fn vswhere_path(program_files_x86: &Path) -> PathBuf {
    program_files_x86
        .join("Microsoft Visual Studio")
        .join("Installer")
        .join("vswhere.exe")
}

/// Queries vswhere for every installation, including prereleases and
/// pre-2017 (legacy) ones.
pub fn detect_vs_installations(
    actions: &dyn BuildActions,
    vswhere: &Path,
) -> Result<Vec<VsInstallation>, DiscoveryError> {
    let exe = vswhere.to_string_lossy();
    let (code, stdout) = actions.capture_process(
        &exe,
        &["-prerelease", "-legacy", "-format", "json", "-utf8"],
    )?;

    if code != 0 {
        return Err(DiscoveryError::VsWhere(format!(
            "vswhere exited with code {}",
            code
        )));
    }

    parse_vswhere_output(&stdout)
}

/// Parse vswhere JSON output
pub fn parse_vswhere_output(json_str: &str) -> Result<Vec<VsInstallation>, DiscoveryError> {
    let installations: Vec<serde_json::Value> = serde_json::from_str(json_str)
        .map_err(|e| DiscoveryError::VsWhere(format!("Failed to parse vswhere output: {}", e)))?;

    let mut result = Vec::new();
    let mut seen_paths = HashSet::new();

    for inst in installations {
        let path = inst.get("installationPath").and_then(|v| v.as_str());
        let major = inst
            .get("installationVersion")
            .and_then(|v| v.as_str())
            .and_then(major_version);

        if let (Some(path), Some(major_version)) = (path, major) {
            let install_path = PathBuf::from(path);
            if !seen_paths.insert(install_path.clone()) {
                continue;
            }
            result.push(VsInstallation {
                install_path,
                major_version,
            });
        }
    }

    Ok(result)
}

/// "17.8.34330.188" -> 17
pub fn major_version(version: &str) -> Option<u32> {
    version.trim().split('.').next()?.parse().ok()
}
