//! Toolchain discovery
//!
//! Locates the environment setup scripts that ship with Visual Studio
//! (`vcvarsall.bat` up to VS 2015, `VsDevCmd.bat` from VS 2017 on) and picks
//! the one a build should call before invoking MSBuild.
//!
//! Discovery never mutates the host and never caches: every call probes the
//! machine again through [`BuildActions`].

pub mod types;
pub mod vswhere;

pub use types::{DiscoveryError, Ranking, ToolchainDescriptor};

use crate::actions::BuildActions;
use crate::units::{BuildableUnit, UnitKind};
use colored::*;
use std::collections::HashSet;
use std::path::Path;

/// Pre-vswhere installs: (directory under Program Files (x86), version)
const LEGACY_INSTALLS: &[(&str, u32)] = &[
    ("Microsoft Visual Studio 10.0", 10),
    ("Microsoft Visual Studio 11.0", 11),
    ("Microsoft Visual Studio 12.0", 12),
    ("Microsoft Visual Studio 14.0", 14),
];

/// Versions below this are MSBuild tools versions, not Visual Studio ones.
const FIRST_VS_TOOLS_VERSION: u32 = 10;

/// Every location a setup script could live at, existing or not.
pub fn candidate_files(actions: &dyn BuildActions) -> Vec<ToolchainDescriptor> {
    let Some(program_files) = actions.env_var("ProgramFiles(x86)") else {
        return Vec::new();
    };
    let program_files = Path::new(&program_files);

    let mut candidates: Vec<ToolchainDescriptor> = LEGACY_INSTALLS
        .iter()
        .map(|(dir, version)| {
            ToolchainDescriptor::new(
                program_files.join(dir).join("VC").join("vcvarsall.bat"),
                *version,
            )
        })
        .collect();

    let vswhere = vswhere::vswhere_path(program_files);
    if actions.file_exists(&vswhere) {
        match vswhere::detect_vs_installations(actions, &vswhere) {
            Ok(installs) => candidates.extend(
                installs
                    .into_iter()
                    .filter(|vs| vs.major_version >= 15)
                    .map(|vs| {
                        ToolchainDescriptor::new(
                            vs.install_path
                                .join("Common7")
                                .join("Tools")
                                .join("VsDevCmd.bat"),
                            vs.major_version,
                        )
                    }),
            ),
            Err(e) => println!("{} {}", "!".yellow(), e),
        }
    }

    candidates
}

/// All setup scripts present on this host, ordered by version then path.
pub fn discover_all(actions: &dyn BuildActions) -> Vec<ToolchainDescriptor> {
    let mut seen = HashSet::new();
    let mut found: Vec<_> = candidate_files(actions)
        .into_iter()
        .filter(|d| actions.file_exists(&d.path))
        .filter(|d| seen.insert(d.path.clone()))
        .collect();
    found.sort_by(|a, b| a.version.cmp(&b.version).then_with(|| a.path.cmp(&b.path)));
    found
}

pub fn parse_tools_version(raw: &str) -> Result<u32, DiscoveryError> {
    raw.trim()
        .parse()
        .map_err(|_| DiscoveryError::InvalidToolsVersion(raw.to_string()))
}

/// Case (a): an explicitly configured version.
///
/// A malformed value is an error; a well-formed value with no matching
/// install is `Ok(None)` and logged as a warning.
pub fn for_requested_version(
    actions: &dyn BuildActions,
    raw: &str,
    ranking: Ranking,
) -> Result<Option<ToolchainDescriptor>, DiscoveryError> {
    let wanted = parse_tools_version(raw)?;

    let all = discover_all(actions);
    for d in &all {
        println!(
            "   {} Found {} version {}",
            "🔧".cyan(),
            d.path.display(),
            d.version
        );
    }

    let selected = ranking.select(&all, Some(wanted)).cloned();
    match &selected {
        Some(d) => println!(
            "   {} Setting Visual Studio tools to {}",
            "🔧".cyan(),
            d.path.display()
        ),
        None => println!(
            "{} Could not find build tools matching version {}",
            "!".yellow(),
            wanted
        ),
    }
    Ok(selected)
}

/// Case (b): the tools a unit declares it was authored with.
pub fn for_unit(
    actions: &dyn BuildActions,
    unit: &BuildableUnit,
    ranking: Ranking,
) -> Option<ToolchainDescriptor> {
    let wanted = unit
        .tools_version
        .filter(|v| *v >= FIRST_VS_TOOLS_VERSION);
    ranking.select(&discover_all(actions), wanted).cloned()
}

/// Case (c): the newest install.
pub fn latest(actions: &dyn BuildActions) -> Option<ToolchainDescriptor> {
    Ranking::Highest.select(&discover_all(actions), None).cloned()
}

/// Picks the setup script for a whole build pass.
///
/// An explicit `tools_version` is authoritative: when it is malformed or
/// unmatched the pass runs without environment initialization. Otherwise the
/// first solution (or the first unit) decides, falling back to the newest
/// install.
pub fn select_toolchain(
    actions: &dyn BuildActions,
    tools_version: Option<&str>,
    units: &[BuildableUnit],
    ranking: Ranking,
) -> Option<ToolchainDescriptor> {
    if let Some(raw) = tools_version {
        return match for_requested_version(actions, raw, ranking) {
            Ok(selected) => selected,
            Err(e) => {
                println!("{} {}", "x".red(), e);
                None
            }
        };
    }

    let guide = units
        .iter()
        .find(|u| u.kind == UnitKind::Solution)
        .or_else(|| units.first());

    let selected = guide
        .and_then(|unit| for_unit(actions, unit, ranking))
        .or_else(|| latest(actions));

    if selected.is_none() && actions.is_windows() {
        println!(
            "{} Could not find a suitable version of VsDevCmd.bat/vcvarsall.bat",
            "!".yellow()
        );
    }
    selected
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::TestActions;
    use std::path::PathBuf;

    const PF: &str = "C:/Program Files (x86)";

    fn legacy(version_dir: &str) -> PathBuf {
        Path::new(PF).join(version_dir).join("VC").join("vcvarsall.bat")
    }

    fn dev_cmd(install: &str) -> PathBuf {
        Path::new(install)
            .join("Common7")
            .join("Tools")
            .join("VsDevCmd.bat")
    }

    fn host() -> TestActions {
        let vswhere = vswhere::vswhere_path(Path::new(PF));
        TestActions::new()
            .windows()
            .env("ProgramFiles(x86)", PF)
            .file(legacy("Microsoft Visual Studio 12.0"))
            .file(legacy("Microsoft Visual Studio 14.0"))
            .file(vswhere.clone())
            .file(dev_cmd("C:/VS/2019"))
            .file(dev_cmd("C:/VS/2022"))
            .capture(
                &vswhere,
                r#"[
                  {"installationPath": "C:/VS/2019", "installationVersion": "16.11.5"},
                  {"installationPath": "C:/VS/2022", "installationVersion": "17.8.1"},
                  {"installationPath": "C:/VS/2022-missing", "installationVersion": "17.9.0"}
                ]"#,
            )
    }

    #[test]
    fn test_discover_all_keeps_existing_files_only() {
        let versions: Vec<u32> = discover_all(&host()).iter().map(|d| d.version).collect();
        assert_eq!(versions, vec![12, 14, 16, 17]);
    }

    #[test]
    fn test_no_program_files_means_nothing() {
        assert!(discover_all(&TestActions::new()).is_empty());
        assert!(latest(&TestActions::new()).is_none());
    }

    #[test]
    fn test_requested_version() {
        let selected = for_requested_version(&host(), "14", Ranking::Nearest).unwrap();
        assert_eq!(selected.map(|d| d.path), Some(legacy("Microsoft Visual Studio 14.0")));

        let nearest = for_requested_version(&host(), " 15 ", Ranking::Nearest).unwrap();
        assert_eq!(nearest.map(|d| d.version), Some(16));

        assert!(for_requested_version(&host(), "18", Ranking::Nearest).unwrap().is_none());
    }

    #[test]
    fn test_malformed_requested_version() {
        let err = for_requested_version(&host(), "vNext", Ranking::Nearest).unwrap_err();
        assert!(matches!(err, DiscoveryError::InvalidToolsVersion(ref raw) if raw == "vNext"));
        assert!(select_toolchain(&host(), Some("vNext"), &[], Ranking::Nearest).is_none());
    }

    #[test]
    fn test_unit_requirement() {
        let sln = BuildableUnit::solution("App.sln").with_tools_version(Some(16));
        assert_eq!(for_unit(&host(), &sln, Ranking::Nearest).map(|d| d.version), Some(16));

        // MSBuild 4.0 era tools versions carry no Visual Studio requirement
        let old = BuildableUnit::project("Lib.csproj").with_tools_version(Some(4));
        assert_eq!(for_unit(&host(), &old, Ranking::Nearest).map(|d| d.version), Some(17));
    }

    #[test]
    fn test_select_prefers_first_solution() {
        let units = vec![
            BuildableUnit::project("Tool.csproj").with_tools_version(Some(12)),
            BuildableUnit::solution("App.sln").with_tools_version(Some(14)),
        ];
        let selected = select_toolchain(&host(), None, &units, Ranking::Nearest);
        assert_eq!(selected.map(|d| d.version), Some(14));
    }

    #[test]
    fn test_select_falls_back_to_latest() {
        let units = vec![BuildableUnit::solution("App.sln").with_tools_version(Some(18))];
        let selected = select_toolchain(&host(), None, &units, Ranking::Exact);
        assert_eq!(selected.map(|d| d.version), Some(17));
    }

    #[test]
    fn test_discovery_is_idempotent() {
        let actions = host();
        let units = vec![BuildableUnit::solution("App.sln")];
        assert_eq!(
            select_toolchain(&actions, None, &units, Ranking::Nearest),
            select_toolchain(&actions, None, &units, Ranking::Nearest)
        );
    }

    #[test]
    fn test_broken_vswhere_keeps_legacy_installs() {
        let vswhere = vswhere::vswhere_path(Path::new(PF));
        let actions = TestActions::new()
            .env("ProgramFiles(x86)", PF)
            .file(legacy("Microsoft Visual Studio 12.0"))
            .file(vswhere.clone())
            .capture(&vswhere, "not json");
        let versions: Vec<u32> = discover_all(&actions).iter().map(|d| d.version).collect();
        assert_eq!(versions, vec![12]);
    }
}
