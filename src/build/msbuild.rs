//! MSBuild invocations.

use crate::config::BuildConfig;
use crate::script::{BuildScript, CommandBuilder};
use crate::toolchain::ToolchainDescriptor;
use crate::units::BuildableUnit;

/// Environment variable set by vcvarsall.bat that shadows the MSBuild
/// `Platform` property.
const PLATFORM_VAR: &str = "Platform";

/// What the host can run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Host {
    pub windows: bool,
    pub apple_silicon: bool,
}

fn msbuild(cmd: &mut CommandBuilder, host: Host) {
    if host.apple_silicon {
        cmd.run_command("dotnet", false).argument("msbuild");
    } else {
        cmd.run_command("msbuild", false);
    }
    cmd.argument("/p:UseSharedCompilation=false");
}

/// `msbuild /t:restore <unit>`
pub fn restore_script(host: Host, unit: &BuildableUnit) -> BuildScript {
    let mut cmd = CommandBuilder::new(host.windows);
    msbuild(&mut cmd, host);
    cmd.argument("/t:restore")
        .quote_argument(&unit.path.to_string_lossy())
        .script()
}

/// The main build invocation for one unit.
///
/// Configuration values win over the unit's own defaults.
pub fn build_script(
    host: Host,
    unit: &BuildableUnit,
    config: &BuildConfig,
    toolchain: Option<&ToolchainDescriptor>,
) -> BuildScript {
    let mut cmd = CommandBuilder::new(host.windows);

    if let Some(tools) = toolchain {
        cmd.call_setup_script(&tools.path).clear_env_var(PLATFORM_VAR);
    }

    msbuild(&mut cmd, host);
    cmd.quote_argument(&unit.path.to_string_lossy())
        .argument(&format!("/t:{}", config.target()));

    let platform = config.platform.as_ref().or(unit.default_platform.as_ref());
    if let Some(platform) = platform {
        cmd.argument(&format!("/p:Platform=\"{}\"", platform));
    }

    let configuration = config
        .configuration
        .as_ref()
        .or(unit.default_configuration.as_ref());
    if let Some(configuration) = configuration {
        cmd.argument(&format!("/p:Configuration=\"{}\"", configuration));
    }

    for arg in &config.arguments {
        cmd.argument(arg);
    }

    cmd.script()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::TestActions;

    const LINUX: Host = Host {
        windows: false,
        apple_silicon: false,
    };

    fn ran(script: BuildScript) -> String {
        let actions = TestActions::new();
        script.run(&actions);
        actions.commands().join("\n")
    }

    #[test]
    fn test_restore_command() {
        let unit = BuildableUnit::solution("src/App.sln");
        assert_eq!(
            ran(restore_script(LINUX, &unit)),
            r#"msbuild /p:UseSharedCompilation=false /t:restore "src/App.sln""#
        );
    }

    #[test]
    fn test_apple_silicon_uses_dotnet() {
        let host = Host {
            windows: false,
            apple_silicon: true,
        };
        let unit = BuildableUnit::project("App.csproj");
        assert!(ran(restore_script(host, &unit)).starts_with("dotnet msbuild "));
    }

    #[test]
    fn test_build_defaults_come_from_unit() {
        let unit = BuildableUnit::solution("App.sln").with_defaults("Release", "Any CPU");
        assert_eq!(
            ran(build_script(LINUX, &unit, &BuildConfig::default(), None)),
            r#"msbuild /p:UseSharedCompilation=false "App.sln" /t:rebuild /p:Platform="Any CPU" /p:Configuration="Release""#
        );
    }

    #[test]
    fn test_build_config_overrides_unit() {
        let unit = BuildableUnit::solution("App.sln").with_defaults("Release", "Any CPU");
        let config = BuildConfig {
            target: Some("build".into()),
            platform: Some("x64".into()),
            configuration: Some("Debug".into()),
            arguments: vec!["/m".into(), "/v:minimal".into()],
            ..BuildConfig::default()
        };
        assert_eq!(
            ran(build_script(LINUX, &unit, &config, None)),
            r#"msbuild /p:UseSharedCompilation=false "App.sln" /t:build /p:Platform="x64" /p:Configuration="Debug" /m /v:minimal"#
        );
    }

    #[test]
    fn test_project_without_defaults() {
        let unit = BuildableUnit::project("Lib.csproj");
        assert_eq!(
            ran(build_script(LINUX, &unit, &BuildConfig::default(), None)),
            r#"msbuild /p:UseSharedCompilation=false "Lib.csproj" /t:rebuild"#
        );
    }

    #[test]
    fn test_toolchain_prefix_clears_platform() {
        let host = Host {
            windows: true,
            apple_silicon: false,
        };
        let tools = ToolchainDescriptor::new(r"C:\VS\VC\vcvarsall.bat", 14);
        let unit = BuildableUnit::project(r"C:\src\Lib.vcxproj");
        assert_eq!(
            ran(build_script(host, &unit, &BuildConfig::default(), Some(&tools))),
            r#"cmd.exe /C "call "C:\VS\VC\vcvarsall.bat" && set Platform=&& type NUL && msbuild /p:UseSharedCompilation=false "C:\src\Lib.vcxproj" /t:rebuild""#
        );
    }
}
