//! Host collaborators.
//!
//! Everything that touches the machine (spawning processes, probing files and
//! environment variables, downloading tools) goes through [`BuildActions`].
//! The orchestration logic only ever sees this trait, which keeps it testable
//! with a scripted fake and lets `--dry-run` swap in [`DryRunActions`].

use crate::script::{FAILURE, ProcessSpec, SUCCESS};
use anyhow::{Context, Result};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use std::process::Command;

/// Capability queries the orchestrator branches on.
pub trait HostCapabilities {
    fn is_windows(&self) -> bool;

    /// Constrained environment where only `dotnet msbuild` is usable.
    fn is_running_on_apple_silicon(&self) -> bool;
}

/// Process, filesystem and network primitives consumed by build scripts.
pub trait BuildActions: HostCapabilities {
    /// Runs a command to completion and returns its exit status.
    fn run_process(&self, spec: &ProcessSpec) -> i32;

    /// Runs a command and captures its standard output.
    fn capture_process(&self, exe: &str, args: &[&str]) -> std::io::Result<(i32, String)>;

    fn file_exists(&self, path: &Path) -> bool;

    fn env_var(&self, name: &str) -> Option<String>;

    /// Downloads `url` to `path`. Failures are reported, never panicked on.
    fn download_file(&self, url: &str, path: &Path) -> Result<()>;
}

/// The real host.
#[derive(Debug, Clone)]
pub struct SystemActions {
    apple_silicon: bool,
}

impl SystemActions {
    pub fn new() -> Self {
        Self {
            apple_silicon: detect_apple_silicon(),
        }
    }
}

impl Default for SystemActions {
    fn default() -> Self {
        Self::new()
    }
}

fn detect_apple_silicon() -> bool {
    if !cfg!(target_os = "macos") {
        return false;
    }
    if cfg!(target_arch = "aarch64") {
        return true;
    }

    // x86_64 binaries running under Rosetta still report an Apple CPU
    Command::new("sysctl")
        .args(["-n", "machdep.cpu.brand_string"])
        .output()
        .map(|o| String::from_utf8_lossy(&o.stdout).contains("Apple"))
        .unwrap_or(false)
}

impl HostCapabilities for SystemActions {
    fn is_windows(&self) -> bool {
        cfg!(windows)
    }

    fn is_running_on_apple_silicon(&self) -> bool {
        self.apple_silicon
    }
}

impl BuildActions for SystemActions {
    fn run_process(&self, spec: &ProcessSpec) -> i32 {
        match shell_command(spec).status() {
            Ok(status) => status.code().unwrap_or(FAILURE),
            Err(e) => {
                println!("   {} Could not start '{}': {}", "x".red(), spec.exe, e);
                FAILURE
            }
        }
    }

    fn capture_process(&self, exe: &str, args: &[&str]) -> std::io::Result<(i32, String)> {
        let output = Command::new(exe).args(args).output()?;
        Ok((
            output.status.code().unwrap_or(FAILURE),
            String::from_utf8_lossy(&output.stdout).to_string(),
        ))
    }

    fn file_exists(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn env_var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok().filter(|v| !v.is_empty())
    }

    fn download_file(&self, url: &str, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let response = ureq::get(url)
            .call()
            .map_err(|e| anyhow::anyhow!("Download failed: {}", e))?;

        let total_size = response
            .headers()
            .get("content-length")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(0);

        let pb = ProgressBar::new(total_size);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.blue} [{elapsed_precise}] [{bar:40.green/black}] {bytes}/{total_bytes} ({eta})")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .tick_chars("◐◓◑◒")
                .progress_chars("━━╸"),
        );

        let mut reader = response.into_body().into_reader();
        save_download(&mut reader, path, &pb)
    }
}

/// Streams into `<path>.part`, then renames it into place. A failed copy
/// removes the partial file so no truncated tool is left behind.
fn save_download(reader: &mut impl Read, path: &Path, pb: &ProgressBar) -> Result<()> {
    let partial = path.with_extension("part");
    if let Err(e) = copy_with_progress(reader, &partial, pb) {
        pb.abandon();
        let _ = std::fs::remove_file(&partial);
        return Err(e);
    }

    std::fs::rename(&partial, path)
        .with_context(|| format!("Failed to move download to {}", path.display()))?;
    pb.finish_with_message("Download complete");
    Ok(())
}

fn copy_with_progress(reader: &mut impl Read, partial: &Path, pb: &ProgressBar) -> Result<()> {
    let mut file = File::create(partial)
        .with_context(|| format!("Failed to create {}", partial.display()))?;
    let mut buffer = [0; 8192];

    loop {
        let n = reader.read(&mut buffer)?;
        if n == 0 {
            break;
        }
        file.write_all(&buffer[..n])?;
        pb.inc(n as u64);
    }
    Ok(())
}

/// Hands the prepared command line to the platform shell.
fn shell_command(spec: &ProcessSpec) -> Command {
    #[cfg(windows)]
    {
        use std::os::windows::process::CommandExt;
        let mut cmd = Command::new(&spec.exe);
        if !spec.args.is_empty() {
            cmd.raw_arg(&spec.args);
        }
        cmd
    }

    #[cfg(not(windows))]
    {
        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg(spec.command_line());
        cmd
    }
}

/// Prints what would run and pretends it succeeded.
///
/// Toolchain discovery still probes the real host, so the printed commands
/// are the ones a real pass would execute.
#[derive(Debug, Clone, Default)]
pub struct DryRunActions {
    host: SystemActions,
}

impl DryRunActions {
    pub fn new() -> Self {
        Self {
            host: SystemActions::new(),
        }
    }
}

impl HostCapabilities for DryRunActions {
    fn is_windows(&self) -> bool {
        self.host.is_windows()
    }

    fn is_running_on_apple_silicon(&self) -> bool {
        self.host.is_running_on_apple_silicon()
    }
}

impl BuildActions for DryRunActions {
    fn run_process(&self, _spec: &ProcessSpec) -> i32 {
        SUCCESS
    }

    fn capture_process(&self, exe: &str, args: &[&str]) -> std::io::Result<(i32, String)> {
        self.host.capture_process(exe, args)
    }

    fn file_exists(&self, path: &Path) -> bool {
        self.host.file_exists(path)
    }

    fn env_var(&self, name: &str) -> Option<String> {
        self.host.env_var(name)
    }

    fn download_file(&self, url: &str, path: &Path) -> Result<()> {
        println!(
            "   {} [dry-run] would download {} -> {}",
            "⬇".blue(),
            url,
            path.display()
        );
        Ok(())
    }
}
