//! Scripted host used by unit tests.

use crate::actions::{BuildActions, HostCapabilities};
use crate::script::{ProcessSpec, SUCCESS};
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

/// Records every command and answers with configured exit codes.
///
/// A command fails with the code of the first registered pattern contained
/// in its command line; everything else succeeds.
#[derive(Debug, Default)]
pub struct TestActions {
    windows: bool,
    apple_silicon: bool,
    failures: Vec<(String, i32)>,
    files: HashSet<PathBuf>,
    env: HashMap<String, String>,
    captures: HashMap<String, String>,
    downloads_fail: bool,
    ran: RefCell<Vec<String>>,
    launched: RefCell<Vec<String>>,
    downloaded: RefCell<Vec<(String, PathBuf)>>,
}

impl TestActions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn windows(mut self) -> Self {
        self.windows = true;
        self
    }

    pub fn apple_silicon(mut self) -> Self {
        self.apple_silicon = true;
        self
    }

    pub fn fail(mut self, pattern: &str, code: i32) -> Self {
        self.failures.push((pattern.to_string(), code));
        self
    }

    pub fn file(mut self, path: impl Into<PathBuf>) -> Self {
        self.files.insert(path.into());
        self
    }

    pub fn env(mut self, key: &str, value: &str) -> Self {
        self.env.insert(key.to_string(), value.to_string());
        self
    }

    pub fn capture(mut self, exe: impl AsRef<Path>, stdout: &str) -> Self {
        self.captures
            .insert(exe.as_ref().to_string_lossy().to_string(), stdout.to_string());
        self
    }

    pub fn with_failing_downloads(mut self) -> Self {
        self.downloads_fail = true;
        self
    }

    pub fn commands(&self) -> Vec<String> {
        self.ran.borrow().clone()
    }

    /// The bare executables handed to the host, in order.
    pub fn exes(&self) -> Vec<String> {
        self.launched.borrow().clone()
    }

    pub fn downloads(&self) -> Vec<(String, PathBuf)> {
        self.downloaded.borrow().clone()
    }
}

impl HostCapabilities for TestActions {
    fn is_windows(&self) -> bool {
        self.windows
    }

    fn is_running_on_apple_silicon(&self) -> bool {
        self.apple_silicon
    }
}

impl BuildActions for TestActions {
    fn run_process(&self, spec: &ProcessSpec) -> i32 {
        let line = spec.command_line();
        let code = self
            .failures
            .iter()
            .find(|(pattern, _)| line.contains(pattern.as_str()))
            .map_or(SUCCESS, |(_, code)| *code);
        self.ran.borrow_mut().push(line);
        self.launched.borrow_mut().push(spec.exe.clone());
        code
    }

    fn capture_process(&self, exe: &str, _args: &[&str]) -> std::io::Result<(i32, String)> {
        match self.captures.get(exe) {
            Some(out) => Ok((SUCCESS, out.clone())),
            None => Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("{} not found", exe),
            )),
        }
    }

    fn file_exists(&self, path: &Path) -> bool {
        self.files.contains(path)
    }

    fn env_var(&self, name: &str) -> Option<String> {
        self.env.get(name).cloned()
    }

    fn download_file(&self, url: &str, path: &Path) -> anyhow::Result<()> {
        self.downloaded
            .borrow_mut()
            .push((url.to_string(), path.to_path_buf()));
        if self.downloads_fail {
            anyhow::bail!("connection refused");
        }
        Ok(())
    }
}
