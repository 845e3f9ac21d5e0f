//! Scripted host shared by the integration tests.

#![allow(dead_code)]

use autobuild::actions::{BuildActions, HostCapabilities};
use autobuild::script::{ProcessSpec, SUCCESS};
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

#[derive(Default)]
pub struct ScriptedHost {
    pub windows: bool,
    pub apple_silicon: bool,
    pub failing: Vec<(String, i32)>,
    pub files: HashSet<PathBuf>,
    pub env: HashMap<String, String>,
    pub vswhere_output: Option<String>,
    pub ran: RefCell<Vec<String>>,
    pub downloads: RefCell<Vec<PathBuf>>,
}

impl ScriptedHost {
    pub fn unix() -> Self {
        Self::default()
    }

    pub fn windows() -> Self {
        Self {
            windows: true,
            ..Self::default()
        }
    }

    pub fn failing_on(mut self, pattern: &str) -> Self {
        self.failing.push((pattern.to_string(), 1));
        self
    }

    pub fn commands(&self) -> Vec<String> {
        self.ran.borrow().clone()
    }
}

impl HostCapabilities for ScriptedHost {
    fn is_windows(&self) -> bool {
        self.windows
    }

    fn is_running_on_apple_silicon(&self) -> bool {
        self.apple_silicon
    }
}

impl BuildActions for ScriptedHost {
    fn run_process(&self, spec: &ProcessSpec) -> i32 {
        let line = spec.command_line();
        let status = self
            .failing
            .iter()
            .find(|(p, _)| line.contains(p.as_str()))
            .map_or(SUCCESS, |(_, code)| *code);
        self.ran.borrow_mut().push(line);
        status
    }

    fn capture_process(&self, _exe: &str, _args: &[&str]) -> std::io::Result<(i32, String)> {
        self.vswhere_output
            .clone()
            .map(|out| (SUCCESS, out))
            .ok_or_else(|| std::io::Error::new(std::io::ErrorKind::NotFound, "vswhere"))
    }

    fn file_exists(&self, path: &Path) -> bool {
        self.files.contains(path)
    }

    fn env_var(&self, name: &str) -> Option<String> {
        self.env.get(name).cloned()
    }

    fn download_file(&self, _url: &str, path: &Path) -> anyhow::Result<()> {
        self.downloads.borrow_mut().push(path.to_path_buf());
        Ok(())
    }
}
