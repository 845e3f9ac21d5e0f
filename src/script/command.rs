//! Command-line construction for external tools.

use super::BuildScript;
use std::fmt;
use std::path::Path;

/// One external invocation: an executable plus its raw argument string.
///
/// `exe` is always the bare program path so it can be launched directly;
/// quoting only happens when the command line is rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessSpec {
    pub exe: String,
    pub args: String,
    /// Render `exe` in double quotes on the command line
    pub quote_exe: bool,
}

impl ProcessSpec {
    pub fn new(exe: impl Into<String>, args: impl Into<String>) -> Self {
        Self {
            exe: exe.into(),
            args: args.into(),
            quote_exe: false,
        }
    }

    /// The full command line as a shell would see it.
    pub fn command_line(&self) -> String {
        let exe = if self.quote_exe {
            quote(&self.exe)
        } else {
            self.exe.clone()
        };
        if self.args.is_empty() {
            exe
        } else {
            format!("{} {}", exe, self.args)
        }
    }
}

impl fmt::Display for ProcessSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.command_line())
    }
}

/// Wraps a path-like argument in double quotes.
pub fn quote(arg: &str) -> String {
    format!("\"{}\"", arg.replace('"', "\\\""))
}

/// Fluent builder for a [`ProcessSpec`].
///
/// Calling an environment setup script turns the command into a shell chain
/// (`cmd.exe /C "call x.bat && ..."`) so the variables it sets are visible to
/// every command that follows.
#[derive(Debug, Clone)]
pub struct CommandBuilder {
    windows: bool,
    chain: Vec<String>,
    /// Current program and whether it is rendered quoted
    exe: Option<(String, bool)>,
    args: Vec<String>,
}

impl CommandBuilder {
    pub fn new(windows: bool) -> Self {
        Self {
            windows,
            chain: Vec::new(),
            exe: None,
            args: Vec::new(),
        }
    }

    /// Finishes the current command (if any) and starts a new one.
    pub fn run_command(&mut self, exe: &str, quote_exe: bool) -> &mut Self {
        self.flush();
        self.exe = Some((exe.to_string(), quote_exe));
        self
    }

    /// Sources an environment setup script into the shell running the chain.
    pub fn call_setup_script(&mut self, path: &Path) -> &mut Self {
        let script = quote(&path.to_string_lossy());
        if self.windows {
            self.run_command("call", false).argument(&script)
        } else {
            self.run_command(".", false).argument(&script)
        }
    }

    /// Removes a variable from the shell environment of the chain.
    pub fn clear_env_var(&mut self, name: &str) -> &mut Self {
        if self.windows {
            // `set X=` alone leaves a non-zero errorlevel behind, `type NUL` resets it
            self.run_command(&format!("set {}=&& type NUL", name), false)
        } else {
            self.run_command("unset", false).argument(name)
        }
    }

    /// Appends raw text; empty text is skipped.
    pub fn argument(&mut self, arg: &str) -> &mut Self {
        if !arg.is_empty() {
            self.args.push(arg.to_string());
        }
        self
    }

    pub fn quote_argument(&mut self, arg: &str) -> &mut Self {
        self.args.push(quote(arg));
        self
    }

    fn flush(&mut self) {
        if let Some((exe, quoted)) = self.exe.take() {
            let mut line = if quoted { quote(&exe) } else { exe };
            for arg in self.args.drain(..) {
                line.push(' ');
                line.push_str(&arg);
            }
            self.chain.push(line);
        }
    }

    pub fn spec(&self) -> ProcessSpec {
        let mut finished = self.clone();
        let (exe, args, quote_exe) = if finished.chain.is_empty() {
            let (exe, quoted) = finished.exe.take().unwrap_or_default();
            (exe, finished.args.join(" "), quoted)
        } else {
            finished.flush();
            let line = finished.chain.join(" && ");
            if self.windows {
                ("cmd.exe".to_string(), format!("/C \"{}\"", line), false)
            } else {
                (
                    "sh".to_string(),
                    format!("-c '{}'", line.replace('\'', "'\\''")),
                    false,
                )
            }
        };

        ProcessSpec {
            exe,
            args,
            quote_exe,
        }
    }

    pub fn script(&self) -> BuildScript {
        BuildScript::process(self.spec())
    }
}
