//! Build script algebra.
//!
//! A [`BuildScript`] describes deferred work that yields an exit status
//! (`0` = success) when run against a [`BuildActions`] host. Scripts are
//! immutable values: composing them never executes anything, and the same
//! script can be inspected, cloned and combined freely before it runs.
//!
//! ## Combinators
//!
//! | Operation | Runs | Status |
//! |-----------|------|--------|
//! | [`sequence`](BuildScript::sequence) (`a & b`) | both, always | failure if either failed |
//! | [`fallback`](BuildScript::fallback) (`a \| b`) | `b` only if `a` failed | success if either succeeded |
//! | [`bind`](BuildScript::bind) | `a`, then `f(status)` | the continuation's status |
//! | [`attempt`](BuildScript::attempt) | `a` | always success |
//! | [`on_failure`](BuildScript::on_failure) | `a`, handler on failure | `a`'s status |

mod command;

pub use command::{CommandBuilder, ProcessSpec};

use crate::actions::BuildActions;
use colored::*;
use std::fmt;
use std::ops::{BitAnd, BitOr};
use std::path::PathBuf;
use std::rc::Rc;

pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;

type Step = Rc<dyn Fn(&dyn BuildActions) -> i32>;
type Continuation = Rc<dyn Fn(i32) -> BuildScript>;
type FailureHandler = Rc<dyn Fn(i32)>;

enum Node {
    Status(i32),
    Process(ProcessSpec),
    Download { url: String, path: PathBuf },
    Step(Step),
    Sequence(BuildScript, BuildScript),
    Fallback(BuildScript, BuildScript),
    Bind(BuildScript, Continuation),
    Attempt(BuildScript),
    OnFailure(BuildScript, FailureHandler),
}

/// A composable, side-effect-free description of work.
#[derive(Clone)]
pub struct BuildScript(Rc<Node>);

/// Combines two statuses so that any failure marks the result failed.
pub fn combine(first: i32, second: i32) -> i32 {
    first | second
}

impl BuildScript {
    fn node(node: Node) -> Self {
        Self(Rc::new(node))
    }

    pub fn success() -> Self {
        Self::status(SUCCESS)
    }

    pub fn failure() -> Self {
        Self::status(FAILURE)
    }

    /// A script that does nothing and reports `code`.
    pub fn status(code: i32) -> Self {
        Self::node(Node::Status(code))
    }

    /// Runs one external process.
    pub fn process(spec: ProcessSpec) -> Self {
        Self::node(Node::Process(spec))
    }

    /// Downloads `url` to `path`; a failed download reports [`FAILURE`].
    pub fn download(url: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self::node(Node::Download {
            url: url.into(),
            path: path.into(),
        })
    }

    /// Runs an in-process callback, e.g. to log progress between commands.
    pub fn create(f: impl Fn(&dyn BuildActions) -> i32 + 'static) -> Self {
        Self::node(Node::Step(Rc::new(f)))
    }

    /// Builds the script only when it is about to run.
    ///
    /// Lets a script depend on state that earlier scripts in the same pass
    /// have changed.
    pub fn defer(f: impl Fn() -> BuildScript + 'static) -> Self {
        Self::success().bind(move |_| f())
    }

    /// Runs `self` then `next` regardless of outcome.
    pub fn sequence(self, next: BuildScript) -> Self {
        Self::node(Node::Sequence(self, next))
    }

    /// Runs `alternative` only if `self` failed.
    pub fn fallback(self, alternative: BuildScript) -> Self {
        Self::node(Node::Fallback(self, alternative))
    }

    /// Runs `self`, then the script `f` picks for its exit status.
    ///
    /// `f` is called exactly once per run, after `self` finished.
    pub fn bind(self, f: impl Fn(i32) -> BuildScript + 'static) -> Self {
        Self::node(Node::Bind(self, Rc::new(f)))
    }

    /// Runs `script` for its side effects and always reports success.
    pub fn attempt(script: BuildScript) -> Self {
        Self::node(Node::Attempt(script))
    }

    /// Calls `handler` with the failing status, leaving the status unchanged.
    pub fn on_failure(self, handler: impl Fn(i32) + 'static) -> Self {
        Self::node(Node::OnFailure(self, Rc::new(handler)))
    }

    /// Executes the script, blocking until every step has finished.
    pub fn run(&self, actions: &dyn BuildActions) -> i32 {
        match self.0.as_ref() {
            Node::Status(code) => *code,
            Node::Process(spec) => {
                println!("   {} {}", "▶".blue(), spec);
                let code = actions.run_process(spec);
                if code != SUCCESS {
                    println!("   {} Exit code {}", "x".red(), code);
                }
                code
            }
            Node::Download { url, path } => match actions.download_file(url, path) {
                Ok(()) => SUCCESS,
                Err(e) => {
                    println!("{} Failed to download '{}': {}", "!".yellow(), url, e);
                    FAILURE
                }
            },
            Node::Step(f) => f(actions),
            Node::Sequence(first, second) => {
                let a = first.run(actions);
                let b = second.run(actions);
                combine(a, b)
            }
            Node::Fallback(preferred, alternative) => match preferred.run(actions) {
                SUCCESS => SUCCESS,
                _ => alternative.run(actions),
            },
            Node::Bind(first, f) => {
                let code = first.run(actions);
                f(code).run(actions)
            }
            Node::Attempt(inner) => {
                inner.run(actions);
                SUCCESS
            }
            Node::OnFailure(inner, handler) => {
                let code = inner.run(actions);
                if code != SUCCESS {
                    handler(code);
                }
                code
            }
        }
    }
}

impl BitAnd for BuildScript {
    type Output = BuildScript;

    fn bitand(self, rhs: BuildScript) -> BuildScript {
        self.sequence(rhs)
    }
}

impl BitOr for BuildScript {
    type Output = BuildScript;

    fn bitor(self, rhs: BuildScript) -> BuildScript {
        self.fallback(rhs)
    }
}

impl fmt::Debug for BuildScript {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.as_ref() {
            Node::Status(code) => write!(f, "Status({})", code),
            Node::Process(spec) => write!(f, "Process({})", spec),
            Node::Download { url, path } => write!(f, "Download({} -> {})", url, path.display()),
            Node::Step(_) => f.write_str("Step"),
            Node::Sequence(a, b) => write!(f, "({:?} & {:?})", a, b),
            Node::Fallback(a, b) => write!(f, "({:?} | {:?})", a, b),
            Node::Bind(a, _) => write!(f, "Bind({:?}, ..)", a),
            Node::Attempt(a) => write!(f, "Attempt({:?})", a),
            Node::OnFailure(a, _) => write!(f, "OnFailure({:?}, ..)", a),
        }
    }
}
