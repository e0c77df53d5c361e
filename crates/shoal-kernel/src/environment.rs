//! Shell environment: the current working directory.
//!
//! Initialized once at startup from the real process cwd. Read by any
//! capability that resolves relative paths; mutated only by `cd`, and only
//! between command invocations — pipe stages never touch it. Passed
//! explicitly into every capability so recursive command substitution stays
//! re-entrant; there is no other mutable global state in the core.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

/// Process-wide shell state.
///
/// Lock is std::sync (not tokio): the critical sections are single
/// PathBuf reads/writes and never held across await points.
#[derive(Debug)]
pub struct Environment {
    cwd: RwLock<PathBuf>,
}

impl Environment {
    /// Create an environment rooted at the real process working directory.
    pub fn new() -> io::Result<Self> {
        Ok(Self {
            cwd: RwLock::new(std::env::current_dir()?),
        })
    }

    /// Create an environment rooted at an explicit directory (tests,
    /// embedders).
    pub fn with_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            cwd: RwLock::new(dir.into()),
        }
    }

    /// The current working directory.
    pub fn current_dir(&self) -> PathBuf {
        self.cwd
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Replace the current working directory. Validation (existence,
    /// directory-ness) is the `cd` capability's job.
    pub fn set_current_dir(&self, dir: impl Into<PathBuf>) {
        *self.cwd.write().unwrap_or_else(|e| e.into_inner()) = dir.into();
    }

    /// Resolve a path argument against the current directory.
    pub fn resolve(&self, path: &str) -> PathBuf {
        let p = Path::new(path);
        if p.is_absolute() {
            p.to_path_buf()
        } else {
            self.current_dir().join(p)
        }
    }
}
