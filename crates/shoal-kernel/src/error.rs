//! Error taxonomy for the shell core.
//!
//! Four failure classes plus one control-flow signal:
//!
//! - [`SyntaxError`] — the line (or one call's redirections) is malformed;
//!   nothing affected by it runs
//! - `UnknownCommand` — dispatch failed for one call
//! - [`AppError`] — a capability failed while running; scoped to its call
//! - `Io` — a bridge or redirection stream failed outside any capability
//! - `Exit` — the explicit exit builtin; only the outermost driver acts on it
//!
//! Every message carries the failing command's name (or `shell:`) plus a
//! stable reason string, never an internal diagnostic.

use thiserror::Error;

/// Stable reason strings shared by the core and the builtins.
pub mod reason {
    pub const FILE_NOT_FOUND: &str = "No such file or directory";
    pub const IS_DIR: &str = "Is a directory";
    pub const NOT_DIR: &str = "Not a directory";
    pub const NO_PERM: &str = "Permission denied";
    pub const READ_STREAM: &str = "Could not read from input stream";
    pub const WRITE_STREAM: &str = "Could not write to output stream";
    pub const MISSING_ARG: &str = "Insufficient arguments";
    pub const FILE_EXISTS: &str = "File exists";
}

/// Map an I/O error to one of the stable reason strings.
pub fn io_reason(err: &std::io::Error) -> &'static str {
    use std::io::ErrorKind;
    match err.kind() {
        ErrorKind::NotFound => reason::FILE_NOT_FOUND,
        ErrorKind::PermissionDenied => reason::NO_PERM,
        ErrorKind::IsADirectory => reason::IS_DIR,
        ErrorKind::NotADirectory => reason::NOT_DIR,
        ErrorKind::AlreadyExists => reason::FILE_EXISTS,
        _ => "I/O error",
    }
}

/// Malformed input, detected before the affected command runs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyntaxError {
    #[error("unterminated quote")]
    UnterminatedQuote,

    #[error("unterminated command substitution")]
    UnterminatedSubstitution,

    /// An operator where a word was required: `< <`, `a | | b`, a trailing
    /// `|`, or a redirection with nothing after it.
    #[error("unexpected operator '{0}'")]
    MisplacedOperator(String),

    /// A call with no command word left once redirections are accounted for.
    #[error("missing command")]
    MissingCommand,

    /// A redirection operand whose glob expansion matched more than one file.
    #[error("ambiguous redirect: {0}")]
    AmbiguousRedirect(String),

    /// Command substitutions nested beyond the recursion bound.
    #[error("command substitution nested too deeply")]
    SubstitutionTooDeep,
}

/// A failure raised by a capability while it ran.
///
/// Rendered `name: message`, e.g. `cat: notes.txt: No such file or directory`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{name}: {message}")]
pub struct AppError {
    pub name: String,
    pub message: String,
}

impl AppError {
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Wrap an I/O failure on `path`, using the stable reason strings.
    pub fn io(name: impl Into<String>, path: &str, err: &std::io::Error) -> Self {
        Self::new(name, format!("{}: {}", path, io_reason(err)))
    }
}

/// Any failure surfaced while evaluating one line.
#[derive(Debug, Error)]
pub enum ShellError {
    #[error("shell: {0}")]
    Syntax(#[from] SyntaxError),

    #[error("shell: {name}: command not found")]
    UnknownCommand { name: String },

    #[error(transparent)]
    App(#[from] AppError),

    /// A redirection file could not be opened or created.
    #[error("shell: {path}: {reason}")]
    Redirect { path: String, reason: &'static str },

    /// A bridge or top-level stream failed outside any capability.
    #[error("shell: {0}")]
    Io(#[from] std::io::Error),

    /// The exit builtin ran. Not an error: the driver terminates the
    /// process with this status.
    #[error("exit {0}")]
    Exit(i32),
}

impl ShellError {
    /// True for the control-flow variant that should stop the whole line.
    pub fn is_exit(&self) -> bool {
        matches!(self, ShellError::Exit(_))
    }
}
