//! Built-in commands.
//!
//! One file per command. Each builtin parses its own flags with lexopt
//! (single-char unix style, clustering allowed), reads named files or the
//! given stdin, and writes to the given stdout. Path arguments resolve
//! against the [`Environment`](crate::environment::Environment) cwd.

mod cat;
mod cd;
mod cp;
mod cut;
mod echo;
mod exit;
mod grep;
mod ls;
mod mkdir;
mod mv;
mod paste;
mod rm;
mod sort;
mod tee;
mod uniq;
mod wc;

use std::sync::Arc;

use tokio::io::AsyncRead;

use super::registry::ToolRegistry;
use crate::environment::Environment;
use crate::error::{io_reason, AppError, ShellError};

pub use cat::Cat;
pub use cd::Cd;
pub use cp::Cp;
pub use cut::Cut;
pub use echo::Echo;
pub use exit::Exit;
pub use grep::Grep;
pub use ls::Ls;
pub use mkdir::Mkdir;
pub use mv::Mv;
pub use paste::Paste;
pub use rm::Rm;
pub use sort::Sort;
pub use tee::Tee;
pub use uniq::Uniq;
pub use wc::Wc;

/// Register every builtin.
pub fn register_builtins(registry: &mut ToolRegistry) {
    registry.register(Arc::new(Cat));
    registry.register(Arc::new(Cd));
    registry.register(Arc::new(Cp));
    registry.register(Arc::new(Cut));
    registry.register(Arc::new(Echo));
    registry.register(Arc::new(Exit));
    registry.register(Arc::new(Grep));
    registry.register(Arc::new(Ls));
    registry.register(Arc::new(Mkdir));
    registry.register(Arc::new(Mv));
    registry.register(Arc::new(Paste));
    registry.register(Arc::new(Rm));
    registry.register(Arc::new(Sort));
    registry.register(Arc::new(Tee));
    registry.register(Arc::new(Uniq));
    registry.register(Arc::new(Wc));
}

/// A lexopt failure (unknown flag, bad value) as this command's error.
pub(crate) fn bad_usage(name: &str, err: impl std::fmt::Display) -> ShellError {
    AppError::new(name, err.to_string()).into()
}

/// Read one named input: a path resolved against the cwd, or the caller's
/// stdin when the path is `-`.
pub(crate) async fn read_input(
    name: &str,
    path: &str,
    stdin: &mut (dyn AsyncRead + Send + Unpin),
    env: &Environment,
) -> Result<String, AppError> {
    if path == "-" {
        return crate::io::read_to_string(stdin)
            .await
            .map_err(|_| AppError::new(name, crate::error::reason::READ_STREAM));
    }
    read_file(name, path, env).await
}

/// Read a whole file as UTF-8, with the stable per-path error shape.
pub(crate) async fn read_file(
    name: &str,
    path: &str,
    env: &Environment,
) -> Result<String, AppError> {
    let resolved = env.resolve(path);
    if resolved.is_dir() {
        return Err(AppError::new(
            name,
            format!("{}: {}", path, crate::error::reason::IS_DIR),
        ));
    }
    tokio::fs::read_to_string(&resolved)
        .await
        .map_err(|e| AppError::new(name, format!("{}: {}", path, io_reason(&e))))
}
