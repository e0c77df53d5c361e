//! cd — Change the current working directory.

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncWrite};

use crate::environment::Environment;
use crate::error::{reason, AppError, ShellError};
use crate::tools::Application;

/// Cd: the one capability that mutates the [`Environment`]. Takes exactly
/// one directory operand; the new cwd is canonicalized so later relative
/// resolution never walks through `..` chains.
pub struct Cd;

#[async_trait]
impl Application for Cd {
    fn name(&self) -> &'static str {
        "cd"
    }

    async fn run(
        &self,
        args: &[String],
        _stdin: &mut (dyn AsyncRead + Send + Unpin),
        _stdout: &mut (dyn AsyncWrite + Send + Unpin),
        env: &Environment,
    ) -> Result<(), ShellError> {
        let path = match args {
            [path] if !path.is_empty() => path,
            [] | [_] => return Err(AppError::new("cd", reason::MISSING_ARG).into()),
            _ => return Err(AppError::new("cd", "Too many arguments").into()),
        };

        let resolved = env.resolve(path);
        if !resolved.exists() {
            return Err(AppError::new(
                "cd",
                format!("{}: {}", path, reason::FILE_NOT_FOUND),
            )
            .into());
        }
        if !resolved.is_dir() {
            return Err(AppError::new(
                "cd",
                format!("{}: {}", path, reason::NOT_DIR),
            )
            .into());
        }

        let canonical = tokio::fs::canonicalize(&resolved).await.map_err(|_| {
            AppError::new("cd", format!("{}: {}", path, reason::NO_PERM))
        })?;
        env.set_current_dir(canonical);
        Ok(())
    }
}
