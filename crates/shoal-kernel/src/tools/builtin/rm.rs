//! rm — Remove files and directories.

use async_trait::async_trait;
use lexopt::prelude::*;
use tokio::io::{AsyncRead, AsyncWrite};

use crate::environment::Environment;
use crate::error::{io_reason, reason, AppError, ShellError};
use crate::tools::builtin::bad_usage;
use crate::tools::Application;

/// Rm: remove each named path. Plain `rm` refuses directories; `-d`
/// removes empty directories, `-r` removes directories recursively.
pub struct Rm;

#[async_trait]
impl Application for Rm {
    fn name(&self) -> &'static str {
        "rm"
    }

    async fn run(
        &self,
        args: &[String],
        _stdin: &mut (dyn AsyncRead + Send + Unpin),
        _stdout: &mut (dyn AsyncWrite + Send + Unpin),
        env: &Environment,
    ) -> Result<(), ShellError> {
        let mut recursive = false;
        let mut empty_dirs = false;
        let mut paths: Vec<String> = Vec::new();

        let mut parser = lexopt::Parser::from_args(args);
        while let Some(arg) = parser.next().map_err(|e| bad_usage("rm", e))? {
            match arg {
                Short('r') | Short('R') => recursive = true,
                Short('d') => empty_dirs = true,
                Value(val) => {
                    paths.push(val.string().unwrap_or_default())
                }
                other => return Err(bad_usage("rm", other.unexpected())),
            }
        }

        if paths.is_empty() {
            return Err(AppError::new("rm", reason::MISSING_ARG).into());
        }

        for path in &paths {
            let resolved = env.resolve(path);
            if !resolved.exists() {
                return Err(AppError::new(
                    "rm",
                    format!("{}: {}", path, reason::FILE_NOT_FOUND),
                )
                .into());
            }

            let result = if resolved.is_dir() {
                if recursive {
                    tokio::fs::remove_dir_all(&resolved).await
                } else if empty_dirs {
                    tokio::fs::remove_dir(&resolved).await
                } else {
                    return Err(AppError::new(
                        "rm",
                        format!("{}: {}", path, reason::IS_DIR),
                    )
                    .into());
                }
            } else {
                tokio::fs::remove_file(&resolved).await
            };
            result.map_err(|e| AppError::new("rm", format!("{}: {}", path, io_reason(&e))))?;
        }
        Ok(())
    }
}
