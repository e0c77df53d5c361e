//! cp — Copy files and directories.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use futures::future::BoxFuture;
use lexopt::prelude::*;
use tokio::io::{AsyncRead, AsyncWrite};

use crate::environment::Environment;
use crate::error::{io_reason, reason, AppError, ShellError};
use crate::tools::builtin::bad_usage;
use crate::tools::Application;

/// Cp: `cp [-r] SRC... DEST`. With several sources DEST must be an
/// existing directory; directories are only copied with `-r`.
pub struct Cp;

/// Recursive directory copy. Boxed because async fns cannot recurse
/// unboxed.
fn copy_dir<'a>(src: &'a Path, dest: &'a Path) -> BoxFuture<'a, std::io::Result<()>> {
    Box::pin(async move {
        tokio::fs::create_dir_all(dest).await?;
        let mut entries = tokio::fs::read_dir(src).await?;
        while let Some(entry) = entries.next_entry().await? {
            let target = dest.join(entry.file_name());
            if entry.file_type().await?.is_dir() {
                copy_dir(&entry.path(), &target).await?;
            } else {
                tokio::fs::copy(entry.path(), target).await?;
            }
        }
        Ok(())
    })
}

#[async_trait]
impl Application for Cp {
    fn name(&self) -> &'static str {
        "cp"
    }

    async fn run(
        &self,
        args: &[String],
        _stdin: &mut (dyn AsyncRead + Send + Unpin),
        _stdout: &mut (dyn AsyncWrite + Send + Unpin),
        env: &Environment,
    ) -> Result<(), ShellError> {
        let mut recursive = false;
        let mut operands: Vec<String> = Vec::new();

        let mut parser = lexopt::Parser::from_args(args);
        while let Some(arg) = parser.next().map_err(|e| bad_usage("cp", e))? {
            match arg {
                Short('r') | Short('R') => recursive = true,
                Value(val) => operands
                    .push(val.string().unwrap_or_default()),
                other => return Err(bad_usage("cp", other.unexpected())),
            }
        }

        if operands.len() < 2 {
            return Err(AppError::new("cp", reason::MISSING_ARG).into());
        }
        let dest_arg = operands.pop().expect("two or more operands");
        let sources = operands;
        let dest = env.resolve(&dest_arg);

        if sources.len() > 1 && !dest.is_dir() {
            return Err(AppError::new(
                "cp",
                format!("{}: {}", dest_arg, reason::NOT_DIR),
            )
            .into());
        }

        for source in &sources {
            let src = env.resolve(source);
            if !src.exists() {
                return Err(AppError::new(
                    "cp",
                    format!("{}: {}", source, reason::FILE_NOT_FOUND),
                )
                .into());
            }

            let target: PathBuf = if dest.is_dir() {
                match src.file_name() {
                    Some(name) => dest.join(name),
                    None => dest.clone(),
                }
            } else {
                dest.clone()
            };

            if src.is_dir() {
                if !recursive {
                    return Err(AppError::new(
                        "cp",
                        format!("{}: {}", source, reason::IS_DIR),
                    )
                    .into());
                }
                copy_dir(&src, &target)
                    .await
                    .map_err(|e| AppError::new("cp", format!("{}: {}", source, io_reason(&e))))?;
            } else {
                tokio::fs::copy(&src, &target)
                    .await
                    .map_err(|e| AppError::new("cp", format!("{}: {}", source, io_reason(&e))))?;
            }
        }
        Ok(())
    }
}
