//! mv — Move (rename) files and directories.

use std::path::PathBuf;

use async_trait::async_trait;
use lexopt::prelude::*;
use tokio::io::{AsyncRead, AsyncWrite};

use crate::environment::Environment;
use crate::error::{io_reason, reason, AppError, ShellError};
use crate::tools::builtin::bad_usage;
use crate::tools::Application;

/// Mv: `mv [-n] SRC... DEST`. With several sources DEST must be an
/// existing directory. `-n` refuses to overwrite an existing target.
pub struct Mv;

#[async_trait]
impl Application for Mv {
    fn name(&self) -> &'static str {
        "mv"
    }

    async fn run(
        &self,
        args: &[String],
        _stdin: &mut (dyn AsyncRead + Send + Unpin),
        _stdout: &mut (dyn AsyncWrite + Send + Unpin),
        env: &Environment,
    ) -> Result<(), ShellError> {
        let mut no_overwrite = false;
        let mut operands: Vec<String> = Vec::new();

        let mut parser = lexopt::Parser::from_args(args);
        while let Some(arg) = parser.next().map_err(|e| bad_usage("mv", e))? {
            match arg {
                Short('n') => no_overwrite = true,
                Value(val) => operands
                    .push(val.string().unwrap_or_default()),
                other => return Err(bad_usage("mv", other.unexpected())),
            }
        }

        if operands.len() < 2 {
            return Err(AppError::new("mv", reason::MISSING_ARG).into());
        }
        let dest_arg = operands.pop().expect("two or more operands");
        let sources = operands;
        let dest = env.resolve(&dest_arg);

        if sources.len() > 1 && !dest.is_dir() {
            return Err(AppError::new(
                "mv",
                format!("{}: {}", dest_arg, reason::NOT_DIR),
            )
            .into());
        }

        for source in &sources {
            let src = env.resolve(source);
            if !src.exists() {
                return Err(AppError::new(
                    "mv",
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

            if no_overwrite && target.exists() {
                // Silently keep the existing target, like mv -n
                continue;
            }

            tokio::fs::rename(&src, &target)
                .await
                .map_err(|e| AppError::new("mv", format!("{}: {}", source, io_reason(&e))))?;
        }
        Ok(())
    }
}
