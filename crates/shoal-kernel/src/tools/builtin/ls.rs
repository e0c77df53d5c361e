//! ls — List directory contents.

use std::path::Path;

use async_trait::async_trait;
use lexopt::prelude::*;
use tokio::io::{AsyncRead, AsyncWrite};

use crate::environment::Environment;
use crate::error::{reason, AppError, ShellError};
use crate::tools::builtin::bad_usage;
use crate::tools::Application;

/// Ls: list files and directories. `-R` recurses, `-X` sorts by extension
/// (files with no extension first). Explicit directories get `path:`
/// section headers; a bare `ls` lists the cwd without one. A single
/// file argument echoes just its file name.
pub struct Ls;

/// Entries of one directory, sorted. Dotfiles are skipped.
fn list_dir(dir: &Path, by_ext: bool) -> std::io::Result<Vec<String>> {
    let mut names: Vec<String> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| entry.file_name().into_string().ok())
        .filter(|name| !name.starts_with('.'))
        .collect();

    if by_ext {
        names.sort_by(|a, b| (ext_of(a), a).cmp(&(ext_of(b), b)));
    } else {
        names.sort();
    }
    Ok(names)
}

/// The extension sort key: empty for none, so extension-less names sort
/// first.
fn ext_of(name: &str) -> String {
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => ext.to_string(),
        _ => String::new(),
    }
}

/// One `path:` section, plus recursive child sections with `-R`.
fn render_sections(
    dir: &Path,
    display: &str,
    recursive: bool,
    by_ext: bool,
    sections: &mut Vec<String>,
) {
    match list_dir(dir, by_ext) {
        Ok(names) => {
            sections.push(format!("{}:\n{}", display, names.join("\n")));
            if recursive {
                for name in &names {
                    let child = dir.join(name);
                    if child.is_dir() {
                        let child_display = format!("{}/{}", display.trim_end_matches('/'), name);
                        render_sections(&child, &child_display, recursive, by_ext, sections);
                    }
                }
            }
        }
        Err(e) => sections.push(
            AppError::new("ls", format!("{}: {}", display, crate::error::io_reason(&e)))
                .to_string(),
        ),
    }
}

#[async_trait]
impl Application for Ls {
    fn name(&self) -> &'static str {
        "ls"
    }

    async fn run(
        &self,
        args: &[String],
        _stdin: &mut (dyn AsyncRead + Send + Unpin),
        stdout: &mut (dyn AsyncWrite + Send + Unpin),
        env: &Environment,
    ) -> Result<(), ShellError> {
        let mut recursive = false;
        let mut by_ext = false;
        let mut paths: Vec<String> = Vec::new();

        let mut parser = lexopt::Parser::from_args(args);
        while let Some(arg) = parser.next().map_err(|e| bad_usage("ls", e))? {
            match arg {
                Short('R') => recursive = true,
                Short('X') => by_ext = true,
                Value(val) => {
                    paths.push(val.string().unwrap_or_default())
                }
                other => return Err(bad_usage("ls", other.unexpected())),
            }
        }

        let output = if paths.is_empty() && !recursive {
            // Bare ls: cwd contents, no header
            match list_dir(&env.current_dir(), by_ext) {
                Ok(names) => names.join("\n"),
                Err(e) => {
                    return Err(AppError::new("ls", crate::error::io_reason(&e).to_string()).into())
                }
            }
        } else if paths.len() == 1 && env.resolve(&paths[0]).is_file() {
            // A single file argument echoes just its name
            Path::new(&paths[0])
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| paths[0].clone())
        } else {
            let mut sections: Vec<String> = Vec::new();
            let targets: Vec<String> = if paths.is_empty() {
                vec![".".to_string()]
            } else {
                paths
            };
            for path in &targets {
                let resolved = env.resolve(path);
                if resolved.is_file() {
                    sections.push(
                        Path::new(path)
                            .file_name()
                            .map(|n| n.to_string_lossy().into_owned())
                            .unwrap_or_else(|| path.clone()),
                    );
                } else {
                    render_sections(&resolved, path, recursive, by_ext, &mut sections);
                }
            }
            sections.join("\n\n")
        };

        crate::io::write_line(stdout, &output)
            .await
            .map_err(|_| AppError::new("ls", reason::WRITE_STREAM))?;
        Ok(())
    }
}
