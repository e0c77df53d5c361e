//! paste — Merge lines of files.

use async_trait::async_trait;
use lexopt::prelude::*;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};

use crate::environment::Environment;
use crate::error::{reason, AppError, ShellError};
use crate::tools::builtin::{bad_usage, read_input};
use crate::tools::Application;

/// Paste: merge inputs line-wise with tab separators. By default line *i*
/// of every input joins into output line *i* (exhausted inputs contribute
/// empty fields); `-s` instead emits one line per input with that input's
/// lines tab-joined. `-` names stdin; stdin is read once and every `-`
/// shares it.
pub struct Paste;

#[async_trait]
impl Application for Paste {
    fn name(&self) -> &'static str {
        "paste"
    }

    async fn run(
        &self,
        args: &[String],
        stdin: &mut (dyn AsyncRead + Send + Unpin),
        stdout: &mut (dyn AsyncWrite + Send + Unpin),
        env: &Environment,
    ) -> Result<(), ShellError> {
        let mut serial = false;
        let mut files: Vec<String> = Vec::new();

        let mut parser = lexopt::Parser::from_args(args);
        while let Some(arg) = parser.next().map_err(|e| bad_usage("paste", e))? {
            match arg {
                Short('s') => serial = true,
                Value(val) => {
                    files.push(val.string().unwrap_or_default())
                }
                other => return Err(bad_usage("paste", other.unexpected())),
            }
        }

        if files.is_empty() {
            files.push("-".to_string());
        }

        // Read stdin at most once; every `-` operand shares the same lines
        let mut stdin_lines: Option<Vec<String>> = None;
        let mut columns: Vec<Vec<String>> = Vec::with_capacity(files.len());
        for path in &files {
            if path == "-" {
                if stdin_lines.is_none() {
                    let content = read_input("paste", path, stdin, env).await?;
                    stdin_lines = Some(content.lines().map(str::to_string).collect());
                }
                columns.push(stdin_lines.clone().expect("stdin read above"));
            } else {
                let content = read_input("paste", path, stdin, env).await?;
                columns.push(content.lines().map(str::to_string).collect());
            }
        }

        let merged: Vec<String> = if serial {
            columns.iter().map(|lines| lines.join("\t")).collect()
        } else {
            let height = columns.iter().map(Vec::len).max().unwrap_or(0);
            (0..height)
                .map(|row| {
                    columns
                        .iter()
                        .map(|lines| lines.get(row).map(String::as_str).unwrap_or(""))
                        .collect::<Vec<&str>>()
                        .join("\t")
                })
                .collect()
        };

        let mut output = merged.join("\n");
        if !output.is_empty() {
            output.push('\n');
        }
        stdout
            .write_all(output.as_bytes())
            .await
            .map_err(|_| AppError::new("paste", reason::WRITE_STREAM))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    async fn run(dir: &std::path::Path, args: &[&str], stdin: &str) -> (Result<(), ShellError>, String) {
        let env = Environment::with_dir(dir);
        let args: Vec<String> = args.iter().map(|s| s.to_string()).collect();
        let mut input: &[u8] = stdin.as_bytes();
        let mut out: Vec<u8> = Vec::new();
        let result = Paste.run(&args, &mut input, &mut out, &env).await;
        (result, String::from_utf8(out).unwrap())
    }

    #[tokio::test]
    async fn single_input_echoes_lines() {
        let dir = tempfile::tempdir().unwrap();
        let (result, out) = run(dir.path(), &[], "a\nb\nc\n").await;
        result.unwrap();
        assert_eq!(out, "a\nb\nc\n");
    }

    #[tokio::test]
    async fn merges_files_in_parallel() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("l.txt"), "1\n2\n3\n").unwrap();
        fs::write(dir.path().join("r.txt"), "a\nb\nc\n").unwrap();
        let (result, out) = run(dir.path(), &["l.txt", "r.txt"], "").await;
        result.unwrap();
        assert_eq!(out, "1\ta\n2\tb\n3\tc\n");
    }

    #[tokio::test]
    async fn shorter_input_pads_with_empty_fields() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("l.txt"), "1\n2\n3\n").unwrap();
        fs::write(dir.path().join("r.txt"), "a\n").unwrap();
        let (result, out) = run(dir.path(), &["l.txt", "r.txt"], "").await;
        result.unwrap();
        assert_eq!(out, "1\ta\n2\t\n3\t\n");
    }

    #[tokio::test]
    async fn serial_joins_each_input_on_one_line() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("l.txt"), "1\n2\n3\n").unwrap();
        fs::write(dir.path().join("r.txt"), "a\nb\n").unwrap();
        let (result, out) = run(dir.path(), &["-s", "l.txt", "r.txt"], "").await;
        result.unwrap();
        assert_eq!(out, "1\t2\t3\na\tb\n");
    }

    #[tokio::test]
    async fn dash_merges_stdin_with_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("f.txt"), "x\ny\n").unwrap();
        let (result, out) = run(dir.path(), &["-", "f.txt"], "1\n2\n").await;
        result.unwrap();
        assert_eq!(out, "1\tx\n2\ty\n");
    }

    #[tokio::test]
    async fn missing_file_aborts() {
        let dir = tempfile::tempdir().unwrap();
        let (result, _) = run(dir.path(), &["ghost.txt"], "").await;
        assert_eq!(
            result.unwrap_err().to_string(),
            "paste: ghost.txt: No such file or directory"
        );
    }
}
