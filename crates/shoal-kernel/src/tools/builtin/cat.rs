//! cat — Concatenate files to standard output.

use async_trait::async_trait;
use lexopt::prelude::*;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};

use crate::environment::Environment;
use crate::error::{reason, AppError, ShellError};
use crate::tools::builtin::{bad_usage, read_input};
use crate::tools::Application;

/// Cat: concatenate files (stdin if none, or where a file is `-`).
/// `-n` numbers output lines.
pub struct Cat;

#[async_trait]
impl Application for Cat {
    fn name(&self) -> &'static str {
        "cat"
    }

    async fn run(
        &self,
        args: &[String],
        stdin: &mut (dyn AsyncRead + Send + Unpin),
        stdout: &mut (dyn AsyncWrite + Send + Unpin),
        env: &Environment,
    ) -> Result<(), ShellError> {
        let mut number_lines = false;
        let mut files: Vec<String> = Vec::new();

        let mut parser = lexopt::Parser::from_args(args);
        while let Some(arg) = parser.next().map_err(|e| bad_usage("cat", e))? {
            match arg {
                Short('n') => number_lines = true,
                Value(val) => files.push(val.string().unwrap_or_default()),
                other => return Err(bad_usage("cat", other.unexpected())),
            }
        }

        let mut output = String::new();
        let mut line_no = 1usize;

        if files.is_empty() {
            files.push("-".to_string());
        }
        for path in &files {
            match read_input("cat", path, stdin, env).await {
                Ok(content) => {
                    if number_lines {
                        for line in content.lines() {
                            output.push_str(&format!("{:6}\t{}\n", line_no, line));
                            line_no += 1;
                        }
                    } else {
                        output.push_str(&content);
                    }
                }
                // A bad file becomes an error line in the output; later
                // files are still processed
                Err(e) => {
                    output.push_str(&e.to_string());
                    output.push('\n');
                }
            }
        }

        stdout
            .write_all(output.as_bytes())
            .await
            .map_err(|_| AppError::new("cat", reason::WRITE_STREAM))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    async fn run(dir: &std::path::Path, args: &[&str], stdin: &str) -> String {
        let env = Environment::with_dir(dir);
        let args: Vec<String> = args.iter().map(|s| s.to_string()).collect();
        let mut input: &[u8] = stdin.as_bytes();
        let mut out: Vec<u8> = Vec::new();
        Cat.run(&args, &mut input, &mut out, &env).await.unwrap();
        String::from_utf8(out).unwrap()
    }

    #[tokio::test]
    async fn reads_stdin_when_no_files() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(run(dir.path(), &[], "from stdin\n").await, "from stdin\n");
    }

    #[tokio::test]
    async fn concatenates_files_in_order() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), "one\n").unwrap();
        fs::write(dir.path().join("b.txt"), "two\n").unwrap();
        assert_eq!(
            run(dir.path(), &["a.txt", "b.txt"], "").await,
            "one\ntwo\n"
        );
    }

    #[tokio::test]
    async fn dash_reads_stdin_between_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), "first\n").unwrap();
        assert_eq!(
            run(dir.path(), &["a.txt", "-"], "middle\n").await,
            "first\nmiddle\n"
        );
    }

    #[tokio::test]
    async fn numbers_lines_across_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), "x\ny\n").unwrap();
        fs::write(dir.path().join("b.txt"), "z\n").unwrap();
        let out = run(dir.path(), &["-n", "a.txt", "b.txt"], "").await;
        assert_eq!(out, "     1\tx\n     2\ty\n     3\tz\n");
    }

    #[tokio::test]
    async fn missing_file_becomes_error_line() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), "ok\n").unwrap();
        let out = run(dir.path(), &["ghost.txt", "a.txt"], "").await;
        assert_eq!(out, "cat: ghost.txt: No such file or directory\nok\n");
    }

    #[tokio::test]
    async fn directory_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        let out = run(dir.path(), &["sub"], "").await;
        assert_eq!(out, "cat: sub: Is a directory\n");
    }
}
