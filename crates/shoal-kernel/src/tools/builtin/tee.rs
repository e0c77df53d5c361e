//! tee — Copy stdin to stdout and to files.

use async_trait::async_trait;
use lexopt::prelude::*;
use tokio::fs::OpenOptions;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};

use crate::environment::Environment;
use crate::error::{io_reason, reason, AppError, ShellError};
use crate::tools::builtin::bad_usage;
use crate::tools::Application;

/// Tee: duplicate stdin to stdout and every named file. `-a` appends to
/// files instead of truncating. Files are opened before any input is
/// consumed, so an unwritable path fails the command up front.
pub struct Tee;

#[async_trait]
impl Application for Tee {
    fn name(&self) -> &'static str {
        "tee"
    }

    async fn run(
        &self,
        args: &[String],
        stdin: &mut (dyn AsyncRead + Send + Unpin),
        stdout: &mut (dyn AsyncWrite + Send + Unpin),
        env: &Environment,
    ) -> Result<(), ShellError> {
        let mut append = false;
        let mut paths: Vec<String> = Vec::new();

        let mut parser = lexopt::Parser::from_args(args);
        while let Some(arg) = parser.next().map_err(|e| bad_usage("tee", e))? {
            match arg {
                Short('a') => append = true,
                Value(val) => {
                    paths.push(val.string().unwrap_or_default())
                }
                other => return Err(bad_usage("tee", other.unexpected())),
            }
        }

        let mut sinks = Vec::with_capacity(paths.len());
        for path in &paths {
            let resolved = env.resolve(path);
            let file = OpenOptions::new()
                .create(true)
                .write(true)
                .append(append)
                .truncate(!append)
                .open(&resolved)
                .await
                .map_err(|e| AppError::new("tee", format!("{}: {}", path, io_reason(&e))))?;
            sinks.push((path.clone(), file));
        }

        let input = crate::io::read_to_string(stdin)
            .await
            .map_err(|_| AppError::new("tee", reason::READ_STREAM))?;

        stdout
            .write_all(input.as_bytes())
            .await
            .map_err(|_| AppError::new("tee", reason::WRITE_STREAM))?;

        for (path, file) in &mut sinks {
            file.write_all(input.as_bytes())
                .await
                .map_err(|e| AppError::new("tee", format!("{}: {}", path, io_reason(&e))))?;
            file.flush()
                .await
                .map_err(|e| AppError::new("tee", format!("{}: {}", path, io_reason(&e))))?;
        }
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
        let result = Tee.run(&args, &mut input, &mut out, &env).await;
        (result, String::from_utf8(out).unwrap())
    }

    #[tokio::test]
    async fn copies_stdin_to_stdout() {
        let dir = tempfile::tempdir().unwrap();
        let (result, out) = run(dir.path(), &[], "hello world\n").await;
        result.unwrap();
        assert_eq!(out, "hello world\n");
    }

    #[tokio::test]
    async fn writes_files_and_stdout() {
        let dir = tempfile::tempdir().unwrap();
        let (result, out) = run(dir.path(), &["one.txt", "two.txt"], "data\n").await;
        result.unwrap();
        assert_eq!(out, "data\n");
        assert_eq!(fs::read_to_string(dir.path().join("one.txt")).unwrap(), "data\n");
        assert_eq!(fs::read_to_string(dir.path().join("two.txt")).unwrap(), "data\n");
    }

    #[tokio::test]
    async fn truncates_by_default() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("f.txt"), "old content\n").unwrap();
        let (result, _) = run(dir.path(), &["f.txt"], "new\n").await;
        result.unwrap();
        assert_eq!(fs::read_to_string(dir.path().join("f.txt")).unwrap(), "new\n");
    }

    #[tokio::test]
    async fn append_flag_preserves_existing_content() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("f.txt"), "line1\n").unwrap();
        let (result, out) = run(dir.path(), &["-a", "f.txt"], "line6\n").await;
        result.unwrap();
        assert_eq!(out, "line6\n");
        assert_eq!(
            fs::read_to_string(dir.path().join("f.txt")).unwrap(),
            "line1\nline6\n"
        );
    }

    #[tokio::test]
    async fn unwritable_path_fails_before_reading() {
        let dir = tempfile::tempdir().unwrap();
        let (result, out) = run(dir.path(), &["no/such/dir/f.txt"], "data\n").await;
        assert!(result.is_err());
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn empty_stdin_writes_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let (result, out) = run(dir.path(), &["f.txt"], "").await;
        result.unwrap();
        assert!(out.is_empty());
        assert_eq!(fs::read_to_string(dir.path().join("f.txt")).unwrap(), "");
    }
}
