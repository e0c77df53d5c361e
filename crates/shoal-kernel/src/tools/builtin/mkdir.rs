//! mkdir — Create directories.

use async_trait::async_trait;
use lexopt::prelude::*;
use tokio::io::{AsyncRead, AsyncWrite};

use crate::environment::Environment;
use crate::error::{io_reason, reason, AppError, ShellError};
use crate::tools::builtin::bad_usage;
use crate::tools::Application;

/// Mkdir: create each named directory. `-p` creates missing parents and
/// tolerates directories that already exist.
pub struct Mkdir;

#[async_trait]
impl Application for Mkdir {
    fn name(&self) -> &'static str {
        "mkdir"
    }

    async fn run(
        &self,
        args: &[String],
        _stdin: &mut (dyn AsyncRead + Send + Unpin),
        _stdout: &mut (dyn AsyncWrite + Send + Unpin),
        env: &Environment,
    ) -> Result<(), ShellError> {
        let mut parents = false;
        let mut dirs: Vec<String> = Vec::new();

        let mut parser = lexopt::Parser::from_args(args);
        while let Some(arg) = parser.next().map_err(|e| bad_usage("mkdir", e))? {
            match arg {
                Short('p') => parents = true,
                Value(val) => {
                    dirs.push(val.string().unwrap_or_default())
                }
                other => return Err(bad_usage("mkdir", other.unexpected())),
            }
        }

        if dirs.is_empty() {
            return Err(AppError::new("mkdir", reason::MISSING_ARG).into());
        }

        for dir in &dirs {
            let resolved = env.resolve(dir);
            let result = if parents {
                tokio::fs::create_dir_all(&resolved).await
            } else {
                tokio::fs::create_dir(&resolved).await
            };
            result.map_err(|e| AppError::new("mkdir", format!("{}: {}", dir, io_reason(&e))))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn run(dir: &std::path::Path, args: &[&str]) -> Result<(), ShellError> {
        let env = Environment::with_dir(dir);
        let args: Vec<String> = args.iter().map(|s| s.to_string()).collect();
        let mut stdin: &[u8] = b"";
        let mut out: Vec<u8> = Vec::new();
        Mkdir.run(&args, &mut stdin, &mut out, &env).await
    }

    #[tokio::test]
    async fn creates_directories() {
        let dir = tempfile::tempdir().unwrap();
        run(dir.path(), &["a", "b"]).await.unwrap();
        assert!(dir.path().join("a").is_dir());
        assert!(dir.path().join("b").is_dir());
    }

    #[tokio::test]
    async fn existing_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("a")).unwrap();
        let err = run(dir.path(), &["a"]).await.unwrap_err();
        assert_eq!(err.to_string(), "mkdir: a: File exists");
    }

    #[tokio::test]
    async fn missing_parent_is_an_error_without_p() {
        let dir = tempfile::tempdir().unwrap();
        let err = run(dir.path(), &["a/b/c"]).await.unwrap_err();
        assert_eq!(err.to_string(), "mkdir: a/b/c: No such file or directory");
    }

    #[tokio::test]
    async fn parents_flag_creates_the_chain() {
        let dir = tempfile::tempdir().unwrap();
        run(dir.path(), &["-p", "a/b/c"]).await.unwrap();
        assert!(dir.path().join("a/b/c").is_dir());
        // And tolerates re-creating it
        run(dir.path(), &["-p", "a/b/c"]).await.unwrap();
    }

    #[tokio::test]
    async fn no_operands_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = run(dir.path(), &[]).await.unwrap_err();
        assert_eq!(err.to_string(), "mkdir: Insufficient arguments");
    }
}
