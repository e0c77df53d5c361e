//! exit — Terminate the shell.

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncWrite};

use crate::environment::Environment;
use crate::error::{AppError, ShellError};
use crate::tools::Application;

/// Exit: return the `Exit` control-flow signal with the given status code
/// (default 0). The remaining sequence steps are skipped and the
/// outermost driver terminates the process — the shell core never calls
/// `process::exit` itself.
pub struct Exit;

#[async_trait]
impl Application for Exit {
    fn name(&self) -> &'static str {
        "exit"
    }

    async fn run(
        &self,
        args: &[String],
        _stdin: &mut (dyn AsyncRead + Send + Unpin),
        _stdout: &mut (dyn AsyncWrite + Send + Unpin),
        _env: &Environment,
    ) -> Result<(), ShellError> {
        let code = match args {
            [] => 0,
            [code] => code
                .parse::<i32>()
                .map_err(|_| AppError::new("exit", format!("{}: Invalid status code", code)))?,
            _ => return Err(AppError::new("exit", "Too many arguments").into()),
        };
        Err(ShellError::Exit(code))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn run(args: &[&str]) -> Result<(), ShellError> {
        let env = Environment::with_dir("/");
        let args: Vec<String> = args.iter().map(|s| s.to_string()).collect();
        let mut stdin: &[u8] = b"";
        let mut out: Vec<u8> = Vec::new();
        Exit.run(&args, &mut stdin, &mut out, &env).await
    }

    #[tokio::test]
    async fn defaults_to_code_zero() {
        assert!(matches!(run(&[]).await.unwrap_err(), ShellError::Exit(0)));
    }

    #[tokio::test]
    async fn uses_given_code() {
        assert!(matches!(run(&["42"]).await.unwrap_err(), ShellError::Exit(42)));
    }

    #[tokio::test]
    async fn rejects_non_numeric_code() {
        let err = run(&["nope"]).await.unwrap_err();
        assert_eq!(err.to_string(), "exit: nope: Invalid status code");
    }

    #[tokio::test]
    async fn rejects_extra_arguments() {
        let err = run(&["1", "2"]).await.unwrap_err();
        assert_eq!(err.to_string(), "exit: Too many arguments");
    }
}
