//! echo — Write arguments to standard output.

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncWrite};

use crate::environment::Environment;
use crate::error::{reason, AppError, ShellError};
use crate::tools::Application;

/// Echo: join the arguments with single spaces and newline-terminate.
/// No flags; `-n` and friends are ordinary text here.
pub struct Echo;

#[async_trait]
impl Application for Echo {
    fn name(&self) -> &'static str {
        "echo"
    }

    async fn run(
        &self,
        args: &[String],
        _stdin: &mut (dyn AsyncRead + Send + Unpin),
        stdout: &mut (dyn AsyncWrite + Send + Unpin),
        _env: &Environment,
    ) -> Result<(), ShellError> {
        let line = args.join(" ");
        crate::io::write_line(stdout, &line)
            .await
            .map_err(|_| AppError::new("echo", reason::WRITE_STREAM))?;
        Ok(())
    }
}
