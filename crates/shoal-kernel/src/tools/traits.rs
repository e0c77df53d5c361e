//! The capability contract every builtin satisfies.

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncWrite};

use crate::environment::Environment;
use crate::error::ShellError;

/// A command that can be executed with streams.
///
/// `args` is the flat, fully resolved argument list (the command's own
/// name removed); implementations must treat it as nothing richer than a
/// list of strings. Output goes to `stdout` and/or the filesystem.
/// Failures are reported as [`crate::error::AppError`] converted into
/// `ShellError`; the single exception is the exit builtin, which returns
/// the `Exit` control-flow variant.
#[async_trait]
pub trait Application: Send + Sync {
    /// The name this capability registers under.
    fn name(&self) -> &'static str;

    /// Run the command to completion.
    async fn run(
        &self,
        args: &[String],
        stdin: &mut (dyn AsyncRead + Send + Unpin),
        stdout: &mut (dyn AsyncWrite + Send + Unpin),
        env: &Environment,
    ) -> Result<(), ShellError>;
}
