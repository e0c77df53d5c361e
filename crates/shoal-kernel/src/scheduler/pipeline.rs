//! Pipeline execution: running calls and connecting concurrent stages.
//!
//! Every stage of a pipe gets its redirections resolved and opened before
//! any stage runs. Adjacent stages are then connected with a bounded
//! [`bridge`](super::bridge): all stages but the last run on their own
//! spawned task, the last rides the caller's task and output stream. The
//! runner joins every stage before reporting, and the error list carries
//! each failed stage's error in stage order.
//!
//! A stage's write end is closed on every exit path (success or failure),
//! so a downstream stage always observes end-of-stream rather than hanging.

use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};

use super::bridge::{bridge, BRIDGE_CAPACITY};
use crate::ast::Call;
use crate::error::ShellError;
use crate::expand::resolve_call;
use crate::io::{null_input, InputStream, OutputStream};
use crate::redirect::{extract, RedirectedCall};
use crate::shell::Shell;

/// Runs the calls and pipes of one evaluation.
pub(crate) struct PipelineRunner {
    shell: Shell,
    depth: usize,
}

impl PipelineRunner {
    pub(crate) fn new(shell: Shell, depth: usize) -> Self {
        Self { shell, depth }
    }

    /// Run a bare call against the caller's default streams.
    ///
    /// The returned vector is empty on success; it never carries more than
    /// one error for a single call.
    pub(crate) async fn run_call(
        &self,
        call: &Call,
        stdin: &mut (dyn AsyncRead + Send + Unpin),
        stdout: &mut (dyn AsyncWrite + Send + Unpin),
    ) -> Vec<ShellError> {
        let redirected = match self.prepare(call).await {
            Ok(rc) => rc,
            Err(e) => return vec![e],
        };
        match self.invoke(redirected, stdin, stdout).await {
            Ok(()) => Vec::new(),
            Err(e) => vec![e],
        }
    }

    /// Run a multi-stage pipe. Stage *i*'s output feeds stage *i+1*'s input
    /// in FIFO byte order; all stages run concurrently.
    pub(crate) async fn run_pipe(
        &self,
        stages: &[Call],
        stdin: &mut InputStream,
        stdout: &mut (dyn AsyncWrite + Send + Unpin),
    ) -> Vec<ShellError> {
        debug_assert!(stages.len() >= 2, "a pipe has at least two stages");

        // Resolve arguments and open every redirection before anything runs
        let mut prepared: Vec<RedirectedCall> = Vec::with_capacity(stages.len());
        for call in stages {
            match self.prepare(call).await {
                Ok(rc) => prepared.push(rc),
                // Streams opened for earlier stages drop (close) right here
                Err(e) => return vec![e],
            }
        }
        let last = prepared.pop().expect("at least two stages");

        // The pipe consumes the caller's input; later sequence steps see EOF
        let mut next_in: InputStream = std::mem::replace(stdin, null_input());

        let mut handles = Vec::with_capacity(prepared.len());
        for redirected in prepared {
            let (writer, reader) = bridge(BRIDGE_CAPACITY);
            let default_in = std::mem::replace(&mut next_in, Box::new(reader));
            tracing::debug!(stage = handles.len(), "spawning pipeline stage");
            handles.push(tokio::spawn(exec_stage(
                self.shell.clone(),
                redirected,
                default_in,
                Box::new(writer),
            )));
        }

        // The last stage rides this task and the caller's output stream
        let mut last_in = next_in;
        let last_result = self.invoke(last, &mut *last_in, stdout).await;
        // Unblock any upstream writer still parked on a full bridge
        drop(last_in);

        // Join every stage before reporting the pipe's outcome
        let mut errors = Vec::new();
        for handle in handles {
            match handle.await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => errors.push(e),
                Err(join) => errors.push(ShellError::Io(std::io::Error::other(join))),
            }
        }
        if let Err(e) = last_result {
            errors.push(e);
        }
        errors
    }

    /// Resolve one call's arguments and open its redirections.
    async fn prepare(&self, call: &Call) -> Result<RedirectedCall, ShellError> {
        let items = resolve_call(&self.shell, call, self.depth).await?;
        extract(items, self.shell.env()).await
    }

    /// Dispatch and run one call against borrowed default streams.
    async fn invoke(
        &self,
        redirected: RedirectedCall,
        stdin: &mut (dyn AsyncRead + Send + Unpin),
        stdout: &mut (dyn AsyncWrite + Send + Unpin),
    ) -> Result<(), ShellError> {
        let mut args = redirected.args;
        debug_assert!(!args.is_empty(), "parser requires a command word");
        let name = args.remove(0);

        let Some(app) = self.shell.registry().get(&name) else {
            return Err(ShellError::UnknownCommand { name });
        };
        tracing::debug!(command = %name, argc = args.len(), "dispatch");

        let mut file_in = redirected.input;
        let mut file_out = redirected.output;

        let effective_in: &mut (dyn AsyncRead + Send + Unpin) = match file_in.as_mut() {
            Some(f) => &mut **f,
            None => stdin,
        };
        let effective_out: &mut (dyn AsyncWrite + Send + Unpin) = match file_out.as_mut() {
            Some(f) => &mut **f,
            None => stdout,
        };

        let result = app
            .run(&args, effective_in, effective_out, self.shell.env())
            .await;

        // Close what this call opened; flush what it borrowed
        let close = match file_out.as_mut() {
            Some(f) => f.shutdown().await,
            None => stdout.flush().await,
        };
        result?;
        close?;
        Ok(())
    }
}

/// Body of one spawned (non-final) pipeline stage.
async fn exec_stage(
    shell: Shell,
    redirected: RedirectedCall,
    default_in: InputStream,
    default_out: OutputStream,
) -> Result<(), ShellError> {
    let mut args = redirected.args;
    let name = args.remove(0);

    // A redirection overrides the pipe's default stream; the unused default
    // stays open until the stage finishes, like an OS pipe descriptor would.
    let (mut stdin, _parked_in) = match redirected.input {
        Some(file) => (file, Some(default_in)),
        None => (default_in, None),
    };
    let (mut stdout, _parked_out) = match redirected.output {
        Some(file) => (file, Some(default_out)),
        None => (default_out, None),
    };

    let Some(app) = shell.registry().get(&name) else {
        // Dropping our streams gives downstream EOF and upstream broken pipe
        return Err(ShellError::UnknownCommand { name });
    };
    tracing::debug!(command = %name, "pipeline stage start");

    let result = app.run(&args, &mut *stdin, &mut *stdout, shell.env()).await;

    // Close our write end on every exit path so downstream observes EOF
    let close = stdout.shutdown().await;
    result?;
    close?;
    Ok(())
}
