//! The shell facade: one line in, one evaluation out.
//!
//! `Shell` owns the dispatch registry and the environment, both behind
//! `Arc` so pipeline stages and recursive substitutions share them
//! cheaply. Evaluation is stateless beyond the environment's cwd: the
//! command tree is built fresh for every line and owned by that line's
//! evaluation alone.
//!
//! Error policy (who sees what):
//!
//! - A syntax error anywhere in the line aborts the whole line before any
//!   command runs: `evaluate` returns `Err` and nothing was executed.
//! - Execution-time failures are collected into [`EvalOutcome::errors`]:
//!   a failing sequence step is reported and the next step still runs; a
//!   failing pipe stage is reported alongside its siblings.
//! - `exit` stops the remaining steps and sets [`EvalOutcome::exit`]; only
//!   the outermost driver actually terminates the process.

use std::sync::Arc;

use futures::future::BoxFuture;
use tokio::io::AsyncWrite;

use crate::ast::Command;
use crate::environment::Environment;
use crate::error::ShellError;
use crate::io::{null_input, InputStream};
use crate::parser;
use crate::scheduler::PipelineRunner;
use crate::tools::ToolRegistry;

/// The result of evaluating one line that made it past parsing.
#[derive(Debug, Default)]
pub struct EvalOutcome {
    /// Every error surfaced by the line's steps and stages, in order.
    pub errors: Vec<ShellError>,
    /// Set when the exit builtin ran; the driver terminates with this code.
    pub exit: Option<i32>,
}

impl EvalOutcome {
    /// True when the line ran to completion without surfacing anything.
    pub fn success(&self) -> bool {
        self.errors.is_empty() && self.exit.is_none()
    }
}

/// The shell: registry + environment, cheap to clone.
#[derive(Clone)]
pub struct Shell {
    registry: Arc<ToolRegistry>,
    env: Arc<Environment>,
}

impl Shell {
    pub fn new(registry: Arc<ToolRegistry>, env: Arc<Environment>) -> Self {
        Self { registry, env }
    }

    /// A shell with every builtin registered, rooted at the process cwd.
    pub fn with_builtins() -> std::io::Result<Self> {
        Ok(Self::new(
            Arc::new(crate::tools::builtin_registry()),
            Arc::new(Environment::new()?),
        ))
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    pub fn env(&self) -> &Environment {
        &self.env
    }

    /// Evaluate one input line.
    ///
    /// `stdin` is owned because a pipeline's first stage consumes it; the
    /// output stream is borrowed and shared by every sequence step.
    pub async fn evaluate(
        &self,
        line: &str,
        stdin: InputStream,
        stdout: &mut (dyn AsyncWrite + Send + Unpin),
    ) -> Result<EvalOutcome, ShellError> {
        self.evaluate_at(line, stdin, stdout, 0).await
    }

    /// Evaluation with an explicit substitution depth (0 at the top level).
    pub(crate) async fn evaluate_at(
        &self,
        line: &str,
        mut stdin: InputStream,
        stdout: &mut (dyn AsyncWrite + Send + Unpin),
        depth: usize,
    ) -> Result<EvalOutcome, ShellError> {
        let Some(tree) = parser::parse(line)? else {
            return Ok(EvalOutcome::default());
        };

        let runner = PipelineRunner::new(self.clone(), depth);
        let mut outcome = EvalOutcome::default();

        let steps = match tree {
            Command::Sequence(steps) => steps,
            single => vec![single],
        };

        for step in &steps {
            let errors = match step {
                Command::Call(call) => runner.run_call(call, &mut *stdin, stdout).await,
                Command::Pipe(stages) => runner.run_pipe(stages, &mut stdin, stdout).await,
                Command::Sequence(_) => unreachable!("the grammar nests no sequences"),
            };

            for error in errors {
                match error {
                    ShellError::Exit(code) => {
                        outcome.exit.get_or_insert(code);
                    }
                    other => outcome.errors.push(other),
                }
            }

            // exit stops the remaining steps; ordinary failures do not
            if outcome.exit.is_some() {
                break;
            }
        }

        Ok(outcome)
    }

    /// Evaluate a command-substitution span, capturing its output.
    ///
    /// Substitutions read a null stdin (they must not steal the caller's
    /// input) and abort the enclosing call on the first failure. Boxed to
    /// break the evaluate → resolve → capture → evaluate future cycle.
    pub(crate) fn capture<'a>(
        &'a self,
        line: &'a str,
        depth: usize,
    ) -> BoxFuture<'a, Result<String, ShellError>> {
        Box::pin(async move {
            let mut sink: Vec<u8> = Vec::new();
            let outcome = self
                .evaluate_at(line, null_input(), &mut sink, depth)
                .await?;

            if let Some(code) = outcome.exit {
                return Err(ShellError::Exit(code));
            }
            if !outcome.errors.is_empty() {
                let mut errors = outcome.errors;
                return Err(errors.remove(0));
            }

            Ok(String::from_utf8_lossy(&sink).into_owned())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_shell(dir: &std::path::Path) -> Shell {
        Shell::new(
            Arc::new(crate::tools::builtin_registry()),
            Arc::new(Environment::with_dir(dir)),
        )
    }

    async fn eval(shell: &Shell, line: &str) -> (String, EvalOutcome) {
        let mut out: Vec<u8> = Vec::new();
        let outcome = shell.evaluate(line, null_input(), &mut out).await.unwrap();
        (String::from_utf8(out).unwrap(), outcome)
    }

    #[tokio::test]
    async fn blank_lines_do_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let shell = make_shell(dir.path());
        let (out, outcome) = eval(&shell, "   ").await;
        assert!(out.is_empty());
        assert!(outcome.success());
    }

    #[tokio::test]
    async fn sequence_runs_left_to_right() {
        let dir = tempfile::tempdir().unwrap();
        let shell = make_shell(dir.path());
        let (out, outcome) = eval(&shell, "echo a ; echo b ; echo c").await;
        assert!(outcome.success());
        assert_eq!(out, "a\nb\nc\n");
    }

    #[tokio::test]
    async fn failing_step_does_not_stop_the_sequence() {
        let dir = tempfile::tempdir().unwrap();
        let shell = make_shell(dir.path());
        let (out, outcome) = eval(&shell, "badcmd ; echo hi").await;
        assert_eq!(out, "hi\n");
        assert_eq!(outcome.errors.len(), 1);
        assert!(matches!(
            &outcome.errors[0],
            ShellError::UnknownCommand { name } if name == "badcmd"
        ));
    }

    #[tokio::test]
    async fn syntax_error_aborts_before_any_side_effect() {
        let dir = tempfile::tempdir().unwrap();
        let shell = make_shell(dir.path());

        let mut out: Vec<u8> = Vec::new();
        let result = shell
            .evaluate("echo ran > marker.txt ; cat < <", null_input(), &mut out)
            .await;

        assert!(result.is_err());
        // The first step never ran: no marker file was created
        assert!(!dir.path().join("marker.txt").exists());
    }

    #[tokio::test]
    async fn exit_stops_remaining_steps() {
        let dir = tempfile::tempdir().unwrap();
        let shell = make_shell(dir.path());
        let (out, outcome) = eval(&shell, "echo before ; exit 3 ; echo after").await;
        assert_eq!(out, "before\n");
        assert_eq!(outcome.exit, Some(3));
        assert!(outcome.errors.is_empty());
    }

    #[tokio::test]
    async fn capture_returns_stdout() {
        let dir = tempfile::tempdir().unwrap();
        let shell = make_shell(dir.path());
        let text = shell.capture("echo captured", 1).await.unwrap();
        assert_eq!(text, "captured\n");
    }

    #[tokio::test]
    async fn capture_propagates_failures() {
        let dir = tempfile::tempdir().unwrap();
        let shell = make_shell(dir.path());
        let err = shell.capture("badcmd", 1).await.unwrap_err();
        assert!(matches!(err, ShellError::UnknownCommand { .. }));
    }

    #[tokio::test]
    async fn substitution_inside_line_feeds_arguments() {
        let dir = tempfile::tempdir().unwrap();
        let shell = make_shell(dir.path());
        let (out, outcome) = eval(&shell, "echo $(echo nested)").await;
        assert!(outcome.success());
        assert_eq!(out, "nested\n");
    }

    #[tokio::test]
    async fn pipe_feeds_adjacent_stages() {
        let dir = tempfile::tempdir().unwrap();
        let shell = make_shell(dir.path());
        let (out, outcome) = eval(&shell, "echo banana | wc -c").await;
        assert!(outcome.success());
        // "banana\n" is 7 bytes
        assert_eq!(out.trim(), "7");
    }
}
