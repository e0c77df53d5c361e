//! shoal REPL — the interactive driver over the shell kernel.
//!
//! The kernel never prints and never terminates the process; this crate
//! makes both policy calls:
//!
//! - **Interactive mode** prints surfaced errors and keeps going.
//! - **Command/script mode** prints and aborts on the first failing line.
//! - An `exit` from any mode becomes the process exit status.
//!
//! Input is read as plain lines; there is deliberately no line editing or
//! history layer.

use std::io::{BufRead, Write};
use std::process::ExitCode;

use anyhow::{Context, Result};
use tokio::io::AsyncWrite;
use tokio::runtime::Runtime;

use shoal_kernel::{io::null_input, EvalOutcome, Shell};

/// The driver: a shell plus the runtime its evaluations block on.
pub struct Repl {
    shell: Shell,
    runtime: Runtime,
}

impl Repl {
    /// A REPL over a fresh shell rooted at the process cwd.
    pub fn new() -> Result<Self> {
        let shell = Shell::with_builtins().context("Failed to create shell")?;
        Self::with_shell(shell)
    }

    /// A REPL over an existing shell (embedders, tests).
    pub fn with_shell(shell: Shell) -> Result<Self> {
        let runtime = Runtime::new().context("Failed to create tokio runtime")?;
        Ok(Self { shell, runtime })
    }

    pub fn shell(&self) -> &Shell {
        &self.shell
    }

    /// Run the interactive loop: prompt, read, evaluate, print errors,
    /// continue. Returns when stdin closes or `exit` runs.
    pub fn run_interactive(&self) -> Result<ExitCode> {
        let stdin = std::io::stdin();
        let mut stdout = std::io::stdout();

        loop {
            write!(stdout, "{}$ ", self.shell.env().current_dir().display())?;
            stdout.flush()?;

            let mut line = String::new();
            if stdin.lock().read_line(&mut line)? == 0 {
                // EOF
                return Ok(ExitCode::SUCCESS);
            }

            let mut sink = tokio::io::stdout();
            match self.evaluate(&line, &mut sink) {
                Ok(outcome) => {
                    for error in &outcome.errors {
                        eprintln!("{error}");
                    }
                    if let Some(code) = outcome.exit {
                        return Ok(ExitCode::from(code as u8));
                    }
                }
                // Syntax errors: print and keep the session alive
                Err(e) => eprintln!("{e}"),
            }
        }
    }

    /// Run a source string (a `-c` command or a script file) line by line,
    /// aborting on the first failing line.
    pub fn run_source(&self, source: &str) -> Result<ExitCode> {
        let mut sink = tokio::io::stdout();

        for line in source.lines() {
            match self.evaluate(line, &mut sink) {
                Ok(outcome) => {
                    for error in &outcome.errors {
                        eprintln!("{error}");
                    }
                    if let Some(code) = outcome.exit {
                        return Ok(ExitCode::from(code as u8));
                    }
                    if !outcome.errors.is_empty() {
                        return Ok(ExitCode::FAILURE);
                    }
                }
                Err(e) => {
                    eprintln!("{e}");
                    return Ok(ExitCode::FAILURE);
                }
            }
        }
        Ok(ExitCode::SUCCESS)
    }

    /// Evaluate one line against the given sink. Interactive and source
    /// modes both go through here. Commands read an empty stdin: in
    /// interactive mode the terminal is busy feeding the REPL itself.
    pub fn evaluate<W>(
        &self,
        line: &str,
        out: &mut W,
    ) -> std::result::Result<EvalOutcome, shoal_kernel::ShellError>
    where
        W: AsyncWrite + Send + Unpin,
    {
        self.runtime
            .block_on(self.shell.evaluate(line, null_input(), out))
    }
}
