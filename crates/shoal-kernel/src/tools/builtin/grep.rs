//! grep — Print lines matching a pattern.

use async_trait::async_trait;
use lexopt::prelude::*;
use regex::RegexBuilder;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};

use crate::environment::Environment;
use crate::error::{reason, AppError, ShellError};
use crate::tools::builtin::{bad_usage, read_input};
use crate::tools::Application;

/// Grep: regex line filter. `-i` ignores case, `-c` prints match counts
/// instead of lines, `-H` always prefixes output with the file name
/// (automatic when more than one file is given). Stdin shows up as
/// `(standard input)` when prefixed.
pub struct Grep;

#[async_trait]
impl Application for Grep {
    fn name(&self) -> &'static str {
        "grep"
    }

    async fn run(
        &self,
        args: &[String],
        stdin: &mut (dyn AsyncRead + Send + Unpin),
        stdout: &mut (dyn AsyncWrite + Send + Unpin),
        env: &Environment,
    ) -> Result<(), ShellError> {
        let mut ignore_case = false;
        let mut count_only = false;
        let mut with_filename = false;
        let mut positionals: Vec<String> = Vec::new();

        let mut parser = lexopt::Parser::from_args(args);
        while let Some(arg) = parser.next().map_err(|e| bad_usage("grep", e))? {
            match arg {
                Short('i') => ignore_case = true,
                Short('c') => count_only = true,
                Short('H') => with_filename = true,
                Value(val) => positionals
                    .push(val.string().unwrap_or_default()),
                other => return Err(bad_usage("grep", other.unexpected())),
            }
        }

        if positionals.is_empty() {
            return Err(AppError::new("grep", reason::MISSING_ARG).into());
        }
        let pattern = positionals.remove(0);
        let files = positionals;

        let regex = RegexBuilder::new(&pattern)
            .case_insensitive(ignore_case)
            .build()
            .map_err(|_| AppError::new("grep", format!("{}: Invalid pattern", pattern)))?;

        let prefix_names = with_filename || files.len() > 1;
        let mut output = String::new();

        let inputs: Vec<String> = if files.is_empty() {
            vec!["-".to_string()]
        } else {
            files
        };

        for path in &inputs {
            let label = if path == "-" { "(standard input)" } else { path };
            match read_input("grep", path, stdin, env).await {
                Ok(content) => {
                    let matches: Vec<&str> =
                        content.lines().filter(|line| regex.is_match(line)).collect();
                    if count_only {
                        if prefix_names {
                            output.push_str(&format!("{}: {}\n", label, matches.len()));
                        } else {
                            output.push_str(&format!("{}\n", matches.len()));
                        }
                    } else {
                        for line in matches {
                            if prefix_names {
                                output.push_str(&format!("{}: {}\n", label, line));
                            } else {
                                output.push_str(line);
                                output.push('\n');
                            }
                        }
                    }
                }
                Err(e) => {
                    output.push_str(&e.to_string());
                    output.push('\n');
                }
            }
        }

        stdout
            .write_all(output.as_bytes())
            .await
            .map_err(|_| AppError::new("grep", reason::WRITE_STREAM))?;
        Ok(())
    }
}
