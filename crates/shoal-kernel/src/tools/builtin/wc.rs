//! wc — Count lines, words, and bytes.

use async_trait::async_trait;
use lexopt::prelude::*;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};

use crate::environment::Environment;
use crate::error::{reason, AppError, ShellError};
use crate::tools::builtin::{bad_usage, read_input};
use crate::tools::Application;

/// Wc: newline / word / byte counts per input, plus a total line when
/// more than one input is given. `-l`, `-w`, `-c` select counts; the
/// default is all three in lines-words-bytes order.
pub struct Wc;

#[derive(Clone, Copy, Default)]
struct Counts {
    lines: u64,
    words: u64,
    bytes: u64,
}

impl Counts {
    fn of(text: &str) -> Self {
        Self {
            lines: text.bytes().filter(|&b| b == b'\n').count() as u64,
            words: text.split_whitespace().count() as u64,
            bytes: text.len() as u64,
        }
    }

    fn add(&mut self, other: Counts) {
        self.lines += other.lines;
        self.words += other.words;
        self.bytes += other.bytes;
    }
}

/// Format one counts row: selected counts, then an optional label.
fn format_row(counts: Counts, lines: bool, words: bool, bytes: bool, label: Option<&str>) -> String {
    let mut row = String::new();
    if lines {
        row.push_str(&format!(" {:7}", counts.lines));
    }
    if words {
        row.push_str(&format!(" {:7}", counts.words));
    }
    if bytes {
        row.push_str(&format!(" {:7}", counts.bytes));
    }
    if let Some(label) = label {
        row.push(' ');
        row.push_str(label);
    }
    row.push('\n');
    row
}

#[async_trait]
impl Application for Wc {
    fn name(&self) -> &'static str {
        "wc"
    }

    async fn run(
        &self,
        args: &[String],
        stdin: &mut (dyn AsyncRead + Send + Unpin),
        stdout: &mut (dyn AsyncWrite + Send + Unpin),
        env: &Environment,
    ) -> Result<(), ShellError> {
        let mut count_lines = false;
        let mut count_words = false;
        let mut count_bytes = false;
        let mut files: Vec<String> = Vec::new();

        let mut parser = lexopt::Parser::from_args(args);
        while let Some(arg) = parser.next().map_err(|e| bad_usage("wc", e))? {
            match arg {
                Short('l') => count_lines = true,
                Short('w') => count_words = true,
                Short('c') => count_bytes = true,
                Value(val) => {
                    files.push(val.string().unwrap_or_default())
                }
                other => return Err(bad_usage("wc", other.unexpected())),
            }
        }

        // No selection means everything
        if !count_lines && !count_words && !count_bytes {
            count_lines = true;
            count_words = true;
            count_bytes = true;
        }

        let mut output = String::new();
        let mut total = Counts::default();

        if files.is_empty() {
            files.push("-".to_string());
        }
        let multiple = files.len() > 1;

        for path in &files {
            match read_input("wc", path, stdin, env).await {
                Ok(content) => {
                    let counts = Counts::of(&content);
                    total.add(counts);
                    let label = (path != "-").then_some(path.as_str());
                    output.push_str(&format_row(
                        counts,
                        count_lines,
                        count_words,
                        count_bytes,
                        label,
                    ));
                }
                Err(e) => {
                    output.push_str(&e.to_string());
                    output.push('\n');
                }
            }
        }

        if multiple {
            output.push_str(&format_row(
                total,
                count_lines,
                count_words,
                count_bytes,
                Some("total"),
            ));
        }

        stdout
            .write_all(output.as_bytes())
            .await
            .map_err(|_| AppError::new("wc", reason::WRITE_STREAM))?;
        Ok(())
    }
}
