//! uniq — Filter adjacent repeated lines.

use async_trait::async_trait;
use lexopt::prelude::*;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};

use crate::environment::Environment;
use crate::error::{io_reason, reason, AppError, ShellError};
use crate::tools::builtin::{bad_usage, read_input};
use crate::tools::Application;

/// Uniq: `uniq [-c] [-d] [-D] [INPUT [OUTPUT]]`. Adjacent duplicate lines
/// collapse to one; `-d` keeps only duplicated groups (once each), `-D`
/// prints every member of duplicated groups, `-c` prefixes each line with
/// its group count. `-c` with `-D` is rejected, as counting every
/// duplicate line is meaningless. With an OUTPUT operand the result goes
/// to that file instead of stdout.
pub struct Uniq;

#[async_trait]
impl Application for Uniq {
    fn name(&self) -> &'static str {
        "uniq"
    }

    async fn run(
        &self,
        args: &[String],
        stdin: &mut (dyn AsyncRead + Send + Unpin),
        stdout: &mut (dyn AsyncWrite + Send + Unpin),
        env: &Environment,
    ) -> Result<(), ShellError> {
        let mut count = false;
        let mut repeated = false;
        let mut all_repeated = false;
        let mut operands: Vec<String> = Vec::new();

        let mut parser = lexopt::Parser::from_args(args);
        while let Some(arg) = parser.next().map_err(|e| bad_usage("uniq", e))? {
            match arg {
                Short('c') => count = true,
                Short('d') => repeated = true,
                Short('D') => all_repeated = true,
                Value(val) => operands
                    .push(val.string().unwrap_or_default()),
                other => return Err(bad_usage("uniq", other.unexpected())),
            }
        }

        if count && all_repeated {
            return Err(AppError::new(
                "uniq",
                "printing all duplicated lines and repeat counts is meaningless",
            )
            .into());
        }
        if operands.len() > 2 {
            return Err(AppError::new("uniq", "Too many arguments").into());
        }

        let input_path = operands.first().cloned().unwrap_or_else(|| "-".to_string());
        let output_path = operands.get(1).cloned();

        let content = read_input("uniq", &input_path, stdin, env).await?;

        // Group adjacent identical lines
        let mut groups: Vec<(usize, &str)> = Vec::new();
        for line in content.lines() {
            match groups.last_mut() {
                Some((n, current)) if *current == line => *n += 1,
                _ => groups.push((1, line)),
            }
        }

        let mut output = String::new();
        for (n, line) in &groups {
            let emit: usize = if all_repeated {
                if *n > 1 {
                    *n
                } else {
                    0
                }
            } else if repeated {
                usize::from(*n > 1)
            } else {
                1
            };

            for _ in 0..emit {
                if count {
                    output.push_str(&format!("{} {}\n", n, line));
                } else {
                    output.push_str(line);
                    output.push('\n');
                }
            }
        }

        match output_path {
            Some(path) => {
                let resolved = env.resolve(&path);
                tokio::fs::write(&resolved, output.as_bytes())
                    .await
                    .map_err(|e| AppError::new("uniq", format!("{}: {}", path, io_reason(&e))))?;
            }
            None => {
                stdout
                    .write_all(output.as_bytes())
                    .await
                    .map_err(|_| AppError::new("uniq", reason::WRITE_STREAM))?;
            }
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
        let result = Uniq.run(&args, &mut input, &mut out, &env).await;
        (result, String::from_utf8(out).unwrap())
    }

    const INPUT: &str = "Hello World\nHello World\nAlice\nAlice\nBob\nAlice\nBob\n";

    #[tokio::test]
    async fn collapses_adjacent_duplicates() {
        let dir = tempfile::tempdir().unwrap();
        let (result, out) = run(dir.path(), &[], INPUT).await;
        result.unwrap();
        assert_eq!(out, "Hello World\nAlice\nBob\nAlice\nBob\n");
    }

    #[tokio::test]
    async fn count_prefixes_group_sizes() {
        let dir = tempfile::tempdir().unwrap();
        let (result, out) = run(dir.path(), &["-c"], INPUT).await;
        result.unwrap();
        assert_eq!(out, "2 Hello World\n2 Alice\n1 Bob\n1 Alice\n1 Bob\n");
    }

    #[tokio::test]
    async fn repeated_keeps_only_duplicated_groups() {
        let dir = tempfile::tempdir().unwrap();
        let (result, out) = run(dir.path(), &["-d"], INPUT).await;
        result.unwrap();
        assert_eq!(out, "Hello World\nAlice\n");
    }

    #[tokio::test]
    async fn all_repeated_prints_every_member() {
        let dir = tempfile::tempdir().unwrap();
        let (result, out) = run(dir.path(), &["-D"], INPUT).await;
        result.unwrap();
        assert_eq!(out, "Hello World\nHello World\nAlice\nAlice\n");
    }

    #[tokio::test]
    async fn count_with_repeated() {
        let dir = tempfile::tempdir().unwrap();
        let (result, out) = run(dir.path(), &["-cd"], INPUT).await;
        result.unwrap();
        assert_eq!(out, "2 Hello World\n2 Alice\n");
    }

    #[tokio::test]
    async fn count_with_all_repeated_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let (result, _) = run(dir.path(), &["-cD"], INPUT).await;
        assert_eq!(
            result.unwrap_err().to_string(),
            "uniq: printing all duplicated lines and repeat counts is meaningless"
        );
    }

    #[tokio::test]
    async fn reads_input_file_and_writes_output_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("in.txt"), "a\na\nb\n").unwrap();
        let (result, out) = run(dir.path(), &["in.txt", "out.txt"], "").await;
        result.unwrap();
        assert!(out.is_empty());
        assert_eq!(
            fs::read_to_string(dir.path().join("out.txt")).unwrap(),
            "a\nb\n"
        );
    }

    #[tokio::test]
    async fn non_adjacent_duplicates_survive() {
        let dir = tempfile::tempdir().unwrap();
        let (result, out) = run(dir.path(), &[], "x\ny\nx\n").await;
        result.unwrap();
        assert_eq!(out, "x\ny\nx\n");
    }

    #[tokio::test]
    async fn empty_input_is_empty_output() {
        let dir = tempfile::tempdir().unwrap();
        let (result, out) = run(dir.path(), &[], "").await;
        result.unwrap();
        assert!(out.is_empty());
    }
}
