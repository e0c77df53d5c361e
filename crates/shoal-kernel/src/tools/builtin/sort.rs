//! sort — Sort lines of text.

use std::cmp::Ordering;

use async_trait::async_trait;
use lexopt::prelude::*;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};

use crate::environment::Environment;
use crate::error::{reason, AppError, ShellError};
use crate::tools::builtin::{bad_usage, read_file};
use crate::tools::Application;

/// Sort: `-n` treats a leading digit run as a number, `-r` reverses, `-f`
/// folds case (ignored when `-n` is set). Files are read eagerly and a
/// missing file aborts the command; with no files, stdin is sorted.
pub struct Sort;

/// Split off the leading digit-or-nondigit chunk, like the original
/// first-word-number comparator: `"12abc"` → (`"12"`, `"abc"`).
fn leading_chunk(s: &str) -> (&str, &str) {
    let mut chars = s.char_indices();
    let Some((_, first)) = chars.next() else {
        return ("", "");
    };
    let digits = first.is_ascii_digit();
    for (idx, c) in chars {
        if c.is_ascii_digit() != digits {
            return (&s[..idx], &s[idx..]);
        }
    }
    (s, "")
}

/// Compare two digit strings numerically without parsing (arbitrary
/// length): longer means larger, equal lengths compare lexicographically.
fn compare_digits(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

fn compare_lines(a: &str, b: &str, numeric: bool, fold_case: bool) -> Ordering {
    if numeric && !a.is_empty() && !b.is_empty() {
        let (chunk_a, rest_a) = leading_chunk(a);
        let (chunk_b, rest_b) = leading_chunk(b);

        let both_numbers = chunk_a.starts_with(|c: char| c.is_ascii_digit())
            && chunk_b.starts_with(|c: char| c.is_ascii_digit());
        let chunk_order = if both_numbers {
            compare_digits(chunk_a, chunk_b)
        } else {
            chunk_a.cmp(chunk_b)
        };
        return chunk_order.then_with(|| rest_a.cmp(rest_b));
    }

    if fold_case {
        a.to_lowercase().cmp(&b.to_lowercase())
    } else {
        a.cmp(b)
    }
}

#[async_trait]
impl Application for Sort {
    fn name(&self) -> &'static str {
        "sort"
    }

    async fn run(
        &self,
        args: &[String],
        stdin: &mut (dyn AsyncRead + Send + Unpin),
        stdout: &mut (dyn AsyncWrite + Send + Unpin),
        env: &Environment,
    ) -> Result<(), ShellError> {
        let mut numeric = false;
        let mut reverse = false;
        let mut fold_case = false;
        let mut files: Vec<String> = Vec::new();

        let mut parser = lexopt::Parser::from_args(args);
        while let Some(arg) = parser.next().map_err(|e| bad_usage("sort", e))? {
            match arg {
                Short('n') => numeric = true,
                Short('r') => reverse = true,
                Short('f') => fold_case = true,
                Value(val) => {
                    files.push(val.string().unwrap_or_default())
                }
                other => return Err(bad_usage("sort", other.unexpected())),
            }
        }

        // Case folding only applies to the plain comparator
        let fold_case = fold_case && !numeric;

        let mut lines: Vec<String> = Vec::new();
        if files.is_empty() {
            lines = crate::io::read_lines(stdin)
                .await
                .map_err(|_| AppError::new("sort", reason::READ_STREAM))?;
        } else {
            for path in &files {
                let content = read_file("sort", path, env).await?;
                lines.extend(content.lines().map(str::to_string));
            }
        }

        lines.sort_by(|a, b| compare_lines(a, b, numeric, fold_case));
        if reverse {
            lines.reverse();
        }

        let mut output = lines.join("\n");
        if !output.is_empty() {
            output.push('\n');
        }
        stdout
            .write_all(output.as_bytes())
            .await
            .map_err(|_| AppError::new("sort", reason::WRITE_STREAM))?;
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
        let result = Sort.run(&args, &mut input, &mut out, &env).await;
        (result, String::from_utf8(out).unwrap())
    }

    #[tokio::test]
    async fn sorts_stdin_lexicographically() {
        let dir = tempfile::tempdir().unwrap();
        let (result, out) = run(dir.path(), &[], "banana\napple\ncherry\n").await;
        result.unwrap();
        assert_eq!(out, "apple\nbanana\ncherry\n");
    }

    #[tokio::test]
    async fn reverse_flag() {
        let dir = tempfile::tempdir().unwrap();
        let (result, out) = run(dir.path(), &["-r"], "a\nc\nb\n").await;
        result.unwrap();
        assert_eq!(out, "c\nb\na\n");
    }

    #[tokio::test]
    async fn numeric_sorts_leading_numbers() {
        let dir = tempfile::tempdir().unwrap();
        let (result, out) = run(dir.path(), &["-n"], "10\n9\n2\n100\n").await;
        result.unwrap();
        assert_eq!(out, "2\n9\n10\n100\n");
    }

    #[tokio::test]
    async fn numeric_compares_rest_after_equal_chunk() {
        let dir = tempfile::tempdir().unwrap();
        let (result, out) = run(dir.path(), &["-n"], "2b\n2a\n10x\n").await;
        result.unwrap();
        assert_eq!(out, "2a\n2b\n10x\n");
    }

    #[tokio::test]
    async fn numeric_handles_huge_numbers() {
        let dir = tempfile::tempdir().unwrap();
        let big = "123456789012345678901234567890";
        let (result, out) = run(dir.path(), &["-n"], &format!("{}\n5\n", big)).await;
        result.unwrap();
        assert_eq!(out, format!("5\n{}\n", big));
    }

    #[tokio::test]
    async fn fold_case_flag() {
        let dir = tempfile::tempdir().unwrap();
        let (result, out) = run(dir.path(), &["-f"], "Banana\napple\nCherry\n").await;
        result.unwrap();
        assert_eq!(out, "apple\nBanana\nCherry\n");
    }

    #[tokio::test]
    async fn without_fold_case_uppercase_sorts_first() {
        let dir = tempfile::tempdir().unwrap();
        let (result, out) = run(dir.path(), &[], "banana\nApple\n").await;
        result.unwrap();
        assert_eq!(out, "Apple\nbanana\n");
    }

    #[tokio::test]
    async fn merges_multiple_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), "pear\nfig\n").unwrap();
        fs::write(dir.path().join("b.txt"), "kiwi\n").unwrap();
        let (result, out) = run(dir.path(), &["a.txt", "b.txt"], "").await;
        result.unwrap();
        assert_eq!(out, "fig\nkiwi\npear\n");
    }

    #[tokio::test]
    async fn missing_file_aborts() {
        let dir = tempfile::tempdir().unwrap();
        let (result, out) = run(dir.path(), &["ghost.txt"], "").await;
        assert_eq!(
            result.unwrap_err().to_string(),
            "sort: ghost.txt: No such file or directory"
        );
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn empty_input_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let (result, out) = run(dir.path(), &[], "").await;
        result.unwrap();
        assert!(out.is_empty());
    }
}
