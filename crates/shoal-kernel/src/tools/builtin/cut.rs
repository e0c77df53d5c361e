//! cut — Select byte or character ranges from each line.

use async_trait::async_trait;
use lexopt::prelude::*;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};

use crate::environment::Environment;
use crate::error::{reason, AppError, ShellError};
use crate::tools::builtin::{bad_usage, read_input};
use crate::tools::Application;

/// Cut: `cut (-b|-c) LIST [FILE]...`. LIST is a comma-separated set of
/// 1-based positions and `N-M` ranges; selected positions are emitted in
/// ascending order regardless of how the list was written. Exactly one of
/// `-b` (bytes) or `-c` (characters) is required.
pub struct Cut;

/// Parse a range list like `1-5,8,10-12` into sorted, deduplicated
/// 1-based positions.
fn parse_ranges(list: &str) -> Result<Vec<usize>, AppError> {
    let invalid = || AppError::new("cut", format!("{}: Invalid range", list));
    let mut positions: Vec<usize> = Vec::new();

    for part in list.split(',') {
        match part.split_once('-') {
            Some((lo, hi)) => {
                let lo: usize = lo.trim().parse().map_err(|_| invalid())?;
                let hi: usize = hi.trim().parse().map_err(|_| invalid())?;
                if lo == 0 || hi < lo {
                    return Err(invalid());
                }
                positions.extend(lo..=hi);
            }
            None => {
                let pos: usize = part.trim().parse().map_err(|_| invalid())?;
                if pos == 0 {
                    return Err(invalid());
                }
                positions.push(pos);
            }
        }
    }

    positions.sort_unstable();
    positions.dedup();
    Ok(positions)
}

/// Select positions from one line, by character or by byte.
fn cut_line(line: &str, positions: &[usize], by_bytes: bool) -> String {
    if by_bytes {
        let bytes = line.as_bytes();
        let selected: Vec<u8> = positions
            .iter()
            .filter_map(|&p| bytes.get(p - 1).copied())
            .collect();
        String::from_utf8_lossy(&selected).into_owned()
    } else {
        let chars: Vec<char> = line.chars().collect();
        positions
            .iter()
            .filter_map(|&p| chars.get(p - 1).copied())
            .collect()
    }
}

#[async_trait]
impl Application for Cut {
    fn name(&self) -> &'static str {
        "cut"
    }

    async fn run(
        &self,
        args: &[String],
        stdin: &mut (dyn AsyncRead + Send + Unpin),
        stdout: &mut (dyn AsyncWrite + Send + Unpin),
        env: &Environment,
    ) -> Result<(), ShellError> {
        let mut by_bytes = false;
        let mut by_chars = false;
        let mut positionals: Vec<String> = Vec::new();

        let mut parser = lexopt::Parser::from_args(args);
        while let Some(arg) = parser.next().map_err(|e| bad_usage("cut", e))? {
            match arg {
                Short('b') => by_bytes = true,
                Short('c') => by_chars = true,
                Value(val) => positionals
                    .push(val.string().unwrap_or_default()),
                other => return Err(bad_usage("cut", other.unexpected())),
            }
        }

        if by_bytes == by_chars {
            return Err(AppError::new("cut", "Exactly one of -b or -c is required").into());
        }
        if positionals.is_empty() {
            return Err(AppError::new("cut", reason::MISSING_ARG).into());
        }

        let positions = parse_ranges(&positionals.remove(0))?;
        let files = positionals;

        let mut output = String::new();
        let inputs: Vec<String> = if files.is_empty() {
            vec!["-".to_string()]
        } else {
            files
        };

        for path in &inputs {
            match read_input("cut", path, stdin, env).await {
                Ok(content) => {
                    for line in content.lines() {
                        output.push_str(&cut_line(line, &positions, by_bytes));
                        output.push('\n');
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
            .map_err(|_| AppError::new("cut", reason::WRITE_STREAM))?;
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
        let result = Cut.run(&args, &mut input, &mut out, &env).await;
        (result, String::from_utf8(out).unwrap())
    }

    #[tokio::test]
    async fn cuts_character_range_from_stdin() {
        let dir = tempfile::tempdir().unwrap();
        let (result, out) = run(dir.path(), &["-c", "1-5"], "1234567890\n").await;
        result.unwrap();
        assert_eq!(out, "12345\n");
    }

    #[tokio::test]
    async fn cuts_byte_range() {
        let dir = tempfile::tempdir().unwrap();
        let (result, out) = run(dir.path(), &["-b", "1-5"], "1234567890\n").await;
        result.unwrap();
        assert_eq!(out, "12345\n");
    }

    #[tokio::test]
    async fn comma_list_emits_ascending_positions() {
        let dir = tempfile::tempdir().unwrap();
        // Positions listed out of order still come out ascending
        let (result, out) = run(dir.path(), &["-c", "5,1,3"], "abcdef\n").await;
        result.unwrap();
        assert_eq!(out, "ace\n");
    }

    #[tokio::test]
    async fn overlapping_ranges_deduplicate() {
        let dir = tempfile::tempdir().unwrap();
        let (result, out) = run(dir.path(), &["-c", "1-3,2-4"], "abcdef\n").await;
        result.unwrap();
        assert_eq!(out, "abcd\n");
    }

    #[tokio::test]
    async fn positions_past_line_end_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let (result, out) = run(dir.path(), &["-c", "1-10"], "abc\n").await;
        result.unwrap();
        assert_eq!(out, "abc\n");
    }

    #[tokio::test]
    async fn cuts_from_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("f.txt"), "hello\nworld\n").unwrap();
        let (result, out) = run(dir.path(), &["-c", "1-2", "f.txt"], "").await;
        result.unwrap();
        assert_eq!(out, "he\nwo\n");
    }

    #[tokio::test]
    async fn missing_file_becomes_error_line_and_rest_continue() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("ok.txt"), "fine\n").unwrap();
        let (result, out) = run(dir.path(), &["-c", "1-4", "ghost.txt", "ok.txt"], "").await;
        result.unwrap();
        assert_eq!(out, "cut: ghost.txt: No such file or directory\nfine\n");
    }

    #[tokio::test]
    async fn requires_exactly_one_mode_flag() {
        let dir = tempfile::tempdir().unwrap();
        let (result, _) = run(dir.path(), &["1-3"], "x\n").await;
        assert!(result.is_err());
        let (result, _) = run(dir.path(), &["-b", "-c", "1-3"], "x\n").await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn rejects_bad_ranges() {
        let dir = tempfile::tempdir().unwrap();
        for list in ["0", "a-b", "5-2", ""] {
            let (result, _) = run(dir.path(), &["-c", list], "x\n").await;
            assert!(result.is_err(), "list {list:?} should fail");
        }
    }
}
