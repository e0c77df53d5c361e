//! Argument resolution: words become concrete argument strings.
//!
//! Per word, in order: quote interpretation (already done by the lexer),
//! command substitution, glob expansion, adjacency joining. The joined text
//! carries a glob-eligibility mask: text that came from quotes (or from a
//! substitution inside double quotes) has its metacharacters `\`-escaped,
//! so the matcher treats it literally while unquoted wildcards stay live.
//!
//! Glob expansion matches the pattern's final path segment against the
//! directory named by its literal prefix (the current directory if none).
//! Matches become separate arguments sorted by name; zero matches means
//! the word passes through literally — never an error here.
//!
//! Command substitution recursively evaluates the inner line through the
//! shell with a capture sink, trims trailing newlines, flattens interior
//! newlines to spaces, and splices the text in place. Recursion depth is
//! bounded so self-referential substitution fails instead of spinning.

use futures::future::BoxFuture;

use crate::ast::{Call, Operator, Piece, Segment, Token, Word};
use crate::error::{ShellError, SyntaxError};
use crate::shell::Shell;

/// Nested command substitutions beyond this bound are a syntax error.
pub const MAX_SUBSTITUTION_DEPTH: usize = 32;

/// One word after resolution: its argument expansion (length > 1 only when
/// a glob matched several entries) and the literal text for error messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedWord {
    pub args: Vec<String>,
    pub literal: String,
}

/// A resolved item: an expanded word or a redirection operator that
/// survives into extraction.
#[derive(Debug)]
pub enum Resolved {
    Word(ResolvedWord),
    Op(Operator),
}

/// Resolve every token of one call.
///
/// Boxed because substitution re-enters the shell's evaluation entry point:
/// resolve → capture → evaluate → resolve.
pub fn resolve_call<'a>(
    shell: &'a Shell,
    call: &'a Call,
    depth: usize,
) -> BoxFuture<'a, Result<Vec<Resolved>, ShellError>> {
    Box::pin(async move {
        let mut items = Vec::with_capacity(call.tokens.len());
        for token in &call.tokens {
            match token {
                Token::Op(op) => items.push(Resolved::Op(*op)),
                Token::Word(word) => {
                    items.push(Resolved::Word(resolve_word(shell, word, depth).await?))
                }
            }
        }
        Ok(items)
    })
}

/// Resolve one word: evaluate its substitutions, then glob-expand the
/// joined text if any unquoted metacharacter survives.
async fn resolve_word(
    shell: &Shell,
    word: &Word,
    depth: usize,
) -> Result<ResolvedWord, ShellError> {
    let mut pattern = String::new();

    for segment in &word.segments {
        match segment {
            Segment::Bare(s) => push_bare(&mut pattern, s),
            Segment::SingleQuoted(s) => pattern.push_str(&shoal_glob::escape(s)),
            Segment::DoubleQuoted(pieces) => {
                for piece in pieces {
                    match piece {
                        Piece::Text(s) => pattern.push_str(&shoal_glob::escape(s)),
                        Piece::Substitution(inner) => {
                            // Quoted context: the substituted text is not
                            // glob-eligible
                            let text = substitute(shell, inner, depth).await?;
                            pattern.push_str(&shoal_glob::escape(&text));
                        }
                    }
                }
            }
            Segment::Substitution(inner) => {
                // Unquoted: substituted text stays glob-eligible
                let text = substitute(shell, inner, depth).await?;
                push_bare(&mut pattern, &text);
            }
        }
    }

    let literal = unescape(&pattern);

    let args = if shoal_glob::contains_glob(&pattern) {
        let matches = expand_pattern(shell, &pattern);
        if matches.is_empty() {
            // Classic fallback: an unmatched pattern is itself the argument
            vec![literal.clone()]
        } else {
            matches
        }
    } else {
        vec![literal.clone()]
    };

    Ok(ResolvedWord { args, literal })
}

/// Append unquoted text to the pattern. Wildcards stay live; a literal
/// backslash is doubled so the matcher cannot mistake it for an escape.
fn push_bare(pattern: &mut String, text: &str) {
    for c in text.chars() {
        if c == '\\' {
            pattern.push('\\');
        }
        pattern.push(c);
    }
}

/// Undo one level of `\`-escaping, recovering the literal text.
fn unescape(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len());
    let mut chars = pattern.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next) = chars.next() {
                out.push(next);
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// Evaluate a command substitution span and normalize its output: trailing
/// newlines trimmed, interior newlines flattened to single spaces.
async fn substitute(shell: &Shell, inner: &str, depth: usize) -> Result<String, ShellError> {
    if depth >= MAX_SUBSTITUTION_DEPTH {
        return Err(SyntaxError::SubstitutionTooDeep.into());
    }
    let captured = shell.capture(inner, depth + 1).await?;
    let trimmed = captured.trim_end_matches(['\n', '\r']);
    Ok(trimmed.replace("\r\n", " ").replace(['\n', '\r'], " "))
}

/// Expand a glob pattern against the directory named by its prefix.
///
/// Matches keep the literal prefix: `src/*.txt` yields `src/a.txt`, not
/// `a.txt`. A prefix that does not name a readable directory (including a
/// prefix that itself contains wildcards) yields no matches, which the
/// caller turns into the literal-word fallback.
fn expand_pattern(shell: &Shell, pattern: &str) -> Vec<String> {
    let (prefix, leaf) = match pattern.rfind('/') {
        Some(idx) => (&pattern[..=idx], &pattern[idx + 1..]),
        None => ("", pattern),
    };

    let prefix_literal = unescape(prefix);
    let dir = if prefix_literal.is_empty() {
        shell.env().current_dir()
    } else {
        shell.env().resolve(&prefix_literal)
    };

    shoal_glob::expand_in_dir(&dir, leaf)
        .into_iter()
        .map(|name| format!("{prefix_literal}{name}"))
        .collect()
}
