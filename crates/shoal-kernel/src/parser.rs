//! Parser for shell input lines.
//!
//! Transforms the token stream into the Call / Pipe / Sequence command
//! tree. The grammar is flat:
//!
//! ```text
//! line := step (';' step)*
//! step := call ('|' call)*
//! call := word+           (with '<' file / '>' file anywhere in the call)
//! ```
//!
//! The builder also performs every structural validity check that does not
//! depend on argument resolution: a redirection operator must be followed
//! by a word, operators may not be adjacent, and every call needs at least
//! one command word. These are reported before anything on the line runs.
//! Glob-dependent ambiguity can only be seen after expansion and is checked
//! by `redirect` instead.

use crate::ast::{Call, Command, Operator, Token};
use crate::error::SyntaxError;
use crate::lexer::tokenize;

/// Parse one input line into a command tree. `Ok(None)` means the line is
/// blank (nothing but whitespace or empty steps).
pub fn parse(line: &str) -> Result<Option<Command>, SyntaxError> {
    build(tokenize(line)?)
}

/// Build the command tree from tokens.
pub fn build(tokens: Vec<Token>) -> Result<Option<Command>, SyntaxError> {
    let mut steps: Vec<Command> = Vec::new();

    for step_tokens in split_on(tokens, Operator::Semi) {
        // Consecutive or dangling ';' produce empty steps; skip them
        if step_tokens.is_empty() {
            continue;
        }
        steps.push(build_step(step_tokens)?);
    }

    Ok(match steps.len() {
        0 => None,
        1 => Some(steps.into_iter().next().expect("one step")),
        _ => Some(Command::Sequence(steps)),
    })
}

/// Build one `;`-separated step: a bare call or a pipeline.
fn build_step(tokens: Vec<Token>) -> Result<Command, SyntaxError> {
    let mut stages: Vec<Call> = Vec::new();

    for stage_tokens in split_on(tokens, Operator::Pipe) {
        // `a | | b`, `| a`, `a |` all leave an empty stage behind
        if stage_tokens.is_empty() {
            return Err(SyntaxError::MisplacedOperator("|".into()));
        }
        stages.push(build_call(stage_tokens)?);
    }

    Ok(if stages.len() == 1 {
        Command::Call(stages.into_iter().next().expect("one stage"))
    } else {
        Command::Pipe(stages)
    })
}

/// Validate one call's token list structurally.
fn build_call(tokens: Vec<Token>) -> Result<Call, SyntaxError> {
    let mut has_command_word = false;
    let mut idx = 0;

    while idx < tokens.len() {
        match &tokens[idx] {
            Token::Op(op) => {
                debug_assert!(op.is_redirection(), "pipe/semi removed by splitting");
                // The operand must be the very next token, and must be a word
                match tokens.get(idx + 1) {
                    Some(Token::Word(_)) => idx += 2,
                    _ => return Err(SyntaxError::MisplacedOperator(op.to_string())),
                }
            }
            Token::Word(_) => {
                has_command_word = true;
                idx += 1;
            }
        }
    }

    if !has_command_word {
        return Err(SyntaxError::MissingCommand);
    }

    Ok(Call { tokens })
}

/// Split a token list on an operator, dropping the separators.
fn split_on(tokens: Vec<Token>, sep: Operator) -> Vec<Vec<Token>> {
    let mut groups: Vec<Vec<Token>> = vec![Vec::new()];
    for token in tokens {
        if token == Token::Op(sep) {
            groups.push(Vec::new());
        } else {
            groups.last_mut().expect("at least one group").push(token);
        }
    }
    groups
}
