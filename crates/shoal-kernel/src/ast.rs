//! Type definitions for tokens and the command tree.

use std::fmt;

/// Structural operators recognized only outside quotes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    /// `<` — redirect input from a file.
    RedirIn,
    /// `>` — redirect output to a file (truncating).
    RedirOut,
    /// `|` — connect two pipeline stages.
    Pipe,
    /// `;` — separate sequence steps.
    Semi,
}

impl Operator {
    pub fn is_redirection(self) -> bool {
        matches!(self, Operator::RedirIn | Operator::RedirOut)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Operator::RedirIn => "<",
            Operator::RedirOut => ">",
            Operator::Pipe => "|",
            Operator::Semi => ";",
        };
        write!(f, "{s}")
    }
}

/// One piece of a double-quoted segment: literal text or an embedded
/// command substitution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Piece {
    Text(String),
    Substitution(String),
}

/// A contiguous run of source text with one quoting classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Unquoted text: glob-eligible, whitespace already consumed.
    Bare(String),
    /// `'...'` content: fully inert.
    SingleQuoted(String),
    /// `"..."` content: substitutions still evaluate, globs do not.
    DoubleQuoted(Vec<Piece>),
    /// An unquoted `` `...` `` or `$(...)` span; the inner command line.
    Substitution(String),
}

/// A word: adjacent segments with no intervening whitespace. Resolves to
/// one argument, or several when glob expansion multiplies it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Word {
    pub segments: Vec<Segment>,
}

impl Word {
    pub fn new(segments: Vec<Segment>) -> Self {
        Self { segments }
    }
}

/// A lexical unit: a word or a structural operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Word(Word),
    Op(Operator),
}

/// One built-in invocation: its word and redirection tokens, unresolved.
/// Arguments and streams are resolved when the call is about to run, so a
/// command substitution inside one sequence step cannot observe state from
/// before an earlier step executed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub tokens: Vec<Token>,
}

/// The command tree for one input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// A single invocation.
    Call(Call),
    /// Stages connected stdout-to-stdin; always at least two.
    Pipe(Vec<Call>),
    /// Steps run left to right, each isolated from the others' failures.
    Sequence(Vec<Command>),
}
