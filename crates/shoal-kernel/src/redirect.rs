//! Redirection extraction: `<`/`>` operator–operand pairs become opened
//! file streams, leaving a clean argument list behind.
//!
//! Single left-to-right scan. The last redirection of each direction wins;
//! replacing a stream drops (closes) the one opened earlier. An operand
//! whose glob expansion matched more than one file is an ambiguous
//! redirect, reported before the owning call runs. Structural problems
//! (operator with no operand) were already rejected by the parser.

use tokio::fs::File;

use crate::ast::Operator;
use crate::environment::Environment;
use crate::error::{io_reason, ShellError, SyntaxError};
use crate::expand::Resolved;
use crate::io::{InputStream, OutputStream};

/// One call's arguments and redirection streams after extraction.
///
/// `None` streams mean the caller's defaults apply (the enclosing pipe
/// stage's bridge or the shell's own stdio).
pub struct RedirectedCall {
    pub args: Vec<String>,
    pub input: Option<InputStream>,
    pub output: Option<OutputStream>,
}

impl std::fmt::Debug for RedirectedCall {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedirectedCall")
            .field("args", &self.args)
            .field("input", &self.input.as_ref().map(|_| "<input>"))
            .field("output", &self.output.as_ref().map(|_| "<output>"))
            .finish()
    }
}

/// Extract redirections from a resolved item list.
pub async fn extract(
    items: Vec<Resolved>,
    env: &Environment,
) -> Result<RedirectedCall, ShellError> {
    let mut args: Vec<String> = Vec::new();
    let mut input: Option<InputStream> = None;
    let mut output: Option<OutputStream> = None;

    let mut iter = items.into_iter();
    while let Some(item) = iter.next() {
        match item {
            Resolved::Word(word) => args.extend(word.args),

            Resolved::Op(op) => {
                let operand = match iter.next() {
                    Some(Resolved::Word(word)) => word,
                    // The parser guarantees an operand word follows
                    _ => return Err(SyntaxError::MisplacedOperator(op.to_string()).into()),
                };

                if operand.args.len() != 1 {
                    return Err(SyntaxError::AmbiguousRedirect(operand.literal).into());
                }
                let path = operand.args.into_iter().next().expect("one operand");
                let resolved = env.resolve(&path);

                match op {
                    Operator::RedirIn => {
                        let file = File::open(&resolved).await.map_err(|e| {
                            ShellError::Redirect {
                                path: path.clone(),
                                reason: io_reason(&e),
                            }
                        })?;
                        // Last redirection wins; the replaced stream closes here
                        input = Some(Box::new(file));
                    }
                    Operator::RedirOut => {
                        let file = File::create(&resolved).await.map_err(|e| {
                            ShellError::Redirect {
                                path: path.clone(),
                                reason: io_reason(&e),
                            }
                        })?;
                        output = Some(Box::new(file));
                    }
                    Operator::Pipe | Operator::Semi => {
                        unreachable!("pipe/semi removed during parsing")
                    }
                }
            }
        }
    }

    Ok(RedirectedCall {
        args,
        input,
        output,
    })
}
