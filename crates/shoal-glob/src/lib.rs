//! shoal-glob: Shell-style glob matching and directory expansion.
//!
//! Provides:
//! - **glob_match**: wildcard matching (`*`, `?`, `[...]`) with `\`-escapes
//! - **contains_glob** / **escape**: helpers for callers that assemble
//!   patterns from mixed quoted/unquoted text
//! - **expand_in_dir**: match a pattern's final path segment against one
//!   directory's entries, sorted by name
//!
//! The matcher is deliberately small and dependency-free. Escaped
//! metacharacters (`\*`, `\?`, `\[`) match only their literal selves, which
//! lets a shell mark quoted text as inert before handing the pattern over.

mod dir;
mod glob;

pub use dir::expand_in_dir;
pub use glob::{contains_glob, escape, glob_match};
