//! Directory expansion: match a pattern's final segment against one
//! directory's entries.

use std::path::Path;

use crate::glob::glob_match;

/// Expand the leaf of a glob pattern against the entries of `dir`.
///
/// `leaf` is the final path segment of the pattern (it may contain escaped
/// metacharacters for quote-protected text). Matching entry names are
/// returned sorted lexicographically. Dotfiles are skipped unless the leaf
/// itself starts with a literal `.`.
///
/// Returns an empty vector when the directory cannot be read — callers
/// treat that the same as "no match" and fall back to the literal word.
pub fn expand_in_dir(dir: &Path, leaf: &str) -> Vec<String> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(_) => return Vec::new(),
    };

    let match_hidden = leaf.starts_with('.') || leaf.starts_with("\\.");
    let mut names: Vec<String> = entries
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| entry.file_name().into_string().ok())
        .filter(|name| match_hidden || !name.starts_with('.'))
        .filter(|name| glob_match(leaf, name))
        .collect();

    names.sort();
    names
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;

    fn make_dir(names: &[&str]) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        for name in names {
            File::create(dir.path().join(name)).unwrap();
        }
        dir
    }

    #[test]
    fn matches_are_sorted_by_name() {
        let dir = make_dir(&["b.txt", "a.txt", "c.txt", "d.rs"]);
        let names = expand_in_dir(dir.path(), "*.txt");
        assert_eq!(names, vec!["a.txt", "b.txt", "c.txt"]);
    }

    #[test]
    fn no_match_returns_empty() {
        let dir = make_dir(&["a.txt"]);
        assert!(expand_in_dir(dir.path(), "*.xyz").is_empty());
    }

    #[test]
    fn hidden_files_need_explicit_dot() {
        let dir = make_dir(&[".hidden", "visible"]);
        assert_eq!(expand_in_dir(dir.path(), "*"), vec!["visible"]);
        assert_eq!(expand_in_dir(dir.path(), ".*"), vec![".hidden"]);
    }

    #[test]
    fn escaped_metacharacters_are_literal() {
        let dir = make_dir(&["star*name", "starXname"]);
        let names = expand_in_dir(dir.path(), "star\\*name");
        assert_eq!(names, vec!["star*name"]);
    }

    #[test]
    fn unreadable_directory_is_no_match() {
        assert!(expand_in_dir(Path::new("/definitely/not/a/dir"), "*").is_empty());
    }
}
