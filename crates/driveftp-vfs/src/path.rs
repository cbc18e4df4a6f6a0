//! Virtual path string helpers.
//!
//! Comparison canonicalizes by stripping a single trailing separator;
//! splitting drops trailing empty components but keeps interior ones, so
//! `a//b` still walks three lookups while `a/` walks one.

/// The virtual path separator. Also the root node's reserved name.
pub const SEPARATOR: &str = "/";

/// Special component naming the current directory.
pub const SELF: &str = ".";

/// Special component naming the parent directory.
pub const PARENT: &str = "..";

fn canonical(path: &str) -> &str {
    match path.strip_suffix(SEPARATOR) {
        Some(stripped) if !stripped.is_empty() => stripped,
        _ => path,
    }
}

/// Separator-insensitive equality: `/a/b` equals `/a/b/`, but `/` is
/// only equal to itself.
pub fn equals(a: &str, b: &str) -> bool {
    canonical(a) == canonical(b)
}

/// Join a directory path and a child name with exactly one separator.
pub fn join(dir: &str, name: &str) -> String {
    if dir.ends_with(SEPARATOR) {
        format!("{dir}{name}")
    } else {
        format!("{dir}{SEPARATOR}{name}")
    }
}

/// Split a path into lookup components, dropping trailing empties only.
/// A path without any separator is a single component, even when empty.
pub fn components(path: &str) -> Vec<&str> {
    if !path.contains(SEPARATOR) {
        return vec![path];
    }
    let mut parts: Vec<&str> = path.split(SEPARATOR).collect();
    while parts.last() == Some(&"") {
        parts.pop();
    }
    parts
}
