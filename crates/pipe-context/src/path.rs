//! Lexical path helpers: joining pieces, normalizing, relative paths, and
//! directory creation.

use std::path::{MAIN_SEPARATOR_STR, is_separator};

/// Join path pieces with the platform separator and normalize the result.
pub fn join_pieces<S: AsRef<str>>(pieces: &[S]) -> String {
    let joined = pieces
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(MAIN_SEPARATOR_STR);
    normalize(&joined)
}

/// Normalize a path without touching the filesystem.
///
/// Collapses repeated separators and `.` segments, folds `name/..` pairs, and
/// drops `..` directly under the root. An empty path normalizes to `.`.
pub fn normalize(path: &str) -> String {
    let (root, parts) = components(path);
    let body = parts.join(MAIN_SEPARATOR_STR);
    match root {
        Root::Drive(drive) => format!("{drive}{MAIN_SEPARATOR_STR}{body}"),
        Root::Separator => format!("{MAIN_SEPARATOR_STR}{body}"),
        Root::None if body.is_empty() => ".".to_string(),
        Root::None => body,
    }
}

/// Express `path` relative to `start`. Both are normalized first.
///
/// When the two do not share a root (one absolute, one relative, or
/// different drives) `path` is returned normalized but otherwise unchanged.
pub fn relative_to(path: &str, start: &str) -> String {
    let (path_root, path_parts) = components(path);
    let (start_root, start_parts) = components(start);
    if path_root != start_root {
        return normalize(path);
    }

    let common = path_parts
        .iter()
        .zip(&start_parts)
        .take_while(|(a, b)| a == b)
        .count();

    let mut rel: Vec<&str> = vec![".."; start_parts.len() - common];
    rel.extend_from_slice(&path_parts[common..]);
    if rel.is_empty() {
        ".".to_string()
    } else {
        rel.join(MAIN_SEPARATOR_STR)
    }
}

/// Create `path` and any missing parents. Succeeds if it already exists.
pub fn create_path(path: &str) -> std::io::Result<()> {
    std::fs::create_dir_all(path)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Root<'a> {
    None,
    Separator,
    Drive(&'a str),
}

fn components(path: &str) -> (Root<'_>, Vec<&str>) {
    let mut root = if path.starts_with(is_separator) {
        Root::Separator
    } else {
        Root::None
    };
    let mut parts: Vec<&str> = Vec::new();
    for (i, comp) in path.split(is_separator).enumerate() {
        match comp {
            "" | "." => {}
            ".." => match parts.last() {
                Some(&last) if last != ".." => {
                    parts.pop();
                }
                _ if root != Root::None => {}
                _ => parts.push(".."),
            },
            _ if i == 0 && is_drive(comp) => root = Root::Drive(comp),
            _ => parts.push(comp),
        }
    }
    (root, parts)
}

fn is_drive(comp: &str) -> bool {
    cfg!(windows) && comp.len() == 2 && comp.ends_with(':')
}
