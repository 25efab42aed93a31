//! Relative path resolution against a reference file or directory.

use std::path::{Path, PathBuf};

use crate::backend::{FsBackend, StdFsBackend};
use crate::conf::C_SEPARATOR_CANONICAL;
use crate::spec::{EnumEntryKind, FsKitError};
use crate::util::{from_slash, to_slash};

/// Resolve `relative_expr` against the directory of `reference`.
///
/// `reference` must exist. When it is a directory, the expression is joined
/// onto it; otherwise onto its parent. The joined path is then cleaned
/// lexically (see [`clean_path_lexical`]) and returned with native separators.
///
/// The result itself is never checked for existence.
///
/// # Errors
/// - [`FsKitError::NotFound`] when `reference` does not exist, including when
///   one of its parent components is a regular file.
/// - [`FsKitError::PermissionDenied`] / [`FsKitError::Io`] when it cannot be
///   inspected.
///
/// # Examples
/// ```ignore
/// // "/x/y/readme.txt" is a file
/// let path = resolve_relative_path("/x/y/readme.txt", "../z/README.md")?;
/// assert_eq!(path, PathBuf::from("/x/z/README.md"));
/// ```
pub fn resolve_relative_path(
    reference: &str,
    relative_expr: &str,
) -> Result<PathBuf, FsKitError> {
    resolve_relative_path_with(&StdFsBackend, reference, relative_expr)
}

/// [`resolve_relative_path`] with an explicit backend for the single
/// classification query.
pub fn resolve_relative_path_with<B>(
    backend: &B,
    reference: &str,
    relative_expr: &str,
) -> Result<PathBuf, FsKitError>
where
    B: FsBackend + ?Sized,
{
    let c_reference = to_slash(reference);
    let c_relative = to_slash(relative_expr);

    let stat_reference = backend.stat(Path::new(reference))?;
    let c_dir_base = match stat_reference.kind {
        EnumEntryKind::Missing => return Err(FsKitError::NotFound(PathBuf::from(reference))),
        EnumEntryKind::Directory => derive_base_dir_of_directory(&c_reference),
        _ => derive_base_dir_of_file(&c_reference),
    };

    let c_cleaned = clean_path_lexical(&format!("{c_dir_base}{c_relative}"));
    Ok(PathBuf::from(from_slash(&c_cleaned)))
}

fn derive_base_dir_of_directory(c_reference: &str) -> String {
    if c_reference.ends_with(C_SEPARATOR_CANONICAL) {
        return c_reference.to_string();
    }
    format!("{c_reference}{C_SEPARATOR_CANONICAL}")
}

/// Everything up to and including the last `/`; empty when there is none.
fn derive_base_dir_of_file(c_reference: &str) -> String {
    match c_reference.rfind(C_SEPARATOR_CANONICAL) {
        Some(n_idx) => c_reference[..=n_idx].to_string(),
        None => String::new(),
    }
}

/// Split a `X:` drive prefix off `path` on Windows.
fn split_volume_prefix(path: &str) -> (&str, &str) {
    let raw = path.as_bytes();
    if cfg!(windows) && raw.len() >= 2 && raw[1] == b':' && raw[0].is_ascii_alphabetic() {
        return path.split_at(2);
    }
    ("", path)
}

/// Normalize a `/`-separated path by string manipulation only.
///
/// - repeated `/` collapse into one;
/// - `.` segments are dropped;
/// - `..` removes the preceding segment; at the root it is dropped, at the
///   start of a relative path it is kept;
/// - a trailing `/` is stripped unless the whole path is the root;
/// - an empty result becomes `.`.
///
/// On Windows a leading drive prefix (`D:`) is kept in front of the root.
pub fn clean_path_lexical(path: &str) -> String {
    let (c_volume, c_rest) = split_volume_prefix(path);
    let b_rooted = c_rest.starts_with(C_SEPARATOR_CANONICAL);

    let mut l_parts: Vec<&str> = Vec::new();
    for part in c_rest.split(C_SEPARATOR_CANONICAL) {
        match part {
            "" | "." => {}
            ".." => match l_parts.last() {
                Some(&last) if last != ".." => {
                    l_parts.pop();
                }
                _ if b_rooted => {}
                _ => l_parts.push(".."),
            },
            _ => l_parts.push(part),
        }
    }

    let c_joined = l_parts.join("/");
    let c_cleaned = if b_rooted {
        format!("{C_SEPARATOR_CANONICAL}{c_joined}")
    } else if c_joined.is_empty() {
        ".".to_string()
    } else {
        c_joined
    };
    format!("{c_volume}{c_cleaned}")
}
