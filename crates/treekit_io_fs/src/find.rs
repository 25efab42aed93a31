//! Name-filtered file enumeration.

use std::path::{Path, PathBuf};

use globset::{GlobBuilder, GlobMatcher};
use regex::Regex;
use tracing::debug;
use walkdir::WalkDir;

use crate::backend::{FsBackend, StdFsBackend};
use crate::spec::{EnumEntryKind, EnumFindPatternMode, FsKitError, SpecFindOptions};

////////////////////////////////////////////////////////////////////////////////
// #region PatternMatching

#[derive(Debug, Clone)]
enum TypeFindMatcher {
    /// Uppercased suffix.
    Suffix(String),
    Glob(GlobMatcher),
    Regex(Regex),
}

impl TypeFindMatcher {
    fn from_options(spec_find_options: &SpecFindOptions) -> Result<Self, FsKitError> {
        let c_pattern = spec_find_options.pattern.as_str();
        match spec_find_options.rule_pattern {
            EnumFindPatternMode::Suffix => Ok(Self::Suffix(c_pattern.to_uppercase())),
            EnumFindPatternMode::Glob => {
                let matcher = GlobBuilder::new(c_pattern)
                    .case_insensitive(true)
                    .literal_separator(true)
                    .build()
                    .map_err(|e| FsKitError::InvalidPattern(format!("{c_pattern}: {e}")))?
                    .compile_matcher();
                Ok(Self::Glob(matcher))
            }
            EnumFindPatternMode::Regex => {
                let regex = Regex::new(c_pattern)
                    .map_err(|e| FsKitError::InvalidPattern(format!("{c_pattern}: {e}")))?;
                Ok(Self::Regex(regex))
            }
        }
    }

    fn is_match(&self, name_file: &str) -> bool {
        match self {
            Self::Suffix(c_suffix_upper) => name_file.to_uppercase().ends_with(c_suffix_upper),
            Self::Glob(matcher) => matcher.is_match(name_file),
            Self::Regex(regex) => regex.is_match(name_file),
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region PublicApi

/// Every non-directory entry under `dir_root` (any depth) whose name ends
/// with `suffix`, compared case-insensitively. An empty suffix matches all.
///
/// Entries are returned in walk order: depth-first, siblings sorted by name.
///
/// # Errors
/// - [`FsKitError::NotADirectory`] when `dir_root` is not an existing directory.
/// - Any IO failure met during the walk.
pub fn find_files_recursive<P: AsRef<Path>>(
    dir_root: P,
    suffix: &str,
) -> Result<Vec<PathBuf>, FsKitError> {
    find_files(
        dir_root,
        &SpecFindOptions {
            pattern: suffix.to_string(),
            rule_pattern: EnumFindPatternMode::Suffix,
            if_recursive: true,
        },
    )
}

/// Like [`find_files_recursive`] but restricted to direct children of `dir_root`.
pub fn find_files_immediate<P: AsRef<Path>>(
    dir_root: P,
    suffix: &str,
) -> Result<Vec<PathBuf>, FsKitError> {
    find_files(
        dir_root,
        &SpecFindOptions {
            pattern: suffix.to_string(),
            rule_pattern: EnumFindPatternMode::Suffix,
            if_recursive: false,
        },
    )
}

/// Enumerate files under `dir_root` whose name matches `spec_find_options`.
pub fn find_files<P: AsRef<Path>>(
    dir_root: P,
    spec_find_options: &SpecFindOptions,
) -> Result<Vec<PathBuf>, FsKitError> {
    let path_dir_root = dir_root.as_ref();
    if !path_dir_root.is_dir() {
        return Err(FsKitError::NotADirectory(path_dir_root.to_path_buf()));
    }
    let matcher = TypeFindMatcher::from_options(spec_find_options)?;

    let l_files = if spec_find_options.if_recursive {
        walk_recursive(path_dir_root, &matcher)?
    } else {
        list_immediate(&StdFsBackend, path_dir_root, &matcher)?
    };

    debug!(
        root = %path_dir_root.display(),
        pattern = %spec_find_options.pattern,
        n_matched = l_files.len(),
        "files found"
    );
    Ok(l_files)
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Traversal

fn walk_recursive(
    path_dir_root: &Path,
    matcher: &TypeFindMatcher,
) -> Result<Vec<PathBuf>, FsKitError> {
    let mut l_files = Vec::new();
    let iter_walk = WalkDir::new(path_dir_root)
        .follow_links(false)
        .sort_by_file_name();

    for entry_res in iter_walk {
        let entry = entry_res.map_err(|e| map_walk_error(path_dir_root, e))?;
        if entry.file_type().is_dir() {
            continue;
        }
        if matcher.is_match(&entry.file_name().to_string_lossy()) {
            l_files.push(entry.into_path());
        }
    }
    Ok(l_files)
}

fn list_immediate<B: FsBackend + ?Sized>(
    backend: &B,
    path_dir_root: &Path,
    matcher: &TypeFindMatcher,
) -> Result<Vec<PathBuf>, FsKitError> {
    let l_files = backend
        .list_dir(path_dir_root)?
        .into_iter()
        .filter(|e| {
            !matches!(e.kind, EnumEntryKind::Directory | EnumEntryKind::Missing)
                && matcher.is_match(&e.name.to_string_lossy())
        })
        .map(|e| path_dir_root.join(e.name))
        .collect();
    Ok(l_files)
}

fn map_walk_error(path_dir_root: &Path, err: walkdir::Error) -> FsKitError {
    let path_failed = err
        .path()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| path_dir_root.to_path_buf());
    let c_message = err.to_string();
    match err.into_io_error() {
        Some(e) => FsKitError::from_io(path_failed, e),
        None => FsKitError::Unknown(c_message),
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
