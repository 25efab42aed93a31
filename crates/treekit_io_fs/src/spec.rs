//! Filesystem toolkit models, options and top-level error type.

use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::conf::N_MODE_DIR_DEFAULT;

////////////////////////////////////////////////////////////////////////////////
// #region EnumsInit

/// Classification of one filesystem entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumEntryKind {
    /// Regular file.
    File,
    /// Directory.
    Directory,
    /// Symbolic link (not followed).
    Symlink,
    /// Fifo, socket, device or any other special entry.
    Other,
    /// Nothing exists at the queried path.
    Missing,
}

/// File name matching mode for [`crate::find::find_files`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumFindPatternMode {
    /// Case-insensitive trailing match; an empty pattern matches every file.
    Suffix,
    /// Case-insensitive shell-like wildcards (`*`, `?`, character classes).
    Glob,
    /// Regular expression searched in the file name.
    Regex,
}

/// Severity attached to a replication diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumDiagnosticSeverity {
    /// Entry skipped on purpose (special file, symlinked directory).
    Warning,
    /// Entry or subtree could not be processed.
    Error,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region EntryModels

/// Result of one metadata query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecEntryStat {
    /// Queried path, as given.
    pub path: PathBuf,
    /// Entry classification.
    pub kind: EnumEntryKind,
    /// Size in bytes (`0` when missing).
    pub size: u64,
    /// Last modification time in unix seconds (`0` when missing).
    pub mod_time: i64,
    /// Permission bits (`0` when missing).
    pub mode: u32,
}

impl SpecEntryStat {
    /// Stat record for a path with nothing behind it.
    pub fn missing(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            kind: EnumEntryKind::Missing,
            size: 0,
            mod_time: 0,
            mode: 0,
        }
    }

    pub fn exists(&self) -> bool {
        self.kind != EnumEntryKind::Missing
    }

    pub fn is_dir(&self) -> bool {
        self.kind == EnumEntryKind::Directory
    }
}

/// One directory listing item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecEntryInfo {
    /// Entry basename, byte-exact.
    pub name: OsString,
    /// Classification without following symlinks.
    pub kind: EnumEntryKind,
    /// Permission bits of the entry itself.
    pub mode: u32,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Options

/// Input options for `replicate_tree`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecReplicateOptions {
    /// Descend into subdirectories.
    pub if_include_subdirs: bool,
    /// Permission bits for directories created under the target.
    pub mode_dir: u32,
}

impl Default for SpecReplicateOptions {
    fn default() -> Self {
        Self {
            if_include_subdirs: true,
            mode_dir: N_MODE_DIR_DEFAULT,
        }
    }
}

/// Input options for `find_files`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecFindOptions {
    /// Suffix, glob or regex, depending on `rule_pattern`.
    pub pattern: String,
    /// Pattern interpretation mode.
    pub rule_pattern: EnumFindPatternMode,
    /// Walk the whole subtree instead of direct children only.
    pub if_recursive: bool,
}

impl Default for SpecFindOptions {
    fn default() -> Self {
        Self {
            pattern: String::new(),
            rule_pattern: EnumFindPatternMode::Suffix,
            if_recursive: true,
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region RecordsAndErrors

/// One replication failure item with path + error text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecReplicateError {
    /// Failed source or destination path.
    pub path: PathBuf,
    /// User-facing error text.
    pub exception: String,
}

/// One event handed to a [`crate::report::DiagnosticSink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecDiagnostic {
    pub severity: EnumDiagnosticSeverity,
    pub path: PathBuf,
    pub message: String,
}

/// Errors returned by the strict operations (resolve, find, backend calls).
#[derive(Debug, Error)]
pub enum FsKitError {
    /// Reference entry does not exist.
    #[error("Path not found: {}", .0.display())]
    NotFound(PathBuf),
    /// Root expected to be a directory is not.
    #[error("Not a directory: {}", .0.display())]
    NotADirectory(PathBuf),
    #[error("Permission denied: {}", path.display())]
    PermissionDenied {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("IO failure on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// Invalid glob or regex given to `find_files`.
    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),
    #[error("Unknown failure: {0}")]
    Unknown(String),
}

impl FsKitError {
    /// Classify an IO error raised while operating on `path`.
    pub fn from_io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            io::ErrorKind::NotFound => Self::NotFound(path),
            io::ErrorKind::NotADirectory => Self::NotADirectory(path),
            io::ErrorKind::PermissionDenied => Self::PermissionDenied { path, source },
            _ => Self::Io { path, source },
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
