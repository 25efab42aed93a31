//! `treekit_io_fs` v1:
//! Rust-side filesystem toolkit.
//!
//! Modules:
//! - `resolve`   : relative path resolution + lexical cleaning
//! - `replicate` : best-effort directory tree replication
//! - `find`      : name-filtered file enumeration
//! - `ops`       : one-shot checks, writes, copies and size formatting
//! - `backend`   : filesystem collaborator seam
//! - `report`    : replication report model and diagnostic sinks
//! - `spec`      : enums/options/errors
//! - `conf`      : constants
//! - `util`      : shared helper functions

pub mod backend;
pub mod conf;
pub mod find;
pub mod ops;
pub mod replicate;
pub mod report;
pub mod resolve;
pub mod spec;
mod util;

pub use backend::{FsBackend, StdFsBackend};
pub use find::{find_files, find_files_immediate, find_files_recursive};
pub use ops::{
    abs_path, allow_read, allow_write, copy_file, create_folder, exists, file_mod_time,
    file_size, format_size_human, is_dir, is_file, rewrite_file, write_append, write_at,
};
pub use replicate::{replicate_tree, replicate_tree_with};
pub use report::{DiagnosticSink, NullSink, ReportReplicate, ReportReplicateBuilder, TracingSink};
pub use resolve::{clean_path_lexical, resolve_relative_path, resolve_relative_path_with};
pub use spec::{
    EnumDiagnosticSeverity, EnumEntryKind, EnumFindPatternMode, FsKitError, SpecDiagnostic,
    SpecEntryInfo, SpecEntryStat, SpecFindOptions, SpecReplicateError, SpecReplicateOptions,
};
