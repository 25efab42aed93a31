//! Filesystem collaborator seam used by the resolver and the replicator.
//!
//! [`StdFsBackend`] talks to the host filesystem through `std::fs`. Tests and
//! embedders can supply their own [`FsBackend`] to inject failures or to run
//! against something other than the local disk.

use std::fs;
use std::io;
use std::path::Path;

use filetime::FileTime;

use crate::spec::{EnumEntryKind, FsKitError, SpecEntryInfo, SpecEntryStat};
use crate::util::{
    apply_mode, classify_file_type, create_dir_all_with_mode, mode_from_metadata,
};

/// Minimal set of filesystem calls the core operations depend on.
pub trait FsBackend {
    /// Metadata of `path`, following symlinks.
    ///
    /// A path with nothing behind it (including a broken symlink or a parent
    /// component that is not a directory) yields a
    /// [`EnumEntryKind::Missing`] record, not an error.
    fn stat(&self, path: &Path) -> Result<SpecEntryStat, FsKitError>;

    /// Immediate entries of `path`, sorted by name.
    ///
    /// Entries are classified without following symlinks. An entry that can
    /// no longer be inspected after the listing is returned as `Missing`.
    fn list_dir(&self, path: &Path) -> Result<Vec<SpecEntryInfo>, FsKitError>;

    fn read_file(&self, path: &Path) -> Result<Vec<u8>, FsKitError>;

    /// Create or truncate `path`, write `content`, then set `mode` verbatim.
    fn write_file(&self, path: &Path, content: &[u8], mode: u32) -> Result<(), FsKitError>;

    /// Create `path` and all missing parents. Idempotent.
    fn make_dir_all(&self, path: &Path, mode: u32) -> Result<(), FsKitError>;
}

/// [`FsBackend`] over the host filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdFsBackend;

fn derive_entry_stat(
    path: &Path,
    res_meta: io::Result<fs::Metadata>,
) -> Result<SpecEntryStat, FsKitError> {
    let meta = match res_meta {
        Ok(v) => v,
        Err(e) if matches!(e.kind(), io::ErrorKind::NotFound | io::ErrorKind::NotADirectory) => {
            return Ok(SpecEntryStat::missing(path));
        }
        Err(e) => return Err(FsKitError::from_io(path, e)),
    };
    Ok(SpecEntryStat {
        path: path.to_path_buf(),
        kind: classify_file_type(meta.file_type()),
        size: meta.len(),
        mod_time: FileTime::from_last_modification_time(&meta).unix_seconds(),
        mode: mode_from_metadata(&meta),
    })
}

fn derive_entry_info(entry: &fs::DirEntry) -> SpecEntryInfo {
    let name = entry.file_name();
    match (entry.file_type(), entry.metadata()) {
        (Ok(cfg_file_type), Ok(meta)) => SpecEntryInfo {
            name,
            kind: classify_file_type(cfg_file_type),
            mode: mode_from_metadata(&meta),
        },
        _ => SpecEntryInfo {
            name,
            kind: EnumEntryKind::Missing,
            mode: 0,
        },
    }
}

impl FsBackend for StdFsBackend {
    fn stat(&self, path: &Path) -> Result<SpecEntryStat, FsKitError> {
        derive_entry_stat(path, fs::metadata(path))
    }

    fn list_dir(&self, path: &Path) -> Result<Vec<SpecEntryInfo>, FsKitError> {
        let iter_entries = fs::read_dir(path).map_err(|e| FsKitError::from_io(path, e))?;

        let mut l_entries = Vec::new();
        for entry_res in iter_entries {
            let entry = entry_res.map_err(|e| FsKitError::from_io(path, e))?;
            l_entries.push(derive_entry_info(&entry));
        }

        l_entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(l_entries)
    }

    fn read_file(&self, path: &Path) -> Result<Vec<u8>, FsKitError> {
        fs::read(path).map_err(|e| FsKitError::from_io(path, e))
    }

    fn write_file(&self, path: &Path, content: &[u8], mode: u32) -> Result<(), FsKitError> {
        fs::write(path, content).map_err(|e| FsKitError::from_io(path, e))?;
        apply_mode(path, mode).map_err(|e| FsKitError::from_io(path, e))
    }

    fn make_dir_all(&self, path: &Path, mode: u32) -> Result<(), FsKitError> {
        create_dir_all_with_mode(path, mode).map_err(|e| FsKitError::from_io(path, e))
    }
}
