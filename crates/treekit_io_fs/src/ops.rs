//! One-shot filesystem helpers: checks, single-file writes and copies,
//! size/mtime queries and human-readable sizes.

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, BufWriter, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::backend::{FsBackend, StdFsBackend};
use crate::conf::{N_SIZE_BASE, N_SIZE_EXACT_BELOW, TUP_SIZE_UNITS};
use crate::resolve::clean_path_lexical;
use crate::spec::{FsKitError, SpecEntryStat};
use crate::util::{from_slash, path_to_string, to_slash};

////////////////////////////////////////////////////////////////////////////////
// #region Checks

/// `true` when `path` exists and is a directory (symlinks followed).
pub fn is_dir<P: AsRef<Path>>(path: P) -> bool {
    fs::metadata(path).is_ok_and(|m| m.is_dir())
}

/// `true` when `path` exists and is not a directory (symlinks followed).
pub fn is_file<P: AsRef<Path>>(path: P) -> bool {
    fs::metadata(path).is_ok_and(|m| !m.is_dir())
}

/// `false` only when the path is known not to exist.
///
/// Metadata failures other than "not found" count as existing.
pub fn exists<P: AsRef<Path>>(path: P) -> bool {
    match fs::metadata(path) {
        Ok(_) => true,
        Err(e) => e.kind() != io::ErrorKind::NotFound,
    }
}

/// `true` when `path` can be opened for reading.
pub fn allow_read<P: AsRef<Path>>(path: P) -> bool {
    File::open(path).is_ok()
}

/// `true` when the existing `path` can be opened for writing. Never creates
/// or truncates.
pub fn allow_write<P: AsRef<Path>>(path: P) -> bool {
    OpenOptions::new().write(true).open(path).is_ok()
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Queries

fn stat_existing(path: &Path) -> Result<SpecEntryStat, FsKitError> {
    let stat_entry = StdFsBackend.stat(path)?;
    if !stat_entry.exists() {
        return Err(FsKitError::NotFound(path.to_path_buf()));
    }
    Ok(stat_entry)
}

pub fn file_size<P: AsRef<Path>>(path: P) -> Result<u64, FsKitError> {
    Ok(stat_existing(path.as_ref())?.size)
}

/// Last modification time in unix seconds.
pub fn file_mod_time<P: AsRef<Path>>(path: P) -> Result<i64, FsKitError> {
    Ok(stat_existing(path.as_ref())?.mod_time)
}

/// Absolute, lexically cleaned form of `path`. Symlinks are not resolved and
/// the path need not exist.
pub fn abs_path<P: AsRef<Path>>(path: P) -> Result<PathBuf, FsKitError> {
    let path = path.as_ref();
    let path_abs = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map_err(|e| FsKitError::from_io(path, e))?
            .join(path)
    };
    let c_cleaned = clean_path_lexical(&to_slash(&path_to_string(&path_abs)));
    Ok(PathBuf::from(from_slash(&c_cleaned)))
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Writes

/// Create `path` and all missing parents.
pub fn create_folder<P: AsRef<Path>>(path: P) -> Result<(), FsKitError> {
    let path = path.as_ref();
    fs::create_dir_all(path).map_err(|e| FsKitError::from_io(path, e))
}

fn create_parent_dir(path: &Path) -> Result<(), FsKitError> {
    match path.parent() {
        Some(path_parent) if !path_parent.as_os_str().is_empty() => create_folder(path_parent),
        _ => Ok(()),
    }
}

/// Replace the contents of `path` with `content`, creating the file and its
/// parent directories when missing.
pub fn rewrite_file<P: AsRef<Path>>(path: P, content: &[u8]) -> Result<(), FsKitError> {
    let path = path.as_ref();
    create_parent_dir(path)?;
    fs::write(path, content).map_err(|e| FsKitError::from_io(path, e))
}

/// Append `content` to the existing file at `path`.
pub fn write_append<P: AsRef<Path>>(path: P, content: &[u8]) -> Result<(), FsKitError> {
    let path = path.as_ref();
    let mut file = OpenOptions::new()
        .append(true)
        .open(path)
        .map_err(|e| FsKitError::from_io(path, e))?;
    file.write_all(content)
        .map_err(|e| FsKitError::from_io(path, e))
}

/// Overwrite bytes of the existing file at `path` starting at `offset`.
pub fn write_at<P: AsRef<Path>>(path: P, content: &[u8], offset: u64) -> Result<(), FsKitError> {
    let path = path.as_ref();
    let mut file = OpenOptions::new()
        .write(true)
        .open(path)
        .map_err(|e| FsKitError::from_io(path, e))?;
    file.seek(SeekFrom::Start(offset))
        .and_then(|_| file.write_all(content))
        .map_err(|e| FsKitError::from_io(path, e))
}

/// Copy one file, creating the destination's parent directories when
/// missing. Returns the number of bytes copied.
pub fn copy_file<P, Q>(path_src: P, path_dst: Q) -> Result<u64, FsKitError>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    let path_src = path_src.as_ref();
    let path_dst = path_dst.as_ref();

    let file_src = File::open(path_src).map_err(|e| FsKitError::from_io(path_src, e))?;
    let file_dst = match File::create(path_dst) {
        Ok(v) => v,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            create_parent_dir(path_dst)?;
            File::create(path_dst).map_err(|e| FsKitError::from_io(path_dst, e))?
        }
        Err(e) => return Err(FsKitError::from_io(path_dst, e)),
    };

    let mut reader = BufReader::new(file_src);
    let mut writer = BufWriter::new(file_dst);
    let n_bytes = io::copy(&mut reader, &mut writer).map_err(|e| FsKitError::from_io(path_dst, e))?;
    writer.flush().map_err(|e| FsKitError::from_io(path_dst, e))?;
    Ok(n_bytes)
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Formatting

/// Render a byte count with binary units, e.g. `1536 -> "1.5KB"`.
///
/// Counts below 10 bytes print exactly (`"7B"`). Otherwise the value is scaled
/// to the largest unit not exceeding it and printed with one decimal when
/// below 10, without decimals otherwise.
pub fn format_size_human(n_bytes: u64) -> String {
    if n_bytes < N_SIZE_EXACT_BELOW {
        return format!("{n_bytes}B");
    }

    let mut n_exp = 0usize;
    let mut n_unit = 1u64;
    while n_exp + 1 < TUP_SIZE_UNITS.len() && n_bytes / n_unit >= N_SIZE_BASE {
        n_unit *= N_SIZE_BASE;
        n_exp += 1;
    }

    let value = n_bytes as f64 / n_unit as f64;
    let c_unit = TUP_SIZE_UNITS[n_exp];
    if value < 10.0 {
        format!("{value:.1}{c_unit}")
    } else {
        format!("{value:.0}{c_unit}")
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
