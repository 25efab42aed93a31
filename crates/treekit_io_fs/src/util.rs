use std::fs;
use std::io;
use std::path::{MAIN_SEPARATOR, Path};

use crate::conf::C_SEPARATOR_CANONICAL;
use crate::spec::EnumEntryKind;

////////////////////////////////////////////////////////////////////////////////
// #region SeparatorConversion

/// Replace the platform separator with `/`.
pub(crate) fn to_slash(path: &str) -> String {
    if MAIN_SEPARATOR == C_SEPARATOR_CANONICAL {
        return path.to_string();
    }
    path.replace(MAIN_SEPARATOR, "/")
}

/// Replace `/` with the platform separator.
pub(crate) fn from_slash(path: &str) -> String {
    if MAIN_SEPARATOR == C_SEPARATOR_CANONICAL {
        return path.to_string();
    }
    path.replace(C_SEPARATOR_CANONICAL, &MAIN_SEPARATOR.to_string())
}

pub(crate) fn path_to_string(path: &Path) -> String {
    path.to_string_lossy().to_string()
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region EntryMetadata

pub(crate) fn classify_file_type(cfg_file_type: fs::FileType) -> EnumEntryKind {
    if cfg_file_type.is_symlink() {
        EnumEntryKind::Symlink
    } else if cfg_file_type.is_dir() {
        EnumEntryKind::Directory
    } else if cfg_file_type.is_file() {
        EnumEntryKind::File
    } else {
        EnumEntryKind::Other
    }
}

/// Permission bits of `meta`.
///
/// Non-unix platforms only expose a read-only flag, mapped onto the default
/// file/dir modes with write bits cleared.
pub(crate) fn mode_from_metadata(meta: &fs::Metadata) -> u32 {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        meta.permissions().mode() & 0o7777
    }
    #[cfg(not(unix))]
    {
        use crate::conf::{N_MODE_DIR_DEFAULT, N_MODE_FILE_DEFAULT};

        let n_mode_base = if meta.is_dir() {
            N_MODE_DIR_DEFAULT
        } else {
            N_MODE_FILE_DEFAULT
        };
        if meta.permissions().readonly() {
            n_mode_base & !0o222
        } else {
            n_mode_base
        }
    }
}

/// Set permission bits on `path` verbatim (no umask).
pub(crate) fn apply_mode(path: &Path, mode: u32) -> Result<(), io::Error> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(mode & 0o7777))
    }
    #[cfg(not(unix))]
    {
        let mut permissions = fs::metadata(path)?.permissions();
        permissions.set_readonly(mode & 0o222 == 0);
        fs::set_permissions(path, permissions)
    }
}

/// Recursively create `path`; succeeds when it already is a directory.
pub(crate) fn create_dir_all_with_mode(path: &Path, mode: u32) -> Result<(), io::Error> {
    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(mode & 0o7777);
    }
    #[cfg(not(unix))]
    {
        let _ = mode;
    }
    builder.create(path)
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::{from_slash, to_slash};

    #[test]
    fn slash_conversion_keeps_forward_slashes() {
        assert_eq!(to_slash("/x/y/readme.txt"), "/x/y/readme.txt");
        assert_eq!(from_slash("/x/y/readme.txt").replace('\\', "/"), "/x/y/readme.txt");
    }

    #[cfg(windows)]
    #[test]
    fn slash_conversion_windows_separator() {
        assert_eq!(to_slash(r"D:\tmp\a.txt"), "D:/tmp/a.txt");
        assert_eq!(from_slash("D:/tmp/a.txt"), r"D:\tmp\a.txt");
    }
}
