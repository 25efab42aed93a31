//! Filesystem toolkit constants and defaults.

/// Canonical separator used by lexical path handling.
pub const C_SEPARATOR_CANONICAL: char = '/';

/// Unit suffixes for human-readable sizes, indexed by power of [`N_SIZE_BASE`].
pub const TUP_SIZE_UNITS: [&str; 7] = ["B", "KB", "MB", "GB", "TB", "PB", "EB"];
/// Multiplier between two consecutive size units.
pub const N_SIZE_BASE: u64 = 1024;
/// Byte counts below this value are printed verbatim.
pub const N_SIZE_EXACT_BELOW: u64 = 10;

/// Default permission bits for directories created during replication.
pub const N_MODE_DIR_DEFAULT: u32 = 0o777;
/// Default permission bits for files created without a source mode.
pub const N_MODE_FILE_DEFAULT: u32 = 0o666;
