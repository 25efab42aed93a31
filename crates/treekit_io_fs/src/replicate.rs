//! Best-effort directory tree replication.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::backend::{FsBackend, StdFsBackend};
use crate::report::{DiagnosticSink, ReportReplicate, ReportReplicateBuilder, TracingSink};
use crate::spec::{
    EnumDiagnosticSeverity, EnumEntryKind, SpecDiagnostic, SpecEntryInfo, SpecReplicateOptions,
};

struct SpecReplicateContext<'a, B: FsBackend + ?Sized, S: DiagnosticSink + ?Sized> {
    backend: &'a B,
    spec_rep_options: &'a SpecReplicateOptions,
    sink: &'a mut S,
    builder_rep_report: ReportReplicateBuilder,
}

impl<B: FsBackend + ?Sized, S: DiagnosticSink + ?Sized> SpecReplicateContext<'_, B, S> {
    fn add_diagnostic(&mut self, severity: EnumDiagnosticSeverity, path: &Path, message: String) {
        let diagnostic = SpecDiagnostic {
            severity,
            path: path.to_path_buf(),
            message,
        };
        self.builder_rep_report.add_diagnostic(&diagnostic);
        self.sink.report(diagnostic);
    }
}

/// Mirror every regular file under `dir_source` into `dir_target`.
///
/// Uses the host filesystem and reports failures through [`TracingSink`].
/// See [`replicate_tree_with`] for the traversal rules.
pub fn replicate_tree<P, Q>(
    dir_source: P,
    dir_target: Q,
    spec_rep_options: SpecReplicateOptions,
) -> ReportReplicate
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    let mut sink = TracingSink;
    replicate_tree_with(
        &StdFsBackend,
        dir_source,
        dir_target,
        &spec_rep_options,
        &mut sink,
    )
}

/// Mirror `dir_source` into `dir_target` through `backend`.
///
/// For each directory level:
/// 1. List the source directory. On failure, report and abandon this subtree.
/// 2. Create the target directory with all missing parents. On failure, report
///    and abandon this subtree.
/// 3. Copy every regular file (bytes and permission bits). A failed read or
///    write is reported for that file only; siblings continue.
/// 4. Recurse into subdirectories when `if_include_subdirs` is set.
///
/// Symlinks to files are copied as regular files with the target's contents.
/// Symlinks to directories and special files are skipped with a warning.
/// Entry names are joined byte-exact, so non-UTF-8 names survive.
///
/// Never fails: every failure lands in `sink` and in the returned report.
pub fn replicate_tree_with<B, S, P, Q>(
    backend: &B,
    dir_source: P,
    dir_target: Q,
    spec_rep_options: &SpecReplicateOptions,
    sink: &mut S,
) -> ReportReplicate
where
    B: FsBackend + ?Sized,
    S: DiagnosticSink + ?Sized,
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    let mut spec_rep_ctx = SpecReplicateContext {
        backend,
        spec_rep_options,
        sink,
        builder_rep_report: ReportReplicateBuilder::default(),
    };

    walk_directory(dir_source.as_ref(), dir_target.as_ref(), &mut spec_rep_ctx);

    let report = spec_rep_ctx.builder_rep_report.build();
    debug!(
        source = %dir_source.as_ref().display(),
        target = %dir_target.as_ref().display(),
        "{report}"
    );
    report
}

fn walk_directory<B, S>(
    path_dir_src: &Path,
    path_dir_dst: &Path,
    spec_rep_ctx: &mut SpecReplicateContext<'_, B, S>,
) where
    B: FsBackend + ?Sized,
    S: DiagnosticSink + ?Sized,
{
    let l_entries = match spec_rep_ctx.backend.list_dir(path_dir_src) {
        Ok(v) => v,
        Err(e) => {
            spec_rep_ctx.add_diagnostic(
                EnumDiagnosticSeverity::Error,
                path_dir_src,
                format!("Failed to read source directory ({e})"),
            );
            return;
        }
    };

    let n_mode_dir = spec_rep_ctx.spec_rep_options.mode_dir;
    if let Err(e) = spec_rep_ctx.backend.make_dir_all(path_dir_dst, n_mode_dir) {
        spec_rep_ctx.add_diagnostic(
            EnumDiagnosticSeverity::Error,
            path_dir_dst,
            format!("Failed to create target directory ({e})"),
        );
        return;
    }
    spec_rep_ctx.builder_rep_report.add_dir();
    debug!(path = %path_dir_dst.display(), "target directory ready");

    for spec_entry in l_entries {
        spec_rep_ctx.builder_rep_report.add_scanned();
        let path_entry_src = path_dir_src.join(&spec_entry.name);
        let path_entry_dst = path_dir_dst.join(&spec_entry.name);
        handle_entry(spec_entry, path_entry_src, path_entry_dst, spec_rep_ctx);
    }
}

fn handle_entry<B, S>(
    spec_entry: SpecEntryInfo,
    path_entry_src: PathBuf,
    path_entry_dst: PathBuf,
    spec_rep_ctx: &mut SpecReplicateContext<'_, B, S>,
) where
    B: FsBackend + ?Sized,
    S: DiagnosticSink + ?Sized,
{
    match spec_entry.kind {
        EnumEntryKind::File => {
            copy_file_entry(&path_entry_src, &path_entry_dst, spec_entry.mode, spec_rep_ctx);
        }
        EnumEntryKind::Directory => {
            if spec_rep_ctx.spec_rep_options.if_include_subdirs {
                walk_directory(&path_entry_src, &path_entry_dst, spec_rep_ctx);
            } else {
                spec_rep_ctx.builder_rep_report.add_skipped();
            }
        }
        EnumEntryKind::Symlink => {
            handle_symlink_entry(&path_entry_src, &path_entry_dst, spec_rep_ctx);
        }
        EnumEntryKind::Missing => {
            spec_rep_ctx.add_diagnostic(
                EnumDiagnosticSeverity::Error,
                &path_entry_src,
                "Source entry vanished before it could be inspected".to_string(),
            );
        }
        EnumEntryKind::Other => {
            spec_rep_ctx.builder_rep_report.add_skipped();
            spec_rep_ctx.add_diagnostic(
                EnumDiagnosticSeverity::Warning,
                &path_entry_src,
                "Special file skipped".to_string(),
            );
        }
    }
}

fn handle_symlink_entry<B, S>(
    path_entry_src: &Path,
    path_entry_dst: &Path,
    spec_rep_ctx: &mut SpecReplicateContext<'_, B, S>,
) where
    B: FsBackend + ?Sized,
    S: DiagnosticSink + ?Sized,
{
    let stat_target = match spec_rep_ctx.backend.stat(path_entry_src) {
        Ok(v) => v,
        Err(e) => {
            spec_rep_ctx.add_diagnostic(
                EnumDiagnosticSeverity::Error,
                path_entry_src,
                format!("Failed to inspect symlink target ({e})"),
            );
            return;
        }
    };

    match stat_target.kind {
        EnumEntryKind::File => {
            copy_file_entry(path_entry_src, path_entry_dst, stat_target.mode, spec_rep_ctx);
        }
        EnumEntryKind::Missing => {
            spec_rep_ctx.add_diagnostic(
                EnumDiagnosticSeverity::Error,
                path_entry_src,
                "Broken symlink".to_string(),
            );
        }
        EnumEntryKind::Directory => {
            spec_rep_ctx.builder_rep_report.add_skipped();
            spec_rep_ctx.add_diagnostic(
                EnumDiagnosticSeverity::Warning,
                path_entry_src,
                "Symlinked directory skipped".to_string(),
            );
        }
        EnumEntryKind::Symlink | EnumEntryKind::Other => {
            spec_rep_ctx.builder_rep_report.add_skipped();
            spec_rep_ctx.add_diagnostic(
                EnumDiagnosticSeverity::Warning,
                path_entry_src,
                "Special file target skipped".to_string(),
            );
        }
    }
}

fn copy_file_entry<B, S>(
    path_file_src: &Path,
    path_file_dst: &Path,
    mode: u32,
    spec_rep_ctx: &mut SpecReplicateContext<'_, B, S>,
) where
    B: FsBackend + ?Sized,
    S: DiagnosticSink + ?Sized,
{
    let raw_content = match spec_rep_ctx.backend.read_file(path_file_src) {
        Ok(v) => v,
        Err(e) => {
            spec_rep_ctx.add_diagnostic(
                EnumDiagnosticSeverity::Error,
                path_file_src,
                format!("Failed to read source file ({e})"),
            );
            return;
        }
    };

    match spec_rep_ctx
        .backend
        .write_file(path_file_dst, &raw_content, mode)
    {
        Ok(()) => {
            spec_rep_ctx.builder_rep_report.add_copied();
            debug!(
                source = %path_file_src.display(),
                target = %path_file_dst.display(),
                n_bytes = raw_content.len(),
                "file replicated"
            );
        }
        Err(e) => spec_rep_ctx.add_diagnostic(
            EnumDiagnosticSeverity::Error,
            path_file_dst,
            format!("Failed to write target file ({e})"),
        ),
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::{Path, PathBuf};

    use super::{replicate_tree, replicate_tree_with};
    use crate::backend::{FsBackend, StdFsBackend};
    use crate::report::NullSink;
    use crate::spec::{
        EnumDiagnosticSeverity, EnumEntryKind, FsKitError, SpecDiagnostic, SpecEntryInfo,
        SpecEntryStat, SpecReplicateOptions,
    };

    fn write_text(path: &Path, txt: &str) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent");
        }
        fs::write(path, txt).expect("write text");
    }

    /// Std backend that refuses to read one chosen path and can report an
    /// extra entry that disappeared right after the listing.
    struct FailingReadBackend {
        path_fail: PathBuf,
        name_vanished: Option<&'static str>,
    }

    impl FsBackend for FailingReadBackend {
        fn stat(&self, path: &Path) -> Result<SpecEntryStat, FsKitError> {
            StdFsBackend.stat(path)
        }

        fn list_dir(&self, path: &Path) -> Result<Vec<SpecEntryInfo>, FsKitError> {
            let mut l_entries = StdFsBackend.list_dir(path)?;
            if let Some(name_vanished) = self.name_vanished {
                l_entries.push(SpecEntryInfo {
                    name: name_vanished.into(),
                    kind: EnumEntryKind::Missing,
                    mode: 0,
                });
                l_entries.sort_by(|a, b| a.name.cmp(&b.name));
            }
            Ok(l_entries)
        }

        fn read_file(&self, path: &Path) -> Result<Vec<u8>, FsKitError> {
            if path == self.path_fail {
                return Err(FsKitError::from_io(
                    path,
                    std::io::Error::from(std::io::ErrorKind::PermissionDenied),
                ));
            }
            StdFsBackend.read_file(path)
        }

        fn write_file(&self, path: &Path, content: &[u8], mode: u32) -> Result<(), FsKitError> {
            StdFsBackend.write_file(path, content, mode)
        }

        fn make_dir_all(&self, path: &Path, mode: u32) -> Result<(), FsKitError> {
            StdFsBackend.make_dir_all(path, mode)
        }
    }

    #[test]
    fn replicate_tree_mirrors_files_and_directories() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let src = tmp.path().join("src");
        let dst = tmp.path().join("out/dst");

        write_text(&src.join("root.txt"), "root");
        write_text(&src.join("a/file1.txt"), "a");
        write_text(&src.join("b/sub/file2.bin"), "b\u{0}b");
        fs::create_dir_all(src.join("empty")).expect("mkdir empty");

        let report = replicate_tree(&src, &dst, SpecReplicateOptions::default());
        assert_eq!(report.error_count(), 0);
        assert_eq!(report.cnt_copied, 3);
        assert_eq!(report.cnt_dirs, 5);

        assert_eq!(fs::read_to_string(dst.join("root.txt")).expect("read"), "root");
        assert_eq!(fs::read_to_string(dst.join("a/file1.txt")).expect("read"), "a");
        assert_eq!(fs::read(dst.join("b/sub/file2.bin")).expect("read"), b"b\0b");
        assert!(dst.join("empty").is_dir());
    }

    #[test]
    fn replicate_tree_without_subdirs_copies_top_level_only() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let src = tmp.path().join("src");
        let dst = tmp.path().join("dst");

        write_text(&src.join("root.txt"), "root");
        write_text(&src.join("a/file1.txt"), "a");

        let spec_rep_options = SpecReplicateOptions {
            if_include_subdirs: false,
            ..SpecReplicateOptions::default()
        };
        let report = replicate_tree(&src, &dst, spec_rep_options);

        assert_eq!(report.error_count(), 0);
        assert_eq!(report.cnt_copied, 1);
        assert_eq!(report.cnt_skipped, 1);
        assert!(dst.join("root.txt").exists());
        assert!(!dst.join("a").exists());
    }

    #[test]
    fn replicate_tree_missing_source_reports_once() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let src = tmp.path().join("missing");
        let dst = tmp.path().join("dst");

        let mut l_diagnostics: Vec<SpecDiagnostic> = Vec::new();
        let report = replicate_tree_with(
            &StdFsBackend,
            &src,
            &dst,
            &SpecReplicateOptions::default(),
            &mut l_diagnostics,
        );

        assert_eq!(report.error_count(), 1);
        assert_eq!(l_diagnostics.len(), 1);
        assert_eq!(l_diagnostics[0].path, src);
        assert!(!dst.exists());
    }

    #[test]
    fn replicate_tree_target_blocked_by_file_reports_once() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let src = tmp.path().join("src");
        let blocker = tmp.path().join("blocker");
        write_text(&src.join("a.txt"), "a");
        write_text(&blocker, "i am a file");

        let mut l_diagnostics: Vec<SpecDiagnostic> = Vec::new();
        let report = replicate_tree_with(
            &StdFsBackend,
            &src,
            blocker.join("dst"),
            &SpecReplicateOptions::default(),
            &mut l_diagnostics,
        );

        assert_eq!(report.error_count(), 1);
        assert_eq!(report.cnt_copied, 0);
        assert_eq!(l_diagnostics.len(), 1);
        assert_eq!(l_diagnostics[0].severity, EnumDiagnosticSeverity::Error);
    }

    #[test]
    fn replicate_tree_continues_after_unreadable_file() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let src = tmp.path().join("src");
        let dst = tmp.path().join("dst");

        write_text(&src.join("a.txt"), "a");
        write_text(&src.join("b.txt"), "b");
        write_text(&src.join("c.txt"), "c");
        write_text(&src.join("sub/d.txt"), "d");

        let backend = FailingReadBackend {
            path_fail: src.join("b.txt"),
            name_vanished: None,
        };
        let mut l_diagnostics: Vec<SpecDiagnostic> = Vec::new();
        let report = replicate_tree_with(
            &backend,
            &src,
            &dst,
            &SpecReplicateOptions::default(),
            &mut l_diagnostics,
        );

        assert_eq!(l_diagnostics.len(), 1);
        assert_eq!(l_diagnostics[0].path, src.join("b.txt"));
        assert_eq!(report.error_count(), 1);
        assert_eq!(report.cnt_copied, 3);
        assert!(dst.join("a.txt").exists());
        assert!(!dst.join("b.txt").exists());
        assert!(dst.join("c.txt").exists());
        assert!(dst.join("sub/d.txt").exists());
    }

    #[test]
    fn replicate_tree_reports_vanished_entry_and_keeps_siblings() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let src = tmp.path().join("src");
        let dst = tmp.path().join("dst");

        write_text(&src.join("a.txt"), "a");
        write_text(&src.join("sub/c.txt"), "c");

        let backend = FailingReadBackend {
            path_fail: PathBuf::new(),
            name_vanished: Some("b.txt"),
        };
        let mut l_diagnostics: Vec<SpecDiagnostic> = Vec::new();
        let report = replicate_tree_with(
            &backend,
            &src,
            &dst,
            &SpecReplicateOptions::default(),
            &mut l_diagnostics,
        );

        let l_vanished: Vec<_> = l_diagnostics
            .iter()
            .filter(|d| d.path == src.join("b.txt"))
            .collect();
        assert_eq!(l_vanished.len(), 1);
        assert_eq!(l_vanished[0].severity, EnumDiagnosticSeverity::Error);
        assert_eq!(report.cnt_copied, 2);
        assert!(dst.join("a.txt").exists());
        assert!(dst.join("sub/c.txt").exists());
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn replicate_tree_copies_non_utf8_names() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let tmp = tempfile::tempdir().expect("tempdir");
        let src = tmp.path().join("src");
        let dst = tmp.path().join("dst");
        let name_raw = OsStr::from_bytes(b"caf\xe9.txt");

        fs::create_dir_all(src.join("sub")).expect("mkdir");
        fs::write(src.join(name_raw), "top").expect("write");
        fs::write(src.join("sub").join(name_raw), "nested").expect("write");

        let report = replicate_tree(&src, &dst, SpecReplicateOptions::default());
        assert_eq!(report.error_count(), 0);
        assert_eq!(report.cnt_copied, 2);
        assert_eq!(fs::read_to_string(dst.join(name_raw)).expect("read"), "top");
        assert_eq!(
            fs::read_to_string(dst.join("sub").join(name_raw)).expect("read"),
            "nested"
        );
    }

    #[test]
    fn replicate_tree_overwrites_and_keeps_unrelated_target_files() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let src = tmp.path().join("src");
        let dst = tmp.path().join("dst");

        write_text(&src.join("a.txt"), "new");
        write_text(&dst.join("a.txt"), "old content");
        write_text(&dst.join("keep.txt"), "keep");

        let report = replicate_tree_with(
            &StdFsBackend,
            &src,
            &dst,
            &SpecReplicateOptions::default(),
            &mut NullSink,
        );

        assert_eq!(report.error_count(), 0);
        assert_eq!(fs::read_to_string(dst.join("a.txt")).expect("read"), "new");
        assert_eq!(fs::read_to_string(dst.join("keep.txt")).expect("read"), "keep");
    }

    #[cfg(unix)]
    #[test]
    fn replicate_tree_preserves_permission_bits() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = tempfile::tempdir().expect("tempdir");
        let src = tmp.path().join("src");
        let dst = tmp.path().join("dst");

        let path_exec = src.join("bin/run.sh");
        let path_private = src.join("secret.txt");
        write_text(&path_exec, "#!/bin/sh\n");
        write_text(&path_private, "s");
        fs::set_permissions(&path_exec, fs::Permissions::from_mode(0o755)).expect("chmod");
        fs::set_permissions(&path_private, fs::Permissions::from_mode(0o600)).expect("chmod");

        let report = replicate_tree(&src, &dst, SpecReplicateOptions::default());
        assert_eq!(report.error_count(), 0);

        for (path_src, path_dst) in [
            (path_exec, dst.join("bin/run.sh")),
            (path_private, dst.join("secret.txt")),
        ] {
            let n_mode_src = fs::metadata(&path_src).expect("meta").permissions().mode() & 0o7777;
            let n_mode_dst = fs::metadata(&path_dst).expect("meta").permissions().mode() & 0o7777;
            assert_eq!(n_mode_src, n_mode_dst);
        }
    }

    #[cfg(unix)]
    #[test]
    fn replicate_tree_symlink_handling() {
        use std::os::unix::fs::symlink;

        let tmp = tempfile::tempdir().expect("tempdir");
        let src = tmp.path().join("src");
        let dst = tmp.path().join("dst");
        let outside = tmp.path().join("outside");

        write_text(&src.join("real.txt"), "real");
        write_text(&outside.join("x.txt"), "x");
        symlink(src.join("real.txt"), src.join("link.txt")).expect("file symlink");
        symlink(&outside, src.join("linkdir")).expect("dir symlink");
        symlink(tmp.path().join("gone"), src.join("dangling")).expect("broken symlink");

        let mut l_diagnostics: Vec<SpecDiagnostic> = Vec::new();
        let report = replicate_tree_with(
            &StdFsBackend,
            &src,
            &dst,
            &SpecReplicateOptions::default(),
            &mut l_diagnostics,
        );

        let path_link_dst = dst.join("link.txt");
        assert!(!path_link_dst.is_symlink());
        assert_eq!(fs::read_to_string(&path_link_dst).expect("read"), "real");
        assert!(!dst.join("linkdir").exists());
        assert!(!dst.join("dangling").exists());

        assert_eq!(report.cnt_copied, 2);
        assert_eq!(report.warning_count(), 1);
        assert_eq!(report.error_count(), 1);
        assert_eq!(l_diagnostics.len(), 2);
    }
}
