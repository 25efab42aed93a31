//! Replication report models, mutable report builder and diagnostic sinks.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use tracing::{error, warn};

use crate::spec::{EnumDiagnosticSeverity, SpecDiagnostic, SpecReplicateError};

////////////////////////////////////////////////////////////////////////////////
// #region Report

/// Aggregate counters and diagnostics for one `replicate_tree` run.
#[derive(Debug, Default, Clone)]
pub struct ReportReplicate {
    /// Total listed source entries.
    pub cnt_scanned: u64,
    /// Number of files written under the target.
    pub cnt_copied: u64,
    /// Number of target directories ensured (created or already present).
    pub cnt_dirs: u64,
    /// Entries deliberately not replicated.
    pub cnt_skipped: u64,
    /// Skipped-entry notices.
    pub warnings: Vec<String>,
    /// Per-entry and per-subtree failures.
    pub errors: Vec<SpecReplicateError>,
}

impl ReportReplicate {
    /// Number of collected hard errors.
    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    /// Number of collected warnings.
    pub fn warning_count(&self) -> usize {
        self.warnings.len()
    }

    /// Machine-readable counters.
    pub fn to_dict(&self) -> BTreeMap<String, u64> {
        let mut dict_counts = BTreeMap::new();
        dict_counts.insert("cnt_scanned".to_string(), self.cnt_scanned);
        dict_counts.insert("cnt_copied".to_string(), self.cnt_copied);
        dict_counts.insert("cnt_dirs".to_string(), self.cnt_dirs);
        dict_counts.insert("cnt_skipped".to_string(), self.cnt_skipped);
        dict_counts.insert("cnt_errors".to_string(), self.error_count() as u64);
        dict_counts.insert("cnt_warnings".to_string(), self.warning_count() as u64);
        dict_counts
    }

    /// Human-readable one-line summary.
    pub fn format(&self, prefix: &str) -> String {
        format!(
            "{prefix} scanned={} copied={} dirs={} skipped={} errors={} warnings={}",
            self.cnt_scanned,
            self.cnt_copied,
            self.cnt_dirs,
            self.cnt_skipped,
            self.error_count(),
            self.warning_count()
        )
    }
}

impl fmt::Display for ReportReplicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format("[REPLICATE]"))
    }
}

/// Mutable accumulator for replication statistics.
#[derive(Debug, Default, Clone)]
pub struct ReportReplicateBuilder {
    report: ReportReplicate,
}

impl ReportReplicateBuilder {
    pub fn add_scanned(&mut self) {
        self.report.cnt_scanned += 1;
    }

    pub fn add_copied(&mut self) {
        self.report.cnt_copied += 1;
    }

    pub fn add_dir(&mut self) {
        self.report.cnt_dirs += 1;
    }

    pub fn add_skipped(&mut self) {
        self.report.cnt_skipped += 1;
    }

    pub fn add_warning(&mut self, warning: String) {
        self.report.warnings.push(warning);
    }

    /// Add one path-scoped error.
    pub fn add_error(&mut self, path: PathBuf, exception: String) {
        self.report.errors.push(SpecReplicateError { path, exception });
    }

    /// Record a diagnostic under the matching report list.
    pub fn add_diagnostic(&mut self, diagnostic: &SpecDiagnostic) {
        match diagnostic.severity {
            EnumDiagnosticSeverity::Warning => self.add_warning(format!(
                "{}: {}",
                diagnostic.message,
                diagnostic.path.display()
            )),
            EnumDiagnosticSeverity::Error => {
                self.add_error(diagnostic.path.clone(), diagnostic.message.clone())
            }
        }
    }

    /// Finalize builder into immutable report.
    pub fn build(self) -> ReportReplicate {
        self.report
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region DiagnosticSinks

/// Receiver for non-fatal replication failures.
pub trait DiagnosticSink {
    fn report(&mut self, diagnostic: SpecDiagnostic);
}

/// Emits each diagnostic as a `tracing` event.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn report(&mut self, diagnostic: SpecDiagnostic) {
        let c_path = diagnostic.path.display().to_string();
        match diagnostic.severity {
            EnumDiagnosticSeverity::Warning => {
                warn!(path = %c_path, "{}", diagnostic.message)
            }
            EnumDiagnosticSeverity::Error => {
                error!(path = %c_path, "{}", diagnostic.message)
            }
        }
    }
}

/// Drops every diagnostic.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl DiagnosticSink for NullSink {
    fn report(&mut self, _diagnostic: SpecDiagnostic) {}
}

impl DiagnosticSink for Vec<SpecDiagnostic> {
    fn report(&mut self, diagnostic: SpecDiagnostic) {
        self.push(diagnostic);
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
