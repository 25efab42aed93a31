use std::collections::BTreeMap;
use std::path::PathBuf;

use pyo3::exceptions::{
    PyFileNotFoundError, PyNotADirectoryError, PyOSError, PyPermissionError, PyValueError,
};
use pyo3::prelude::*;
use treekit_io_fs::{
    EnumFindPatternMode, FsKitError, ReportReplicate, SpecFindOptions, SpecReplicateError,
    SpecReplicateOptions, clean_path_lexical, find_files, find_files_immediate,
    find_files_recursive, format_size_human, replicate_tree, resolve_relative_path,
};

const N_BRIDGE_ABI_VERSION: u64 = 1;
const C_BRIDGE_CONTRACT_VERSION: &str = "treekit.fs.v1";
const C_BRIDGE_TRANSPORT: &str = "rust_native";

#[pyclass(name = "SpecReplicateError")]
#[derive(Debug, Clone)]
struct PySpecReplicateError {
    #[pyo3(get)]
    path: String,
    #[pyo3(get)]
    exception: String,
}

impl From<SpecReplicateError> for PySpecReplicateError {
    fn from(spec_error: SpecReplicateError) -> Self {
        Self {
            path: spec_error.path.to_string_lossy().to_string(),
            exception: spec_error.exception,
        }
    }
}

#[pyclass(name = "ReportReplicate")]
#[derive(Debug, Clone)]
struct PyReportReplicate {
    report: ReportReplicate,
}

#[pymethods]
impl PyReportReplicate {
    #[getter]
    fn cnt_scanned(&self) -> u64 {
        self.report.cnt_scanned
    }

    #[getter]
    fn cnt_copied(&self) -> u64 {
        self.report.cnt_copied
    }

    #[getter]
    fn cnt_dirs(&self) -> u64 {
        self.report.cnt_dirs
    }

    #[getter]
    fn cnt_skipped(&self) -> u64 {
        self.report.cnt_skipped
    }

    #[getter]
    fn warnings(&self) -> Vec<String> {
        self.report.warnings.clone()
    }

    #[getter]
    fn errors(&self) -> Vec<PySpecReplicateError> {
        self.report
            .errors
            .iter()
            .cloned()
            .map(PySpecReplicateError::from)
            .collect()
    }

    #[getter]
    fn error_count(&self) -> usize {
        self.report.error_count()
    }

    #[getter]
    fn warning_count(&self) -> usize {
        self.report.warning_count()
    }

    fn to_dict(&self) -> BTreeMap<String, u64> {
        self.report.to_dict()
    }

    #[pyo3(signature = (prefix = "[REPLICATE]"))]
    fn format(&self, prefix: &str) -> String {
        self.report.format(prefix)
    }

    fn __str__(&self) -> String {
        self.report.to_string()
    }
}

fn parse_rule_pattern(value: &str) -> PyResult<EnumFindPatternMode> {
    match value {
        "suffix" => Ok(EnumFindPatternMode::Suffix),
        "glob" => Ok(EnumFindPatternMode::Glob),
        "regex" => Ok(EnumFindPatternMode::Regex),
        _ => Err(PyValueError::new_err(format!(
            "Invalid pattern strategy: `{value}`. Expected one of: ['suffix', 'glob', 'regex']"
        ))),
    }
}

fn map_fs_kit_error(exception: FsKitError) -> PyErr {
    let c_message = exception.to_string();
    match exception {
        FsKitError::NotFound(_) => PyFileNotFoundError::new_err(c_message),
        FsKitError::NotADirectory(_) => PyNotADirectoryError::new_err(c_message),
        FsKitError::PermissionDenied { .. } => PyPermissionError::new_err(c_message),
        FsKitError::InvalidPattern(_) => PyValueError::new_err(c_message),
        FsKitError::Io { .. } | FsKitError::Unknown(_) => PyOSError::new_err(c_message),
    }
}

fn paths_to_strings(l_paths: Vec<PathBuf>) -> Vec<String> {
    l_paths
        .into_iter()
        .map(|p| p.to_string_lossy().to_string())
        .collect()
}

#[pyfunction(name = "resolve_relative_path")]
fn resolve_relative_path_py(reference: &str, relative_expr: &str) -> PyResult<String> {
    let path_resolved =
        resolve_relative_path(reference, relative_expr).map_err(map_fs_kit_error)?;
    Ok(path_resolved.to_string_lossy().to_string())
}

#[pyfunction(name = "clean_path_lexical")]
fn clean_path_lexical_py(path: &str) -> String {
    clean_path_lexical(path)
}

#[pyfunction(name = "replicate_tree")]
#[pyo3(signature = (dir_source, dir_target, if_include_subdirs = true, mode_dir = 0o777))]
fn replicate_tree_py(
    py: Python<'_>,
    dir_source: String,
    dir_target: String,
    if_include_subdirs: bool,
    mode_dir: u32,
) -> PyReportReplicate {
    let spec_rep_options = SpecReplicateOptions {
        if_include_subdirs,
        mode_dir,
    };
    let report = py.allow_threads(|| replicate_tree(dir_source, dir_target, spec_rep_options));
    PyReportReplicate { report }
}

#[pyfunction(name = "find_files_recursive")]
#[pyo3(signature = (dir_root, suffix = ""))]
fn find_files_recursive_py(
    py: Python<'_>,
    dir_root: String,
    suffix: &str,
) -> PyResult<Vec<String>> {
    let l_files = py
        .allow_threads(|| find_files_recursive(dir_root, suffix))
        .map_err(map_fs_kit_error)?;
    Ok(paths_to_strings(l_files))
}

#[pyfunction(name = "find_files_immediate")]
#[pyo3(signature = (dir_root, suffix = ""))]
fn find_files_immediate_py(
    py: Python<'_>,
    dir_root: String,
    suffix: &str,
) -> PyResult<Vec<String>> {
    let l_files = py
        .allow_threads(|| find_files_immediate(dir_root, suffix))
        .map_err(map_fs_kit_error)?;
    Ok(paths_to_strings(l_files))
}

#[pyfunction(name = "find_files")]
#[pyo3(signature = (dir_root, pattern = "", rule_pattern = "suffix", if_recursive = true))]
fn find_files_py(
    py: Python<'_>,
    dir_root: String,
    pattern: &str,
    rule_pattern: &str,
    if_recursive: bool,
) -> PyResult<Vec<String>> {
    let spec_find_options = SpecFindOptions {
        pattern: pattern.to_string(),
        rule_pattern: parse_rule_pattern(rule_pattern)?,
        if_recursive,
    };
    let l_files = py
        .allow_threads(|| find_files(dir_root, &spec_find_options))
        .map_err(map_fs_kit_error)?;
    Ok(paths_to_strings(l_files))
}

#[pyfunction(name = "format_size_human")]
fn format_size_human_py(n_bytes: u64) -> String {
    format_size_human(n_bytes)
}

#[pymodule]
fn _treekit_io_fs_rs(module: &Bound<'_, PyModule>) -> PyResult<()> {
    module.add_class::<PySpecReplicateError>()?;
    module.add_class::<PyReportReplicate>()?;
    module.add_function(wrap_pyfunction!(resolve_relative_path_py, module)?)?;
    module.add_function(wrap_pyfunction!(clean_path_lexical_py, module)?)?;
    module.add_function(wrap_pyfunction!(replicate_tree_py, module)?)?;
    module.add_function(wrap_pyfunction!(find_files_recursive_py, module)?)?;
    module.add_function(wrap_pyfunction!(find_files_immediate_py, module)?)?;
    module.add_function(wrap_pyfunction!(find_files_py, module)?)?;
    module.add_function(wrap_pyfunction!(format_size_human_py, module)?)?;
    module.add("__bridge_abi__", N_BRIDGE_ABI_VERSION)?;
    module.add("__bridge_contract__", C_BRIDGE_CONTRACT_VERSION)?;
    module.add("__bridge_transport__", C_BRIDGE_TRANSPORT)?;
    Ok(())
}

