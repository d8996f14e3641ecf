use std::path::PathBuf;
use thiserror::Error;

/// Why a spreadsheet could not become a table. Never fatal: the caller keeps
/// an empty table and reports this instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    #[error("file not found: {}", .0.to_string_lossy())]
    FileNotFound(PathBuf),

    #[error("failed to read {}: {message}", .path.to_string_lossy())]
    Parse { path: PathBuf, message: String },

    #[error("missing required columns: {}", .missing.join(", "))]
    MissingColumns { missing: Vec<String> },
}

impl LoadError {
    pub fn code(&self) -> &'static str {
        match self {
            LoadError::FileNotFound(_) => "file_not_found",
            LoadError::Parse { .. } => "parse_failed",
            LoadError::MissingColumns { .. } => "missing_columns",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("student name must be \"First Last\": {0:?}")]
    MalformedKey(String),

    #[error("no grades found for student: {0}")]
    NoMatchingStudent(String),
}

impl SelectionError {
    pub fn code(&self) -> &'static str {
        match self {
            SelectionError::MalformedKey(_) => "malformed_selection_key",
            SelectionError::NoMatchingStudent(_) => "no_matching_student",
        }
    }
}

/// Placeholder outcome of a statistic. Distinct from any numeric result, so a
/// student who scored 0 everywhere is never confused with an empty view.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NoData {
    #[error("no student selected")]
    NoSelection,

    #[error("no grades available")]
    EmptyFilterResult { unit: Option<String> },
}

impl NoData {
    pub fn code(&self) -> &'static str {
        match self {
            NoData::NoSelection => "no_selection",
            NoData::EmptyFilterResult { .. } => "empty_filter_result",
        }
    }

    /// Wire name of the placeholder reason.
    pub fn reason(&self) -> &'static str {
        match self {
            NoData::NoSelection => "noSelection",
            NoData::EmptyFilterResult { .. } => "noGrades",
        }
    }

    /// Placeholder chart title.
    pub fn title(&self) -> &'static str {
        match self {
            NoData::NoSelection => "No student selected.",
            NoData::EmptyFilterResult { .. } => "No grades available.",
        }
    }
}
