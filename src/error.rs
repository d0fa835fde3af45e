use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failures raised while loading or exporting feedback data.
///
/// Aggregation itself never fails; every variant here originates at the
/// data-source or export boundary.
#[derive(Debug, Error)]
pub enum FeedbackError {
    #[error("feedback source '{}' is unavailable: {reason}", .path.display())]
    SourceUnavailable { path: PathBuf, reason: String },
    #[error(
        "feedback source '{}' is missing expected columns [{}] (found: [{}])",
        .path.display(),
        .missing.join(", "),
        .found.join(", ")
    )]
    SchemaMismatch {
        path: PathBuf,
        missing: Vec<String>,
        found: Vec<String>,
    },
    #[error("feedback source '{}' has an unreadable record at line {line}: {reason}", .path.display())]
    MalformedRow {
        path: PathBuf,
        line: u64,
        reason: String,
    },
    #[error("column configuration error: {0}")]
    Configuration(String),
    #[error("CSV export failed: {0}")]
    Export(#[from] csv::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, FeedbackError>;
