//! Runtime settings resolved from CLI flags, the environment, and `.env`.

use std::path::PathBuf;

use crate::error::Result;
use crate::source::CsvSource;
use crate::source::columns::ColumnAliases;

pub const DEFAULT_CSV: &str = "feedback.csv";
pub const DEFAULT_LOG_FILE: &str = "logs/feedback_board.log";

/// Where to read feedback from and how to interpret its columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub csv_path: PathBuf,
    pub columns_path: Option<PathBuf>,
    pub has_headers: bool,
}

impl Settings {
    /// Resolves settings, preferring explicit values over `FEEDBACK_CSV` and
    /// `FEEDBACK_COLUMNS`.
    pub fn resolve(csv: Option<String>, columns: Option<String>, no_headers: bool) -> Self {
        Self::resolve_with(csv, columns, no_headers, |key| std::env::var(key).ok())
    }

    fn resolve_with(
        csv: Option<String>,
        columns: Option<String>,
        no_headers: bool,
        env: impl Fn(&str) -> Option<String>,
    ) -> Self {
        let csv_path = csv
            .or_else(|| env("FEEDBACK_CSV"))
            .unwrap_or_else(|| DEFAULT_CSV.to_string());
        let columns_path = columns
            .or_else(|| env("FEEDBACK_COLUMNS"))
            .filter(|p| !p.is_empty());

        Self {
            csv_path: PathBuf::from(csv_path),
            columns_path: columns_path.map(PathBuf::from),
            has_headers: !no_headers,
        }
    }

    /// Builds the CSV source these settings describe, loading the alias
    /// file if one is configured.
    pub fn source(&self) -> Result<CsvSource> {
        let mut source = CsvSource::new(&self.csv_path);
        if let Some(path) = &self.columns_path {
            source = source.with_aliases(ColumnAliases::load(path)?);
        }
        if !self.has_headers {
            source = source.without_headers();
        }
        Ok(source)
    }
}

/// Log file location from `LOG_FILE_PATH`, or the default.
pub fn log_file_path() -> PathBuf {
    std::env::var("LOG_FILE_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_LOG_FILE))
}
