//! Feedback ingestion.
//!
//! [`DataSource`] is the seam between the pipeline and wherever the
//! feedback export lives. [`CsvSource`] reads a CSV file, resolving its
//! columns through [`ColumnMap`](columns::ColumnMap).

pub mod columns;
pub mod dates;

use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use csv::{ReaderBuilder, StringRecord};
use tracing::{debug, info, warn};

use crate::error::{FeedbackError, Result};
use crate::record::{FeedbackRecord, FeedbackTable};
use columns::{ColumnAliases, ColumnMap, Field, Layout};
use dates::parse_timestamp;

/// Identity of a source's current contents. A changed signature means the
/// cached table is stale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSignature {
    pub path: PathBuf,
    pub len: u64,
    pub modified: Option<SystemTime>,
}

/// A fully loaded table plus the number of rows rejected for lacking an
/// issue id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadedTable {
    pub table: FeedbackTable,
    pub dropped_rows: usize,
}

/// Supplies a feedback table, or a typed error. Never a partial table.
pub trait DataSource {
    fn signature(&self) -> Result<SourceSignature>;
    fn load(&self) -> Result<LoadedTable>;
}

/// Reads feedback from a CSV export on disk.
#[derive(Debug, Clone)]
pub struct CsvSource {
    path: PathBuf,
    aliases: ColumnAliases,
    has_headers: bool,
}

impl CsvSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            aliases: ColumnAliases::default(),
            has_headers: true,
        }
    }

    pub fn with_aliases(mut self, aliases: ColumnAliases) -> Self {
        self.aliases = aliases;
        self
    }

    /// Skips header lookup and maps columns by position.
    pub fn without_headers(mut self) -> Self {
        self.has_headers = false;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn unavailable(&self, reason: impl ToString) -> FeedbackError {
        FeedbackError::SourceUnavailable {
            path: self.path.clone(),
            reason: reason.to_string(),
        }
    }

    /// Picks the column map for this file. Returns the map and whether the
    /// first record is data rather than a header row.
    ///
    /// A header row is only trusted when every required field resolves. A
    /// partial match on a file of a known width uses the positional layout
    /// instead; the first record is kept as data when its date cell parses.
    fn resolve_columns(&self, first: &StringRecord) -> Result<(ColumnMap, bool)> {
        let found: Vec<String> = first.iter().map(str::to_string).collect();
        let width = first.len();
        let layout = Layout::for_width(width);

        let matched = if self.has_headers {
            let map = ColumnMap::from_headers(&found, &self.aliases);
            let missing = map.missing_required();
            if missing.is_empty() {
                return Ok((map, false));
            }
            if layout.is_none() && !map.is_empty() {
                return Err(FeedbackError::SchemaMismatch {
                    path: self.path.clone(),
                    missing,
                    found,
                });
            }
            !map.is_empty()
        } else {
            false
        };

        let Some(layout) = layout else {
            return Err(FeedbackError::SchemaMismatch {
                path: self.path.clone(),
                missing: Field::ALL.iter().map(|f| f.name().to_string()).collect(),
                found,
            });
        };

        let columns = ColumnMap::from_layout(layout, width);
        let first_is_data = !matched || has_timestamp(first, &columns);
        if self.has_headers {
            warn!(
                path = %self.path.display(),
                width,
                first_is_data,
                "Headers incomplete or unrecognized, falling back to positional layout"
            );
        }
        debug!(?layout, width, "Using positional layout");
        Ok((columns, first_is_data))
    }
}

fn has_timestamp(row: &StringRecord, columns: &ColumnMap) -> bool {
    columns
        .index(Field::CreatedAt)
        .and_then(|idx| row.get(idx))
        .and_then(parse_timestamp)
        .is_some()
}

impl DataSource for CsvSource {
    fn signature(&self) -> Result<SourceSignature> {
        let meta = std::fs::metadata(&self.path).map_err(|e| self.unavailable(e))?;
        Ok(SourceSignature {
            path: self.path.clone(),
            len: meta.len(),
            modified: meta.modified().ok(),
        })
    }

    #[tracing::instrument(skip(self), fields(path = %self.path.display()))]
    fn load(&self) -> Result<LoadedTable> {
        let file = File::open(&self.path).map_err(|e| self.unavailable(e))?;
        let mut rdr = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(file);

        let mut records = rdr.records();
        let first = match records.next() {
            Some(result) => result.map_err(|e| malformed(&self.path, e))?,
            None => return Err(self.unavailable("file is empty")),
        };

        let (columns, first_is_data) = self.resolve_columns(&first)?;

        let mut loaded = LoadedTable::default();
        let rows = first_is_data
            .then_some(Ok(first))
            .into_iter()
            .chain(records);

        for result in rows {
            let row = result.map_err(|e| malformed(&self.path, e))?;
            match to_record(&row, &columns) {
                Some(record) => loaded.table.push(record),
                None => {
                    loaded.dropped_rows += 1;
                    warn!(
                        line = row.position().map(|p| p.line()),
                        "Dropping feedback row without an issue id"
                    );
                }
            }
        }

        info!(
            records = loaded.table.len(),
            dropped = loaded.dropped_rows,
            "Feedback table loaded"
        );
        Ok(loaded)
    }
}

fn malformed(path: &Path, err: csv::Error) -> FeedbackError {
    let line = err.position().map(|p| p.line()).unwrap_or(0);
    FeedbackError::MalformedRow {
        path: path.to_path_buf(),
        line,
        reason: err.to_string(),
    }
}

/// Builds a record from one CSV row. Returns `None` when the issue id is
/// blank or absent.
fn to_record(row: &StringRecord, columns: &ColumnMap) -> Option<FeedbackRecord> {
    let cell = |field: Field| -> Option<String> {
        columns
            .index(field)
            .and_then(|idx| row.get(idx))
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };

    Some(FeedbackRecord {
        issue_id: cell(Field::IssueId)?,
        created_at: cell(Field::CreatedAt).and_then(|raw| parse_timestamp(&raw)),
        rating: cell(Field::Rating),
        comment: cell(Field::Comment),
        suggestion: cell(Field::Suggestion),
        article_title: cell(Field::ArticleTitle),
    })
}
