//! Read-through cache for the loaded feedback table.

use std::sync::Arc;

use tracing::{debug, info};

use crate::error::Result;
use crate::record::FeedbackTable;
use crate::source::{DataSource, SourceSignature};

/// Holds the most recently loaded table together with the signature of the
/// source it was read from.
///
/// The table is shared read-only; a reload replaces the `Arc` rather than
/// mutating the table behind it.
#[derive(Debug, Default)]
pub struct TableCache {
    entry: Option<CacheEntry>,
    loads: usize,
}

#[derive(Debug)]
struct CacheEntry {
    signature: SourceSignature,
    table: Arc<FeedbackTable>,
    dropped_rows: usize,
}

impl TableCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached table, loading it first when the cache is empty or
    /// the source signature has changed.
    pub fn get_or_load<S: DataSource + ?Sized>(&mut self, source: &S) -> Result<Arc<FeedbackTable>> {
        let signature = source.signature()?;

        if let Some(entry) = &self.entry {
            if entry.signature == signature {
                debug!(path = %signature.path.display(), "Feedback table cache hit");
                return Ok(Arc::clone(&entry.table));
            }
            info!(path = %signature.path.display(), "Feedback source changed, reloading");
        }

        let loaded = source.load()?;
        let table = Arc::new(loaded.table);
        self.loads += 1;
        self.entry = Some(CacheEntry {
            signature,
            table: Arc::clone(&table),
            dropped_rows: loaded.dropped_rows,
        });
        Ok(table)
    }

    /// Number of times the source has actually been read.
    pub fn loads(&self) -> usize {
        self.loads
    }

    /// Rows dropped by the most recent load.
    pub fn dropped_rows(&self) -> usize {
        self.entry.as_ref().map_or(0, |e| e.dropped_rows)
    }
}
