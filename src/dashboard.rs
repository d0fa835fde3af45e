//! Load → filter → aggregate pipeline behind a single typed boundary.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::analyzers::aggregate::{all_articles, issue_for_article, issue_index, summarize};
use crate::analyzers::types::{IssueEntry, IssueSummary};
use crate::cache::TableCache;
use crate::error::Result;
use crate::record::FeedbackTable;
use crate::source::DataSource;

/// Which issue the viewer asked for.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Selection {
    /// The most recent issue.
    #[default]
    Latest,
    Issue(String),
    /// The issue containing the named article.
    Article(String),
}

/// Everything rendered for one view of the board.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IssueView {
    pub issues: Vec<IssueEntry>,
    pub summary: IssueSummary,
    /// Article the selection was resolved from, when it was.
    pub article: Option<String>,
    pub dropped_rows: usize,
}

/// Owns a data source and the cache of its table.
pub struct Dashboard<S> {
    source: S,
    cache: TableCache,
}

impl<S: DataSource> Dashboard<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            cache: TableCache::new(),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn cache(&self) -> &TableCache {
        &self.cache
    }

    pub fn table(&mut self) -> Result<Arc<FeedbackTable>> {
        self.cache.get_or_load(&self.source)
    }

    /// Issues newest first, with record counts.
    pub fn issues(&mut self) -> Result<Vec<IssueEntry>> {
        Ok(issue_index(&self.table()?))
    }

    /// Article titles across every issue, alphabetically.
    pub fn articles(&mut self) -> Result<Vec<String>> {
        Ok(all_articles(&self.table()?))
    }

    /// Builds the view for `selection`.
    ///
    /// Only loading can fail. An issue with no records yields a zero-state
    /// summary, and an article that matches nothing falls back to the most
    /// recent issue.
    #[tracing::instrument(skip(self))]
    pub fn view(&mut self, selection: &Selection) -> Result<IssueView> {
        let table = self.table()?;
        let issues = issue_index(&table);
        let latest = issues.first().map(|e| e.issue_id.clone());

        let (issue_id, article) = match selection {
            Selection::Latest => (latest, None),
            Selection::Issue(id) => (Some(id.clone()), None),
            Selection::Article(title) => match issue_for_article(&table, title) {
                Some(id) => (Some(id), Some(title.clone())),
                None => {
                    warn!(article = %title, "No issue found for article, showing latest");
                    (latest, None)
                }
            },
        };

        let issue_id = issue_id.unwrap_or_default();
        let summary = summarize(&table, &issue_id);
        if summary.total == 0 {
            info!(issue = %issue_id, "Selected issue has no feedback");
        } else {
            debug!(
                issue = %issue_id,
                total = summary.total,
                written = summary.written_count,
                "Issue summarized"
            );
        }

        Ok(IssueView {
            issues,
            summary,
            article,
            dropped_rows: self.cache.dropped_rows(),
        })
    }
}
