//! Column normalization for feedback exports.
//!
//! Exports arrive with survey-question headers, hand-renamed headers, or no
//! header row at all. [`ColumnMap`] resolves each [`Field`] to a column
//! index using the built-in aliases, any extra aliases from a
//! [`ColumnAliases`] file, and finally a positional [`Layout`].

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use crate::error::{FeedbackError, Result};

/// A feedback attribute that can be read from a CSV column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    IssueId,
    CreatedAt,
    Rating,
    Comment,
    Suggestion,
    ArticleTitle,
}

impl Field {
    pub const ALL: [Field; 6] = [
        Field::IssueId,
        Field::CreatedAt,
        Field::Rating,
        Field::Comment,
        Field::Suggestion,
        Field::ArticleTitle,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Field::IssueId => "issue_id",
            Field::CreatedAt => "created_at",
            Field::Rating => "rating",
            Field::Comment => "comment",
            Field::Suggestion => "suggestion",
            Field::ArticleTitle => "article_title",
        }
    }

    fn builtin_aliases(self) -> &'static [&'static str] {
        match self {
            Field::IssueId => &["newsletter", "issue", "issue id", "newsletter issue", "edition"],
            Field::CreatedAt => &["created time", "created", "created at", "date", "timestamp"],
            Field::Rating => &[
                "how did you like this week's issue?",
                "rating",
                "vote",
                "sentiment",
            ],
            Field::Comment => &[
                "while you're here, do you mind telling us why you chose that? (optional)",
                "comments",
                "comment",
                "why",
            ],
            Field::Suggestion => &["suggestions", "suggestion"],
            Field::ArticleTitle => &["essays", "essay", "article title", "article", "articles"],
        }
    }

    /// Phrase that identifies a reworded survey question for this field.
    fn keyword(self) -> Option<&'static str> {
        match self {
            Field::Rating => Some("how did you like"),
            Field::Comment => Some("why you chose"),
            Field::Suggestion => Some("suggest"),
            _ => None,
        }
    }
}

/// Lowercases, maps `_` to space and collapses runs of whitespace.
pub fn normalize_header(header: &str) -> String {
    header
        .replace('_', " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Extra header aliases per field, loaded from a JSON file:
///
/// ```json
/// {
///   "issue_id": ["Edition name"],
///   "comment": ["Tell us more"]
/// }
/// ```
#[derive(Debug, Default, Clone)]
pub struct ColumnAliases {
    entries: HashMap<Field, Vec<String>>,
}

impl ColumnAliases {
    /// Loads aliases from the JSON file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            FeedbackError::Configuration(format!("cannot read '{}': {e}", path.display()))
        })?;
        Self::from_json(&content)
            .map_err(|e| FeedbackError::Configuration(format!("{}: {e}", path.display())))
    }

    pub fn from_json(content: &str) -> std::result::Result<Self, serde_json::Error> {
        let raw: HashMap<Field, Vec<String>> = serde_json::from_str(content)?;
        let entries = raw
            .into_iter()
            .map(|(field, names)| (field, names.iter().map(|n| normalize_header(n)).collect()))
            .collect();
        Ok(Self { entries })
    }

    /// Returns the extra aliases configured for `field`.
    pub fn get(&self, field: Field) -> &[String] {
        self.entries.get(&field).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Fixed column orders used when a file has no recognizable header row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// `Newsletter, Created time, Essays, Rating, Comments`
    Compact,
    /// `Newsletter, Created time, Rating, Comments, Suggestions, Essays`,
    /// followed by two or three columns that are ignored.
    Extended,
}

impl Layout {
    pub fn for_width(width: usize) -> Option<Layout> {
        match width {
            5 => Some(Layout::Compact),
            8 | 9 => Some(Layout::Extended),
            _ => None,
        }
    }

    fn position(self, field: Field) -> usize {
        match (self, field) {
            (_, Field::IssueId) => 0,
            (_, Field::CreatedAt) => 1,
            (Layout::Compact, Field::ArticleTitle) => 2,
            (Layout::Compact, Field::Rating) => 3,
            (Layout::Compact, Field::Comment) => 4,
            (Layout::Compact, Field::Suggestion) => usize::MAX,
            (Layout::Extended, Field::Rating) => 2,
            (Layout::Extended, Field::Comment) => 3,
            (Layout::Extended, Field::Suggestion) => 4,
            (Layout::Extended, Field::ArticleTitle) => 5,
        }
    }
}

/// Column index for each field, where one was found.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMap {
    indices: HashMap<Field, usize>,
}

impl ColumnMap {
    /// Resolves fields by header name: exact alias match first, then the
    /// question keyword for fields that have one.
    pub fn from_headers<S: AsRef<str>>(headers: &[S], aliases: &ColumnAliases) -> Self {
        let normalized: Vec<String> = headers.iter().map(|h| normalize_header(h.as_ref())).collect();
        let mut indices = HashMap::new();

        for field in Field::ALL {
            let by_alias = normalized.iter().position(|h| {
                aliases.get(field).iter().any(|a| a == h)
                    || field.builtin_aliases().iter().any(|a| *a == h.as_str())
            });
            let found = by_alias.or_else(|| {
                field.keyword().and_then(|kw| {
                    normalized
                        .iter()
                        .enumerate()
                        .position(|(i, h)| h.contains(kw) && !indices.values().any(|&v| v == i))
                })
            });
            if let Some(idx) = found {
                indices.insert(field, idx);
            }
        }

        Self { indices }
    }

    pub fn from_layout(layout: Layout, width: usize) -> Self {
        let indices = Field::ALL
            .into_iter()
            .map(|f| (f, layout.position(f)))
            .filter(|&(_, idx)| idx < width)
            .collect();
        Self { indices }
    }

    pub fn index(&self, field: Field) -> Option<usize> {
        self.indices.get(&field).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Names of required fields that did not resolve to a column.
    ///
    /// Comment and suggestion are interchangeable: only one of them is needed.
    pub fn missing_required(&self) -> Vec<String> {
        let mut missing: Vec<String> = [Field::IssueId, Field::CreatedAt, Field::Rating]
            .into_iter()
            .filter(|f| self.index(*f).is_none())
            .map(|f| f.name().to_string())
            .collect();

        if self.index(Field::Comment).is_none() && self.index(Field::Suggestion).is_none() {
            missing.push("comment or suggestion".to_string());
        }
        missing
    }
}
