use chrono::NaiveDateTime;
use serde::Serialize;

/// One reader response to a newsletter issue.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FeedbackRecord {
    pub issue_id: String,
    pub created_at: Option<NaiveDateTime>,
    pub rating: Option<String>,
    pub comment: Option<String>,
    pub suggestion: Option<String>,
    pub article_title: Option<String>,
}

/// Feedback rows in the order the source produced them.
pub type FeedbackTable = Vec<FeedbackRecord>;

/// Sentiment bucket a raw rating label falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Rating {
    Good,
    Meh,
    Bad,
    Other,
}

impl Rating {
    pub const ALL: [Rating; 4] = [Rating::Good, Rating::Meh, Rating::Bad, Rating::Other];

    /// Trims and case-folds `raw`, then matches it exactly against the three
    /// known labels. Blank, missing, or unrecognized labels are `Other`.
    pub fn classify(raw: Option<&str>) -> Rating {
        match raw.map(|r| r.trim().to_lowercase()).as_deref() {
            Some("good") => Rating::Good,
            Some("meh") => Rating::Meh,
            Some("bad") => Rating::Bad,
            _ => Rating::Other,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Rating::Good => "GOOD",
            Rating::Meh => "MEH",
            Rating::Bad => "BAD",
            Rating::Other => "OTHER",
        }
    }
}

impl FeedbackRecord {
    pub fn category(&self) -> Rating {
        Rating::classify(self.rating.as_deref())
    }

    /// Rating text as shown on a feedback tile: trimmed and upper-cased,
    /// falling back to the category label when the raw value is blank.
    pub fn display_rating(&self) -> String {
        match self.rating.as_deref().map(str::trim) {
            Some(r) if !r.is_empty() => r.to_uppercase(),
            _ => self.category().label().to_string(),
        }
    }

    pub fn has_comment(&self) -> bool {
        has_text(&self.comment)
    }

    pub fn has_suggestion(&self) -> bool {
        has_text(&self.suggestion)
    }

    /// True when the reader left a comment or a suggestion.
    pub fn is_written(&self) -> bool {
        self.has_comment() || self.has_suggestion()
    }
}

fn has_text(field: &Option<String>) -> bool {
    field.as_deref().is_some_and(|s| !s.trim().is_empty())
}
