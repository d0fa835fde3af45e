//! Data types produced by the aggregation functions.

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::record::{FeedbackTable, Rating};

/// Count and percentage for a single rating category.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CategoryShare {
    pub count: usize,
    pub percentage: f64,
}

/// Rating breakdown over exactly the four categories.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RatingDistribution {
    pub total: usize,
    pub good: CategoryShare,
    pub meh: CategoryShare,
    pub bad: CategoryShare,
    pub other: CategoryShare,
}

impl RatingDistribution {
    pub fn get(&self, rating: Rating) -> CategoryShare {
        match rating {
            Rating::Good => self.good,
            Rating::Meh => self.meh,
            Rating::Bad => self.bad,
            Rating::Other => self.other,
        }
    }

    /// Categories paired with their shares, in Good/Meh/Bad/Other order.
    pub fn iter(&self) -> impl Iterator<Item = (Rating, CategoryShare)> + '_ {
        Rating::ALL.into_iter().map(move |r| (r, self.get(r)))
    }
}

/// An issue with its record count and most recent feedback time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IssueEntry {
    pub issue_id: String,
    pub records: usize,
    pub latest: Option<NaiveDateTime>,
}

/// Everything the presenter needs to show one issue.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IssueSummary {
    pub issue_id: String,
    pub total: usize,
    pub distribution: RatingDistribution,
    pub written_count: usize,
    pub written: FeedbackTable,
    pub articles: Vec<String>,
}
