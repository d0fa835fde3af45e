use std::cmp::Ordering;
use std::collections::HashMap;

use crate::analyzers::types::{CategoryShare, IssueEntry, IssueSummary, RatingDistribution};
use crate::analyzers::utility::pct;
use crate::record::{FeedbackRecord, FeedbackTable, Rating};

/// One entry per distinct issue, ordered newest first.
///
/// Issues are ranked by the most recent `created_at` among their records.
/// Issues with no dated record sort after every dated issue; ties keep the
/// order in which each issue first appears in `table`.
pub fn issue_index(table: &[FeedbackRecord]) -> Vec<IssueEntry> {
    let mut entries: Vec<IssueEntry> = Vec::new();
    let mut positions: HashMap<&str, usize> = HashMap::new();

    for record in table {
        let pos = *positions.entry(record.issue_id.as_str()).or_insert_with(|| {
            entries.push(IssueEntry {
                issue_id: record.issue_id.clone(),
                records: 0,
                latest: None,
            });
            entries.len() - 1
        });

        let entry = &mut entries[pos];
        entry.records += 1;
        if record.created_at > entry.latest {
            entry.latest = record.created_at;
        }
    }

    // sort_by is stable, so equal keys stay in first-seen order
    entries.sort_by(|a, b| match (a.latest, b.latest) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });

    entries
}

/// Distinct issue ids, newest first. See [`issue_index`] for the ordering.
pub fn list_issues(table: &[FeedbackRecord]) -> Vec<String> {
    issue_index(table)
        .into_iter()
        .map(|entry| entry.issue_id)
        .collect()
}

/// Records whose `issue_id` equals `issue_id` exactly.
pub fn filter_by_issue(table: &[FeedbackRecord], issue_id: &str) -> FeedbackTable {
    table
        .iter()
        .filter(|r| r.issue_id == issue_id)
        .cloned()
        .collect()
}

/// Counts and percentages for Good, Meh, Bad and Other.
///
/// An empty table yields zero for every count and percentage.
pub fn rating_distribution(table: &[FeedbackRecord]) -> RatingDistribution {
    let mut counts: HashMap<Rating, usize> = HashMap::new();
    for record in table {
        *counts.entry(record.category()).or_default() += 1;
    }

    let total = table.len();
    let share = |rating: Rating| {
        let count = counts.get(&rating).copied().unwrap_or(0);
        CategoryShare {
            count,
            percentage: pct(count, total),
        }
    };

    RatingDistribution {
        total,
        good: share(Rating::Good),
        meh: share(Rating::Meh),
        bad: share(Rating::Bad),
        other: share(Rating::Other),
    }
}

/// Records carrying a comment or a suggestion, in input order.
pub fn written_feedback(table: &[FeedbackRecord]) -> FeedbackTable {
    table.iter().filter(|r| r.is_written()).cloned().collect()
}

/// Distinct article titles in first-seen order.
pub fn articles_in(table: &[FeedbackRecord]) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for title in table.iter().filter_map(|r| r.article_title.as_deref()) {
        if !seen.iter().any(|s| s == title) {
            seen.push(title.to_string());
        }
    }
    seen
}

/// Every distinct article title, sorted alphabetically.
pub fn all_articles(table: &[FeedbackRecord]) -> Vec<String> {
    let mut titles = articles_in(table);
    titles.sort();
    titles
}

/// Issue of the first record about `title`, if any.
pub fn issue_for_article(table: &[FeedbackRecord], title: &str) -> Option<String> {
    table
        .iter()
        .find(|r| r.article_title.as_deref() == Some(title))
        .map(|r| r.issue_id.clone())
}

/// Runs the per-issue aggregations and bundles their results.
pub fn summarize(table: &[FeedbackRecord], issue_id: &str) -> IssueSummary {
    let rows = filter_by_issue(table, issue_id);
    let written = written_feedback(&rows);

    IssueSummary {
        issue_id: issue_id.to_string(),
        total: rows.len(),
        distribution: rating_distribution(&rows),
        written_count: written.len(),
        written,
        articles: articles_in(&rows),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};

    fn record(issue: &str, rating: &str, comment: Option<&str>) -> FeedbackRecord {
        FeedbackRecord {
            issue_id: issue.to_string(),
            rating: Some(rating.to_string()),
            comment: comment.map(str::to_string),
            ..Default::default()
        }
    }

    fn dated(issue: &str, day: u32) -> FeedbackRecord {
        FeedbackRecord {
            issue_id: issue.to_string(),
            created_at: Some(at(day)),
            ..Default::default()
        }
    }

    fn at(day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, day)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap()
    }

    fn sample_table() -> FeedbackTable {
        vec![
            record("#1", "Good", Some("Great!")),
            record("#1", "Bad", None),
            record("#2", "Meh", Some("ok")),
        ]
    }

    #[test]
    fn test_filter_by_issue_exact_match() {
        let table = sample_table();
        assert_eq!(filter_by_issue(&table, "#1").len(), 2);
        assert!(filter_by_issue(&table, "#").is_empty());
        assert!(filter_by_issue(&table, "#3").is_empty());
    }

    #[test]
    fn test_distribution_for_sample_issue() {
        let issue = filter_by_issue(&sample_table(), "#1");
        let dist = rating_distribution(&issue);

        assert_eq!(dist.total, 2);
        assert_eq!(dist.good, CategoryShare { count: 1, percentage: 50.0 });
        assert_eq!(dist.meh, CategoryShare { count: 0, percentage: 0.0 });
        assert_eq!(dist.bad, CategoryShare { count: 1, percentage: 50.0 });
        assert_eq!(dist.other, CategoryShare { count: 0, percentage: 0.0 });
    }

    #[test]
    fn test_distribution_empty_table_is_all_zero() {
        let dist = rating_distribution(&[]);
        assert_eq!(dist.total, 0);
        for (_, share) in dist.iter() {
            assert_eq!(share.count, 0);
            assert_eq!(share.percentage, 0.0);
        }
    }

    #[test]
    fn test_distribution_percentages_sum_to_hundred() {
        let table = vec![
            record("#1", "Good", None),
            record("#1", "good ", None),
            record("#1", "Meh", None),
            record("#1", "Bad", None),
            record("#1", "Excellent", None),
            record("#1", "", None),
            record("#1", "bad", None),
        ];
        let dist = rating_distribution(&table);
        let sum: f64 = dist.iter().map(|(_, s)| s.percentage).sum();
        assert!((sum - 100.0).abs() < 1e-6);
        assert_eq!(dist.other.count, 2);
        assert_eq!(dist.good.count, 2);
    }

    #[test]
    fn test_mixed_case_rating_counts_as_good() {
        let dist = rating_distribution(&[record("#1", "GOOD ", None)]);
        assert_eq!(dist.good.count, 1);
        assert_eq!(dist.other.count, 0);
    }

    #[test]
    fn test_written_feedback_keeps_commented_rows() {
        let issue = filter_by_issue(&sample_table(), "#1");
        let written = written_feedback(&issue);
        assert_eq!(written.len(), 1);
        assert_eq!(written[0].comment.as_deref(), Some("Great!"));
    }

    #[test]
    fn test_written_feedback_includes_suggestions_and_is_idempotent() {
        let mut table = sample_table();
        table.push(FeedbackRecord {
            issue_id: "#2".into(),
            suggestion: Some("Shorter intro".into()),
            ..Default::default()
        });
        table.push(record("#2", "Good", Some("")));

        let written = written_feedback(&table);
        assert_eq!(written.len(), 3);
        assert_eq!(written_feedback(&written), written);
        assert!(written.iter().all(|r| r.is_written()));
    }

    #[test]
    fn test_list_issues_newest_first() {
        let table = vec![dated("#1", 1), dated("#2", 3), dated("#1", 5), dated("#3", 2)];
        assert_eq!(list_issues(&table), vec!["#1", "#2", "#3"]);
    }

    #[test]
    fn test_list_issues_undated_last_in_first_seen_order() {
        let table = vec![
            record("#u1", "Good", None),
            dated("#old", 1),
            record("#u2", "Good", None),
            dated("#new", 9),
            record("#u1", "Bad", None),
        ];
        assert_eq!(list_issues(&table), vec!["#new", "#old", "#u1", "#u2"]);
    }

    #[test]
    fn test_list_issues_ties_are_stable() {
        let table = vec![dated("#b", 4), dated("#a", 4), dated("#c", 4)];
        assert_eq!(list_issues(&table), vec!["#b", "#a", "#c"]);
    }

    #[test]
    fn test_issue_index_counts_records() {
        let table = vec![dated("#1", 1), dated("#1", 2), record("#1", "Good", None)];
        let index = issue_index(&table);
        assert_eq!(index.len(), 1);
        assert_eq!(index[0].records, 3);
        assert_eq!(index[0].latest, Some(at(2)));
    }

    #[test]
    fn test_list_issues_empty_table() {
        assert!(list_issues(&[]).is_empty());
    }

    #[test]
    fn test_articles_first_seen_and_sorted() {
        let mut table = sample_table();
        table[0].article_title = Some("Zebra".into());
        table[1].article_title = Some("Apple".into());
        table[2].article_title = Some("Zebra".into());

        assert_eq!(articles_in(&table), vec!["Zebra", "Apple"]);
        assert_eq!(all_articles(&table), vec!["Apple", "Zebra"]);
        assert!(articles_in(&sample_table()).is_empty());
    }

    #[test]
    fn test_issue_for_article() {
        let mut table = sample_table();
        table[2].article_title = Some("On Coffee".into());
        assert_eq!(issue_for_article(&table, "On Coffee").as_deref(), Some("#2"));
        assert_eq!(issue_for_article(&table, "on coffee"), None);
    }

    #[test]
    fn test_summarize_unknown_issue_is_zero_state() {
        let summary = summarize(&sample_table(), "#404");
        assert_eq!(summary.total, 0);
        assert_eq!(summary.written_count, 0);
        assert!(summary.written.is_empty());
        assert_eq!(summary.distribution, rating_distribution(&[]));
    }
}
