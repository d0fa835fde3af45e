//! Rendering and persistence for dashboard views.
//!
//! Supports a plain-text board, JSON serialization, and CSV export of the
//! written feedback for an issue.

use std::fmt;
use std::fs::File;
use std::path::Path;

use chrono::NaiveDateTime;
use csv::WriterBuilder;
use serde::Serialize;
use tracing::{debug, info};

use crate::analyzers::types::{IssueEntry, RatingDistribution};
use crate::dashboard::IssueView;
use crate::record::{FeedbackRecord, Rating};

const BAR_WIDTH: usize = 20;
const TILE_DATE_FORMAT: &str = "%d %b %Y";

/// Logs a view using Rust's debug pretty-print format.
pub fn print_pretty(view: &IssueView) {
    debug!("{:#?}", view);
}

/// Serializes a view as pretty-printed JSON.
pub fn to_json(view: &IssueView) -> serde_json::Result<String> {
    serde_json::to_string_pretty(view)
}

/// Formats a tile date, or an empty string when the record is undated.
pub fn format_date(created_at: Option<NaiveDateTime>) -> String {
    created_at
        .map(|dt| dt.format(TILE_DATE_FORMAT).to_string())
        .unwrap_or_default()
}

fn bar(percentage: f64) -> String {
    let filled = ((percentage / 100.0) * BAR_WIDTH as f64).round() as usize;
    let filled = filled.min(BAR_WIDTH);
    format!("{}{}", "#".repeat(filled), "-".repeat(BAR_WIDTH - filled))
}

fn write_distribution(f: &mut fmt::Formatter<'_>, dist: &RatingDistribution) -> fmt::Result {
    for (rating, share) in dist.iter() {
        if rating == Rating::Other && share.count == 0 {
            continue;
        }
        writeln!(
            f,
            "  {:<6}{:>6.1}%  {}",
            rating.label(),
            share.percentage,
            bar(share.percentage)
        )?;
    }
    Ok(())
}

fn write_tile(f: &mut fmt::Formatter<'_>, record: &FeedbackRecord) -> fmt::Result {
    writeln!(
        f,
        "[{}] {}",
        record.display_rating(),
        format_date(record.created_at)
    )?;
    if let Some(title) = &record.article_title {
        writeln!(f, "  on: {title}")?;
    }
    if let Some(comment) = record.comment.as_deref().filter(|_| record.has_comment()) {
        writeln!(f, "  Reader feedback:\n    \"{comment}\"")?;
    }
    if let Some(suggestion) = record.suggestion.as_deref().filter(|_| record.has_suggestion()) {
        writeln!(f, "  Suggestion:\n    \"{suggestion}\"")?;
    }
    Ok(())
}

/// Text board for a view: figures, bars, then one tile per written record
/// in table order.
pub struct TextBoard<'a>(pub &'a IssueView);

impl fmt::Display for TextBoard<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let view = self.0;
        let summary = &view.summary;

        if view.issues.is_empty() {
            return writeln!(f, "No feedback has been recorded yet.");
        }

        if let Some(article) = &view.article {
            writeln!(f, "Article: {article}")?;
        }
        writeln!(f, "Issue: {}", summary.issue_id)?;
        writeln!(f, "Total votes: {}", summary.total)?;
        writeln!(f, "Sentiment:")?;
        write_distribution(f, &summary.distribution)?;
        writeln!(f, "Comments: {}", summary.written_count)?;

        if !summary.articles.is_empty() {
            writeln!(f, "Articles in this issue: {}", summary.articles.join(", "))?;
        }
        writeln!(f)?;

        if summary.written.is_empty() {
            writeln!(f, "No written comments for this issue (ratings only).")?;
        } else {
            for record in &summary.written {
                write_tile(f, record)?;
                writeln!(f)?;
            }
        }

        if view.dropped_rows > 0 {
            writeln!(f, "({} rows without an issue were skipped)", view.dropped_rows)?;
        }
        Ok(())
    }
}

/// Issue picker: one line per issue, newest first.
pub struct IssueList<'a>(pub &'a [IssueEntry]);

impl fmt::Display for IssueList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for entry in self.0 {
            writeln!(
                f,
                "{:<24} {:>5} responses  {}",
                entry.issue_id,
                entry.records,
                format_date(entry.latest)
            )?;
        }
        Ok(())
    }
}

pub fn render_text(view: &IssueView) -> String {
    TextBoard(view).to_string()
}

pub fn render_issue_list(entries: &[IssueEntry]) -> String {
    IssueList(entries).to_string()
}

#[derive(Serialize)]
struct ExportRow<'a> {
    issue_id: &'a str,
    created_at: Option<NaiveDateTime>,
    rating: Option<&'a str>,
    category: Rating,
    comment: Option<&'a str>,
    suggestion: Option<&'a str>,
    article_title: Option<&'a str>,
}

/// Writes `records` to a new CSV file at `path`, replacing any existing file.
pub fn write_records(path: &Path, records: &[FeedbackRecord]) -> crate::error::Result<()> {
    debug!(path = %path.display(), rows = records.len(), "Writing CSV export");

    let file = File::create(path)?;
    let mut writer = WriterBuilder::new().has_headers(true).from_writer(file);

    for record in records {
        writer.serialize(ExportRow {
            issue_id: &record.issue_id,
            created_at: record.created_at,
            rating: record.rating.as_deref(),
            category: record.category(),
            comment: record.comment.as_deref(),
            suggestion: record.suggestion.as_deref(),
            article_title: record.article_title.as_deref(),
        })?;
    }
    writer.flush()?;

    info!(path = %path.display(), rows = records.len(), "CSV export written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::aggregate::{issue_index, summarize};
    use chrono::NaiveDate;
    use std::fs;

    fn table() -> Vec<FeedbackRecord> {
        vec![
            FeedbackRecord {
                issue_id: "#1".into(),
                created_at: NaiveDate::from_ymd_opt(2024, 1, 5).and_then(|d| d.and_hms_opt(15, 45, 0)),
                rating: Some("good".into()),
                comment: Some("Great!".into()),
                article_title: Some("On Espresso".into()),
                ..Default::default()
            },
            FeedbackRecord {
                issue_id: "#1".into(),
                rating: Some("Bad".into()),
                ..Default::default()
            },
        ]
    }

    fn view_for(issue: &str) -> IssueView {
        let table = table();
        IssueView {
            issues: issue_index(&table),
            summary: summarize(&table, issue),
            article: None,
            dropped_rows: 0,
        }
    }

    #[test]
    fn test_format_date() {
        let dt = NaiveDate::from_ymd_opt(2024, 1, 5).and_then(|d| d.and_hms_opt(0, 0, 0));
        assert_eq!(format_date(dt), "05 Jan 2024");
        assert_eq!(format_date(None), "");
    }

    #[test]
    fn test_bar_bounds() {
        assert_eq!(bar(0.0), "-".repeat(BAR_WIDTH));
        assert_eq!(bar(100.0), "#".repeat(BAR_WIDTH));
        assert_eq!(bar(50.0).matches('#').count(), BAR_WIDTH / 2);
    }

    #[test]
    fn test_render_text_lists_figures_and_tiles() {
        let text = render_text(&view_for("#1"));
        assert!(text.contains("Total votes: 2"));
        assert!(text.contains("GOOD    50.0%"));
        assert!(text.contains("BAD     50.0%"));
        assert!(!text.contains("OTHER"));
        assert!(text.contains("Comments: 1"));
        assert!(text.contains("[GOOD] 05 Jan 2024"));
        assert!(text.contains("\"Great!\""));
        assert!(text.contains("Articles in this issue: On Espresso"));
    }

    #[test]
    fn test_render_text_zero_state() {
        let text = render_text(&view_for("#404"));
        assert!(text.contains("Total votes: 0"));
        assert!(text.contains("No written comments"));
    }

    #[test]
    fn test_text_board_matches_render_text() {
        let view = view_for("#1");
        assert_eq!(format!("{}", TextBoard(&view)), render_text(&view));
        let empty = IssueView {
            issues: Vec::new(),
            summary: summarize(&[], ""),
            article: None,
            dropped_rows: 0,
        };
        assert_eq!(render_text(&empty), "No feedback has been recorded yet.\n");
    }

    #[test]
    fn test_render_issue_list() {
        let text = render_issue_list(&issue_index(&table()));
        assert!(text.starts_with("#1"));
        assert!(text.contains("2 responses"));
        assert!(text.contains("05 Jan 2024"));
    }

    #[test]
    fn test_to_json_contains_distribution() {
        let json = to_json(&view_for("#1")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["summary"]["distribution"]["good"]["count"], 1);
        assert_eq!(value["summary"]["written_count"], 1);
    }

    #[test]
    fn test_print_pretty_does_not_panic() {
        print_pretty(&view_for("#1"));
    }

    #[test]
    fn test_write_records_header_and_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("written.csv");

        write_records(&path, &table()).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("issue_id,created_at,rating,category"));
        assert!(lines[1].contains("Good,Great!"));
    }
}
