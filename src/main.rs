//! CLI entry point for the newsletter feedback board.
//!
//! Provides subcommands for listing issues and articles, showing the board
//! for one issue, exporting its written feedback, and watching the export
//! for changes.

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use feedback_board::config::{Settings, log_file_path};
use feedback_board::dashboard::{Dashboard, Selection};
use feedback_board::error::FeedbackError;
use feedback_board::output::{print_pretty, render_issue_list, render_text, to_json, write_records};
use feedback_board::source::CsvSource;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, error, info};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "feedback_board")]
#[command(about = "Reader feedback dashboard for newsletter issues", long_about = None)]
struct Cli {
    /// Feedback CSV export (defaults to $FEEDBACK_CSV, then feedback.csv)
    #[arg(long, global = true, value_name = "FILE")]
    csv: Option<String>,

    /// JSON file with extra column header aliases (defaults to $FEEDBACK_COLUMNS)
    #[arg(long, global = true, value_name = "FILE")]
    columns: Option<String>,

    /// The CSV has no header row; map columns by position
    #[arg(long, global = true, default_value_t = false)]
    no_headers: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Json,
}

#[derive(clap::Args)]
struct Pick {
    /// Issue to show (defaults to the most recent)
    #[arg(short, long, conflicts_with = "article")]
    issue: Option<String>,

    /// Show the issue containing this article title
    #[arg(short, long)]
    article: Option<String>,
}

impl Pick {
    fn selection(self) -> Selection {
        match (self.issue, self.article) {
            (Some(id), _) => Selection::Issue(id),
            (None, Some(title)) => Selection::Article(title),
            (None, None) => Selection::Latest,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// List issues, most recent first
    Issues,
    /// List article titles alphabetically
    Articles,
    /// Show rating statistics and written feedback for one issue
    Show {
        #[command(flatten)]
        pick: Pick,

        #[arg(short, long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },
    /// Write the written feedback for one issue to a CSV file
    Export {
        #[command(flatten)]
        pick: Pick,

        /// CSV file to write
        #[arg(short, long, default_value = "written_feedback.csv")]
        output: PathBuf,
    },
    /// Re-render an issue whenever the CSV export changes
    Watch {
        #[command(flatten)]
        pick: Pick,

        /// Seconds between checks
        #[arg(short = 'r', long, default_value_t = 5)]
        interval: u64,

        /// Number of checks (0 = infinite)
        #[arg(short = 'n', long, default_value_t = 0)]
        rounds: usize,
    },
}

fn main() {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path = log_file_path();
    let log_dir = log_file_path.parent().unwrap_or(Path::new("logs"));
    let log_file_name = log_file_path
        .file_name()
        .unwrap_or(OsStr::new("feedback_board.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(env_filter("RUST_LOG", "info"));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(env_filter("RUST_LOG_JSON", "debug"));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    if let Err(err) = run(cli) {
        report(&err);
        // exit skips destructors, so flush the file appender first
        drop(file_guard);
        std::process::exit(1);
    }
}

fn env_filter(var: &str, default: &str) -> EnvFilter {
    EnvFilter::try_from_env(var).unwrap_or_else(|_| EnvFilter::new(default))
}

fn run(cli: Cli) -> Result<()> {
    let settings = Settings::resolve(cli.csv, cli.columns, cli.no_headers);
    debug!(?settings, "Resolved settings");
    let mut board = Dashboard::new(settings.source()?);

    match cli.command {
        Commands::Issues => {
            let issues = board.issues()?;
            info!(total = issues.len(), "Issue list built");
            print!("{}", render_issue_list(&issues));
        }
        Commands::Articles => {
            for title in board.articles()? {
                println!("{title}");
            }
        }
        Commands::Show { pick, format } => {
            let view = board.view(&pick.selection())?;
            print_pretty(&view);
            match format {
                Format::Text => print!("{}", render_text(&view)),
                Format::Json => println!("{}", to_json(&view)?),
            }
        }
        Commands::Export { pick, output } => {
            let view = board.view(&pick.selection())?;
            write_records(&output, &view.summary.written)?;
            info!(
                issue = %view.summary.issue_id,
                rows = view.summary.written_count,
                output = %output.display(),
                "Written feedback exported"
            );
        }
        Commands::Watch {
            pick,
            interval,
            rounds,
        } => watch(&mut board, pick.selection(), interval, rounds)?,
    }

    Ok(())
}

/// Re-runs the pipeline every `interval` seconds, printing the board again
/// only when the source was reloaded.
#[tracing::instrument(skip(board), fields(path = %board.source().path().display()))]
fn watch(
    board: &mut Dashboard<CsvSource>,
    selection: Selection,
    interval: u64,
    rounds: usize,
) -> Result<()> {
    if rounds == 0 {
        info!(interval, "Watching indefinitely. Press Ctrl+C to stop.");
    }

    let mut round = 0;
    let mut seen_loads = 0;

    loop {
        if rounds > 0 && round >= rounds {
            break;
        }
        round += 1;

        match board.view(&selection) {
            Ok(view) => {
                let loads = board.cache().loads();
                if loads != seen_loads {
                    seen_loads = loads;
                    println!("{}", "=".repeat(60));
                    print!("{}", render_text(&view));
                } else {
                    debug!(round, "Source unchanged");
                }
            }
            // A file being rewritten can briefly disappear or be half written.
            Err(err) => error!(round, error = %err, "Refresh failed, keeping previous board"),
        }

        if rounds == 0 || round < rounds {
            std::thread::sleep(Duration::from_secs(interval));
        }
    }

    info!(round, "Finished watching");
    Ok(())
}

/// Prints a message suited to the kind of failure.
fn report(err: &anyhow::Error) {
    let message = match err.downcast_ref::<FeedbackError>() {
        Some(FeedbackError::SourceUnavailable { path, reason }) => format!(
            "Could not open the feedback export at '{}': {reason}",
            path.display()
        ),
        Some(FeedbackError::SchemaMismatch { missing, found, .. }) => format!(
            "The feedback export does not have the expected columns.\n  missing: {}\n  found:   {}",
            missing.join(", "),
            found.join(", ")
        ),
        Some(FeedbackError::MalformedRow { line, reason, .. }) => {
            format!("The feedback export is malformed at line {line}: {reason}")
        }
        Some(FeedbackError::Configuration(reason)) => {
            format!("The column alias file could not be used: {reason}")
        }
        Some(FeedbackError::Export(e)) => format!("Could not write the export: {e}"),
        Some(FeedbackError::Io(e)) => format!("I/O error: {e}"),
        None => format!("Error: {err:#}"),
    };
    error!(error = %err, "Command failed");
    eprintln!("{message}");
}
