//! # CLI Module
//!
//! Command-line interface for the duplicate image finder.
//!
//! ## Usage
//! ```bash
//! # Byte-identical files, open each pair in the viewer
//! dupe-pairs ~/Pictures
//!
//! # Similar-looking images on all cores, just list the count
//! dupe-pairs ~/Pictures --comparison-method histogram -f 0.01 --parallel --action-equal none
//!
//! # JSON output for scripting
//! dupe-pairs ~/Pictures --action-equal none --output json
//! ```

use clap::{ArgAction, Parser, ValueEnum};
use console::{style, Term};
use duplicate_image_pairs::core::action::{
    Action, ActionDispatcher, DispatchReport, ViewerCommand, DEFAULT_VIEWER,
};
use duplicate_image_pairs::core::comparator::{
    ComparisonMethod, DEFAULT_ASPECT_FUZZINESS, DEFAULT_RMS_THRESHOLD,
};
use duplicate_image_pairs::core::pipeline::{Pipeline, PipelineResult};
use duplicate_image_pairs::core::search::Match;
use duplicate_image_pairs::error::Result;
use duplicate_image_pairs::events::{ActionEvent, CompareEvent, Event, EventChannel, PipelineEvent};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::thread;

/// Find pairs of equal or similar images.
#[derive(Parser, Debug)]
#[command(name = "dupe-pairs")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// The root of the directory tree under which images are compared
    root_directory: PathBuf,

    /// Maximum deviation (RMS) of the histograms of two images still considered equal
    #[arg(short, long, default_value_t = DEFAULT_RMS_THRESHOLD)]
    fuzziness: f64,

    /// Maximum difference in aspect ratios of two images to compare more closely
    #[arg(long, default_value_t = DEFAULT_ASPECT_FUZZINESS)]
    aspect_fuzziness: f64,

    /// Method used to determine if two images are considered equal
    #[arg(long, value_enum, default_value_t = Method::Exact)]
    comparison_method: Method,

    /// Action run on each pair of images found to be equal
    #[arg(long, value_enum, default_value_t = OnEqual::View)]
    action_equal: OnEqual,

    /// Compare pairs using all available cores
    #[arg(long)]
    parallel: bool,

    /// Pairs per work unit in parallel mode (0 or unset = default)
    #[arg(long)]
    chunk_size: Option<usize>,

    /// Worker threads in parallel mode (default: one per core)
    #[arg(long)]
    workers: Option<usize>,

    /// Viewer command for the `view` action; both files are appended
    #[arg(long, default_value = DEFAULT_VIEWER)]
    viewer: String,

    /// Skip dot-files and do not descend into dot-directories
    #[arg(long)]
    exclude_hidden: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    output: OutputFormat,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Method {
    /// Same size and same content
    #[value(name = "exact", alias = "compare_exactly")]
    Exact,
    /// Similar aspect ratio and color histogram
    #[value(name = "histogram", alias = "compare_histograms")]
    Histogram,
}

impl From<Method> for ComparisonMethod {
    fn from(method: Method) -> Self {
        match method {
            Method::Exact => ComparisonMethod::Exact,
            Method::Histogram => ComparisonMethod::Histogram,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OnEqual {
    /// Delete the first file of each pair
    #[value(name = "delete_first")]
    DeleteFirst,
    /// Delete the second file of each pair
    #[value(name = "delete_second")]
    DeleteSecond,
    /// Open both files in the viewer
    #[value(name = "view")]
    View,
    /// Do nothing
    #[value(name = "none")]
    Nothing,
}

impl From<OnEqual> for Action {
    fn from(choice: OnEqual) -> Self {
        match choice {
            OnEqual::DeleteFirst => Action::DeleteFirst,
            OnEqual::DeleteSecond => Action::DeleteSecond,
            OnEqual::View => Action::View,
            OnEqual::Nothing => Action::NoAction,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// File and match counts, as plain lines
    Text,
    /// JSON summary with every matched pair
    Json,
}

/// Run the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    duplicate_image_pairs::init_tracing(cli.verbose);

    // Resolve everything fallible before the scan starts
    let viewer: ViewerCommand = cli.viewer.parse()?;
    let dispatcher = ActionDispatcher::new(cli.action_equal.into()).with_viewer(viewer);

    let pipeline = Pipeline::builder()
        .root(cli.root_directory.clone())
        .method(cli.comparison_method.into())
        .rms_threshold(cli.fuzziness)
        .aspect_fuzziness(cli.aspect_fuzziness)
        .parallel(cli.parallel)
        .chunk_size(cli.chunk_size.unwrap_or(0))
        .workers(cli.workers)
        .exclude_hidden(cli.exclude_hidden)
        .build();
    pipeline.config().validate()?;

    let term = Term::stderr();
    let show_progress = cli.output == OutputFormat::Text && term.is_term();
    let result = run_pipeline(&pipeline, show_progress)?;

    match cli.output {
        OutputFormat::Text => {
            println!("{} total files", result.total_files());
            println!("{} matches", result.matches.len());

            let report = dispatch_actions(&dispatcher, &result.matches, show_progress);
            print_text_footer(&term, &result, &report);
        }
        OutputFormat::Json => {
            let report = dispatcher.dispatch(&result.matches);
            print_json_results(&result, &dispatcher, &report);
        }
    }

    Ok(())
}

fn run_pipeline(pipeline: &Pipeline, show_progress: bool) -> Result<PipelineResult> {
    let (sender, receiver) = EventChannel::new();

    let progress = show_progress.then(|| {
        let pb = ProgressBar::new(0);
        if let Ok(bar_style) = ProgressStyle::default_bar()
            .template("{spinner:.green} {msg} [{bar:40.cyan/blue}] {pos}/{len} pairs")
        {
            pb.set_style(bar_style.progress_chars("█▓░"));
        }
        pb
    });

    let event_thread = thread::spawn(move || {
        for event in receiver.iter() {
            let Some(pb) = progress.as_ref() else {
                continue;
            };
            match event {
                Event::Pipeline(PipelineEvent::PhaseChanged { phase }) => {
                    pb.set_message(phase.to_string());
                }
                Event::Compare(CompareEvent::Started { total_pairs, .. }) => {
                    pb.set_length(total_pairs as u64);
                }
                Event::Compare(CompareEvent::Progress(p)) => {
                    pb.set_position(p.pairs_evaluated as u64);
                }
                Event::Pipeline(PipelineEvent::Completed { .. }) => {
                    pb.finish_and_clear();
                }
                _ => {}
            }
        }
        if let Some(pb) = progress {
            pb.finish_and_clear();
        }
    });

    let result = pipeline.run_with_events(&sender);

    // Drop sender to signal event thread to finish
    drop(sender);
    event_thread.join().ok();

    result
}

/// Apply the action to every pair, ticking a progress bar per pair
fn dispatch_actions(
    dispatcher: &ActionDispatcher,
    matches: &[Match],
    show_progress: bool,
) -> DispatchReport {
    if !show_progress || dispatcher.action() == Action::NoAction || matches.is_empty() {
        return dispatcher.dispatch(matches);
    }

    let (sender, receiver) = EventChannel::new();
    let pb = ProgressBar::new(matches.len() as u64);
    if let Ok(bar_style) =
        ProgressStyle::default_bar().template("{msg} [{bar:40.cyan/blue}] {pos}/{len} pairs")
    {
        pb.set_style(bar_style.progress_chars("█▓░"));
    }
    let action = dispatcher.action();
    pb.set_message(action.to_string());

    // Failures are listed in the footer; the bar only counts them
    let event_thread = thread::spawn(move || {
        let mut failed = 0usize;
        for event in receiver.iter() {
            match event {
                Event::Action(ActionEvent::Applied { .. }) => pb.inc(1),
                Event::Action(ActionEvent::Failed { .. }) => {
                    failed += 1;
                    pb.set_message(format!("{action} ({failed} failed)"));
                    pb.inc(1);
                }
                _ => {}
            }
        }
        pb.finish_and_clear();
    });

    let report = dispatcher.dispatch_with_events(matches, &sender);

    drop(sender);
    event_thread.join().ok();

    report
}

fn print_text_footer(term: &Term, result: &PipelineResult, report: &DispatchReport) {
    if !result.scan_errors.is_empty() {
        term.write_line(&format!(
            "{} {} entries could not be read and were skipped",
            style("!").yellow().bold(),
            result.scan_errors.len()
        ))
        .ok();
    }

    if report.failed > 0 {
        term.write_line(&format!(
            "{} action failed on {} of {} pairs",
            style("✗").red().bold(),
            report.failed,
            report.applied + report.failed
        ))
        .ok();
        for error in &report.errors {
            term.write_line(&format!("  {}", style(error).dim())).ok();
        }
    }
}

fn print_json_results(
    result: &PipelineResult,
    dispatcher: &ActionDispatcher,
    report: &DispatchReport,
) {
    let output = serde_json::json!({
        "total_files": result.total_files(),
        "total_matches": result.matches.len(),
        "duration_ms": result.duration_ms,
        "skipped_entries": result.scan_errors,
        "matches": result.matches,
        "action": dispatcher.action().to_string(),
        "actions_applied": report.applied,
        "action_errors": report.errors,
    });

    println!("{output:#}");
}
