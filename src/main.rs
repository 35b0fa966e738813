mod analyzers;
mod config;
mod error;
mod git;
mod reporters;
mod types;

use analyzers::aggregate::aggregate_commits;
use analyzers::classifier::{Classifier, ScoringRules};
use analyzers::estimator::{Estimator, RateTable};
use clap::Parser;
use error::{Result, TimesheetError};
use git::log_parser::ExcludedAuthors;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use types::EstimatedCommit;

#[derive(Parser, Debug)]
#[command(
    name = "git-timesheet",
    about = "⏱ Estimate planning and implementation hours from git history",
    version,
    long_about = "Scans your local git history and estimates the human effort behind it.\n\n\
                  Each commit is classified by intent (feature/fix/publish/merge) and by\n\
                  complexity (structural vs. algorithmic), then converted into planning and\n\
                  implementation hours and rolled up per author, month, and file type.\n\n\
                  Useful for retroactive billing on repositories with no time tracking."
)]
struct Args {
    /// Path to a git repository (defaults to the current directory).
    #[arg(value_name = "PATH")]
    repo_path: Option<PathBuf>,

    /// Analyze commits since this date, e.g. "6 months ago", "2024-01-01".
    /// Omit to include all history.
    #[arg(long)]
    since: Option<String>,

    /// Output format: terminal, json, markdown
    #[arg(long)]
    format: Option<String>,

    /// Directory the json/markdown reports are written into (defaults to ".").
    #[arg(long)]
    output: Option<PathBuf>,

    /// Author identity to drop (repeatable). Replaces the built-in bot list.
    #[arg(long = "exclude-author", value_name = "AUTHOR")]
    exclude_authors: Vec<String>,

    /// Path to a .git-timesheet.yml config file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print an annotated config template and exit.
    #[arg(long)]
    generate_config: bool,
}

fn main() {
    let args = Args::parse();
    if let Err(e) = run(args) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    if args.generate_config {
        return config::print_template(args.output.as_deref());
    }

    let start_dir = match &args.repo_path {
        Some(p) => p.clone(),
        None => std::env::current_dir()?,
    };
    let repo_root = git::locate_repo_root(&start_dir)?;
    let repo_name = repo_root
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("repo")
        .to_string();

    let cfg = config::resolve_config(args.config.as_deref(), &repo_root)?;

    // CLI flags take precedence over the config file
    let since = resolved(args.since, cfg.since.clone(), "");
    let format = resolved(args.format, cfg.format.clone(), "terminal");
    if !matches!(format.as_str(), "terminal" | "json" | "markdown") {
        return Err(TimesheetError::Config(format!(
            "invalid --format value: \"{format}\". \
             Expected one of: \"terminal\", \"json\", \"markdown\""
        )));
    }
    let output_dir = args
        .output
        .or_else(|| cfg.output.clone().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("."));

    let excluded = ExcludedAuthors::new(config::effective_exclusions(&args.exclude_authors, &cfg));
    let mut rates = RateTable::default();
    cfg.apply_rates(&mut rates);

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner:.green} {msg}")
            .unwrap()
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
    );
    pb.enable_steady_tick(Duration::from_millis(80));

    let total_start = Instant::now();
    let mut step_start = Instant::now();

    pb.set_message("[1/3] Parsing commit log...");
    let records = match git::log_parser::parse_log(&repo_root, &since, &excluded) {
        Ok(r) => r,
        Err(e) => {
            pb.finish_and_clear();
            return Err(e);
        }
    };
    let t1 = fmt_dur(step_start.elapsed());
    step_start = Instant::now();
    pb.println(format!("  ✓ [1/3] Parsing commit log               {t1}"));

    pb.set_message("[2/3] Classifying and estimating...");
    let classifier = Classifier::new(ScoringRules::default());
    let estimator = Estimator::new(rates);
    let commits: Vec<EstimatedCommit> = records
        .into_iter()
        .map(|record| {
            let classification = classifier.classify(&record);
            let estimate = estimator.estimate(&record.stats, &classification);
            EstimatedCommit {
                record,
                classification,
                estimate,
            }
        })
        .collect();
    let t2 = fmt_dur(step_start.elapsed());
    step_start = Instant::now();
    pb.println(format!("  ✓ [2/3] Classifying and estimating       {t2}"));

    pb.set_message("[3/3] Aggregating...");
    let stats = match aggregate_commits(&commits) {
        Ok(s) => s,
        Err(e) => {
            pb.finish_and_clear();
            return Err(e);
        }
    };
    let t3 = fmt_dur(step_start.elapsed());
    pb.println(format!("  ✓ [3/3] Aggregating                      {t3}"));
    pb.finish_and_clear();

    eprintln!(
        "✔ {} — {} commits, {} authors, {:.1}h estimated — ⏱ {}",
        repo_name,
        stats.total_commits,
        stats.authors.len(),
        stats.total_hours,
        fmt_dur(total_start.elapsed())
    );

    match format.as_str() {
        "json" => {
            std::fs::create_dir_all(&output_dir)?;
            reporters::json::write_json(&commits, &output_dir.join("commit-analysis.json"))?;
            reporters::json::write_json(&stats, &output_dir.join("hours-report.json"))?;
        }
        "markdown" => {
            std::fs::create_dir_all(&output_dir)?;
            reporters::markdown::write_markdown(
                &reporters::markdown::commit_analysis_markdown(&commits, &stats),
                &output_dir.join("commit-analysis.md"),
            )?;
            reporters::markdown::write_markdown(
                &reporters::markdown::hours_report_markdown(&stats),
                &output_dir.join("hours-report.md"),
            )?;
        }
        _ => {
            let since_display = if since.is_empty() { "all history" } else { since.as_str() };
            reporters::terminal::report_terminal(&stats, &repo_name, since_display);
        }
    }

    Ok(())
}

/// CLI value → config value → built-in default.
fn resolved(cli: Option<String>, cfg: Option<String>, default: &str) -> String {
    cli.or(cfg).unwrap_or_else(|| default.to_string())
}

fn fmt_dur(d: Duration) -> String {
    let ms = d.as_millis();
    if ms >= 1000 {
        format!("{:.1}s", d.as_secs_f64())
    } else {
        format!("{ms}ms")
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
