use crate::error::Result;
use crate::types::{AggregateStats, CommitKind, ComplexityLevel, EstimatedCommit, KindTotals};
use chrono::NaiveDate;
use std::path::Path;

/// Per-commit analysis document: overall totals, commit detail, complexity
/// distribution, and the file-type impact table.
pub fn commit_analysis_markdown(commits: &[EstimatedCommit], stats: &AggregateStats) -> String {
    let mut md = String::from("# Commit Analysis\n\n");

    let total_files: usize = commits.iter().map(|c| c.record.stats.files_changed).sum();
    let total_additions: usize = commits.iter().map(|c| c.record.stats.additions).sum();
    let total_deletions: usize = commits.iter().map(|c| c.record.stats.deletions).sum();

    md.push_str("## Overall Statistics\n");
    md.push_str(&format!("- Total Commits: {}\n", commits.len()));
    md.push_str(&format!("- Total Files Changed: {total_files}\n"));
    md.push_str(&format!("- Total Lines Added: {total_additions}\n"));
    md.push_str(&format!("- Total Lines Deleted: {total_deletions}\n"));
    md.push_str(&format!("- Total Hours Estimated: {:.2}\n\n", stats.total_hours));

    md.push_str("## Commits\n\n");
    for commit in commits {
        let r = &commit.record;
        let est = &commit.estimate;
        md.push_str(&format!("### {} — {} — {}\n", r.hash, r.timestamp, r.message));
        md.push_str(&format!("- **Kind**: {}\n", commit.classification.kind));
        md.push_str(&format!(
            "- **Complexity**: {} {}\n",
            commit.classification.axis, commit.classification.level
        ));
        md.push_str("- **Changes**:\n");
        md.push_str(&format!("  * Files: {}\n", r.stats.files_changed));
        md.push_str(&format!("  * Added: {} lines\n", r.stats.additions));
        md.push_str(&format!("  * Deleted: {} lines\n", r.stats.deletions));
        md.push_str(&format!(
            "  * Net: {} lines\n",
            r.stats.additions as i64 - r.stats.deletions as i64
        ));
        if !r.stats.file_types.is_empty() {
            md.push_str("- **File Types**:\n");
            for (ext, count) in &r.stats.file_types {
                md.push_str(&format!("  * {ext}: {count} files\n"));
            }
        }
        md.push_str("- **Time Estimates**:\n");
        md.push_str(&format!("  * Planning: {:.2} hours\n", est.planning_hours));
        md.push_str(&format!("  * Implementation: {:.2} hours\n", est.implementation_hours));
        md.push_str(&format!("  * Total: {:.2} hours\n\n", est.total_hours()));
    }

    md.push_str("## Complexity Distribution\n");
    let levels = [
        ComplexityLevel::Trivial,
        ComplexityLevel::Basic,
        ComplexityLevel::Moderate,
        ComplexityLevel::Complex,
        ComplexityLevel::VeryComplex,
    ];
    for level in levels {
        let count = commits
            .iter()
            .filter(|c| c.classification.level == level)
            .count();
        if count == 0 {
            continue;
        }
        let percentage = count as f64 / commits.len().max(1) as f64 * 100.0;
        md.push_str(&format!("- {level}: {percentage:.1}% ({count} commits)\n"));
    }
    md.push('\n');

    md.push_str("## File Type Impact\n");
    md.push_str("| Type | Files Changed | Lines Added | Lines Deleted | Hours |\n");
    md.push_str("|------|---------------|-------------|---------------|-------|\n");
    for (ext, impact) in &stats.file_types {
        md.push_str(&format!(
            "| {ext} | {} | {} | {} | {:.2} |\n",
            impact.files,
            impact.additions.round() as i64,
            impact.deletions.round() as i64,
            impact.hours
        ));
    }

    md
}

/// Aggregate hours document: project summary, per-author monthly tables, work
/// distribution, and work-pattern stats.
pub fn hours_report_markdown(stats: &AggregateStats) -> String {
    let mut md = String::from("# Git Hours Report\n\n");

    md.push_str("## Project Summary\n");
    match &stats.period {
        Some(period) => {
            let avg = stats.total_hours / period.total_working_days.max(1) as f64;
            md.push_str(&format!("- **Period**: {} – {}\n", period.start, period.end));
            md.push_str(&format!("- **Calendar Days**: {}\n", period.total_calendar_days));
            md.push_str(&format!("- **Working Days**: {}\n", period.total_working_days));
            md.push_str(&format!("- **Total Hours**: {:.2}\n", stats.total_hours));
            md.push_str(&format!("- **Average Hours per Working Day**: {avg:.2}\n\n"));
        }
        None => {
            md.push_str("- No commits in the analyzed range.\n\n");
            return md;
        }
    }

    md.push_str("## Hours by Author\n\n");
    for (author, author_stats) in &stats.authors {
        md.push_str(&format!("### {author}\n\n"));
        md.push_str(
            "| Month | Working Days | Features | Fixes | Publishes | Merges | Other | Total Hours | Hours/Day |\n",
        );
        md.push_str(
            "|-------|--------------|----------|-------|-----------|--------|-------|-------------|-----------|\n",
        );
        for (month, m) in &author_stats.by_month {
            let hours_per_day = m.hours / m.working_days.max(1) as f64;
            md.push_str(&format!(
                "| {} | {} | {} | {} | {} | {} | {} | {:.1} | {:.1} |\n",
                month_name(month),
                m.working_days,
                kind_cell(m.by_kind.feature),
                kind_cell(m.by_kind.fix),
                kind_cell(m.by_kind.publish),
                kind_cell(m.by_kind.merge),
                kind_cell(m.by_kind.default),
                m.hours,
                hours_per_day,
            ));
        }
        let working_days: usize = author_stats.by_month.values().map(|m| m.working_days).sum();
        let avg = author_stats.total_hours / working_days.max(1) as f64;
        md.push_str(&format!(
            "| **Total** | {} | {} | {} | {} | {} | {} | {:.1} | {avg:.1} |\n\n",
            working_days,
            kind_cell(author_stats.by_kind.feature),
            kind_cell(author_stats.by_kind.fix),
            kind_cell(author_stats.by_kind.publish),
            kind_cell(author_stats.by_kind.merge),
            kind_cell(author_stats.by_kind.default),
            author_stats.total_hours,
        ));
    }

    md.push_str("## Work Distribution\n");
    let kinds = [
        (CommitKind::Feature, "Features"),
        (CommitKind::Fix, "Fixes"),
        (CommitKind::Publish, "Publishes"),
        (CommitKind::Merge, "Merges"),
        (CommitKind::Default, "Other"),
    ];
    for (kind, label) in kinds {
        let totals = stats.by_kind.get(kind);
        if totals.commits == 0 {
            continue;
        }
        let percentage = if stats.total_hours > 0.0 {
            totals.hours / stats.total_hours * 100.0
        } else {
            0.0
        };
        md.push_str(&format!(
            "- {label}: {} commits, {:.1} hours ({percentage:.1}% of total time)\n",
            totals.commits, totals.hours
        ));
    }
    md.push('\n');

    if let Some(period) = &stats.period {
        md.push_str("## Work Pattern\n");
        let frequency =
            period.total_working_days as f64 / period.total_calendar_days.max(1) as f64 * 100.0;
        md.push_str(&format!("- Total Period: {} days\n", period.total_calendar_days));
        md.push_str(&format!("- Active Days: {}\n", period.total_working_days));
        md.push_str(&format!("- Work Frequency: {frequency:.1}% of days had activity\n"));
        md.push_str(&format!(
            "- Average Hours per Working Day: {:.2}\n",
            stats.total_hours / period.total_working_days.max(1) as f64
        ));
        md.push_str(&format!(
            "- Average Commits per Working Day: {:.2}\n",
            stats.total_commits as f64 / period.total_working_days.max(1) as f64
        ));
    }

    md
}

pub fn write_markdown(content: &str, path: &Path) -> Result<()> {
    std::fs::write(path, content)?;
    eprintln!("✓ Markdown report written to {}", path.display());
    Ok(())
}

fn kind_cell(totals: KindTotals) -> String {
    format!("{} ({:.1}h)", totals.commits, totals.hours)
}

/// `"2024-03"` → `"March 2024"`. Falls back to the raw key if the month does
/// not parse.
fn month_name(month: &str) -> String {
    NaiveDate::parse_from_str(&format!("{month}-01"), "%Y-%m-%d")
        .map(|d| d.format("%B %Y").to_string())
        .unwrap_or_else(|_| month.to_string())
}
