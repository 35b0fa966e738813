use crate::types::{AggregateStats, CommitKind, KindTotals};
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Attribute, Cell, Color, Table};

/// Prints the aggregate as a per-author monthly table plus distribution lines.
pub fn report_terminal(stats: &AggregateStats, repo_name: &str, since: &str) {
    eprintln!();
    println!(
        "{} — {} since \"{}\" ({} commits, {} authors)",
        "⏱ git-timesheet".cyan().bold(),
        repo_name.bold(),
        since.bright_black(),
        stats.total_commits.to_string().bright_black(),
        stats.authors.len().to_string().bright_black(),
    );
    println!();

    let Some(period) = &stats.period else {
        println!("{}", "  No commits found with current filters.".yellow());
        println!();
        return;
    };

    println!(
        "  {} {} – {}   {} {} of {} days   {} {:.1}h total",
        "period".bright_black(),
        period.start,
        period.end,
        "active".bright_black(),
        period.total_working_days,
        period.total_calendar_days,
        "estimated".bright_black(),
        stats.total_hours,
    );
    println!();

    for (author, author_stats) in &stats.authors {
        println!(
            "  {} — {} commits, {:.1}h",
            author.bold(),
            author_stats.total_commits,
            author_stats.total_hours
        );

        let mut table = Table::new();
        table.load_preset(UTF8_FULL);
        table.set_header(vec![
            "MONTH", "DAYS", "FEATURES", "FIXES", "PUBLISHES", "MERGES", "OTHER", "HOURS",
            "H/DAY",
        ]);

        for (month, m) in &author_stats.by_month {
            let hours_per_day = m.hours / m.working_days.max(1) as f64;
            table.add_row(vec![
                Cell::new(month),
                Cell::new(m.working_days.to_string()),
                kind_cell(m.by_kind.feature),
                kind_cell(m.by_kind.fix),
                kind_cell(m.by_kind.publish),
                kind_cell(m.by_kind.merge),
                kind_cell(m.by_kind.default),
                Cell::new(format!("{:.1}", m.hours)).add_attribute(Attribute::Bold),
                Cell::new(format!("{hours_per_day:.1}")),
            ]);
        }

        println!("{table}");
        println!();
    }

    println!("{}", "  Work distribution:".cyan());
    let kinds = [
        (CommitKind::Feature, "features"),
        (CommitKind::Fix, "fixes"),
        (CommitKind::Publish, "publishes"),
        (CommitKind::Merge, "merges"),
        (CommitKind::Default, "other"),
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
        println!(
            "    {} {} {}",
            "•".white(),
            label,
            format!(
                "{} commit{}, {:.1}h ({percentage:.1}%)",
                totals.commits,
                if totals.commits != 1 { "s" } else { "" },
                totals.hours
            )
            .bright_black(),
        );
    }
    println!();
}

/// Plain numeric text with color by activity so comfy-table measures widths
/// without ANSI escape bytes in the column content.
fn kind_cell(totals: KindTotals) -> Cell {
    let text = format!("{} ({:.1}h)", totals.commits, totals.hours);
    if totals.commits == 0 {
        Cell::new(text).fg(Color::DarkGrey)
    } else {
        Cell::new(text)
    }
}
