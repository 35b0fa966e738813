use crate::error::{Result, TimesheetError};
use crate::types::{
    AggregateStats, AuthorStats, EstimatedCommit, FileTypeImpact, KindBreakdown, MonthStats,
    ProjectPeriod,
};
use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet};

// working-day sets only live for the duration of the fold; they are collapsed
// to counts before the aggregate is returned
#[derive(Default)]
struct MonthAcc {
    commits: usize,
    hours: f64,
    by_kind: KindBreakdown,
    days: BTreeSet<NaiveDate>,
}

#[derive(Default)]
struct AuthorAcc {
    total_commits: usize,
    total_hours: f64,
    by_kind: KindBreakdown,
    months: BTreeMap<String, MonthAcc>,
}

/// Folds the ordered, already-filtered commit sequence into per-kind totals,
/// per-author monthly breakdowns, file-type impact, and the project calendar
/// span. Author identity is lowercased before grouping, so `Alice` and
/// `alice` land in one bucket.
pub fn aggregate_commits(commits: &[EstimatedCommit]) -> Result<AggregateStats> {
    let mut authors: BTreeMap<String, AuthorAcc> = BTreeMap::new();
    let mut by_kind = KindBreakdown::default();
    let mut file_types: BTreeMap<String, FileTypeImpact> = BTreeMap::new();
    let mut all_days: BTreeSet<NaiveDate> = BTreeSet::new();
    let mut total_hours = 0.0;

    for ec in commits {
        let date = parse_commit_date(&ec.record)?;
        let month = date.format("%Y-%m").to_string();
        let hours = ec.estimate.total_hours();
        let kind = ec.classification.kind;

        total_hours += hours;
        by_kind.record(kind, hours);
        all_days.insert(date);

        let author = authors.entry(ec.record.author.to_lowercase()).or_default();
        author.total_commits += 1;
        author.total_hours += hours;
        author.by_kind.record(kind, hours);

        let month_acc = author.months.entry(month).or_default();
        month_acc.commits += 1;
        month_acc.hours += hours;
        month_acc.by_kind.record(kind, hours);
        month_acc.days.insert(date);

        // lines and hours attributed by each extension's file-count share
        let stats = &ec.record.stats;
        if stats.files_changed > 0 {
            for (ext, count) in &stats.file_types {
                let share = *count as f64 / stats.files_changed as f64;
                let slot = file_types.entry(ext.clone()).or_default();
                slot.files += count;
                slot.additions += stats.additions as f64 * share;
                slot.deletions += stats.deletions as f64 * share;
                slot.hours += hours * share;
            }
        }
    }

    let period = match (all_days.iter().next(), all_days.iter().next_back()) {
        (Some(first), Some(last)) => Some(ProjectPeriod {
            start: first.format("%Y-%m-%d").to_string(),
            end: last.format("%Y-%m-%d").to_string(),
            // inclusive: a single-day history spans 1 day
            total_calendar_days: (*last - *first).num_days() + 1,
            total_working_days: all_days.len(),
        }),
        _ => None,
    };

    Ok(AggregateStats {
        period,
        total_commits: commits.len(),
        total_hours,
        by_kind,
        authors: authors
            .into_iter()
            .map(|(name, acc)| (name, finalize_author(acc)))
            .collect(),
        file_types,
    })
}

fn finalize_author(acc: AuthorAcc) -> AuthorStats {
    AuthorStats {
        total_commits: acc.total_commits,
        total_hours: acc.total_hours,
        by_kind: acc.by_kind,
        by_month: acc
            .months
            .into_iter()
            .map(|(month, m)| {
                (
                    month,
                    MonthStats {
                        commits: m.commits,
                        hours: m.hours,
                        working_days: m.days.len(),
                        by_kind: m.by_kind,
                    },
                )
            })
            .collect(),
    }
}

fn parse_commit_date(record: &crate::types::CommitRecord) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(record.date_str(), "%Y-%m-%d")
        .map_err(|e| TimesheetError::InvalidDate(record.timestamp.clone(), e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{
        Classification, CommitChangeStats, CommitKind, CommitRecord, ComplexityAxis,
        ComplexityLevel, TimeEstimate,
    };
    use pretty_assertions::assert_eq;
    use std::collections::BTreeMap;

    fn commit(author: &str, timestamp: &str, kind: CommitKind, hours: f64) -> EstimatedCommit {
        EstimatedCommit {
            record: CommitRecord {
                hash: "abc".to_string(),
                author: author.to_string(),
                timestamp: timestamp.to_string(),
                message: "msg".to_string(),
                stats: CommitChangeStats {
                    files_changed: 1,
                    additions: 10,
                    deletions: 2,
                    file_types: BTreeMap::from([("ts".to_string(), 1)]),
                    files: vec!["src/a.ts".to_string()],
                },
            },
            classification: Classification {
                kind,
                axis: ComplexityAxis::Algorithmic,
                level: ComplexityLevel::Basic,
            },
            estimate: TimeEstimate {
                planning_hours: hours / 2.0,
                implementation_hours: hours / 2.0,
            },
        }
    }

    #[test]
    fn test_author_grouping_is_case_insensitive() {
        let commits = vec![
            commit("Alice", "2024-03-02 10:00:00", CommitKind::Feature, 2.0),
            commit("alice", "2024-03-01 09:00:00", CommitKind::Fix, 1.0),
        ];
        let stats = aggregate_commits(&commits).expect("aggregate should succeed");
        assert_eq!(stats.authors.len(), 1, "Alice and alice must merge into one bucket");
        let alice = &stats.authors["alice"];
        assert_eq!(alice.total_commits, 2);
        assert!((alice.total_hours - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_working_days_counts_distinct_dates() {
        let commits = vec![
            commit("alice", "2024-03-01 08:00:00", CommitKind::Feature, 1.0),
            commit("alice", "2024-03-01 18:00:00", CommitKind::Fix, 1.0),
            commit("alice", "2024-03-05 12:00:00", CommitKind::Default, 1.0),
        ];
        let stats = aggregate_commits(&commits).expect("aggregate should succeed");
        let month = &stats.authors["alice"].by_month["2024-03"];
        assert_eq!(month.commits, 3);
        assert_eq!(month.working_days, 2, "two commits on one date count as one working day");
    }

    #[test]
    fn test_calendar_span_is_inclusive() {
        let commits = vec![
            commit("alice", "2024-03-10 10:00:00", CommitKind::Feature, 1.0),
            commit("alice", "2024-03-01 10:00:00", CommitKind::Feature, 1.0),
        ];
        let stats = aggregate_commits(&commits).expect("aggregate should succeed");
        let period = stats.period.expect("non-empty history has a period");
        assert_eq!(period.start, "2024-03-01");
        assert_eq!(period.end, "2024-03-10");
        assert_eq!(period.total_calendar_days, 10);
        assert_eq!(period.total_working_days, 2);
    }

    #[test]
    fn test_single_day_history_spans_one_day() {
        let commits = vec![commit("alice", "2024-03-01 10:00:00", CommitKind::Feature, 1.0)];
        let stats = aggregate_commits(&commits).expect("aggregate should succeed");
        assert_eq!(stats.period.unwrap().total_calendar_days, 1);
    }

    #[test]
    fn test_months_split_by_calendar_month() {
        let commits = vec![
            commit("alice", "2024-04-01 10:00:00", CommitKind::Feature, 2.0),
            commit("alice", "2024-03-31 10:00:00", CommitKind::Feature, 1.0),
        ];
        let stats = aggregate_commits(&commits).expect("aggregate should succeed");
        let months = &stats.authors["alice"].by_month;
        assert_eq!(months.len(), 2);
        assert!((months["2024-03"].hours - 1.0).abs() < 1e-9);
        assert!((months["2024-04"].hours - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_kind_totals_accumulate() {
        let commits = vec![
            commit("alice", "2024-03-01 08:00:00", CommitKind::Feature, 2.0),
            commit("alice", "2024-03-02 08:00:00", CommitKind::Feature, 1.0),
            commit("bob", "2024-03-03 08:00:00", CommitKind::Merge, 0.0),
        ];
        let stats = aggregate_commits(&commits).expect("aggregate should succeed");
        assert_eq!(stats.by_kind.feature.commits, 2);
        assert!((stats.by_kind.feature.hours - 3.0).abs() < 1e-9);
        assert_eq!(stats.by_kind.merge.commits, 1);
        assert_eq!(stats.by_kind.merge.hours, 0.0);
        assert_eq!(stats.total_commits, 3);
    }

    #[test]
    fn test_unparseable_date_is_fatal() {
        let commits = vec![commit("alice", "yesterday-ish", CommitKind::Feature, 1.0)];
        let err = aggregate_commits(&commits).expect_err("bad date must abort the run");
        assert!(
            matches!(err, TimesheetError::InvalidDate(..)),
            "expected InvalidDate, got {err:?}"
        );
    }

    #[test]
    fn test_empty_history_degrades_gracefully() {
        let stats = aggregate_commits(&[]).expect("empty history is not an error");
        assert!(stats.period.is_none());
        assert_eq!(stats.total_commits, 0);
        assert!(stats.authors.is_empty());
        assert!(stats.file_types.is_empty());
    }

    #[test]
    fn test_file_type_impact_distributes_proportionally() {
        let mut ec = commit("alice", "2024-03-01 10:00:00", CommitKind::Feature, 4.0);
        ec.record.stats = CommitChangeStats {
            files_changed: 4,
            additions: 100,
            deletions: 20,
            file_types: BTreeMap::from([("ts".to_string(), 3), ("md".to_string(), 1)]),
            files: vec![
                "src/a.ts".to_string(),
                "src/b.ts".to_string(),
                "src/c.ts".to_string(),
                "README.md".to_string(),
            ],
        };
        let stats = aggregate_commits(&[ec]).expect("aggregate should succeed");
        let ts = &stats.file_types["ts"];
        let md = &stats.file_types["md"];
        assert_eq!(ts.files, 3);
        assert_eq!(md.files, 1);
        assert!((ts.additions - 75.0).abs() < 1e-9, "3/4 of added lines go to ts");
        assert!((md.additions - 25.0).abs() < 1e-9);
        assert!((ts.hours - 3.0).abs() < 1e-9, "3/4 of the commit's hours go to ts");
        assert!((md.hours - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_aggregate_round_trips_through_json() {
        let commits = vec![
            commit("Alice", "2024-03-02 10:00:00", CommitKind::Feature, 2.25),
            commit("bob", "2024-02-14 09:00:00", CommitKind::Fix, 0.4),
        ];
        let stats = aggregate_commits(&commits).expect("aggregate should succeed");
        let json = serde_json::to_string_pretty(&stats).expect("serialize");
        let reloaded: AggregateStats = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(stats, reloaded, "JSON round-trip must reproduce identical totals");
    }
}
