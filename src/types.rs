use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;

// ─── Core Git Data ────────────────────────────────────────────────────────────

/// Per-commit change statistics extracted from the numstat listing.
///
/// Invariant: `files_changed == files.len() == file_types.values().sum()`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CommitChangeStats {
    pub files_changed: usize,
    pub additions: usize,
    pub deletions: usize,
    /// Extension → number of files with that extension in this commit.
    pub file_types: BTreeMap<String, usize>,
    pub files: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CommitRecord {
    pub hash: String,
    pub author: String,
    /// Raw `YYYY-MM-DD HH:MM:SS` string as emitted by the log format.
    pub timestamp: String,
    pub message: String,
    pub stats: CommitChangeStats,
}

impl CommitRecord {
    /// The calendar-date part of the timestamp (`YYYY-MM-DD`).
    pub fn date_str(&self) -> &str {
        self.timestamp
            .split_whitespace()
            .next()
            .unwrap_or(&self.timestamp)
    }
}

// ─── Classification ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CommitKind {
    Feature,
    Fix,
    Publish,
    Merge,
    Default,
}

impl std::fmt::Display for CommitKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CommitKind::Feature => write!(f, "FEATURE"),
            CommitKind::Fix     => write!(f, "FIX"),
            CommitKind::Publish => write!(f, "PUBLISH"),
            CommitKind::Merge   => write!(f, "MERGE"),
            CommitKind::Default => write!(f, "DEFAULT"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ComplexityAxis {
    Structural,
    Algorithmic,
}

impl std::fmt::Display for ComplexityAxis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ComplexityAxis::Structural  => write!(f, "STRUCTURAL"),
            ComplexityAxis::Algorithmic => write!(f, "ALGORITHMIC"),
        }
    }
}

/// Five-tier severity bucket, ordered Trivial → VeryComplex. The discriminant
/// order indexes the complexity-multiplier tables.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ComplexityLevel {
    Trivial,
    Basic,
    Moderate,
    Complex,
    VeryComplex,
}

impl std::fmt::Display for ComplexityLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ComplexityLevel::Trivial     => write!(f, "TRIVIAL"),
            ComplexityLevel::Basic       => write!(f, "BASIC"),
            ComplexityLevel::Moderate    => write!(f, "MODERATE"),
            ComplexityLevel::Complex     => write!(f, "COMPLEX"),
            ComplexityLevel::VeryComplex => write!(f, "VERY_COMPLEX"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Classification {
    pub kind: CommitKind,
    pub axis: ComplexityAxis,
    pub level: ComplexityLevel,
}

/// Effort category a file extension bills under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileCategory {
    Logic,
    Config,
    Style,
    Docs,
}

// ─── Estimates ────────────────────────────────────────────────────────────────

/// Hour estimate for a single commit. The total is always the exact sum of the
/// two parts; it is derived at serialization time and never stored, so the
/// three serialized fields cannot drift apart.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TimeEstimate {
    pub planning_hours: f64,
    pub implementation_hours: f64,
}

impl TimeEstimate {
    pub const ZERO: TimeEstimate = TimeEstimate {
        planning_hours: 0.0,
        implementation_hours: 0.0,
    };

    pub fn total_hours(&self) -> f64 {
        self.planning_hours + self.implementation_hours
    }
}

impl Serialize for TimeEstimate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut st = serializer.serialize_struct("TimeEstimate", 3)?;
        st.serialize_field("planning", &self.planning_hours)?;
        st.serialize_field("implementation", &self.implementation_hours)?;
        st.serialize_field("total", &self.total_hours())?;
        st.end()
    }
}

impl<'de> Deserialize<'de> for TimeEstimate {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct Raw {
            planning: f64,
            implementation: f64,
            // `total` is intentionally not read back; it is re-derived.
        }
        let raw = Raw::deserialize(deserializer)?;
        Ok(TimeEstimate {
            planning_hours: raw.planning,
            implementation_hours: raw.implementation,
        })
    }
}

/// A commit record with its classification and estimate attached; one element
/// of the pipeline's ordered per-commit output.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct EstimatedCommit {
    #[serde(flatten)]
    pub record: CommitRecord,
    pub classification: Classification,
    pub estimate: TimeEstimate,
}

// ─── Aggregates ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct KindTotals {
    pub commits: usize,
    pub hours: f64,
}

/// Commit counts and hours split by commit kind.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct KindBreakdown {
    #[serde(rename = "FEATURE")]
    pub feature: KindTotals,
    #[serde(rename = "FIX")]
    pub fix: KindTotals,
    #[serde(rename = "PUBLISH")]
    pub publish: KindTotals,
    #[serde(rename = "MERGE")]
    pub merge: KindTotals,
    #[serde(rename = "DEFAULT")]
    pub default: KindTotals,
}

impl KindBreakdown {
    pub fn record(&mut self, kind: CommitKind, hours: f64) {
        let slot = self.slot_mut(kind);
        slot.commits += 1;
        slot.hours += hours;
    }

    pub fn get(&self, kind: CommitKind) -> KindTotals {
        match kind {
            CommitKind::Feature => self.feature,
            CommitKind::Fix     => self.fix,
            CommitKind::Publish => self.publish,
            CommitKind::Merge   => self.merge,
            CommitKind::Default => self.default,
        }
    }

    fn slot_mut(&mut self, kind: CommitKind) -> &mut KindTotals {
        match kind {
            CommitKind::Feature => &mut self.feature,
            CommitKind::Fix     => &mut self.fix,
            CommitKind::Publish => &mut self.publish,
            CommitKind::Merge   => &mut self.merge,
            CommitKind::Default => &mut self.default,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProjectPeriod {
    /// Earliest commit date, `YYYY-MM-DD`.
    pub start: String,
    /// Latest commit date, `YYYY-MM-DD`.
    pub end: String,
    /// Inclusive span: a single-day history spans 1 day.
    pub total_calendar_days: i64,
    /// Distinct dates with at least one retained commit.
    pub total_working_days: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MonthStats {
    pub commits: usize,
    pub hours: f64,
    /// Distinct commit dates within this month.
    pub working_days: usize,
    pub by_kind: KindBreakdown,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AuthorStats {
    pub total_commits: usize,
    pub total_hours: f64,
    pub by_kind: KindBreakdown,
    /// Keyed by `YYYY-MM`.
    pub by_month: BTreeMap<String, MonthStats>,
}

/// Per-extension impact totals. Lines and hours are attributed to an extension
/// proportionally to its share of each commit's changed files.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FileTypeImpact {
    pub files: usize,
    pub additions: f64,
    pub deletions: f64,
    pub hours: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AggregateStats {
    /// `None` for an empty history.
    pub period: Option<ProjectPeriod>,
    pub total_commits: usize,
    pub total_hours: f64,
    pub by_kind: KindBreakdown,
    /// Keyed by lowercased author identity.
    pub authors: BTreeMap<String, AuthorStats>,
    pub file_types: BTreeMap<String, FileTypeImpact>,
}
