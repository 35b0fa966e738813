use crate::types::{
    Classification, CommitChangeStats, CommitKind, ComplexityAxis, ComplexityLevel, FileCategory,
    TimeEstimate,
};
use serde::Deserialize;

/// Base effort rates for one file category.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct CategoryRate {
    /// Flat planning hours for a commit entirely in this category.
    pub planning: f64,
    /// Implementation hours per added line (deleted lines bill at 10%).
    pub implementation_per_line: f64,
}

/// All estimator constants, passed in at construction so tests and config
/// overrides can swap them without touching the engine.
#[derive(Debug, Clone)]
pub struct RateTable {
    pub logic: CategoryRate,
    pub config: CategoryRate,
    pub style: CategoryRate,
    pub docs: CategoryRate,
    /// Indexed by level, Trivial → VeryComplex.
    pub structural_multipliers: [f64; 5],
    pub algorithmic_multipliers: [f64; 5],
}

impl Default for RateTable {
    fn default() -> Self {
        RateTable {
            logic:  CategoryRate { planning: 0.50, implementation_per_line: 0.020 },
            config: CategoryRate { planning: 0.15, implementation_per_line: 0.005 },
            style:  CategoryRate { planning: 0.25, implementation_per_line: 0.010 },
            docs:   CategoryRate { planning: 0.10, implementation_per_line: 0.004 },
            structural_multipliers:  [0.5, 0.8, 1.2, 1.6, 2.0],
            algorithmic_multipliers: [0.5, 0.9, 1.4, 1.9, 2.5],
        }
    }
}

impl RateTable {
    pub fn for_category(&self, category: FileCategory) -> CategoryRate {
        match category {
            FileCategory::Logic  => self.logic,
            FileCategory::Config => self.config,
            FileCategory::Style  => self.style,
            FileCategory::Docs   => self.docs,
        }
    }

    pub fn complexity_multiplier(&self, axis: ComplexityAxis, level: ComplexityLevel) -> f64 {
        let idx = level as usize;
        match axis {
            ComplexityAxis::Structural  => self.structural_multipliers[idx],
            ComplexityAxis::Algorithmic => self.algorithmic_multipliers[idx],
        }
    }
}

/// FEATURE carries full cost; MERGE is always free.
pub fn kind_multiplier(kind: CommitKind) -> f64 {
    match kind {
        CommitKind::Feature => 1.0,
        CommitKind::Fix     => 0.5,
        CommitKind::Publish => 0.1,
        CommitKind::Merge   => 0.0,
        CommitKind::Default => 0.8,
    }
}

/// Effort category for a file-extension bucket. Unrecognized extensions bill
/// as logic.
pub fn category_of(ext: &str) -> FileCategory {
    match ext {
        "json" | "yml" | "yaml" | "toml" | "ini" | "env" | "lock" | "conf" | "properties" => {
            FileCategory::Config
        }
        "css" | "scss" | "less" | "sass" | "html" | "svg" => FileCategory::Style,
        "md" | "mdx" | "markdown" | "txt" | "rst" | "adoc" => FileCategory::Docs,
        _ => FileCategory::Logic,
    }
}

/// Converts a classification plus change stats into an hour estimate.
pub struct Estimator {
    rates: RateTable,
}

impl Estimator {
    pub fn new(rates: RateTable) -> Self {
        Estimator { rates }
    }

    /// Lines are distributed across extension buckets proportionally to each
    /// bucket's share of `files_changed`, not to actual per-file diff size;
    /// aggregate numstat output carries no per-file attribution to do better.
    pub fn estimate(&self, stats: &CommitChangeStats, classification: &Classification) -> TimeEstimate {
        if stats.files_changed == 0 {
            return TimeEstimate::ZERO;
        }

        let additions = stats.additions as f64;
        let deletions = stats.deletions as f64;
        let changed = additions + deletions;
        let net_ratio = if changed > 0.0 {
            (additions - deletions).max(0.0) / changed
        } else {
            0.0
        };

        let mut planning_mult = 0.3 + net_ratio * 0.7;
        if stats.deletions > stats.additions {
            // extra discount when the commit mostly deletes
            planning_mult *= 0.2;
        }

        let complexity_mult = self
            .rates
            .complexity_multiplier(classification.axis, classification.level);
        let kind_mult = kind_multiplier(classification.kind);

        let mut planning = 0.0;
        let mut implementation = 0.0;

        for (ext, count) in &stats.file_types {
            let share = *count as f64 / stats.files_changed as f64;
            let rate = self.rates.for_category(category_of(ext));
            let added = additions * share;
            let deleted = deletions * share;

            planning += rate.planning * complexity_mult * share * planning_mult * kind_mult;
            implementation += added * rate.implementation_per_line * complexity_mult * kind_mult
                + deleted * rate.implementation_per_line * complexity_mult * 0.1 * kind_mult;
        }

        TimeEstimate {
            planning_hours: planning,
            implementation_hours: implementation,
        }
    }
}

impl Default for Estimator {
    fn default() -> Self {
        Estimator::new(RateTable::default())
    }
}
