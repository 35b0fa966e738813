use crate::types::{
    Classification, CommitChangeStats, CommitKind, CommitRecord, ComplexityAxis, ComplexityLevel,
};
use once_cell::sync::Lazy;
use regex::Regex;

static VERSION_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bv?\d+\.\d+(\.\d+)?\b").expect("version regex"));

static FIX_HINT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(fix|bug|hotfix|patch)\b").expect("fix-hint regex"));

static FEATURE_HINT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(feat|feature|add)\b").expect("feature-hint regex"));

static PUBLISH_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(publish|release|bump)\b").expect("publish regex"));

/// Scoring tables for complexity classification. `Default` is the production
/// configuration; tests can pass alternates to [`Classifier::new`].
#[derive(Debug, Clone)]
pub struct ScoringRules {
    /// Path markers that signal presentation-layer work.
    pub structural_dirs: Vec<String>,
    pub structural_exts: Vec<String>,
    /// Stylesheet extensions earn an extra bonus on top of the structural
    /// extension bucket, so a css file contributes from three terms.
    pub stylesheet_exts: Vec<String>,
    /// Path markers that signal logic-layer work.
    pub algorithmic_dirs: Vec<String>,
    pub code_exts: Vec<String>,
    /// Inclusive upper bounds for Trivial, Basic, Moderate, Complex; anything
    /// above the last bound is VeryComplex. Shared by both axes.
    pub level_cutoffs: [f64; 4],
}

impl Default for ScoringRules {
    fn default() -> Self {
        ScoringRules {
            structural_dirs: to_owned(&[
                "components",
                "layouts",
                "styles",
                "pages",
                "views",
                "templates",
            ]),
            structural_exts: to_owned(&["css", "scss", "less", "html", "jsx", "tsx", "svg"]),
            stylesheet_exts: to_owned(&["css", "scss", "less"]),
            algorithmic_dirs: to_owned(&[
                "utils", "helpers", "services", "hooks", "commands", "lib", "core",
            ]),
            code_exts: to_owned(&["js", "ts", "jsx", "tsx"]),
            level_cutoffs: [10.0, 30.0, 60.0, 100.0],
        }
    }
}

fn to_owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Assigns each commit an intent and a complexity severity.
pub struct Classifier {
    rules: ScoringRules,
}

impl Classifier {
    pub fn new(rules: ScoringRules) -> Self {
        Classifier { rules }
    }

    pub fn classify(&self, record: &CommitRecord) -> Classification {
        let kind = classify_kind(&record.message);
        let (axis, level) = self.classify_complexity(&record.stats);
        Classification { kind, axis, level }
    }

    /// Scores both axes and keeps the higher one; a tie counts as algorithmic.
    pub fn classify_complexity(&self, stats: &CommitChangeStats) -> (ComplexityAxis, ComplexityLevel) {
        let structural = self.score_structural(stats);
        let algorithmic = self.score_algorithmic(stats);
        if algorithmic >= structural {
            (ComplexityAxis::Algorithmic, self.level_for(algorithmic))
        } else {
            (ComplexityAxis::Structural, self.level_for(structural))
        }
    }

    pub fn score_structural(&self, stats: &CommitChangeStats) -> f64 {
        let mut score = 0.0;
        for file in &stats.files {
            if self.rules.structural_dirs.iter().any(|d| file.contains(d.as_str())) {
                score += 10.0;
            }
        }
        for (ext, count) in &stats.file_types {
            let n = *count as f64;
            if self.rules.structural_exts.iter().any(|e| e == ext) {
                score += 5.0 * n;
            }
            if self.rules.stylesheet_exts.iter().any(|e| e == ext) {
                score += 8.0 * n;
            }
        }
        score + 2.0 * stats.files_changed as f64
    }

    pub fn score_algorithmic(&self, stats: &CommitChangeStats) -> f64 {
        let mut score = 0.0;
        for file in &stats.files {
            if self.rules.algorithmic_dirs.iter().any(|d| file.contains(d.as_str())) {
                score += 15.0;
            }
        }
        for (ext, count) in &stats.file_types {
            if self.rules.code_exts.iter().any(|e| e == ext) {
                score += 8.0 * *count as f64;
            }
        }
        if stats.files_changed > 0 {
            // deleted lines weigh a tenth of added lines in the density term
            let avg_lines_per_file = (stats.additions as f64 + 0.10 * stats.deletions as f64)
                / stats.files_changed as f64;
            score += (avg_lines_per_file / 10.0).min(20.0);
        }
        let deletion_ratio = stats.deletions as f64 / stats.additions.max(1) as f64;
        score + deletion_ratio.min(1.5) * 5.0
    }

    fn level_for(&self, score: f64) -> ComplexityLevel {
        let [trivial, basic, moderate, complex] = self.rules.level_cutoffs;
        if score <= trivial {
            ComplexityLevel::Trivial
        } else if score <= basic {
            ComplexityLevel::Basic
        } else if score <= moderate {
            ComplexityLevel::Moderate
        } else if score <= complex {
            ComplexityLevel::Complex
        } else {
            ComplexityLevel::VeryComplex
        }
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Classifier::new(ScoringRules::default())
    }
}

/// Intent classification: an ordered first-match rule list. The order is the
/// contract: merge markers outrank explicit feat/fix prefixes, which outrank
/// version-plus-keyword patterns, which outrank generic publish markers, so a
/// message like "v1.2.1 fix crash" resolves to FIX rather than PUBLISH.
pub fn classify_kind(message: &str) -> CommitKind {
    let msg = message.trim();
    let lower = msg.to_lowercase();

    if lower.starts_with("merge") {
        return CommitKind::Merge;
    }
    if lower.starts_with("feat:") || lower.starts_with("feat(") || lower.starts_with("feature:") {
        return CommitKind::Feature;
    }
    if lower.starts_with("fix:") || lower.starts_with("fix(") || lower.starts_with("hotfix:") {
        return CommitKind::Fix;
    }
    if VERSION_PATTERN.is_match(msg) {
        if FIX_HINT.is_match(msg) {
            return CommitKind::Fix;
        }
        if FEATURE_HINT.is_match(msg) {
            return CommitKind::Feature;
        }
    }
    if PUBLISH_PATTERN.is_match(msg) || VERSION_PATTERN.is_match(msg) {
        return CommitKind::Publish;
    }
    CommitKind::Default
}
