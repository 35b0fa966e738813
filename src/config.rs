use crate::analyzers::estimator::RateTable;
use crate::error::{Result, TimesheetError};
use serde::Deserialize;
use std::path::Path;

/// Author identities dropped by default: automated CI bots whose commits are
/// machine noise, not billable work. Replaced wholesale by `excluded_authors`
/// in config or `--exclude-author` on the CLI.
pub const DEFAULT_EXCLUDED_AUTHORS: &[&str] =
    &["github-actions[bot]", "dependabot[bot]", "renovate[bot]"];

pub const CONFIG_FILENAME: &str = ".git-timesheet.yml";

/// All settings that can be placed in a .git-timesheet.yml config file.
/// Every field is optional; omitted fields fall back to CLI defaults.
/// CLI flags always take precedence over values set here.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TimesheetConfig {
    // Analysis defaults (overridden by the corresponding CLI flag)
    pub since: Option<String>,
    pub format: Option<String>,
    pub output: Option<String>,

    /// Replaces the built-in bot exclusion list.
    pub excluded_authors: Option<Vec<String>>,

    // Per-category rate overrides
    pub rates: Option<ConfigRates>,
}

/// Optional per-category base-rate overrides. Each field that is present
/// replaces the built-in rate for that category.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigRates {
    pub logic: Option<ConfigRate>,
    pub config: Option<ConfigRate>,
    pub style: Option<ConfigRate>,
    pub docs: Option<ConfigRate>,
}

#[derive(Debug, Default, Clone, Copy, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigRate {
    pub planning: Option<f64>,
    pub implementation_per_line: Option<f64>,
}

impl TimesheetConfig {
    /// Validates semantic constraints that serde cannot enforce.
    ///
    /// Returns a human-readable error describing exactly what is wrong and
    /// what values are accepted. Called automatically by [`load_config`].
    pub fn validate(&self) -> std::result::Result<(), String> {
        // format must be one of the three supported output drivers
        if let Some(fmt) = &self.format {
            match fmt.as_str() {
                "terminal" | "json" | "markdown" => {}
                other => {
                    return Err(format!(
                        "Invalid 'format' value: \"{other}\". \
                         Expected one of: \"terminal\", \"json\", \"markdown\""
                    ))
                }
            }
        }

        if let Some(rates) = &self.rates {
            let categories: &[(&str, &Option<ConfigRate>)] = &[
                ("logic", &rates.logic),
                ("config", &rates.config),
                ("style", &rates.style),
                ("docs", &rates.docs),
            ];
            for (name, rate) in categories {
                let Some(rate) = rate else { continue };
                let fields = [
                    ("planning", rate.planning),
                    ("implementation_per_line", rate.implementation_per_line),
                ];
                for (field, val) in fields {
                    if let Some(v) = val {
                        if !v.is_finite() {
                            return Err(format!(
                                "Invalid rate 'rates.{name}.{field}': {v} is not a finite number"
                            ));
                        }
                        if v <= 0.0 {
                            return Err(format!(
                                "Invalid rate 'rates.{name}.{field}': {v}. \
                                 Rates are hours (or hours per line) and must be greater than 0"
                            ));
                        }
                    }
                }
            }
        }

        Ok(())
    }

    /// Applies the rate overrides onto a [`RateTable`].
    pub fn apply_rates(&self, table: &mut RateTable) {
        let Some(rates) = &self.rates else { return };
        let slots = [
            (&rates.logic, &mut table.logic),
            (&rates.config, &mut table.config),
            (&rates.style, &mut table.style),
            (&rates.docs, &mut table.docs),
        ];
        for (override_rate, slot) in slots {
            let Some(r) = override_rate else { continue };
            if let Some(p) = r.planning {
                slot.planning = p;
            }
            if let Some(i) = r.implementation_per_line {
                slot.implementation_per_line = i;
            }
        }
    }
}

/// Reads, parses, and validates a YAML config file from `path`.
pub fn load_config(path: &Path) -> Result<TimesheetConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        TimesheetError::Config(format!("cannot read config file '{}': {e}", path.display()))
    })?;
    let cfg: TimesheetConfig = serde_yaml::from_str(&content).map_err(|e| {
        TimesheetError::Config(format!("invalid config file '{}': {e}", path.display()))
    })?;
    cfg.validate()
        .map_err(|e| TimesheetError::Config(format!("config file '{}': {e}", path.display())))?;
    Ok(cfg)
}

/// Resolution order: explicit `--config` path, then `<repo>/.git-timesheet.yml`,
/// then `~/.git-timesheet.yml`. Only an explicit path is an error when missing.
pub fn resolve_config(explicit: Option<&Path>, repo_root: &Path) -> Result<TimesheetConfig> {
    if let Some(path) = explicit {
        return load_config(path);
    }
    let repo_cfg = repo_root.join(CONFIG_FILENAME);
    if repo_cfg.exists() {
        return load_config(&repo_cfg);
    }
    if let Some(home) = dirs::home_dir() {
        let home_cfg = home.join(CONFIG_FILENAME);
        if home_cfg.exists() {
            return load_config(&home_cfg);
        }
    }
    Ok(TimesheetConfig::default())
}

/// Annotated YAML template, printed by `--generate-config`.
pub static TEMPLATE: &str = r#"# git-timesheet configuration file
# Generated by: git-timesheet --generate-config
#
# All settings are optional. Omit any field to use the built-in default.
# CLI flags always take precedence over values in this file.
# Save this file as .git-timesheet.yml in your repository root (or in your
# home directory for a user-wide default), then run:
#
#   git-timesheet [path]

# ── Analysis scope ─────────────────────────────────────────────────────────────

# Analyze commits since this date. Leave empty (or omit) for all history.
# Accepts any git date format: "6 months ago", "2024-01-01", "1 year ago"
# since: ""

# ── Output ─────────────────────────────────────────────────────────────────────

# Output format: terminal, json, markdown
# format: "terminal"

# Directory the json/markdown reports are written into.
# output: "reports"

# ── Authors ────────────────────────────────────────────────────────────────────

# Author identities to drop entirely (commits and their file stats).
# Replaces the built-in bot list. Matching is case-insensitive.
# excluded_authors:
#   - "github-actions[bot]"
#   - "dependabot[bot]"
#   - "renovate[bot]"

# ── Estimation rates ───────────────────────────────────────────────────────────
# Base rates per file category: flat planning hours per commit, and
# implementation hours per added line (deleted lines bill at 10%).

# rates:
#   logic:
#     planning: 0.5
#     implementation_per_line: 0.02
#   config:
#     planning: 0.15
#     implementation_per_line: 0.005
#   style:
#     planning: 0.25
#     implementation_per_line: 0.01
#   docs:
#     planning: 0.1
#     implementation_per_line: 0.004
"#;

/// Prints the config template to stdout, or writes it to `output_path` if given.
pub fn print_template(output_path: Option<&Path>) -> Result<()> {
    match output_path {
        Some(path) => std::fs::write(path, TEMPLATE).map_err(|e| {
            TimesheetError::Config(format!(
                "cannot write config template to '{}': {e}",
                path.display()
            ))
        }),
        None => {
            print!("{TEMPLATE}");
            Ok(())
        }
    }
}

/// The effective exclusion list: CLI flags win over config, config wins over
/// the built-in bot list.
pub fn effective_exclusions(cli: &[String], cfg: &TimesheetConfig) -> Vec<String> {
    if !cli.is_empty() {
        return cli.to_vec();
    }
    if let Some(from_cfg) = &cfg.excluded_authors {
        return from_cfg.clone();
    }
    DEFAULT_EXCLUDED_AUTHORS.iter().map(|s| s.to_string()).collect()
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_template_is_valid_yaml() {
        let result: std::result::Result<TimesheetConfig, _> = serde_yaml::from_str(TEMPLATE);
        assert!(
            result.is_ok(),
            "TEMPLATE must parse as valid TimesheetConfig: {:?}",
            result.err()
        );
        let cfg = result.unwrap();
        // All fields should be None (everything is commented out in the template)
        assert!(cfg.since.is_none());
        assert!(cfg.format.is_none());
        assert!(cfg.excluded_authors.is_none());
        assert!(cfg.rates.is_none());
    }

    #[test]
    fn test_empty_config_is_valid() {
        let cfg: TimesheetConfig = serde_yaml::from_str("{}").expect("empty map should parse");
        assert!(cfg.since.is_none());
        assert!(cfg.output.is_none());
        assert!(cfg.rates.is_none());
    }

    #[test]
    fn test_excluded_authors_parsed() {
        let yaml = "excluded_authors:\n  - ci-bot\n  - deploy-bot\n";
        let cfg: TimesheetConfig = serde_yaml::from_str(yaml).expect("should parse");
        let authors = cfg.excluded_authors.expect("excluded_authors should be Some");
        assert!(authors.contains(&"ci-bot".to_string()));
        assert!(authors.contains(&"deploy-bot".to_string()));
    }

    #[test]
    fn test_rates_parsed_and_applied() {
        let yaml = "rates:\n  logic:\n    planning: 1.0\n  docs:\n    implementation_per_line: 0.001\n";
        let cfg: TimesheetConfig = serde_yaml::from_str(yaml).expect("should parse");
        let mut table = RateTable::default();
        cfg.apply_rates(&mut table);
        assert!((table.logic.planning - 1.0).abs() < 1e-9, "logic planning overridden");
        assert!(
            (table.logic.implementation_per_line - 0.020).abs() < 1e-9,
            "unspecified fields keep the default"
        );
        assert!((table.docs.implementation_per_line - 0.001).abs() < 1e-9);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let yaml = "unknown_setting: true\n";
        let result: std::result::Result<TimesheetConfig, _> = serde_yaml::from_str(yaml);
        assert!(
            result.is_err(),
            "Unknown fields should be rejected by deny_unknown_fields"
        );
    }

    #[test]
    fn test_validate_invalid_format_rejected() {
        let yaml = "format: \"csv\"\n";
        let cfg: TimesheetConfig = serde_yaml::from_str(yaml).expect("should parse");
        let result = cfg.validate();
        assert!(result.is_err(), "Invalid format should be rejected");
        let msg = result.unwrap_err();
        assert!(msg.contains("format"), "Error should mention 'format': {msg}");
        assert!(
            msg.contains("terminal") && msg.contains("json") && msg.contains("markdown"),
            "Error should list all valid values: {msg}"
        );
    }

    #[test]
    fn test_validate_negative_rate_rejected() {
        let yaml = "rates:\n  style:\n    planning: -0.25\n";
        let cfg: TimesheetConfig = serde_yaml::from_str(yaml).expect("should parse");
        let result = cfg.validate();
        assert!(result.is_err(), "Negative rate should be rejected");
        let msg = result.unwrap_err();
        assert!(msg.contains("style"), "Error should name the category: {msg}");
        assert!(msg.contains("greater than 0"), "Error should explain the requirement: {msg}");
    }

    #[test]
    fn test_validate_all_categories_checked() {
        for category in ["logic", "config", "style", "docs"] {
            let yaml = format!("rates:\n  {category}:\n    implementation_per_line: -1.0\n");
            let cfg: TimesheetConfig = serde_yaml::from_str(&yaml).expect("should parse");
            let result = cfg.validate();
            assert!(result.is_err(), "Negative rate for '{category}' should be rejected");
            assert!(
                result.unwrap_err().contains(category),
                "Error for '{category}' should name the category"
            );
        }
    }

    #[test]
    fn test_effective_exclusions_precedence() {
        let cfg_with_authors: TimesheetConfig =
            serde_yaml::from_str("excluded_authors:\n  - ci-bot\n").expect("should parse");

        let cli = vec!["release-bot".to_string()];
        assert_eq!(
            effective_exclusions(&cli, &cfg_with_authors),
            vec!["release-bot".to_string()],
            "CLI flags win over config"
        );
        assert_eq!(
            effective_exclusions(&[], &cfg_with_authors),
            vec!["ci-bot".to_string()],
            "config wins over the built-in list"
        );
        let builtin = effective_exclusions(&[], &TimesheetConfig::default());
        assert!(builtin.contains(&"github-actions[bot]".to_string()));
        assert!(builtin.contains(&"dependabot[bot]".to_string()));
    }

    // ── Example file test ─────────────────────────────────────────────────────

    #[test]
    fn test_load_example_file() {
        let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
        let example_path = manifest_dir.join(".git-timesheet.example.yml");

        let cfg = load_config(&example_path).unwrap_or_else(|e| {
            panic!("Example config file should parse and validate successfully: {e}")
        });

        assert_eq!(cfg.since.as_deref(), Some("1 year ago"));
        assert_eq!(cfg.format.as_deref(), Some("markdown"));
        assert_eq!(cfg.output.as_deref(), Some("reports"));

        let authors = cfg
            .excluded_authors
            .as_ref()
            .expect("excluded_authors should be set in example file");
        assert!(authors.contains(&"github-actions[bot]".to_string()));
        assert!(authors.contains(&"dependabot[bot]".to_string()));

        let rates = cfg.rates.as_ref().expect("rates should be set in example file");
        let logic = rates.logic.expect("logic rate should be set");
        assert!((logic.planning.unwrap() - 0.6).abs() < 1e-9);
        assert!((logic.implementation_per_line.unwrap() - 0.025).abs() < 1e-9);
    }
}
