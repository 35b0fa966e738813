use crate::error::{Result, TimesheetError};
use crate::types::{CommitChangeStats, CommitRecord};
use std::collections::HashSet;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use std::process::{Command, Stdio};
use std::thread;

/// Author identities dropped from the analysis entirely (automated CI bots).
/// Matching is a case-insensitive exact comparison against the author field.
#[derive(Debug, Clone, Default)]
pub struct ExcludedAuthors(HashSet<String>);

impl ExcludedAuthors {
    pub fn new<I, S>(authors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        ExcludedAuthors(
            authors
                .into_iter()
                .map(|a| a.as_ref().to_lowercase())
                .collect(),
        )
    }

    pub fn contains(&self, author: &str) -> bool {
        self.0.contains(&author.to_lowercase())
    }
}

/// Runs a single `git log --numstat` pass and returns structured commit
/// records, newest first.
///
/// The log format is `hash|author|date|message` headers followed by
/// tab-separated per-file stat lines; both are fed through the same state
/// machine [`parse_log_text`] uses for pre-acquired text.
pub fn parse_log(cwd: &Path, since: &str, excluded: &ExcludedAuthors) -> Result<Vec<CommitRecord>> {
    let mut args: Vec<String> = vec![
        "log".into(),
        "--pretty=format:%H|%an|%ad|%s".into(),
        "--date=format:%Y-%m-%d %H:%M:%S".into(),
        "--numstat".into(),
    ];

    if !since.is_empty() {
        args.push(format!("--since={since}"));
    }

    let mut child = Command::new("git")
        .args(&args)
        .current_dir(cwd)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| TimesheetError::Git(format!("failed to run git: {e}")))?;

    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| TimesheetError::Git("failed to capture git stdout".to_string()))?;
    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| TimesheetError::Git("failed to capture git stderr".to_string()))?;

    let stderr_reader = thread::spawn(move || {
        let mut stderr_text = String::new();
        let mut reader = BufReader::new(stderr);
        let _ = reader.read_to_string(&mut stderr_text);
        stderr_text
    });

    let mut commits: Vec<CommitRecord> = Vec::new();
    let mut current: Option<CommitRecord> = None;

    for line in BufReader::new(stdout).lines() {
        let line =
            line.map_err(|e| TimesheetError::Git(format!("failed reading git output: {e}")))?;
        parse_line(&line, excluded, &mut commits, &mut current);
    }

    if let Some(c) = current.take() {
        commits.push(c);
    }

    let status = child
        .wait()
        .map_err(|e| TimesheetError::Git(format!("failed to wait for git process: {e}")))?;

    if !status.success() {
        let stderr_text = stderr_reader.join().unwrap_or_default();
        return Err(TimesheetError::Git(format!("git log failed: {stderr_text}")));
    }

    let _ = stderr_reader.join();

    Ok(commits)
}

/// Parses an already-obtained log blob into commit records, preserving input
/// order. This is the pure entry point the streaming path shares.
pub fn parse_log_text(text: &str, excluded: &ExcludedAuthors) -> Vec<CommitRecord> {
    let mut commits: Vec<CommitRecord> = Vec::new();
    let mut current: Option<CommitRecord> = None;

    for line in text.lines() {
        parse_line(line, excluded, &mut commits, &mut current);
    }

    if let Some(c) = current.take() {
        commits.push(c);
    }

    commits
}

fn parse_line(
    line: &str,
    excluded: &ExcludedAuthors,
    commits: &mut Vec<CommitRecord>,
    current: &mut Option<CommitRecord>,
) {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return;
    }

    if let Some((hash, author, timestamp, message)) = split_header(trimmed) {
        // a header terminates the previous commit's record
        if let Some(c) = current.take() {
            commits.push(c);
        }
        if excluded.contains(author) {
            // `current` stays None, so the author's stat lines fall through
            return;
        }
        *current = Some(CommitRecord {
            hash: hash.to_string(),
            author: author.to_string(),
            timestamp: timestamp.to_string(),
            message: message.to_string(),
            stats: CommitChangeStats::default(),
        });
        return;
    }

    let mut parts = trimmed.splitn(3, '\t');
    if let (Some(added_raw), Some(deleted_raw), Some(raw_path)) =
        (parts.next(), parts.next(), parts.next())
    {
        // a stat line before any header is dropped silently; incomplete log
        // windows must not abort the run
        let Some(c) = current.as_mut() else { return };

        let path = raw_path.trim();
        if path.is_empty() {
            return;
        }

        // binary changes carry the "-" placeholder: zero lines, but the file
        // still counts toward files_changed and the extension tally
        c.stats.additions += added_raw.parse::<usize>().unwrap_or(0);
        c.stats.deletions += deleted_raw.parse::<usize>().unwrap_or(0);
        c.stats.files_changed += 1;
        *c.stats.file_types.entry(extension_of(path)).or_insert(0) += 1;
        c.stats.files.push(path.to_string());
    }
}

/// A commit header is `hash|author|date|message`: four `|`-separated fields
/// whose first field contains no tab (a stat line never satisfies both).
fn split_header(line: &str) -> Option<(&str, &str, &str, &str)> {
    if !line.contains('|') {
        return None;
    }
    let mut parts = line.splitn(4, '|');
    match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(hash), Some(author), Some(date), Some(message)) if !hash.contains('\t') => {
            Some((hash, author, date, message))
        }
        _ => None,
    }
}

/// Extension bucket for a path: the substring after the last `.`.
///
/// Compound suffixes like `Button.test.tsx`, `app.spec.js`, `Card.stories.tsx`
/// resolve to the trailing real extension, not `test`/`spec`/`stories`.
/// A path with no `.` buckets as `unknown`.
pub fn extension_of(path: &str) -> String {
    match path.rfind('.') {
        Some(idx) if idx + 1 < path.len() => path[idx + 1..].to_string(),
        _ => "unknown".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_exclusions() -> ExcludedAuthors {
        ExcludedAuthors::default()
    }

    const SAMPLE: &str = "\
abc123|Alice|2024-03-01 10:00:00|feat: add cache
120\t10\tsrc/lib/cache.ts
3\t1\tsrc/lib/cache.test.ts
def456|Bob|2024-02-28 09:30:00|fix: null deref
5\t2\tsrc/app.js
-\t-\tassets/logo.png
";

    #[test]
    fn test_parses_headers_and_stat_lines() {
        let commits = parse_log_text(SAMPLE, &no_exclusions());
        assert_eq!(commits.len(), 2, "two headers should yield two records");
        assert_eq!(commits[0].hash, "abc123");
        assert_eq!(commits[0].author, "Alice");
        assert_eq!(commits[0].timestamp, "2024-03-01 10:00:00");
        assert_eq!(commits[0].message, "feat: add cache");
        assert_eq!(commits[0].stats.additions, 123);
        assert_eq!(commits[0].stats.deletions, 11);
    }

    #[test]
    fn test_output_order_matches_input_order() {
        let commits = parse_log_text(SAMPLE, &no_exclusions());
        assert_eq!(commits[0].hash, "abc123", "newest-first input order must be preserved");
        assert_eq!(commits[1].hash, "def456");
    }

    #[test]
    fn test_file_count_invariant() {
        let commits = parse_log_text(SAMPLE, &no_exclusions());
        for c in &commits {
            let type_total: usize = c.stats.file_types.values().sum();
            assert_eq!(c.stats.files_changed, c.stats.files.len());
            assert_eq!(c.stats.files_changed, type_total);
        }
    }

    #[test]
    fn test_binary_file_counts_as_zero_lines() {
        let commits = parse_log_text(SAMPLE, &no_exclusions());
        let bob = &commits[1];
        assert_eq!(bob.stats.files_changed, 2, "binary file still increments files_changed");
        assert_eq!(bob.stats.additions, 5, "binary '-' contributes zero added lines");
        assert_eq!(bob.stats.deletions, 2, "binary '-' contributes zero deleted lines");
        assert_eq!(bob.stats.file_types.get("png"), Some(&1));
    }

    #[test]
    fn test_stat_line_before_header_dropped_silently() {
        let text = "10\t2\torphan.rs\nabc|Alice|2024-01-01 08:00:00|feat: start\n1\t0\tsrc/a.rs\n";
        let commits = parse_log_text(text, &no_exclusions());
        assert_eq!(commits.len(), 1, "orphan stat line must not create a record");
        assert_eq!(commits[0].stats.files_changed, 1);
        assert!(!commits[0].stats.files.contains(&"orphan.rs".to_string()));
    }

    #[test]
    fn test_excluded_author_dropped_with_stat_lines() {
        let text = "\
a1|github-actions[bot]|2024-01-02 00:00:00|chore: bump deps
200\t200\tpackage-lock.json
a2|Alice|2024-01-01 08:00:00|feat: start
1\t0\tsrc/a.rs
";
        let excluded = ExcludedAuthors::new(["github-actions[bot]"]);
        let commits = parse_log_text(text, &excluded);
        assert_eq!(commits.len(), 1, "excluded author must not appear at all");
        assert_eq!(commits[0].author, "Alice");
        assert!(
            !commits[0].stats.files.contains(&"package-lock.json".to_string()),
            "the bot's stat lines must not leak into the next record"
        );
    }

    #[test]
    fn test_excluded_author_match_is_case_insensitive() {
        let excluded = ExcludedAuthors::new(["Dependabot[bot]"]);
        assert!(excluded.contains("dependabot[bot]"));
        assert!(excluded.contains("DEPENDABOT[BOT]"));
        assert!(!excluded.contains("alice"));
    }

    #[test]
    fn test_extension_extraction() {
        assert_eq!(extension_of("src/lib/cache.ts"), "ts");
        assert_eq!(extension_of("styles.css"), "css");
        assert_eq!(extension_of("Button.test.tsx"), "tsx", ".test.tsx buckets as tsx");
        assert_eq!(extension_of("app.spec.js"), "js", ".spec.js buckets as js");
        assert_eq!(extension_of("Card.stories.tsx"), "tsx", ".stories.tsx buckets as tsx");
        assert_eq!(extension_of("Makefile"), "unknown", "no extension buckets as unknown");
        assert_eq!(extension_of(".gitignore"), "gitignore");
        assert_eq!(extension_of("trailing."), "unknown");
    }

    #[test]
    fn test_message_with_pipes_survives_splitn() {
        let text = "abc|Alice|2024-01-01 08:00:00|feat: support a|b|c syntax\n1\t0\tsrc/a.rs\n";
        let commits = parse_log_text(text, &no_exclusions());
        assert_eq!(commits[0].message, "feat: support a|b|c syntax");
    }

    #[test]
    fn test_empty_input_yields_no_commits() {
        let commits = parse_log_text("", &no_exclusions());
        assert!(commits.is_empty());
    }

    #[test]
    fn test_commit_without_stat_lines_has_zero_stats() {
        // merges often carry no numstat block
        let text = "abc|Alice|2024-01-01 08:00:00|Merge branch 'main'\n";
        let commits = parse_log_text(text, &no_exclusions());
        assert_eq!(commits.len(), 1);
        assert_eq!(commits[0].stats.files_changed, 0);
        assert_eq!(commits[0].stats.additions, 0);
    }
}
