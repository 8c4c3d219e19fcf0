//! CSV -> markdown drain.
//!
//! Every kind goes through [`import_items`]; an [`ImportPlan`] supplies the
//! kind-specific validation, rendering and file naming. Import is one-shot:
//! the CSV is removed once its rows have been processed, and a second run
//! without a fresh export fails with [`ContribError::CsvNotFound`].

pub mod render;

use crate::config::Workspace;
use crate::csv::{self, Row};
use crate::error::{ContribError, Result};
use crate::model::{ContributionKind, KindSelection};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::PathBuf;
use tracing::{debug, info, warn};

pub struct ImportPlan {
    pub kind: ContributionKind,
    pub csv_path: PathBuf,
    pub output_dir: PathBuf,
    pub is_valid: fn(&Row) -> bool,
    pub render: fn(&Row) -> String,
    pub file_name: fn(&Row) -> String,
}

impl ImportPlan {
    pub fn for_kind(workspace: &Workspace, kind: ContributionKind) -> Self {
        let (is_valid, render, file_name): (fn(&Row) -> bool, fn(&Row) -> String, fn(&Row) -> String) =
            match kind {
                ContributionKind::Commit => (
                    render::is_valid_commit,
                    render::render_commit,
                    render::commit_file_name,
                ),
                ContributionKind::PullRequest => (
                    render::is_valid_pull_request,
                    render::render_pull_request,
                    render::pull_request_file_name,
                ),
                ContributionKind::CodeReview => (
                    render::is_valid_code_review,
                    render::render_code_review,
                    render::code_review_file_name,
                ),
            };

        Self {
            kind,
            csv_path: workspace.csv_path(kind),
            output_dir: workspace.contributions_dir(kind),
            is_valid,
            render,
            file_name,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportStats {
    pub total: usize,
    pub valid: usize,
    pub discarded: usize,
    pub imported: usize,
    pub skipped: usize,
}

fn read_rows(plan: &ImportPlan) -> Result<Vec<Row>> {
    let text = fs::read_to_string(&plan.csv_path)?;
    Ok(csv::parse(&text)?
        .into_iter()
        .map(|row| row.map_values(|v| v.trim().to_string()))
        .collect())
}

/// Drain one CSV into markdown files, skipping files that already exist.
pub fn import_items(plan: &ImportPlan) -> Result<ImportStats> {
    if !plan.csv_path.is_file() {
        return Err(ContribError::CsvNotFound(plan.csv_path.clone()));
    }

    let rows = read_rows(plan)?;
    let total = rows.len();
    let valid: Vec<Row> = rows.into_iter().filter(|r| (plan.is_valid)(r)).collect();
    let mut stats = ImportStats {
        total,
        valid: valid.len(),
        discarded: total - valid.len(),
        ..ImportStats::default()
    };
    if stats.discarded > 0 {
        warn!(
            kind = %plan.kind,
            discarded = stats.discarded,
            "discarded rows missing required fields"
        );
    }

    fs::create_dir_all(&plan.output_dir)?;

    let pb = ProgressBar::new(valid.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{pos}/{len}] {wide_msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );

    for row in &valid {
        let file_name = (plan.file_name)(row);
        let path = plan.output_dir.join(&file_name);
        pb.set_message(file_name);
        pb.inc(1);

        if path.exists() {
            debug!(path = %path.display(), "already exists");
            stats.skipped += 1;
            continue;
        }
        fs::write(&path, (plan.render)(row))?;
        stats.imported += 1;
    }
    pb.finish_and_clear();

    fs::remove_file(&plan.csv_path)?;
    info!(kind = %plan.kind, ?stats, "import finished, CSV removed");

    Ok(stats)
}

/// Resolve an import `[types]` argument against the CSVs present on disk.
pub fn select_kinds(workspace: &Workspace, types: Option<&str>) -> Result<KindSelection> {
    let available = workspace.available_csvs();
    if available.is_empty() {
        return Err(ContribError::NoCsvFiles(workspace.exports_dir()));
    }

    let Some(types) = types else {
        return Ok(available);
    };

    let requested = KindSelection::parse(types)?;
    let normalized = types.trim().to_lowercase();
    let is_keyword = normalized == "both" || normalized.split(',').any(|t| t.trim() == "all");
    if is_keyword {
        return Ok(requested.intersect(&available));
    }

    for kind in requested.kinds() {
        if !available.contains(kind) {
            return Err(ContribError::CsvNotFound(workspace.csv_path(kind)));
        }
    }
    Ok(requested)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::COMMIT_CSV_HEADERS;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    /// A commits CSV line with `fields` set and every other column empty.
    fn commit_line(fields: &[(&str, &str)]) -> String {
        COMMIT_CSV_HEADERS
            .iter()
            .map(|h| {
                fields
                    .iter()
                    .find(|(name, _)| name == h)
                    .map(|(_, v)| csv::escape_field(v).into_owned())
                    .unwrap_or_default()
            })
            .collect::<Vec<_>>()
            .join(",")
    }

    fn write_csv(workspace: &Workspace, lines: &[String]) {
        let mut text = COMMIT_CSV_HEADERS.join(",");
        text.push('\n');
        for line in lines {
            text.push_str(line);
            text.push('\n');
        }
        fs::create_dir_all(workspace.exports_dir()).unwrap();
        fs::write(workspace.csv_path(ContributionKind::Commit), text).unwrap();
    }

    fn valid(sha: &str, date: &str) -> String {
        commit_line(&[
            ("type", "commit"),
            ("sha", sha),
            ("short_sha", &sha[..7]),
            ("author_date", date),
            ("message_first_line", "Tidy, then ship"),
        ])
    }

    #[test]
    fn missing_csv_fails_without_touching_disk() {
        let dir = tempdir().unwrap();
        let workspace = Workspace::new(Some(dir.path())).unwrap();
        let plan = ImportPlan::for_kind(&workspace, ContributionKind::Commit);

        assert!(matches!(import_items(&plan), Err(ContribError::CsvNotFound(_))));
        assert!(!dir.path().join("contributions").exists());
    }

    #[test]
    fn invalid_rows_are_discarded_and_counted() {
        let dir = tempdir().unwrap();
        let workspace = Workspace::new(Some(dir.path())).unwrap();
        write_csv(
            &workspace,
            &[
                valid("abc1234ffff", "2024-03-01T12:00:00Z"),
                commit_line(&[("type", "commit"), ("sha", "no-date"), ("short_sha", "no-date")]),
                valid("def5678eeee", "2024-03-02T08:00:00Z"),
                commit_line(&[("type", "commit"), ("author_date", "2024-03-03T00:00:00Z")]),
            ],
        );
        let plan = ImportPlan::for_kind(&workspace, ContributionKind::Commit);

        let stats = import_items(&plan).unwrap();

        assert_eq!(
            stats,
            ImportStats {
                total: 4,
                valid: 2,
                discarded: 2,
                imported: 2,
                skipped: 0,
            }
        );
        assert_eq!(stats.discarded, stats.total - stats.valid);
        let body = fs::read_to_string(plan.output_dir.join("2024-03-01T12-00-00-abc1234.md")).unwrap();
        assert!(body.contains("- **Message**: Tidy, then ship"));
        assert!(plan.output_dir.join("2024-03-02T08-00-00-def5678.md").is_file());
        assert!(!plan.csv_path.exists());
    }

    #[test]
    fn header_only_csv_is_still_consumed() {
        let dir = tempdir().unwrap();
        let workspace = Workspace::new(Some(dir.path())).unwrap();
        write_csv(&workspace, &[]);
        let plan = ImportPlan::for_kind(&workspace, ContributionKind::Commit);

        assert_eq!(import_items(&plan).unwrap(), ImportStats::default());
        assert!(!plan.csv_path.exists());
    }

    #[test]
    fn csv_without_valid_rows_is_still_consumed() {
        let dir = tempdir().unwrap();
        let workspace = Workspace::new(Some(dir.path())).unwrap();
        write_csv(&workspace, &[commit_line(&[("type", "commit")])]);
        let plan = ImportPlan::for_kind(&workspace, ContributionKind::Commit);

        let stats = import_items(&plan).unwrap();

        assert_eq!((stats.total, stats.valid, stats.discarded), (1, 0, 1));
        assert!(!plan.csv_path.exists());
        assert_eq!(fs::read_dir(&plan.output_dir).unwrap().count(), 0);
    }
}
