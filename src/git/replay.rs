use super::VersionControl;
use crate::config::Workspace;
use crate::error::Result;
use crate::model::{ContributionKind, KindSelection};
use crate::util::{git_date, timestamp_from_filename};
use chrono::{DateTime, Utc};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContributionFile {
    pub kind: ContributionKind,
    pub file_name: String,
    /// Path relative to the workspace root, as handed to git.
    pub path: PathBuf,
    pub timestamp: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplayStats {
    pub total: usize,
    pub committed: usize,
    /// Already committed plus unparseable names.
    pub skipped: usize,
    pub invalid: usize,
    pub errors: usize,
}

/// Markdown files (README excluded) of the selected kinds, in discovery
/// order: kind order first, then file name.
pub fn collect_files(workspace: &Workspace, kinds: &KindSelection) -> Result<Vec<ContributionFile>> {
    let mut files = Vec::new();

    for kind in kinds.kinds() {
        let dir = workspace.contributions_dir(kind);
        if !dir.is_dir() {
            continue;
        }

        let mut names: Vec<String> = fs::read_dir(&dir)?
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().is_file())
            .filter_map(|entry| entry.file_name().into_string().ok())
            .filter(|name| name.ends_with(".md") && name != "README.md")
            .collect();
        names.sort();

        let relative = dir
            .strip_prefix(workspace.root())
            .map(|p| p.to_path_buf())
            .unwrap_or_else(|_| dir.clone());

        files.extend(names.into_iter().map(|name| ContributionFile {
            kind,
            path: relative.join(&name),
            timestamp: timestamp_from_filename(&name),
            file_name: name,
        }));
    }

    Ok(files)
}

/// Commit `files` one at a time in chronological order, forging author and
/// committer dates from each file name. Never fails as a whole: per-file
/// problems are counted and the replay moves on.
pub fn replay(vcs: &dyn VersionControl, mut files: Vec<ContributionFile>) -> ReplayStats {
    // Stable: equal timestamps keep discovery order. Unparseable names sort first.
    files.sort_by_key(|f| f.timestamp);

    let mut stats = ReplayStats {
        total: files.len(),
        ..ReplayStats::default()
    };

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{pos}/{len}] {wide_msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );

    for file in &files {
        pb.set_message(file.file_name.clone());
        pb.inc(1);

        let Some(timestamp) = file.timestamp else {
            warn!(file = %file.file_name, "skipping file with invalid date prefix");
            stats.invalid += 1;
            stats.skipped += 1;
            continue;
        };

        match vcs.has_history(&file.path) {
            Ok(true) => {
                stats.skipped += 1;
                continue;
            }
            Ok(false) => {}
            Err(e) => {
                warn!(file = %file.file_name, error = %e, "could not read history");
                stats.errors += 1;
                continue;
            }
        }

        let date = git_date(&timestamp);
        let message = format!("Add contribution: {}", file.file_name);

        if let Err(e) = vcs.stage(&file.path) {
            warn!(file = %file.file_name, error = %e, "staging failed");
            stats.errors += 1;
            continue;
        }
        match vcs.commit(&file.path, &message, &date) {
            Ok(()) => stats.committed += 1,
            Err(e) => {
                warn!(file = %file.file_name, error = %e, "commit failed");
                stats.errors += 1;
                // A file left in the index would ride along with the next commit.
                if let Err(e) = vcs.unstage(&file.path) {
                    warn!(file = %file.file_name, error = %e, "could not unstage after failed commit");
                }
            }
        }
    }

    pb.finish_and_clear();
    info!(?stats, "replay finished");
    stats
}
