use crate::config::Workspace;
use crate::csv::to_csv;
use crate::error::Result;
use crate::github::FetchResult;
use crate::model::{ContributionKind, KindSelection};
use serde::Serialize;
use std::fs;
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Clone)]
pub struct ExportedFile {
    pub kind: ContributionKind,
    pub path: PathBuf,
    pub rows: usize,
    pub bytes: usize,
}

fn write_kind<T: Serialize>(
    workspace: &Workspace,
    kind: ContributionKind,
    records: &[T],
) -> Result<ExportedFile> {
    let content = to_csv(records, kind.headers())?;
    let path = workspace.csv_path(kind);
    fs::create_dir_all(workspace.exports_dir())?;
    fs::write(&path, &content)?;
    info!(path = %path.display(), rows = records.len(), "wrote CSV");

    Ok(ExportedFile {
        kind,
        path,
        rows: records.len(),
        bytes: content.len(),
    })
}

/// Write one CSV per selected kind, overwriting earlier exports. A selected
/// kind with no records still gets a header-only file.
pub fn export_contributions(
    workspace: &Workspace,
    kinds: &KindSelection,
    fetched: &FetchResult,
) -> Result<Vec<ExportedFile>> {
    let mut written = Vec::new();
    for kind in kinds.kinds() {
        let file = match kind {
            ContributionKind::Commit => write_kind(workspace, kind, &fetched.commits)?,
            ContributionKind::PullRequest => write_kind(workspace, kind, &fetched.pull_requests)?,
            ContributionKind::CodeReview => write_kind(workspace, kind, &fetched.code_reviews)?,
        };
        written.push(file);
    }
    Ok(written)
}
