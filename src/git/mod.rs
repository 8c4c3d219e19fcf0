pub mod replay;
pub mod repo;

pub use replay::{collect_files, replay, ContributionFile, ReplayStats};
pub use repo::GitCli;

use crate::error::Result;
use std::path::Path;

/// The slice of version control the replay needs. Paths are relative to the
/// directory the implementation runs in.
pub trait VersionControl {
    /// Whether `path` already appears in the commit history.
    fn has_history(&self, path: &Path) -> Result<bool>;
    fn stage(&self, path: &Path) -> Result<()>;
    /// Drop `path` from the index again, leaving the work tree alone.
    fn unstage(&self, path: &Path) -> Result<()>;
    /// Commit `path` alone, whatever else is staged, with author and
    /// committer dates set to `date` (`YYYY-MM-DD HH:MM:SS +0000`).
    fn commit(&self, path: &Path, message: &str, date: &str) -> Result<()>;
}
