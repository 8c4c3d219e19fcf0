use super::VersionControl;
use crate::error::{ContribError, Result};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tracing::debug;

/// `git` subprocess wrapper rooted at a directory inside a work tree.
pub struct GitCli {
    cwd: PathBuf,
}

impl GitCli {
    /// Open the repository containing `path`, or the current dir if `None`.
    pub fn open<P: AsRef<Path>>(path: Option<P>) -> Result<Self> {
        let cwd = match path {
            Some(p) => p.as_ref().to_path_buf(),
            None => std::env::current_dir()?,
        };

        // Bare repositories have nothing to commit files from.
        let repo = gix::discover(&cwd).map_err(|_| ContribError::NotARepository(cwd.clone()))?;
        if repo.workdir().is_none() {
            return Err(ContribError::NotARepository(cwd));
        }

        Ok(Self { cwd })
    }

    fn output<I, S>(&self, args: I, envs: &[(&str, &str)]) -> Result<Output>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        Ok(Command::new("git")
            .args(args)
            .envs(envs.iter().copied())
            .current_dir(&self.cwd)
            .output()?)
    }

    fn run(&self, args: &[&OsStr], envs: &[(&str, &str)]) -> Result<()> {
        let out = self.output(args, envs)?;
        if out.status.success() {
            return Ok(());
        }
        Err(ContribError::Git {
            command: args
                .iter()
                .map(|a| a.to_string_lossy())
                .collect::<Vec<_>>()
                .join(" "),
            code: out.status.code(),
            stderr: String::from_utf8_lossy(&out.stderr).trim().to_string(),
        })
    }
}

impl VersionControl for GitCli {
    fn has_history(&self, path: &Path) -> Result<bool> {
        let out = self.output(
            [OsStr::new("log"), OsStr::new("--oneline"), OsStr::new("--"), path.as_os_str()],
            &[],
        )?;
        // An unborn branch makes `git log` fail; that simply means no history.
        Ok(out.status.success() && !String::from_utf8_lossy(&out.stdout).trim().is_empty())
    }

    fn stage(&self, path: &Path) -> Result<()> {
        debug!(path = %path.display(), "git add");
        self.run(&[OsStr::new("add"), OsStr::new("--"), path.as_os_str()], &[])
    }

    fn unstage(&self, path: &Path) -> Result<()> {
        debug!(path = %path.display(), "git rm --cached");
        // Only files without history are staged, so dropping the entry restores the index.
        self.run(
            &[
                OsStr::new("rm"),
                OsStr::new("--cached"),
                OsStr::new("--quiet"),
                OsStr::new("--"),
                path.as_os_str(),
            ],
            &[],
        )
    }

    fn commit(&self, path: &Path, message: &str, date: &str) -> Result<()> {
        debug!(path = %path.display(), message, date, "git commit --only");
        self.run(
            &[
                OsStr::new("commit"),
                OsStr::new("--only"),
                OsStr::new("-m"),
                OsStr::new(message),
                OsStr::new("--"),
                path.as_os_str(),
            ],
            &[("GIT_AUTHOR_DATE", date), ("GIT_COMMITTER_DATE", date)],
        )
    }
}
