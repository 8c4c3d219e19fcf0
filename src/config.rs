use crate::error::{ContribError, Result};
use crate::model::{ContributionKind, KindSelection};
use std::path::{Path, PathBuf};

pub const DEFAULT_API_URL: &str = "https://api.github.com";

pub const TOKEN_VAR: &str = "GITHUB_TOKEN";
pub const USERNAME_VAR: &str = "GITHUB_USERNAME";
pub const API_URL_VAR: &str = "GITHUB_API_URL";

/// Credentials and endpoint for the hosted git platform.
#[derive(Clone)]
pub struct Config {
    pub token: String,
    pub username: String,
    pub api_url: String,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("token", &"<redacted>")
            .field("username", &self.username)
            .field("api_url", &self.api_url)
            .finish()
    }
}

impl Config {
    /// Load `.env` if present, then read the process environment.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source. Blank values count as missing.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let token = get(TOKEN_VAR).ok_or(ContribError::MissingEnv(TOKEN_VAR))?;
        let username = get(USERNAME_VAR).ok_or(ContribError::MissingEnv(USERNAME_VAR))?;
        let api_url = get(API_URL_VAR)
            .map(|u| u.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        Ok(Self {
            token,
            username,
            api_url,
        })
    }
}

/// On-disk layout: `exports/` for CSV, `contributions/<kind>/` for markdown.
/// The root is also the git repository the commit stage writes to.
#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
}

impl Workspace {
    pub fn new<P: AsRef<Path>>(root: Option<P>) -> Result<Self> {
        let root = match root {
            Some(p) => p.as_ref().to_path_buf(),
            None => std::env::current_dir()?,
        };
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn exports_dir(&self) -> PathBuf {
        self.root.join("exports")
    }

    pub fn csv_path(&self, kind: ContributionKind) -> PathBuf {
        self.exports_dir().join(kind.csv_file_name())
    }

    pub fn contributions_dir(&self, kind: ContributionKind) -> PathBuf {
        self.root.join("contributions").join(kind.dir_name())
    }

    /// Kinds whose CSV file currently exists.
    pub fn available_csvs(&self) -> KindSelection {
        let mut available = KindSelection::default();
        for kind in ContributionKind::ALL {
            available.set(kind, self.csv_path(kind).is_file());
        }
        available
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn missing_token_fails_first() {
        let err = Config::from_lookup(env(&[(USERNAME_VAR, "octo")])).unwrap_err();
        assert!(matches!(err, ContribError::MissingEnv(TOKEN_VAR)));
    }

    #[test]
    fn blank_username_counts_as_missing() {
        let err = Config::from_lookup(env(&[(TOKEN_VAR, "t"), (USERNAME_VAR, "  ")])).unwrap_err();
        assert!(matches!(err, ContribError::MissingEnv(USERNAME_VAR)));
    }

    #[test]
    fn enterprise_url_is_trimmed() {
        let config = Config::from_lookup(env(&[
            (TOKEN_VAR, "t"),
            (USERNAME_VAR, "octo"),
            (API_URL_VAR, "https://ghe.example.com/api/v3/"),
        ]))
        .unwrap();
        assert_eq!(config.api_url, "https://ghe.example.com/api/v3");
    }

    #[test]
    fn public_api_is_the_default() {
        let config = Config::from_lookup(env(&[(TOKEN_VAR, "t"), (USERNAME_VAR, "octo")])).unwrap();
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert!(!format!("{config:?}").contains("\"t\""));
    }

    #[test]
    fn workspace_paths() {
        let ws = Workspace::new(Some("/tmp/ws")).unwrap();
        assert_eq!(
            ws.csv_path(ContributionKind::PullRequest),
            PathBuf::from("/tmp/ws/exports/pullRequests.csv")
        );
        assert_eq!(
            ws.contributions_dir(ContributionKind::CodeReview),
            PathBuf::from("/tmp/ws/contributions/code-reviews")
        );
    }
}
