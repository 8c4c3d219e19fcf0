//! Wire shapes of the REST endpoints we call. Only the fields we read are
//! declared; everything optional on the platform side is optional here.

use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiUser {
    pub login: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiRepo {
    pub name: String,
    pub owner: ApiUser,
    #[serde(default)]
    pub private: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiGitActor {
    pub name: Option<String>,
    pub email: Option<String>,
    pub date: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiVerification {
    #[serde(default)]
    pub verified: bool,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiCommitDetail {
    #[serde(default)]
    pub message: String,
    pub author: Option<ApiGitActor>,
    pub committer: Option<ApiGitActor>,
    pub verification: Option<ApiVerification>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiParent {
    pub sha: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiCommitStats {
    pub additions: Option<u64>,
    pub deletions: Option<u64>,
    pub total: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiCommit {
    pub sha: String,
    #[serde(default)]
    pub html_url: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub node_id: String,
    #[serde(default)]
    pub commit: ApiCommitDetail,
    #[serde(default)]
    pub parents: Vec<ApiParent>,
    pub stats: Option<ApiCommitStats>,
    pub files: Option<Vec<serde_json::Value>>,
}

/// An item from `/search/issues`. Pull requests carry a `pull_request` object.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiIssue {
    pub number: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub html_url: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub node_id: String,
    pub created_at: Option<String>,
    pub closed_at: Option<String>,
    pub user: Option<ApiUser>,
    pub pull_request: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiSearchPage {
    #[serde(default)]
    pub total_count: u64,
    #[serde(default)]
    pub items: Vec<ApiIssue>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiGitRef {
    pub sha: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiBase {
    pub repo: ApiRepo,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiPull {
    pub number: u64,
    pub title: Option<String>,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub html_url: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub node_id: String,
    pub created_at: Option<String>,
    pub merged_at: Option<String>,
    pub closed_at: Option<String>,
    pub user: Option<ApiUser>,
    pub merged: Option<bool>,
    pub draft: Option<bool>,
    pub merge_commit_sha: Option<String>,
    pub head: Option<ApiGitRef>,
    pub base: ApiBase,
}

impl ApiPull {
    pub fn is_merged(&self) -> bool {
        self.merged.unwrap_or(self.merged_at.is_some())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiReview {
    pub id: u64,
    pub user: Option<ApiUser>,
    pub body: Option<String>,
    #[serde(default)]
    pub state: String,
    pub submitted_at: Option<String>,
    #[serde(default)]
    pub html_url: String,
    pub commit_id: Option<String>,
}

/// Search hits plus the total the endpoint reported, which may exceed what it
/// is willing to return.
#[derive(Debug, Clone, Default)]
pub struct SearchResults {
    pub total_count: u64,
    pub items: Vec<ApiIssue>,
}
