use crate::error::{ContribError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const COMMIT_CSV_HEADERS: &[&str] = &[
    "type",
    "sha",
    "short_sha",
    "message",
    "message_first_line",
    "author_name",
    "author_email",
    "author_date",
    "committer_name",
    "committer_email",
    "committer_date",
    "repo",
    "repo_owner",
    "repo_name",
    "url",
    "api_url",
    "node_id",
    "parents",
    "stats_additions",
    "stats_deletions",
    "stats_total",
    "files_changed",
    "verification_verified",
    "verification_reason",
];

// PR bodies are multi-line and never exported.
pub const PULL_REQUEST_CSV_HEADERS: &[&str] = &[
    "type",
    "number",
    "sha",
    "short_sha",
    "title",
    "state",
    "created_at",
    "merged_at",
    "closed_at",
    "author_name",
    "author_date",
    "repo",
    "repo_owner",
    "repo_name",
    "url",
    "api_url",
    "node_id",
    "merged",
    "draft",
    "head_sha",
    "merge_commit_sha",
];

pub const CODE_REVIEW_CSV_HEADERS: &[&str] = &[
    "type",
    "review_id",
    "state",
    "submitted_at",
    "pr_number",
    "pr_title",
    "repo",
    "repo_owner",
    "repo_name",
    "reviewer_name",
    "review_body",
    "pr_url",
    "review_url",
    "commit_id",
];

pub const DEFAULT_AFFILIATION: &str = "owner,collaborator,organization_member";
pub const VALID_AFFILIATIONS: &[&str] = &["owner", "collaborator", "organization_member"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommitRecord {
    #[serde(rename = "type")]
    pub record_type: String,
    pub sha: String,
    pub short_sha: String,
    pub message: String,
    pub message_first_line: String,
    pub author_name: String,
    pub author_email: String,
    pub author_date: String,
    pub committer_name: String,
    pub committer_email: String,
    pub committer_date: String,
    pub repo: String,
    pub repo_owner: String,
    pub repo_name: String,
    pub url: String,
    pub api_url: String,
    pub node_id: String,
    pub parents: String,
    pub stats_additions: Option<u64>,
    pub stats_deletions: Option<u64>,
    pub stats_total: Option<u64>,
    pub files_changed: Option<u64>,
    pub verification_verified: bool,
    pub verification_reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PullRequestRecord {
    #[serde(rename = "type")]
    pub record_type: String,
    pub number: u64,
    pub sha: String,
    pub short_sha: String,
    pub title: String,
    pub state: String,
    pub created_at: String,
    pub merged_at: String,
    pub closed_at: String,
    pub author_name: String,
    pub author_date: String,
    pub repo: String,
    pub repo_owner: String,
    pub repo_name: String,
    pub url: String,
    pub api_url: String,
    pub node_id: String,
    pub merged: bool,
    pub draft: bool,
    pub head_sha: String,
    pub merge_commit_sha: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeReviewRecord {
    #[serde(rename = "type")]
    pub record_type: String,
    pub review_id: u64,
    pub state: String,
    pub submitted_at: String,
    pub pr_number: u64,
    pub pr_title: String,
    pub repo: String,
    pub repo_owner: String,
    pub repo_name: String,
    pub reviewer_name: String,
    pub review_body: String,
    pub pr_url: String,
    pub review_url: String,
    pub commit_id: String,
}

/// A repository the commit fetch walks. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRef {
    pub owner: String,
    pub name: String,
    pub private: bool,
}

impl RepoRef {
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContributionKind {
    Commit,
    PullRequest,
    CodeReview,
}

impl ContributionKind {
    pub const ALL: [ContributionKind; 3] = [
        ContributionKind::Commit,
        ContributionKind::PullRequest,
        ContributionKind::CodeReview,
    ];

    /// Value of the `type` column.
    pub fn type_tag(self) -> &'static str {
        match self {
            ContributionKind::Commit => "commit",
            ContributionKind::PullRequest => "pull-request",
            ContributionKind::CodeReview => "code-review",
        }
    }

    pub fn csv_file_name(self) -> &'static str {
        match self {
            ContributionKind::Commit => "commits.csv",
            ContributionKind::PullRequest => "pullRequests.csv",
            ContributionKind::CodeReview => "codeReviews.csv",
        }
    }

    /// Subdirectory of `contributions/` holding this kind's markdown files.
    pub fn dir_name(self) -> &'static str {
        match self {
            ContributionKind::Commit => "commits",
            ContributionKind::PullRequest => "pull-requests",
            ContributionKind::CodeReview => "code-reviews",
        }
    }

    pub fn headers(self) -> &'static [&'static str] {
        match self {
            ContributionKind::Commit => COMMIT_CSV_HEADERS,
            ContributionKind::PullRequest => PULL_REQUEST_CSV_HEADERS,
            ContributionKind::CodeReview => CODE_REVIEW_CSV_HEADERS,
        }
    }

    /// Plural, lower-case name used in progress and summary output.
    pub fn label(self) -> &'static str {
        match self {
            ContributionKind::Commit => "commits",
            ContributionKind::PullRequest => "pull requests",
            ContributionKind::CodeReview => "code reviews",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            ContributionKind::Commit => "Commits",
            ContributionKind::PullRequest => "Pull Requests",
            ContributionKind::CodeReview => "Code Reviews",
        }
    }

    fn from_token(token: &str) -> Option<Self> {
        match token {
            "commit" | "commits" => Some(ContributionKind::Commit),
            "pr" | "prs" | "pullrequests" => Some(ContributionKind::PullRequest),
            "review" | "reviews" | "codereviews" => Some(ContributionKind::CodeReview),
            _ => None,
        }
    }
}

impl fmt::Display for ContributionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Which contribution kinds an operation acts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KindSelection {
    pub commits: bool,
    pub pull_requests: bool,
    pub code_reviews: bool,
}

impl KindSelection {
    pub fn all() -> Self {
        Self {
            commits: true,
            pull_requests: true,
            code_reviews: true,
        }
    }

    pub fn commits_only() -> Self {
        Self {
            commits: true,
            ..Self::default()
        }
    }

    pub fn contains(&self, kind: ContributionKind) -> bool {
        match kind {
            ContributionKind::Commit => self.commits,
            ContributionKind::PullRequest => self.pull_requests,
            ContributionKind::CodeReview => self.code_reviews,
        }
    }

    pub fn set(&mut self, kind: ContributionKind, enabled: bool) {
        match kind {
            ContributionKind::Commit => self.commits = enabled,
            ContributionKind::PullRequest => self.pull_requests = enabled,
            ContributionKind::CodeReview => self.code_reviews = enabled,
        }
    }

    pub fn is_empty(&self) -> bool {
        !self.commits && !self.pull_requests && !self.code_reviews
    }

    /// Selected kinds in processing order.
    pub fn kinds(&self) -> Vec<ContributionKind> {
        ContributionKind::ALL
            .into_iter()
            .filter(|k| self.contains(*k))
            .collect()
    }

    pub fn intersect(&self, other: &KindSelection) -> Self {
        Self {
            commits: self.commits && other.commits,
            pull_requests: self.pull_requests && other.pull_requests,
            code_reviews: self.code_reviews && other.code_reviews,
        }
    }

    /// Parse a `[types]` argument: `all`, `both`, or a comma-separated list
    /// of kind aliases. Replaces the default instead of adding to it.
    pub fn parse(input: &str) -> Result<Self> {
        let normalized = input.trim().to_lowercase();
        let tokens: Vec<&str> = normalized.split(',').map(str::trim).collect();

        if tokens.contains(&"all") {
            return Ok(Self::all());
        }
        if normalized == "both" {
            return Ok(Self {
                commits: true,
                pull_requests: true,
                code_reviews: false,
            });
        }

        let mut selection = Self::default();
        for kind in tokens.iter().filter_map(|t| ContributionKind::from_token(t)) {
            selection.set(kind, true);
        }

        if selection.is_empty() {
            return Err(ContribError::InvalidTypes(input.to_string()));
        }
        Ok(selection)
    }

    pub fn titles(&self) -> Vec<&'static str> {
        self.kinds().into_iter().map(ContributionKind::title).collect()
    }
}

/// Repository-access relationships used to scope the commit fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Affiliation(Vec<String>);

impl Affiliation {
    pub fn parse(input: &str) -> Result<Self> {
        let values: Vec<String> = input.split(',').map(|a| a.trim().to_string()).collect();
        for value in &values {
            if !VALID_AFFILIATIONS.contains(&value.as_str()) {
                return Err(ContribError::InvalidAffiliation(value.clone()));
            }
        }
        Ok(Self(values))
    }

    pub fn values(&self) -> &[String] {
        &self.0
    }
}

impl Default for Affiliation {
    fn default() -> Self {
        Self(DEFAULT_AFFILIATION.split(',').map(str::to_string).collect())
    }
}

impl fmt::Display for Affiliation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(","))
    }
}
