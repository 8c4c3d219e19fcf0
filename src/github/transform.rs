use super::types::{ApiCommit, ApiIssue, ApiPull, ApiReview};
use crate::model::{CodeReviewRecord, CommitRecord, ContributionKind, PullRequestRecord, RepoRef};
use crate::util::{normalize_timestamp, short_sha, single_line};

pub fn transform_commit(commit: &ApiCommit, repo: &RepoRef) -> CommitRecord {
    let detail = &commit.commit;
    let author = detail.author.clone().unwrap_or_default();
    let committer = detail.committer.clone().unwrap_or_default();
    let verification = detail.verification.clone().unwrap_or_default();
    let stats = commit.stats.clone().unwrap_or_default();

    CommitRecord {
        record_type: ContributionKind::Commit.type_tag().to_string(),
        sha: commit.sha.clone(),
        short_sha: short_sha(&commit.sha),
        message: single_line(&detail.message),
        message_first_line: detail.message.lines().next().unwrap_or("").trim().to_string(),
        author_name: author.name.unwrap_or_default(),
        author_email: author.email.unwrap_or_default(),
        author_date: normalize_timestamp(author.date.as_deref()),
        committer_name: committer.name.unwrap_or_default(),
        committer_email: committer.email.unwrap_or_default(),
        committer_date: normalize_timestamp(committer.date.as_deref()),
        repo: repo.full_name(),
        repo_owner: repo.owner.clone(),
        repo_name: repo.name.clone(),
        url: commit.html_url.clone(),
        api_url: commit.url.clone(),
        node_id: commit.node_id.clone(),
        parents: commit
            .parents
            .iter()
            .map(|p| p.sha.as_str())
            .collect::<Vec<_>>()
            .join(";"),
        stats_additions: stats.additions,
        stats_deletions: stats.deletions,
        stats_total: stats.total,
        files_changed: commit.files.as_ref().map(|f| f.len() as u64),
        verification_verified: verification.verified,
        verification_reason: verification.reason.unwrap_or_default(),
    }
}

/// Merge commit when merged, else the head commit, else `None`.
pub fn resolve_sha(merged: bool, merge_commit_sha: Option<&str>, head_sha: Option<&str>) -> Option<String> {
    let pick = if merged { merge_commit_sha } else { head_sha };
    pick.filter(|s| !s.is_empty()).map(str::to_string)
}

fn placeholder_sha(number: u64) -> String {
    format!("pr-{number}")
}

pub fn transform_pull_request(pr: &ApiPull) -> PullRequestRecord {
    let merged = pr.is_merged();
    let head_sha = pr.head.as_ref().and_then(|h| h.sha.clone()).unwrap_or_default();
    let merge_commit_sha = if merged {
        pr.merge_commit_sha.clone().unwrap_or_default()
    } else {
        String::new()
    };

    let (sha, short) = match resolve_sha(merged, Some(&merge_commit_sha), Some(&head_sha)) {
        Some(sha) => {
            let short = short_sha(&sha);
            (sha, short)
        }
        None => (placeholder_sha(pr.number), placeholder_sha(pr.number)),
    };

    let owner = pr.base.repo.owner.login.clone();
    let name = pr.base.repo.name.clone();
    let created_at = normalize_timestamp(pr.created_at.as_deref());

    PullRequestRecord {
        record_type: ContributionKind::PullRequest.type_tag().to_string(),
        number: pr.number,
        sha,
        short_sha: short,
        title: single_line(pr.title.as_deref().unwrap_or("")),
        state: pr.state.clone(),
        created_at: created_at.clone(),
        merged_at: normalize_timestamp(pr.merged_at.as_deref()),
        closed_at: normalize_timestamp(pr.closed_at.as_deref()),
        author_name: pr.user.as_ref().map(|u| u.login.clone()).unwrap_or_default(),
        author_date: created_at,
        repo: format!("{owner}/{name}"),
        repo_owner: owner,
        repo_name: name,
        url: pr.html_url.clone(),
        api_url: pr.url.clone(),
        node_id: pr.node_id.clone(),
        merged,
        draft: pr.draft.unwrap_or(false),
        head_sha,
        merge_commit_sha,
    }
}

/// Record built from a search hit alone, used when the detail fetch fails.
pub fn pull_request_from_search(issue: &ApiIssue, owner: &str, repo: &str) -> PullRequestRecord {
    let created_at = normalize_timestamp(issue.created_at.as_deref());
    PullRequestRecord {
        record_type: ContributionKind::PullRequest.type_tag().to_string(),
        number: issue.number,
        sha: placeholder_sha(issue.number),
        short_sha: placeholder_sha(issue.number),
        title: single_line(&issue.title),
        state: issue.state.clone(),
        created_at: created_at.clone(),
        merged_at: String::new(),
        closed_at: normalize_timestamp(issue.closed_at.as_deref()),
        author_name: issue.user.as_ref().map(|u| u.login.clone()).unwrap_or_default(),
        author_date: created_at,
        repo: format!("{owner}/{repo}"),
        repo_owner: owner.to_string(),
        repo_name: repo.to_string(),
        url: issue.html_url.clone(),
        api_url: issue.url.clone(),
        node_id: issue.node_id.clone(),
        merged: false,
        draft: false,
        head_sha: String::new(),
        merge_commit_sha: String::new(),
    }
}

/// Reviews written by `username` that were not dismissed.
pub fn is_countable_review(review: &ApiReview, username: &str) -> bool {
    let by_user = review
        .user
        .as_ref()
        .is_some_and(|u| u.login.eq_ignore_ascii_case(username));
    by_user && !review.state.eq_ignore_ascii_case("DISMISSED")
}

pub fn transform_review(review: &ApiReview, pr: &ApiPull) -> CodeReviewRecord {
    let owner = pr.base.repo.owner.login.clone();
    let name = pr.base.repo.name.clone();

    CodeReviewRecord {
        record_type: ContributionKind::CodeReview.type_tag().to_string(),
        review_id: review.id,
        state: review.state.clone(),
        submitted_at: normalize_timestamp(review.submitted_at.as_deref()),
        pr_number: pr.number,
        pr_title: single_line(pr.title.as_deref().unwrap_or("")),
        repo: format!("{owner}/{name}"),
        repo_owner: owner,
        repo_name: name,
        reviewer_name: review.user.as_ref().map(|u| u.login.clone()).unwrap_or_default(),
        review_body: single_line(review.body.as_deref().unwrap_or("")),
        pr_url: pr.html_url.clone(),
        review_url: review.html_url.clone(),
        commit_id: review.commit_id.clone().unwrap_or_default(),
    }
}

/// `https://host/<owner>/<repo>/pull/<n>` -> `(owner, repo, n)`
pub fn parse_pull_url(html_url: &str) -> Option<(String, String, u64)> {
    let segments: Vec<&str> = html_url.trim_end_matches('/').split('/').collect();
    let pull = segments.iter().rposition(|s| *s == "pull")?;
    if pull < 2 || pull + 2 != segments.len() {
        return None;
    }
    let number = segments[pull + 1].parse().ok()?;
    Some((
        segments[pull - 2].to_string(),
        segments[pull - 1].to_string(),
        number,
    ))
}
