use super::client::{GitHubApi, SEARCH_RESULT_CAP};
use super::transform::{
    is_countable_review, parse_pull_url, pull_request_from_search, transform_commit,
    transform_pull_request, transform_review,
};
use super::types::ApiIssue;
use crate::error::Result;
use crate::model::{
    Affiliation, CodeReviewRecord, CommitRecord, KindSelection, PullRequestRecord, RepoRef,
};
use chrono::{DateTime, Utc};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::{Duration, Instant};
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct FetchOptions {
    pub username: String,
    pub affiliation: Affiliation,
    pub since: Option<DateTime<Utc>>,
    pub kinds: KindSelection,
}

#[derive(Debug, Clone, Default)]
pub struct FetchStats {
    pub repos_processed: usize,
    pub repos_with_commits: usize,
    pub prs_searched: usize,
    /// Pull requests recorded from search data because the detail fetch failed.
    pub prs_degraded: usize,
    /// Search hits that were not pull requests or had an unparseable URL.
    pub search_skipped: usize,
    /// Search hits the endpoint reported but would not return.
    pub search_truncated: u64,
    pub errors: usize,
    pub elapsed: Duration,
}

#[derive(Debug, Clone, Default)]
pub struct FetchResult {
    pub commits: Vec<CommitRecord>,
    pub pull_requests: Vec<PullRequestRecord>,
    pub code_reviews: Vec<CodeReviewRecord>,
    pub stats: FetchStats,
}

fn bar(len: u64, template: &str) -> ProgressBar {
    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(template)
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    pb
}

/// Fetch every selected contribution kind for `opts.username`.
///
/// Only the repository listing is fatal. Failures for a single repository or
/// pull request are logged, counted in `stats.errors`, and skipped.
pub fn fetch_contributions(api: &dyn GitHubApi, opts: &FetchOptions) -> Result<FetchResult> {
    let started = Instant::now();
    let mut result = FetchResult::default();

    if opts.kinds.commits {
        fetch_commits(api, opts, &mut result)?;
    }
    if opts.kinds.pull_requests {
        fetch_pull_requests(api, opts, &mut result);
    }
    if opts.kinds.code_reviews {
        fetch_code_reviews(api, opts, &mut result);
    }

    result.stats.elapsed = started.elapsed();
    Ok(result)
}

fn fetch_commits(api: &dyn GitHubApi, opts: &FetchOptions, result: &mut FetchResult) -> Result<()> {
    let repos: Vec<RepoRef> = api
        .list_repos(&opts.affiliation)?
        .into_iter()
        .map(|r| RepoRef {
            owner: r.owner.login,
            name: r.name,
            private: r.private,
        })
        .collect();
    info!(count = repos.len(), affiliation = %opts.affiliation, "listed repositories");

    let pb = bar(
        repos.len() as u64,
        "{spinner:.green} [{pos}/{len}] {wide_msg}",
    );

    for repo in &repos {
        let suffix = if repo.private { " (private)" } else { "" };
        pb.set_message(format!("{}{suffix}", repo.full_name()));

        match api.list_commits(&repo.owner, &repo.name, &opts.username, opts.since.as_ref()) {
            Ok(commits) => {
                if !commits.is_empty() {
                    result.stats.repos_with_commits += 1;
                }
                result
                    .commits
                    .extend(commits.iter().map(|c| transform_commit(c, repo)));
            }
            // Empty repositories answer 409 Conflict.
            Err(e) if e.status() == Some(409) => {}
            Err(e) => {
                warn!(repo = %repo.full_name(), error = %e, "failed to list commits");
                result.stats.errors += 1;
            }
        }

        result.stats.repos_processed += 1;
        pb.inc(1);
    }

    pb.finish_with_message(format!("{} commits", result.commits.len()));
    Ok(())
}

fn search_query(qualifier: &str, username: &str, since: Option<&DateTime<Utc>>) -> String {
    let mut query = format!("{qualifier}:{username} type:pr");
    if let Some(since) = since {
        query.push_str(&format!(" created:>={}", since.format("%Y-%m-%d")));
    }
    query
}

/// Run a search and keep only pull-request hits with a parseable URL.
fn search_pulls(
    api: &dyn GitHubApi,
    query: &str,
    stats: &mut FetchStats,
) -> Vec<(ApiIssue, String, String, u64)> {
    info!(query, "searching pull requests");

    let results = match api.search_issues(query) {
        Ok(r) => r,
        Err(e) => {
            warn!(query, error = %e, "search failed");
            stats.errors += 1;
            return Vec::new();
        }
    };

    if results.total_count > SEARCH_RESULT_CAP as u64 {
        let dropped = results.total_count - SEARCH_RESULT_CAP as u64;
        warn!(
            query,
            total = results.total_count,
            "search matched more than {SEARCH_RESULT_CAP} pull requests; {dropped} older ones are not retrievable"
        );
        stats.search_truncated += dropped;
    }

    let mut hits = Vec::new();
    for issue in results.items {
        if issue.pull_request.is_none() {
            warn!(url = %issue.html_url, "search hit is not a pull request");
            stats.search_skipped += 1;
            continue;
        }
        match parse_pull_url(&issue.html_url) {
            Some((owner, repo, number)) => hits.push((issue, owner, repo, number)),
            None => {
                warn!(url = %issue.html_url, "could not parse pull request URL");
                stats.search_skipped += 1;
            }
        }
    }
    hits
}

fn fetch_pull_requests(api: &dyn GitHubApi, opts: &FetchOptions, result: &mut FetchResult) {
    let query = search_query("author", &opts.username, opts.since.as_ref());
    let hits = search_pulls(api, &query, &mut result.stats);
    let pb = bar(hits.len() as u64, "{spinner:.green} PRs [{pos}/{len}] {wide_msg}");

    for (issue, owner, repo, number) in hits {
        pb.set_message(format!("{owner}/{repo}#{number}"));
        let record = match api.get_pull(&owner, &repo, number) {
            Ok(pr) => transform_pull_request(&pr),
            Err(e) => {
                warn!(repo = %format!("{owner}/{repo}"), number, error = %e, "falling back to search data");
                result.stats.prs_degraded += 1;
                pull_request_from_search(&issue, &owner, &repo)
            }
        };
        result.pull_requests.push(record);
        result.stats.prs_searched += 1;
        pb.inc(1);
    }

    pb.finish_with_message(format!("{} pull requests", result.pull_requests.len()));
}

fn fetch_code_reviews(api: &dyn GitHubApi, opts: &FetchOptions, result: &mut FetchResult) {
    let query = search_query("reviewed-by", &opts.username, opts.since.as_ref());
    let hits = search_pulls(api, &query, &mut result.stats);
    let pb = bar(hits.len() as u64, "{spinner:.green} Reviews [{pos}/{len}] {wide_msg}");

    for (_, owner, repo, number) in hits {
        pb.set_message(format!("{owner}/{repo}#{number}"));
        pb.inc(1);

        let pr = match api.get_pull(&owner, &repo, number) {
            Ok(pr) => pr,
            Err(e) => {
                warn!(repo = %format!("{owner}/{repo}"), number, error = %e, "could not fetch pull request");
                result.stats.errors += 1;
                continue;
            }
        };
        let reviews = match api.list_reviews(&owner, &repo, number) {
            Ok(reviews) => reviews,
            Err(e) => {
                warn!(repo = %format!("{owner}/{repo}"), number, error = %e, "could not fetch reviews");
                result.stats.errors += 1;
                continue;
            }
        };

        // The search cannot filter by review time, so the since-date is applied here.
        let records = reviews
            .iter()
            .filter(|r| is_countable_review(r, &opts.username))
            .filter(|r| submitted_since(r.submitted_at.as_deref(), opts.since.as_ref()))
            .map(|r| transform_review(r, &pr));
        result.code_reviews.extend(records);
    }

    pb.finish_with_message(format!("{} code reviews", result.code_reviews.len()));
}

fn submitted_since(submitted_at: Option<&str>, since: Option<&DateTime<Utc>>) -> bool {
    let Some(since) = since else {
        return true;
    };
    submitted_at
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .is_some_and(|ts| ts.with_timezone(&Utc) >= *since)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ContribError;
    use crate::github::types::{
        ApiBase, ApiCommit, ApiCommitDetail, ApiGitActor, ApiGitRef, ApiPull, ApiRepo, ApiReview,
        ApiUser, SearchResults,
    };
    use crate::util::parse_since_date;
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;

    #[derive(Default)]
    struct FakeApi {
        repos: Vec<ApiRepo>,
        failing_repo: Option<String>,
        commits: Vec<ApiCommit>,
        search: Vec<ApiIssue>,
        total_count: u64,
        missing_pulls: Vec<u64>,
        reviews: Vec<ApiReview>,
        queries: RefCell<Vec<String>>,
    }

    fn http_error(status: u16) -> ContribError {
        ContribError::Http {
            status,
            url: "fake".into(),
            body: String::new(),
        }
    }

    impl GitHubApi for FakeApi {
        fn list_repos(&self, _: &Affiliation) -> Result<Vec<ApiRepo>> {
            Ok(self.repos.clone())
        }

        fn list_commits(
            &self,
            _owner: &str,
            repo: &str,
            _author: &str,
            _since: Option<&DateTime<Utc>>,
        ) -> Result<Vec<ApiCommit>> {
            if self.failing_repo.as_deref() == Some(repo) {
                return Err(http_error(500));
            }
            Ok(self.commits.clone())
        }

        fn search_issues(&self, query: &str) -> Result<SearchResults> {
            self.queries.borrow_mut().push(query.to_string());
            Ok(SearchResults {
                total_count: self.total_count,
                items: self.search.clone(),
            })
        }

        fn get_pull(&self, owner: &str, repo: &str, number: u64) -> Result<ApiPull> {
            if self.missing_pulls.contains(&number) {
                return Err(http_error(404));
            }
            Ok(ApiPull {
                number,
                title: Some(format!("PR {number}")),
                state: "closed".into(),
                html_url: format!("https://github.com/{owner}/{repo}/pull/{number}"),
                url: String::new(),
                node_id: String::new(),
                created_at: Some("2024-02-01T00:00:00Z".into()),
                merged_at: Some("2024-02-02T00:00:00Z".into()),
                closed_at: None,
                user: Some(ApiUser { login: "octo".into() }),
                merged: Some(true),
                draft: Some(false),
                merge_commit_sha: Some(format!("{number:07}abc")),
                head: Some(ApiGitRef { sha: None }),
                base: ApiBase {
                    repo: ApiRepo {
                        name: repo.into(),
                        owner: ApiUser { login: owner.into() },
                        private: false,
                    },
                },
            })
        }

        fn list_reviews(&self, _: &str, _: &str, _: u64) -> Result<Vec<ApiReview>> {
            Ok(self.reviews.clone())
        }
    }

    fn repo(name: &str) -> ApiRepo {
        ApiRepo {
            name: name.into(),
            owner: ApiUser { login: "octo".into() },
            private: false,
        }
    }

    fn commit(sha: &str) -> ApiCommit {
        ApiCommit {
            sha: sha.into(),
            html_url: String::new(),
            url: String::new(),
            node_id: String::new(),
            commit: ApiCommitDetail {
                message: "fix\n\nbody".into(),
                author: Some(ApiGitActor {
                    name: Some("Octo".into()),
                    email: Some("octo@example.com".into()),
                    date: Some("2024-01-05T10:00:00Z".into()),
                }),
                committer: None,
                verification: None,
            },
            parents: Vec::new(),
            stats: None,
            files: None,
        }
    }

    fn hit(number: u64) -> ApiIssue {
        ApiIssue {
            number,
            title: format!("PR {number}"),
            state: "open".into(),
            html_url: format!("https://github.com/acme/widgets/pull/{number}"),
            url: String::new(),
            node_id: String::new(),
            created_at: Some("2024-02-01T00:00:00Z".into()),
            closed_at: None,
            user: Some(ApiUser { login: "octo".into() }),
            pull_request: Some(serde_json::json!({})),
        }
    }

    fn review(id: u64, login: &str, state: &str, submitted: &str) -> ApiReview {
        ApiReview {
            id,
            user: Some(ApiUser { login: login.into() }),
            body: None,
            state: state.into(),
            submitted_at: Some(submitted.into()),
            html_url: String::new(),
            commit_id: None,
        }
    }

    fn options(kinds: KindSelection, since: Option<&str>) -> FetchOptions {
        FetchOptions {
            username: "octo".into(),
            affiliation: Affiliation::default(),
            since: since.map(|s| parse_since_date(s).unwrap()),
            kinds,
        }
    }

    #[test]
    fn one_failing_repository_does_not_abort_commit_fetch() {
        let api = FakeApi {
            repos: vec![repo("a"), repo("broken"), repo("c")],
            failing_repo: Some("broken".into()),
            commits: vec![commit("1111111aaaa")],
            ..FakeApi::default()
        };

        let result = fetch_contributions(&api, &options(KindSelection::commits_only(), None)).unwrap();

        assert_eq!(result.commits.len(), 2);
        assert_eq!(result.stats.repos_processed, 3);
        assert_eq!(result.stats.repos_with_commits, 2);
        assert_eq!(result.stats.errors, 1);
        assert_eq!(result.commits[0].short_sha, "1111111");
        assert_eq!(result.commits[0].message, "fix  body");
        assert_eq!(result.commits[0].message_first_line, "fix");
        assert!(result.pull_requests.is_empty());
    }

    #[test]
    fn pull_request_detail_failure_degrades_instead_of_skipping() {
        let api = FakeApi {
            search: vec![hit(1), hit(2)],
            total_count: 2,
            missing_pulls: vec![2],
            ..FakeApi::default()
        };
        let kinds = KindSelection::parse("prs").unwrap();

        let result = fetch_contributions(&api, &options(kinds, Some("2024-01-15T08:30:00Z"))).unwrap();

        assert_eq!(result.pull_requests.len(), 2);
        assert_eq!(result.stats.prs_degraded, 1);
        assert_eq!(result.pull_requests[0].sha, "0000001abc");
        assert_eq!(result.pull_requests[1].short_sha, "pr-2");
        assert_eq!(
            api.queries.borrow().as_slice(),
            ["author:octo type:pr created:>=2024-01-15"]
        );
    }

    #[test]
    fn reviews_are_filtered_by_author_state_and_time() {
        let api = FakeApi {
            search: vec![hit(5)],
            total_count: 1,
            reviews: vec![
                review(1, "octo", "APPROVED", "2024-03-01T00:00:00Z"),
                review(2, "octo", "DISMISSED", "2024-03-01T00:00:00Z"),
                review(3, "other", "APPROVED", "2024-03-01T00:00:00Z"),
                review(4, "octo", "COMMENTED", "2023-12-31T23:59:59Z"),
            ],
            ..FakeApi::default()
        };
        let kinds = KindSelection::parse("reviews").unwrap();

        let result = fetch_contributions(&api, &options(kinds, Some("2024-01-01T00:00:00Z"))).unwrap();

        let ids: Vec<u64> = result.code_reviews.iter().map(|r| r.review_id).collect();
        assert_eq!(ids, vec![1]);
        assert_eq!(result.code_reviews[0].pr_number, 5);
    }

    #[test]
    fn truncated_search_is_reported() {
        let api = FakeApi {
            search: vec![hit(1)],
            total_count: 1500,
            ..FakeApi::default()
        };
        let kinds = KindSelection::parse("prs").unwrap();

        let result = fetch_contributions(&api, &options(kinds, None)).unwrap();
        assert_eq!(result.stats.search_truncated, 500);
    }

    #[test]
    fn skipped_search_hits_are_counted() {
        let mut issue_url = hit(3);
        issue_url.html_url = "https://github.com/acme/widgets/issues/3".into();
        let mut plain_issue = hit(4);
        plain_issue.pull_request = None;
        let api = FakeApi {
            search: vec![hit(1), hit(2), issue_url, plain_issue],
            total_count: 4,
            missing_pulls: vec![2],
            ..FakeApi::default()
        };
        let kinds = KindSelection::parse("prs").unwrap();

        let result = fetch_contributions(&api, &options(kinds, None)).unwrap();

        assert_eq!(result.pull_requests.len(), 2);
        assert_eq!(result.stats.prs_searched, 2);
        assert_eq!(result.stats.prs_degraded, 1);
        assert_eq!(result.stats.search_skipped, 2);
    }
}
