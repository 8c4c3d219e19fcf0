use super::types::{ApiCommit, ApiPull, ApiRepo, ApiReview, ApiSearchPage, SearchResults};
use crate::config::Config;
use crate::error::Result;
use crate::model::Affiliation;
use crate::util::to_iso;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use tracing::debug;

const PER_PAGE: &str = "100";

/// The search endpoint never returns more than this many items per query.
pub const SEARCH_RESULT_CAP: usize = 1000;

/// Remote calls the fetch stage depends on.
pub trait GitHubApi {
    fn list_repos(&self, affiliation: &Affiliation) -> Result<Vec<ApiRepo>>;

    fn list_commits(
        &self,
        owner: &str,
        repo: &str,
        author: &str,
        since: Option<&DateTime<Utc>>,
    ) -> Result<Vec<ApiCommit>>;

    fn search_issues(&self, query: &str) -> Result<SearchResults>;

    fn get_pull(&self, owner: &str, repo: &str, number: u64) -> Result<ApiPull>;

    fn list_reviews(&self, owner: &str, repo: &str, number: u64) -> Result<Vec<ApiReview>>;
}

pub struct GitHubClient {
    agent: ureq::Agent,
    base_url: String,
    token: String,
}

impl GitHubClient {
    pub fn new(config: &Config) -> Self {
        let agent = ureq::AgentBuilder::new()
            .user_agent(concat!("contrib-replay/", env!("CARGO_PKG_VERSION")))
            .build();
        Self {
            agent,
            base_url: config.api_url.clone(),
            token: config.token.clone(),
        }
    }

    fn request(&self, url: &str) -> ureq::Request {
        self.agent
            .get(url)
            .set("Authorization", &format!("Bearer {}", self.token))
            .set("Accept", "application/vnd.github+json")
            .set("X-GitHub-Api-Version", "2022-11-28")
    }

    /// GET one page, returning the decoded body and the `rel="next"` link.
    fn get_page<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<(T, Option<String>)> {
        debug!(url, "GET");
        let mut request = self.request(url);
        for (key, value) in query {
            request = request.query(key, value);
        }
        let response = request.call()?;
        let next = response.header("link").and_then(next_link);
        let body = response.into_string()?;
        Ok((serde_json::from_str(&body)?, next))
    }

    fn get_all<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> Result<Vec<T>> {
        let first = format!("{}{}", self.base_url, path);
        let (mut items, mut next): (Vec<T>, _) = self.get_page(&first, query)?;
        while let Some(url) = next {
            let (page, link): (Vec<T>, _) = self.get_page(&url, &[])?;
            items.extend(page);
            next = link;
        }
        Ok(items)
    }
}

impl GitHubApi for GitHubClient {
    fn list_repos(&self, affiliation: &Affiliation) -> Result<Vec<ApiRepo>> {
        let affiliation = affiliation.to_string();
        self.get_all(
            "/user/repos",
            &[("affiliation", affiliation.as_str()), ("per_page", PER_PAGE)],
        )
    }

    fn list_commits(
        &self,
        owner: &str,
        repo: &str,
        author: &str,
        since: Option<&DateTime<Utc>>,
    ) -> Result<Vec<ApiCommit>> {
        let path = format!("/repos/{owner}/{repo}/commits");
        let since = since.map(to_iso);
        let mut query = vec![("author", author), ("per_page", PER_PAGE)];
        if let Some(since) = since.as_deref() {
            query.push(("since", since));
        }
        self.get_all(&path, &query)
    }

    fn search_issues(&self, query: &str) -> Result<SearchResults> {
        let first = format!("{}/search/issues", self.base_url);
        let params = [
            ("q", query),
            ("sort", "created"),
            ("order", "desc"),
            ("per_page", PER_PAGE),
        ];

        let (page, mut next): (ApiSearchPage, _) = self.get_page(&first, &params)?;
        let mut results = SearchResults {
            total_count: page.total_count,
            items: page.items,
        };

        while let Some(url) = next {
            if results.items.len() >= SEARCH_RESULT_CAP {
                break;
            }
            let (page, link): (ApiSearchPage, _) = self.get_page(&url, &[])?;
            if page.items.is_empty() {
                break;
            }
            results.items.extend(page.items);
            next = link;
        }
        results.items.truncate(SEARCH_RESULT_CAP);
        Ok(results)
    }

    fn get_pull(&self, owner: &str, repo: &str, number: u64) -> Result<ApiPull> {
        let url = format!("{}/repos/{owner}/{repo}/pulls/{number}", self.base_url);
        Ok(self.get_page(&url, &[])?.0)
    }

    fn list_reviews(&self, owner: &str, repo: &str, number: u64) -> Result<Vec<ApiReview>> {
        self.get_all(
            &format!("/repos/{owner}/{repo}/pulls/{number}/reviews"),
            &[("per_page", PER_PAGE)],
        )
    }
}

/// Extract the `rel="next"` target from a `Link` header.
fn next_link(header: &str) -> Option<String> {
    header.split(',').find_map(|part| {
        let mut pieces = part.split(';');
        let url = pieces.next()?.trim();
        let is_next = pieces.any(|p| p.trim() == "rel=\"next\"");
        if is_next {
            Some(url.trim_start_matches('<').trim_end_matches('>').to_string())
        } else {
            None
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_next_link_among_relations() {
        let header = "<https://api.github.com/user/repos?page=2>; rel=\"next\", \
                      <https://api.github.com/user/repos?page=5>; rel=\"last\"";
        assert_eq!(
            next_link(header).as_deref(),
            Some("https://api.github.com/user/repos?page=2")
        );
    }

    #[test]
    fn last_page_has_no_next() {
        let header = "<https://api.github.com/user/repos?page=1>; rel=\"prev\", \
                      <https://api.github.com/user/repos?page=1>; rel=\"first\"";
        assert_eq!(next_link(header), None);
    }
}
