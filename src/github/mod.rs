pub mod client;
pub mod fetch;
pub mod transform;
pub mod types;

pub use client::{GitHubApi, GitHubClient, SEARCH_RESULT_CAP};
pub use fetch::{fetch_contributions, FetchOptions, FetchResult, FetchStats};
