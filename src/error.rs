use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ContribError>;

#[derive(Error, Debug)]
pub enum ContribError {
    #[error("{0} is required. Set it in the environment or in a .env file.")]
    MissingEnv(&'static str),
    #[error("Invalid date format. Expected YYYY-MM-DDTHH:MM:SSZ (e.g., 2024-01-01T00:00:00Z), got: {0}")]
    InvalidDate(String),
    #[error("Invalid affiliation: {0}. Valid values are: owner, collaborator, organization_member")]
    InvalidAffiliation(String),
    #[error("Invalid type \"{0}\". Valid types: commits, prs, reviews, all, or comma-separated")]
    InvalidTypes(String),
    #[error("CSV file not found: {}", .0.display())]
    CsvNotFound(PathBuf),
    #[error("No CSV files found in {}", .0.display())]
    NoCsvFiles(PathBuf),
    #[error("CSV parse error at line {line}: {message}")]
    Csv { line: usize, message: String },
    #[error("GitHub API returned {status} for {url}: {body}")]
    Http { status: u16, url: String, body: String },
    #[error("GitHub API request to {url} failed: {message}")]
    Transport { url: String, message: String },
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("git {command} exited with {code:?}: {stderr}")]
    Git {
        command: String,
        code: Option<i32>,
        stderr: String,
    },
    #[error("Not a git repository: {}", .0.display())]
    NotARepository(PathBuf),
    #[error("Operation cancelled")]
    Cancelled,
}

impl From<ureq::Error> for ContribError {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::Status(status, response) => {
                let url = response.get_url().to_string();
                let body = response.into_string().unwrap_or_default();
                ContribError::Http { status, url, body }
            }
            ureq::Error::Transport(transport) => ContribError::Transport {
                url: transport
                    .url()
                    .map(|u| u.to_string())
                    .unwrap_or_default(),
                message: transport.to_string(),
            },
        }
    }
}

impl ContribError {
    /// HTTP status of a failed API call, if the failure came from the server.
    pub fn status(&self) -> Option<u16> {
        match self {
            ContribError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}
