pub mod cli;
pub mod config;
pub mod csv;
pub mod error;
pub mod export;
pub mod git;
pub mod github;
pub mod import;
pub mod model;
pub mod prompt;
pub mod report;
pub mod util;
