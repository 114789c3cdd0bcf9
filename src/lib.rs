//! cf-scaffold: contest sample scraper
//!
//! Pulls the problem roster and sample tests out of Codeforces contest pages
//! and lays them out as a per-problem solution directory.

pub mod codeforces;
pub mod config;
pub mod event;
pub mod roster;
pub mod sample;
pub mod scaffold;

use thiserror::Error;

/// Main error type for scraping and scaffolding a contest
#[derive(Debug, Error)]
pub enum ScaffoldError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("Unexpected status {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Extraction error for {url}: {source}")]
    Extract { url: String, source: ExtractError },

    #[error("No problems found for contest {contest}")]
    EmptyRoster { contest: String },

    #[error("Template render error: {0}")]
    Render(#[from] askama::Error),

    #[error("Fetch limiter closed: {0}")]
    Limiter(#[from] tokio::sync::AcquireError),

    #[error("Fetch task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Errors raised by the page extractors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    #[error("output sample appears before any input sample")]
    OutputBeforeInput,
}

pub type Result<T> = std::result::Result<T, ScaffoldError>;

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

pub type ExtractResult<T> = std::result::Result<T, ExtractError>;

pub use codeforces::{ContestScrape, ContestScraper, ContestScraperBuilder, ProblemPage};
pub use config::Config;
pub use event::{tokenize, Event};
pub use roster::{extract_roster, ContestRoster, ProblemRef, RosterExtractor};
pub use sample::{extract_samples, Sample, SampleExtractor, SampleKind};
pub use scaffold::{ProblemReport, Scaffolder, SolutionFile};
