//! TOML configuration for the scraper and the scaffold layout.
//!
//! Every field has a default, so a missing file or an empty one is a valid
//! configuration:
//!
//! ```toml
//! [site]
//! base-url = "https://codeforces.com"
//! timeout-secs = 30
//! max-concurrent-fetches = 4
//!
//! [scaffold]
//! language = "C++17"
//! template = "template.cc"
//! output-dir = "."
//! ```

use crate::{ConfigError, ConfigResult};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_BASE_URL: &str = "https://codeforces.com";
/// Upper bound for `max-concurrent-fetches`
pub const MAX_CONCURRENT_FETCHES: usize = 64;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Config {
    pub site: SiteConfig,
    pub scaffold: ScaffoldConfig,
}

/// Where pages come from and how politely they are fetched
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct SiteConfig {
    pub base_url: String,
    pub user_agent: String,
    pub timeout_secs: u64,
    pub max_concurrent_fetches: usize,
}

/// Layout of the generated solution directory
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ScaffoldConfig {
    /// Label used in the contest directory name, e.g. `1850-C++17`
    pub language: String,
    /// Solution template copied into every problem directory
    pub template: PathBuf,
    pub output_dir: PathBuf,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: format!("cf-scaffold/{}", env!("CARGO_PKG_VERSION")),
            timeout_secs: 30,
            max_concurrent_fetches: 4,
        }
    }
}

impl Default for ScaffoldConfig {
    fn default() -> Self {
        Self {
            language: "C++17".to_string(),
            template: PathBuf::from("template.cc"),
            output_dir: PathBuf::from("."),
        }
    }
}

/// Loads and validates a configuration file
pub fn load_config(path: &Path) -> ConfigResult<Config> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parses and validates configuration from a TOML string
pub fn parse_config(content: &str) -> ConfigResult<Config> {
    let config: Config = toml::from_str(content)?;
    validate(&config)?;
    Ok(config)
}

pub fn validate(config: &Config) -> ConfigResult<()> {
    let site = &config.site;
    if !site.base_url.starts_with("http://") && !site.base_url.starts_with("https://") {
        return Err(ConfigError::Validation(format!(
            "base-url must be an http(s) URL: {}",
            site.base_url
        )));
    }
    if site.timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "timeout-secs must be at least 1".to_string(),
        ));
    }
    if !(1..=MAX_CONCURRENT_FETCHES).contains(&site.max_concurrent_fetches) {
        return Err(ConfigError::Validation(format!(
            "max-concurrent-fetches must be between 1 and {}, got {}",
            MAX_CONCURRENT_FETCHES, site.max_concurrent_fetches
        )));
    }

    let scaffold = &config.scaffold;
    if scaffold.language.is_empty() || scaffold.language.contains(['/', '\\']) {
        return Err(ConfigError::Validation(format!(
            "language must be a plain label: {:?}",
            scaffold.language
        )));
    }
    if scaffold.template.extension().is_none() {
        return Err(ConfigError::Validation(format!(
            "template needs a file extension: {}",
            scaffold.template.display()
        )));
    }

    Ok(())
}

/// Checks a contest id: the contest number from the URL, not the round number.
pub fn validate_contest(contest: &str) -> ConfigResult<()> {
    if contest.is_empty() || !contest.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ConfigError::Validation(format!(
            "contest must be a contest number, got {:?}",
            contest
        )));
    }
    Ok(())
}
