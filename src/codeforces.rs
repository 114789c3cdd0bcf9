use crate::config::{SiteConfig, DEFAULT_BASE_URL};
use crate::roster::{extract_roster, ContestRoster, ProblemRef};
use crate::sample::{extract_samples, Sample};
use crate::{Result, ScaffoldError};
use derive_builder::Builder;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Builder)]
#[builder(setter(into))]
pub struct ContestScraper {
    contest: String,
    #[builder(default = "DEFAULT_BASE_URL.to_string()")]
    base_url: String,
    #[builder(default)]
    client: Client,
    #[builder(default = "4")]
    max_concurrent: usize,
}

#[derive(Debug)]
pub struct ContestScrape {
    pub roster: ContestRoster,
    /// One entry per roster problem, in roster order
    pub pages: Vec<ProblemPage>,
}

/// One problem of the roster; a page that failed keeps its own error
#[derive(Debug)]
pub struct ProblemPage {
    pub problem: ProblemRef,
    pub samples: Result<Vec<Sample>>,
}

impl ContestScraper {
    pub fn contest(&self) -> &str {
        &self.contest
    }

    pub async fn fetch_roster(&self) -> Result<ContestRoster> {
        let url = contest_url(&self.base_url, &self.contest);
        let html = fetch_page(&self.client, &url).await?;

        let roster = extract_roster(&self.contest, &html);
        if roster.problems.is_empty() {
            return Err(ScaffoldError::EmptyRoster {
                contest: self.contest.clone(),
            });
        }
        info!(
            contest = %self.contest,
            name = %roster.name,
            problems = roster.problems.len(),
            "fetched contest roster"
        );
        Ok(roster)
    }

    pub async fn fetch_samples(&self, letter: &str) -> Result<Vec<Sample>> {
        let url = problem_url(&self.base_url, &self.contest, letter);
        fetch_samples(&self.client, &url).await
    }

    /// Fetches the roster, then every problem page concurrently.
    ///
    /// Only a roster failure fails the scrape; each problem page carries its
    /// own outcome.
    pub async fn scrape(&self) -> Result<ContestScrape> {
        let roster = self.fetch_roster().await?;
        let permits = Arc::new(Semaphore::new(
            self.max_concurrent.clamp(1, Semaphore::MAX_PERMITS),
        ));

        let mut handles = vec![];
        for problem in roster.problems.clone() {
            let client = self.client.clone();
            let url = problem_url(&self.base_url, &self.contest, &problem.letter);
            let permits = permits.clone();
            let handle = tokio::spawn(async move {
                let _permit = permits.acquire_owned().await?;
                fetch_samples(&client, &url).await
            });
            handles.push((problem, handle));
        }

        let mut pages = vec![];
        for (problem, handle) in handles {
            let samples = handle.await.unwrap_or_else(|e| Err(e.into()));
            if let Err(e) = &samples {
                warn!(letter = %problem.letter, error = %e, "problem page failed");
            }
            pages.push(ProblemPage { problem, samples });
        }

        Ok(ContestScrape { roster, pages })
    }
}

/// Builds the HTTP client used for every page of a contest
pub fn build_http_client(config: &SiteConfig) -> std::result::Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(Duration::from_secs(config.timeout_secs))
        .gzip(true)
        .build()
}

async fn fetch_samples(client: &Client, url: &str) -> Result<Vec<Sample>> {
    let html = fetch_page(client, url).await?;
    let samples = extract_samples(&html).map_err(|source| ScaffoldError::Extract {
        url: url.to_string(),
        source,
    })?;
    debug!(url, samples = samples.len(), "fetched problem page");
    Ok(samples)
}

async fn fetch_page(client: &Client, url: &str) -> Result<String> {
    let http_err = |source| ScaffoldError::Http {
        url: url.to_string(),
        source,
    };

    let response = client.get(url).send().await.map_err(http_err)?;
    let status = response.status();
    if !status.is_success() {
        return Err(ScaffoldError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    response.text().await.map_err(http_err)
}

fn contest_url(base_url: &str, contest: &str) -> String {
    format!("{}/contest/{}", base_url.trim_end_matches('/'), contest)
}

fn problem_url(base_url: &str, contest: &str, letter: &str) -> String {
    format!(
        "{}/contest/{}/problem/{}",
        base_url.trim_end_matches('/'),
        contest,
        letter
    )
}
