//! End-to-end tests for scraping a contest and scaffolding it on disk
//!
//! Pages are served by a wiremock server from the HTML fixtures.

use cf_scaffold::{ContestScraperBuilder, ExtractError, Scaffolder, ScaffoldError, SolutionFile};
use std::fs;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const CONTEST_PAGE: &str = include_str!("../fixtures/contest.html");
const PROBLEM_PAGE: &str = include_str!("../fixtures/problem.html");

async fn mount_page(server: &MockServer, page_path: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/html"),
        )
        .mount(server)
        .await;
}

fn scraper_for(server: &MockServer) -> cf_scaffold::ContestScraper {
    scraper_with_limit(server, 2)
}

fn scraper_with_limit(server: &MockServer, limit: usize) -> cf_scaffold::ContestScraper {
    ContestScraperBuilder::default()
        .contest("1850")
        .base_url(server.uri())
        .max_concurrent(limit)
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_scrape_contest_into_directory() {
    let server = MockServer::start().await;
    mount_page(&server, "/contest/1850", CONTEST_PAGE).await;
    for letter in ["A", "B1", "B2"] {
        mount_page(&server, &format!("/contest/1850/problem/{}", letter), PROBLEM_PAGE).await;
    }
    mount_page(
        &server,
        "/contest/1850/problem/C",
        "<html><body><p>Interactive problem</p></body></html>",
    )
    .await;

    let scrape = scraper_for(&server).scrape().await.unwrap();
    assert_eq!(scrape.roster.name, "Codeforces Round 900");

    let letters: Vec<_> = scrape
        .pages
        .iter()
        .map(|p| p.problem.letter.as_str())
        .collect();
    assert_eq!(letters, vec!["A", "B1", "B2", "C"]);

    let tmp = TempDir::new().unwrap();
    let scaffolder = Scaffolder::new(tmp.path(), "C++17", tmp.path().join("template.cc"));
    let mut reports = vec![];
    for page in &scrape.pages {
        reports.push(
            scaffolder
                .scaffold_problem("1850", &page.problem, page.samples.as_ref().unwrap())
                .unwrap(),
        );
    }

    let tests: Vec<_> = reports.iter().map(|r| r.tests).collect();
    assert_eq!(tests, vec![2, 2, 2, 0]);
    assert!(reports.iter().all(|r| r.solution == SolutionFile::Rendered));

    let dir = tmp.path().join("1850-C++17");
    assert_eq!(
        fs::read_to_string(dir.join("B1").join("input1")).unwrap(),
        "2\n3 4\n5 6\n"
    );
    assert_eq!(
        fs::read_to_string(dir.join("B1").join("output2")).unwrap(),
        "3\n"
    );
    assert!(dir.join("C").join("C.cc").exists());
    assert!(!dir.join("C").join("input1").exists());
}

#[tokio::test]
async fn test_fetch_samples_for_single_problem() {
    let server = MockServer::start().await;
    mount_page(&server, "/contest/1850/problem/A", PROBLEM_PAGE).await;

    let samples = scraper_for(&server).fetch_samples("A").await.unwrap();
    assert_eq!(samples.len(), 4);
    assert_eq!(samples[2].bytes, b"1\n1 & 2\n");
}

#[tokio::test]
async fn test_empty_roster_is_an_error() {
    let server = MockServer::start().await;
    mount_page(&server, "/contest/1850", "<html><body>Contest not found</body></html>").await;

    let err = scraper_for(&server).fetch_roster().await.unwrap_err();
    assert!(matches!(err, ScaffoldError::EmptyRoster { contest } if contest == "1850"));
}

#[tokio::test]
async fn test_http_status_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/contest/1850"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = scraper_for(&server).fetch_roster().await.unwrap_err();
    assert!(matches!(err, ScaffoldError::Status { status: 503, .. }));
}

#[tokio::test]
async fn test_output_before_input_fails_problem() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/contest/1850/problem/A",
        r#"<div class="output"><pre>1</pre></div>"#,
    )
    .await;

    let err = scraper_for(&server).fetch_samples("A").await.unwrap_err();
    assert!(matches!(
        err,
        ScaffoldError::Extract {
            source: ExtractError::OutputBeforeInput,
            ..
        }
    ));
}

#[tokio::test]
async fn test_failed_problem_keeps_other_pages() {
    let server = MockServer::start().await;
    mount_page(&server, "/contest/1850", CONTEST_PAGE).await;
    for letter in ["A", "B2", "C"] {
        mount_page(&server, &format!("/contest/1850/problem/{}", letter), PROBLEM_PAGE).await;
    }
    Mock::given(method("GET"))
        .and(path("/contest/1850/problem/B1"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let scrape = scraper_for(&server).scrape().await.unwrap();
    assert_eq!(scrape.pages.len(), 4);

    let failed = &scrape.pages[1];
    assert_eq!(failed.problem.letter, "B1");
    assert!(matches!(
        failed.samples,
        Err(ScaffoldError::Status { status: 404, .. })
    ));

    for i in [0, 2, 3] {
        assert_eq!(scrape.pages[i].samples.as_ref().unwrap().len(), 4);
    }
}

#[tokio::test]
async fn test_oversized_fetch_limit_is_clamped() {
    let server = MockServer::start().await;
    mount_page(&server, "/contest/1850", CONTEST_PAGE).await;
    for letter in ["A", "B1", "B2", "C"] {
        mount_page(&server, &format!("/contest/1850/problem/{}", letter), PROBLEM_PAGE).await;
    }

    let scrape = scraper_with_limit(&server, usize::MAX).scrape().await.unwrap();
    assert_eq!(scrape.pages.len(), 4);
    assert!(scrape.pages.iter().all(|p| p.samples.is_ok()));
}
