use anyhow::{bail, Context, Result};
use cf_scaffold::codeforces::build_http_client;
use cf_scaffold::config::{load_config, validate, validate_contest};
use cf_scaffold::{Config, ContestScraperBuilder, Scaffolder};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Scaffold a solution directory with sample tests for a Codeforces contest
#[derive(Parser, Debug)]
#[command(name = "cf-scaffold", version, about, long_about = None)]
struct Cli {
    /// Contest number (not the round number)
    contest: String,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Language label used in the contest directory name
    #[arg(short, long)]
    language: Option<String>,

    /// Solution template copied into each problem directory
    #[arg(short, long, value_name = "FILE")]
    template: Option<PathBuf>,

    /// Directory the contest directory is created in
    #[arg(short, long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Site root to fetch pages from
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose, cli.quiet);

    validate_contest(&cli.contest)?;
    let config = resolve_config(&cli)?;

    println!("cf-scaffold v{}", env!("CARGO_PKG_VERSION"));
    println!(
        "Parsing contest {} for language {}, please wait...",
        cli.contest, config.scaffold.language
    );

    let scraper = ContestScraperBuilder::default()
        .contest(cli.contest.as_str())
        .base_url(config.site.base_url.as_str())
        .client(build_http_client(&config.site)?)
        .max_concurrent(config.site.max_concurrent_fetches)
        .build()?;

    let scrape = scraper
        .scrape()
        .await
        .with_context(|| format!("failed to scrape contest {}", cli.contest))?;
    if !scrape.roster.name.is_empty() {
        println!("{}", scrape.roster.name);
    }
    println!("Found {} problems", scrape.roster.problems.len());

    let scaffolder = Scaffolder::from_config(&config.scaffold);
    let mut failed = vec![];
    for page in &scrape.pages {
        println!("Problem {}: {}", page.problem.letter, page.problem.title);
        let samples = match &page.samples {
            Ok(samples) => samples,
            Err(e) => {
                eprintln!("Problem {} skipped: {}", page.problem.letter, e);
                failed.push(page.problem.letter.as_str());
                continue;
            }
        };
        let report = scaffolder
            .scaffold_problem(&cli.contest, &page.problem, samples)
            .with_context(|| format!("failed to scaffold problem {}", page.problem.letter))?;
        println!("{} sample test(s) found.", report.tests);
        info!(dir = %report.dir.display(), solution = %report.solution, "problem ready");
    }

    println!(
        "Done: {}",
        scaffolder.contest_dir(&cli.contest).display()
    );
    if !failed.is_empty() {
        bail!("could not fetch problem(s) {}", failed.join(", "));
    }
    Ok(())
}

/// Loads the config file if given, then applies command-line overrides
fn resolve_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => load_config(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => Config::default(),
    };

    if let Some(language) = &cli.language {
        config.scaffold.language = language.clone();
    }
    if let Some(template) = &cli.template {
        config.scaffold.template = template.clone();
    }
    if let Some(output_dir) = &cli.output_dir {
        config.scaffold.output_dir = output_dir.clone();
    }
    if let Some(base_url) = &cli.base_url {
        config.site.base_url = base_url.clone();
    }

    validate(&config)?;
    Ok(config)
}

fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("cf_scaffold=warn"),
            1 => EnvFilter::new("cf_scaffold=info,warn"),
            2 => EnvFilter::new("cf_scaffold=debug,info"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
