use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use clap::ArgMatches;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use pagerot_core::dataset::{Dataset, read_url_list};
use pagerot_core::merge::{merge, outer_join};
use pagerot_core::model::{Freshness, Language, MergeStrategy};
use pagerot_core::report::{build_changes_table, build_current_table, extract_url_path};
use pagerot_core::table::Table;
use pagerot_scraper::crawl::ProgressCallback;
use pagerot_scraper::extract::ExtractProgress;
use pagerot_scraper::{Crawler, Extractor, SiteConfig, build_client, discover_via_hybrid,
    discover_via_sitemap};
use reqwest::Client;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// How article URLs are found for a scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Sitemap,
    Crawl,
    Hybrid,
    UrlFile,
    ExistingOnly,
}

/// Parse a discovery strategy from a flag value or a menu choice.
pub fn parse_strategy(raw: &str) -> Option<Strategy> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "sitemap" => Some(Strategy::Sitemap),
        "2" | "crawl" => Some(Strategy::Crawl),
        "3" | "hybrid" => Some(Strategy::Hybrid),
        "4" | "url-file" | "urlfile" | "file" => Some(Strategy::UrlFile),
        "5" | "existing" | "existing-only" | "none" => Some(Strategy::ExistingOnly),
        _ => None,
    }
}

/// Parse a merge strategy from a flag value or a menu choice.
pub fn parse_merge_choice(raw: &str) -> Option<MergeStrategy> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "skip" => Some(MergeStrategy::Skip),
        "2" | "update" => Some(MergeStrategy::Update),
        "3" | "append" => Some(MergeStrategy::Append),
        _ => None,
    }
}

/// Expand `~` in a user-supplied path.
pub fn expand_path(raw: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(raw).as_ref())
}

/// Count records per freshness class at `today`.
pub fn freshness_counts(dataset: &Dataset, today: NaiveDate) -> (usize, usize, usize) {
    let mut fresh = 0;
    let mut rotting = 0;
    let mut outdated = 0;
    for record in &dataset.records {
        match Freshness::classify(record.date_modified, today) {
            Freshness::Fresh => fresh += 1,
            Freshness::Rotting => rotting += 1,
            Freshness::Outdated => outdated += 1,
        }
    }
    (fresh, rotting, outdated)
}

fn print_divider() {
    println!("{}", "═".repeat(60).bright_blue().bold());
}

fn print_prompt(msg: &str) -> String {
    print!("{} ", msg.bright_cyan().bold());
    io::stdout().flush().unwrap();
    let mut response = String::new();
    io::stdin().read_line(&mut response).unwrap();
    response.trim().to_string()
}

fn prompt_strategy() -> Strategy {
    println!("{}", "URL Discovery Methods:".bright_blue().bold());
    println!("  1. Sitemap (recommended)");
    println!("  2. Web crawling (slower, may find more)");
    println!("  3. Hybrid (union of sitemap and crawl)");
    println!("  4. Manual URL list from file");
    println!("  5. Skip discovery (use existing data only)");
    println!();

    let choice = print_prompt("Choose method (1-5):");
    println!();
    parse_strategy(&choice).unwrap_or_else(|| {
        println!("{} Invalid choice, using sitemap", "→".yellow().bold());
        Strategy::Sitemap
    })
}

fn prompt_merge_choice() -> MergeStrategy {
    println!("{}", "Existing data found. How to handle new URLs?".bright_blue().bold());
    println!("  1. Skip URLs already in the dataset");
    println!("  2. Update existing records with fresh data");
    println!("  3. Append all (keep duplicates)");
    println!();

    let choice = print_prompt("Choose (1-3, default=1):");
    println!();
    parse_merge_choice(&choice).unwrap_or(MergeStrategy::Skip)
}

fn progress_spinner() -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap(),
    );
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

fn site_config(base_url: &Url, sub_matches: &ArgMatches) -> Result<SiteConfig> {
    let max_pages = *sub_matches.get_one::<usize>("max-pages").unwrap();
    let delay_ms = *sub_matches.get_one::<u64>("delay-ms").unwrap();
    let timeout = *sub_matches.get_one::<u64>("timeout").unwrap();

    let mut config = SiteConfig::new(base_url.as_str())?
        .with_max_pages(max_pages)
        .with_request_delay_ms(delay_ms)
        .with_timeout_secs(timeout);
    // Only the scan command carries this flag.
    if let Ok(Some(extract_timeout)) = sub_matches.try_get_one::<u64>("extract-timeout") {
        config = config.with_extract_timeout_secs(*extract_timeout);
    }
    Ok(config)
}

async fn discover_urls(
    client: &Client,
    config: &SiteConfig,
    strategy: Strategy,
    url_file: Option<&PathBuf>,
) -> Result<Vec<String>> {
    match strategy {
        Strategy::Sitemap => {
            println!("{} Discovering URLs via sitemap...", "→".blue());
            Ok(discover_via_sitemap(client, config).await?)
        }
        Strategy::Crawl => {
            println!("{} Discovering URLs via crawl...", "→".blue());
            let spinner = progress_spinner();
            let spinner_cb = spinner.clone();
            let progress: ProgressCallback = Arc::new(move |fetched, url| {
                spinner_cb.set_message(format!("[{}] {}", fetched, extract_url_path(&url)));
            });
            let crawler =
                Crawler::new(client.clone(), config.clone()).with_progress_callback(progress);
            let urls = crawler.crawl().await?;
            spinner.finish_and_clear();
            Ok(urls)
        }
        Strategy::Hybrid => {
            println!("{} Discovering URLs via sitemap and crawl...", "→".blue());
            let spinner = progress_spinner();
            let spinner_cb = spinner.clone();
            let progress: ProgressCallback = Arc::new(move |fetched, url| {
                spinner_cb.set_message(format!("[{}] {}", fetched, extract_url_path(&url)));
            });
            let outcome = discover_via_hybrid(client, config, Some(progress)).await?;
            spinner.finish_and_clear();
            if outcome.crawl_only > 0 {
                println!(
                    "{} Crawl found {} URL(s) the sitemap missed",
                    "→".yellow(),
                    outcome.crawl_only.to_string().cyan()
                );
            }
            Ok(outcome.urls)
        }
        Strategy::UrlFile => {
            let path = match url_file {
                Some(path) => path.clone(),
                None => expand_path(&print_prompt("Path to URL list file:")),
            };
            println!(
                "{} Reading URLs from {}",
                "→".blue(),
                path.display().to_string().bright_white()
            );
            Ok(read_url_list(&path)?)
        }
        Strategy::ExistingOnly => {
            println!("{} Skipping URL discovery", "→".blue());
            Ok(Vec::new())
        }
    }
}

fn print_dataset_summary(dataset: &Dataset) {
    let danish = dataset
        .records
        .iter()
        .filter(|r| r.language == Language::Da)
        .count();
    let english = dataset
        .records
        .iter()
        .filter(|r| r.language == Language::En)
        .count();
    println!(
        "  {} Languages: DA {}, EN {}",
        "•".blue(),
        danish.to_string().cyan(),
        english.to_string().cyan()
    );

    let mut created: Vec<NaiveDate> = dataset.records.iter().filter_map(|r| r.date_created).collect();
    created.sort();
    if let (Some(first), Some(last)) = (created.first(), created.last()) {
        println!(
            "  {} Date range: {} to {}",
            "•".blue(),
            first.to_string().cyan(),
            last.to_string().cyan()
        );
    }

    let with_tags = dataset.records.iter().filter(|r| !r.tags.is_empty()).count();
    println!(
        "  {} Articles with tags: {}/{}",
        "•".blue(),
        with_tags.to_string().cyan(),
        dataset.len().to_string().cyan()
    );
}

pub async fn handle_scan(sub_matches: &ArgMatches) -> Result<()> {
    tracing_subscriber::fmt::init();

    print_divider();
    println!("{}", "  CONTENT FRESHNESS SCAN".bright_white().bold());
    print_divider();
    println!();

    let base_url = match sub_matches.get_one::<Url>("url") {
        Some(url) => url.clone(),
        None => {
            let raw = print_prompt("Base URL of the site to scan:");
            Url::parse(&raw).with_context(|| format!("invalid URL '{}'", raw))?
        }
    };

    let strategy = match sub_matches.get_one::<String>("strategy") {
        Some(raw) => {
            parse_strategy(raw).with_context(|| format!("unknown strategy '{}'", raw))?
        }
        None => prompt_strategy(),
    };

    let config = site_config(&base_url, sub_matches)?;
    let client = build_client(config.timeout_secs())?;
    let dataset_path = expand_path(sub_matches.get_one::<String>("dataset").unwrap());

    let existing = if dataset_path.exists() {
        Dataset::load(&dataset_path)?
    } else {
        Dataset::new()
    };
    if !existing.is_empty() {
        println!(
            "{} Existing dataset: {} records",
            "→".blue(),
            existing.len().to_string().bright_white()
        );
    }

    let mut urls = discover_urls(
        &client,
        &config,
        strategy,
        sub_matches.get_one::<PathBuf>("url-file"),
    )
    .await?;
    println!(
        "{} Discovered {} URLs",
        "✓".green().bold(),
        urls.len().to_string().bright_white()
    );

    let merge_strategy = if !existing.is_empty() && !urls.is_empty() {
        match sub_matches.get_one::<String>("merge") {
            Some(raw) => parse_merge_choice(raw)
                .with_context(|| format!("unknown merge strategy '{}'", raw))?,
            None => prompt_merge_choice(),
        }
    } else {
        MergeStrategy::Update
    };

    if merge_strategy == MergeStrategy::Skip && !urls.is_empty() {
        let known = existing.urls();
        let total = urls.len();
        urls.retain(|url| !known.contains(url));
        println!(
            "{} Filtering: {} total, {} new",
            "→".blue(),
            total.to_string().bright_white(),
            urls.len().to_string().bright_white()
        );
    }

    let fresh = if urls.is_empty() {
        Vec::new()
    } else {
        println!();
        println!("{} Scraping {} articles...", "→".blue(), urls.len());
        let bar = ProgressBar::new(urls.len() as u64);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{bar:40.cyan/blue} {pos}/{len} {msg}")
                .unwrap(),
        );
        let bar_cb = bar.clone();
        let progress: ExtractProgress = Arc::new(move |_done, _total, url| {
            bar_cb.set_message(extract_url_path(&url));
            bar_cb.inc(1);
        });
        // Extraction fetches whole article pages, so it gets its own
        // client with the longer timeout.
        let extract_client = build_client(config.extract_timeout_secs())?;
        let extractor = Extractor::new(extract_client, &config);
        let records = extractor.extract_all(&urls, Some(progress)).await;
        bar.finish_and_clear();
        records
    };

    let merged = merge(existing, fresh, merge_strategy);
    if merged.is_empty() {
        println!("{} No data to save", "→".yellow().bold());
        return Ok(());
    }
    merged.save(&dataset_path)?;

    println!();
    println!(
        "{} Dataset saved: {} ({} records)",
        "✓".green().bold(),
        dataset_path.display().to_string().bright_white(),
        merged.len().to_string().cyan()
    );
    print_dataset_summary(&merged);

    if let Some(external) = sub_matches.get_one::<PathBuf>("external") {
        let joined_path = expand_path(sub_matches.get_one::<String>("joined-output").unwrap());
        match Table::load(external) {
            Ok(external_table) => {
                let mut joined = outer_join(&merged.to_table(), &external_table, "url");
                joined.sort_desc_by("date_created");
                joined.save(&joined_path)?;
                println!(
                    "{} Joined table saved: {} ({} rows)",
                    "✓".green().bold(),
                    joined_path.display().to_string().bright_white(),
                    joined.len().to_string().cyan()
                );
            }
            Err(e) => {
                println!(
                    "{} Skipping external join, could not read {}: {}",
                    "→".yellow(),
                    external.display().to_string().bright_white(),
                    e
                );
            }
        }
    }

    println!();
    print_divider();
    println!("{}", "  SCAN COMPLETE".green().bold());
    print_divider();
    Ok(())
}

pub async fn handle_discover(sub_matches: &ArgMatches) -> Result<()> {
    tracing_subscriber::fmt::init();

    let base_url = sub_matches.get_one::<Url>("url").unwrap();
    let strategy = parse_strategy(sub_matches.get_one::<String>("strategy").unwrap())
        .unwrap_or(Strategy::Hybrid);
    let config = site_config(base_url, sub_matches)?;
    let client = build_client(config.timeout_secs())?;

    let urls = discover_urls(&client, &config, strategy, None).await?;
    println!(
        "{} Discovered {} URLs",
        "✓".green().bold(),
        urls.len().to_string().bright_white()
    );
    println!();
    for url in &urls {
        println!("{}", url);
    }
    Ok(())
}

pub fn handle_report(sub_matches: &ArgMatches) -> Result<()> {
    tracing_subscriber::fmt::init();

    let dataset_path = expand_path(sub_matches.get_one::<String>("dataset").unwrap());
    let output_dir = expand_path(sub_matches.get_one::<String>("output-dir").unwrap());
    let today = Utc::now().date_naive();

    let dataset = Dataset::load(&dataset_path)
        .with_context(|| format!("reading {}", dataset_path.display()))?;

    let current = build_current_table(&dataset, today);
    let current_path = output_dir.join("report_current.csv");
    current.save(&current_path)?;

    let (fresh, rotting, outdated) = freshness_counts(&dataset, today);
    print_divider();
    println!("{}", "  FRESHNESS REPORT".bright_white().bold());
    print_divider();
    println!();
    println!("  {} Fresh:    {}", "•".green(), fresh.to_string().green().bold());
    println!("  {} Rotting:  {}", "•".yellow(), rotting.to_string().yellow().bold());
    println!("  {} Outdated: {}", "•".red(), outdated.to_string().red().bold());
    println!();
    println!(
        "{} Current state written to {}",
        "✓".green().bold(),
        current_path.display().to_string().bright_white()
    );

    if let Some(previous_path) = sub_matches.get_one::<String>("previous") {
        let previous_path = expand_path(previous_path);
        let previous = Dataset::load(&previous_path)
            .with_context(|| format!("reading {}", previous_path.display()))?;
        let changes = build_changes_table(&previous, &dataset, today);
        let changes_path = output_dir.join("report_changes.csv");
        changes.save(&changes_path)?;
        println!(
            "{} {} change(s) written to {}",
            "✓".green().bold(),
            changes.len().to_string().cyan(),
            changes_path.display().to_string().bright_white()
        );
    }

    Ok(())
}
