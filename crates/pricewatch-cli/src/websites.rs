//! Website registry command handlers for the CLI.

use clap::Subcommand;
use pricewatch_db::{NewWebsite, WebsiteListFilters};

/// Sub-commands available under `websites`.
#[derive(Debug, Subcommand)]
pub enum WebsiteCommands {
    /// Register a website to scrape
    Add {
        #[arg(long)]
        name: String,
        /// Start URL; must be unique
        #[arg(long)]
        url: String,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        description: Option<String>,
        /// daily, weekly, monthly or on-demand
        #[arg(long, value_parser = ["daily", "weekly", "monthly", "on-demand"])]
        frequency: Option<String>,
    },
    /// List registered websites, newest first
    List {
        #[arg(long)]
        category: Option<String>,
        /// Only active (`true`) or inactive (`false`) websites
        #[arg(long)]
        active: Option<bool>,
        #[arg(long, default_value = "1")]
        page: i64,
        #[arg(long, default_value = "10")]
        limit: i64,
    },
}

/// Registers a website.
///
/// # Errors
///
/// Returns an error if the URL is not http(s), is already registered, or
/// the insert fails.
pub(crate) async fn run_websites_add(
    pool: &sqlx::PgPool,
    name: &str,
    url: &str,
    category: Option<&str>,
    description: Option<&str>,
    frequency: Option<&str>,
) -> anyhow::Result<()> {
    pricewatch_scraper::urls::parse_target(url)?;
    if let Err(e) = pricewatch_scraper::Merchant::require(url) {
        eprintln!("warning: {e}; scrapes of this website will only summarize the page");
    }

    let website = NewWebsite {
        name,
        url,
        description,
        category,
        scrape_frequency: frequency,
    };
    let row = pricewatch_db::create_website(pool, website).await?;
    println!("created website {} ({})", row.id, row.url);
    Ok(())
}

/// Prints one page of registered websites.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub(crate) async fn run_websites_list(
    pool: &sqlx::PgPool,
    category: Option<&str>,
    is_active: Option<bool>,
    page: i64,
    limit: i64,
) -> anyhow::Result<()> {
    let filters = WebsiteListFilters {
        category,
        is_active,
        page,
        limit,
    };
    let (websites, total) = pricewatch_db::list_websites(pool, filters).await?;

    if websites.is_empty() {
        println!("no websites found; add one with `websites add`");
        return Ok(());
    }

    println!(
        "{:<38}{:<14}{:<11}{:<18}URL",
        "ID", "CATEGORY", "ACTIVE", "LAST SCRAPED"
    );
    for website in &websites {
        let last_scraped = website.last_scraped.map_or_else(
            || "never".to_string(),
            |t| t.format("%Y-%m-%d %H:%M").to_string(),
        );
        println!(
            "{:<38}{:<14}{:<11}{:<18}{}",
            website.id, website.category, website.is_active, last_scraped, website.url
        );
    }
    println!(
        "page {} of {} ({total} websites)",
        page.max(1),
        total_pages(total, limit)
    );

    Ok(())
}

pub(crate) fn total_pages(total: i64, limit: i64) -> i64 {
    let limit = limit.max(1);
    (total + limit - 1) / limit
}
