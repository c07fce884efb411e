//! The `scrape` command.
//!
//! Exactly one JSON envelope line is written to stdout per invocation,
//! success or failure. Persistence runs after a successful scrape and never
//! changes the outcome: database errors are logged and swallowed.

use anyhow::{anyhow, Context};
use clap::Args;
use pricewatch_core::{AppConfig, FetchMode, FilterCriteria, ScrapeResult};
use pricewatch_db::{get_website, update_website_scrape_summary, upsert_product, ProductUpsert};
use pricewatch_scraper::{ScrapeRequest, Scraper};
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Debug, Args)]
pub struct ScrapeArgs {
    /// Page URL, or the id of a registered website
    pub target: String,
    /// Fetch strategy: auto, http or browser
    #[arg(long, default_value = "auto")]
    pub mode: FetchMode,
    /// Scrape this URL instead of the website's stored one
    #[arg(long)]
    pub url: Option<String>,
    /// Inclusive lower price bound
    #[arg(long)]
    pub min_price: Option<Decimal>,
    /// Inclusive upper price bound
    #[arg(long)]
    pub max_price: Option<Decimal>,
    /// Keep items whose name contains this text
    #[arg(long)]
    pub name: Option<String>,
    /// Keep items whose reference or name contains this text
    #[arg(long)]
    pub reference: Option<String>,
    /// Stop after this many listing pages
    #[arg(long)]
    pub max_pages: Option<usize>,
}

impl ScrapeArgs {
    pub(crate) fn criteria(&self) -> FilterCriteria {
        let text = |v: Option<&str>| {
            v.map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_owned)
        };
        FilterCriteria {
            min_price: self.min_price,
            max_price: self.max_price,
            name_filter: text(self.name.as_deref()),
            reference_filter: text(self.reference.as_deref()),
        }
    }
}

/// What the first positional argument names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Target {
    Url(String),
    Website(Uuid),
}

impl Target {
    pub(crate) fn parse(raw: &str) -> anyhow::Result<Self> {
        let raw = raw.trim();
        let lower = raw.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            return Ok(Target::Url(raw.to_owned()));
        }
        Uuid::parse_str(raw)
            .map(Target::Website)
            .map_err(|_| anyhow!("target must be an http(s) URL or a website id, got '{raw}'"))
    }
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub(crate) enum Envelope {
    Success { success: bool, data: ScrapeResult },
    Failure { error: String },
}

impl Envelope {
    pub(crate) fn success(data: ScrapeResult) -> Self {
        Envelope::Success {
            success: true,
            data,
        }
    }

    pub(crate) fn failure(err: &dyn std::fmt::Display) -> Self {
        Envelope::Failure {
            error: err.to_string(),
        }
    }
}

/// Writes the envelope as a single line on stdout.
pub(crate) fn emit(envelope: &Envelope) {
    match serde_json::to_string(envelope) {
        Ok(line) => println!("{line}"),
        Err(e) => println!("{}", json!({ "error": format!("failed to encode result: {e}") })),
    }
}

/// Runs one scrape and prints its envelope. Never fails: every error
/// becomes an error envelope.
pub(crate) async fn run_scrape(config: &AppConfig, args: &ScrapeArgs) {
    let envelope = match scrape(config, args).await {
        Ok(result) => Envelope::success(result),
        Err(e) => {
            let message = format!("{e:#}");
            tracing::error!(error = %message, "scrape failed");
            Envelope::failure(&message)
        }
    };
    emit(&envelope);
}

async fn scrape(config: &AppConfig, args: &ScrapeArgs) -> anyhow::Result<ScrapeResult> {
    let target = Target::parse(&args.target)?;
    let pool = connect_if_configured(config).await;

    let (stored_url, website_id) = match target {
        Target::Url(url) => (url, None),
        Target::Website(id) => {
            let pool = pool
                .as_ref()
                .ok_or_else(|| anyhow!("a database is required to resolve website {id}"))?;
            let website = get_website(pool, id)
                .await
                .context("failed to look up website")?
                .ok_or_else(|| anyhow!("website {id} not found"))?;
            (website.url, Some(id))
        }
    };

    let request = ScrapeRequest {
        url: args.url.clone().unwrap_or(stored_url),
        mode: args.mode,
        criteria: args.criteria(),
        max_pages: args.max_pages,
    };
    let scraper = Scraper::from_config(config)?;
    let result = scraper.scrape(&request).await?;

    if let Some(pool) = &pool {
        persist(pool, &result, website_id).await;
    }
    Ok(result)
}

async fn connect_if_configured(config: &AppConfig) -> Option<PgPool> {
    if config.database_url.is_none() {
        tracing::debug!("DATABASE_URL not set, results will not be persisted");
        return None;
    }
    match pricewatch_db::connect_pool_from_config(config).await {
        Ok(pool) => Some(pool),
        Err(e) => {
            tracing::warn!(error = %e, "database unavailable, results will not be persisted");
            None
        }
    }
}

/// The record stored on a website after each scrape.
pub(crate) fn scrape_summary(result: &ScrapeResult) -> serde_json::Value {
    let (kind, count) = match result {
        ScrapeResult::List(page) => ("list", page.count),
        ScrapeResult::Single(page) => ("single", usize::from(page.data.is_some())),
    };
    json!({
        "type": kind,
        "count": count,
        "domain": result.domain(),
        "timestamp": result.timestamp(),
        "method": result.method(),
    })
}

async fn persist(pool: &PgPool, result: &ScrapeResult, website_id: Option<Uuid>) {
    if let Some(id) = website_id {
        if let Err(e) = update_website_scrape_summary(pool, id, &scrape_summary(result)).await {
            tracing::warn!(website_id = %id, error = %e, "failed to store scrape summary");
        }
    }

    let products = result.products();
    let mut saved = 0_usize;
    for item in &products {
        let Some(product) = ProductUpsert::from_item(item, result.domain(), website_id) else {
            continue;
        };
        match upsert_product(pool, &product).await {
            Ok(_) => saved += 1,
            Err(e) => {
                tracing::warn!(url = %product.url, error = %e, "failed to save product");
            }
        }
    }
    tracing::info!(saved, found = products.len(), "products persisted");
}
