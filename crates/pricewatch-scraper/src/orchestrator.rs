//! One scrape invocation, start URL to [`ScrapeResult`].
//!
//! The fetch mode is turned into an ordered list of strategies. Each is
//! tried in turn; a failed strategy is logged and the next one runs. For a
//! configured merchant the page is walked as a listing. Anything else is
//! fetched once and summarized.

use std::time::Duration;

use chrono::Utc;
use pricewatch_core::{
    AppConfig, BrowserTimings, FetchMethod, FetchMode, FilterCriteria, ListPage, PageSummary,
    ProductFields, ScrapeResult, SinglePage,
};
use scraper::Html;

use crate::error::ScraperError;
use crate::fetch::{BrowserLauncher, BrowserSession, HttpFetcher, PageFetcher, WebDriverLauncher};
use crate::pagination::{
    walk_listing, BrowserDriver, HttpDriver, LoadedPage, PageDriver, WalkOptions, WalkOutcome,
};
use crate::resolve::{page_summary, resolve_fields};
use crate::sites::Merchant;
use crate::urls::{extract_domain, parse_target};

/// Parameters of one scrape.
#[derive(Debug, Clone, Default)]
pub struct ScrapeRequest {
    pub url: String,
    pub mode: FetchMode,
    pub criteria: FilterCriteria,
    /// Upper bound on listing pages, clamped to the strategy's cap.
    pub max_pages: Option<usize>,
}

impl ScrapeRequest {
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }
}

/// Strategies to attempt, in order. Auto mode plans a browser strategy only
/// when a browser is configured.
#[must_use]
pub fn strategy_plan(
    mode: FetchMode,
    merchant: Option<Merchant>,
    browser_configured: bool,
) -> &'static [FetchMethod] {
    let requires_script = merchant.is_some_and(|m| m.config().requires_script);
    match mode {
        FetchMode::Auto if !browser_configured => &[FetchMethod::Http],
        FetchMode::Auto if requires_script => &[FetchMethod::Browser],
        FetchMode::Auto => &[FetchMethod::Http, FetchMethod::Browser],
        FetchMode::Http => &[FetchMethod::Http],
        FetchMode::Browser => &[FetchMethod::Browser],
    }
}

/// Scrape engine. Holds the fetch collaborators and pacing; keeps no state
/// between calls.
pub struct Scraper<F, B> {
    fetcher: F,
    launcher: Option<B>,
    page_delay: Duration,
    timings: BrowserTimings,
}

impl Scraper<HttpFetcher, WebDriverLauncher> {
    /// Builds the production engine. Without a WebDriver URL, auto mode
    /// fetches over HTTP only and browser mode fails with
    /// [`ScraperError::BrowserUnavailable`].
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if an HTTP client cannot be built.
    pub fn from_config(config: &AppConfig) -> Result<Self, ScraperError> {
        Ok(Self::new(
            HttpFetcher::from_config(config)?,
            WebDriverLauncher::from_config(config)?,
        )
        .with_page_delay(Duration::from_millis(config.scraper_page_delay_ms))
        .with_browser_timings(config.browser_timings))
    }
}

impl<F: PageFetcher, B: BrowserLauncher> Scraper<F, B> {
    pub fn new(fetcher: F, launcher: Option<B>) -> Self {
        Self {
            fetcher,
            launcher,
            page_delay: Duration::ZERO,
            timings: BrowserTimings::default(),
        }
    }

    #[must_use]
    pub fn with_page_delay(mut self, page_delay: Duration) -> Self {
        self.page_delay = page_delay;
        self
    }

    #[must_use]
    pub fn with_browser_timings(mut self, timings: BrowserTimings) -> Self {
        self.timings = timings;
        self
    }

    /// Runs one scrape.
    ///
    /// A listing whose first page cannot be fetched by any strategy yields an
    /// empty list. When filters are requested the result is always a list.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::InvalidUrl`] for a malformed target,
    /// [`ScraperError::BrowserUnavailable`] for browser mode without a
    /// configured browser, or the last strategy's error when an unconfigured
    /// page cannot be fetched.
    pub async fn scrape(&self, request: &ScrapeRequest) -> Result<ScrapeResult, ScraperError> {
        let url = parse_target(&request.url)?.to_string();
        let domain = extract_domain(&url);
        let merchant = Merchant::classify(&url);
        let plan = strategy_plan(request.mode, merchant, self.launcher.is_some());

        tracing::info!(
            url = %url,
            mode = %request.mode,
            merchant = ?merchant,
            filters = request.criteria.is_active(),
            "scrape started"
        );

        let mut last_failure = None;
        for &method in plan {
            match self.run(method, &url, &domain, merchant, request).await {
                Ok(result) => return Ok(finish(result, request)),
                Err(e) => {
                    tracing::warn!(method = %method, error = %e, "fetch strategy failed");
                    last_failure = Some((method, e));
                }
            }
        }

        let Some((method, err)) = last_failure else {
            return Err(ScraperError::BrowserUnavailable);
        };
        // Configuration problems are reported; only fetch failures degrade.
        if merchant.is_some() && err.is_fetch_failure() {
            tracing::warn!(error = %err, "first listing page unavailable, returning empty list");
            return Ok(ScrapeResult::List(ListPage::new(
                &domain,
                &url,
                method,
                0,
                request.criteria.is_active(),
                Vec::new(),
            )));
        }
        Err(err)
    }

    async fn run(
        &self,
        method: FetchMethod,
        url: &str,
        domain: &str,
        merchant: Option<Merchant>,
        request: &ScrapeRequest,
    ) -> Result<ScrapeResult, ScraperError> {
        match method {
            FetchMethod::Http => {
                let driver = HttpDriver::new(&self.fetcher);
                self.extract(&driver, url, domain, merchant, request).await
            }
            FetchMethod::Browser => {
                let launcher = self
                    .launcher
                    .as_ref()
                    .ok_or(ScraperError::BrowserUnavailable)?;
                let session = launcher.launch().await?;
                let driver = BrowserDriver::new(&session, self.timings);
                let result = self.extract(&driver, url, domain, merchant, request).await;
                if let Err(e) = session.quit().await {
                    tracing::warn!(error = %e, "failed to close browser session");
                }
                result
            }
        }
    }

    async fn extract<D: PageDriver>(
        &self,
        driver: &D,
        url: &str,
        domain: &str,
        merchant: Option<Merchant>,
        request: &ScrapeRequest,
    ) -> Result<ScrapeResult, ScraperError> {
        let Some(merchant) = merchant else {
            tracing::info!(domain, "no site configuration, summarizing page only");
            let page = driver.open(url).await?;
            return Ok(single(domain, url, driver.method(), &page, None));
        };

        let opts = WalkOptions {
            max_pages: request.max_pages,
            page_delay: self.page_delay,
            criteria: &request.criteria,
        };
        match walk_listing(driver, url, merchant, &opts).await? {
            WalkOutcome::Listing { items, pages } => Ok(ScrapeResult::List(ListPage::new(
                domain,
                url,
                driver.method(),
                pages,
                request.criteria.is_active(),
                items,
            ))),
            WalkOutcome::SinglePage(page) => {
                Ok(single(domain, url, driver.method(), &page, Some(merchant)))
            }
        }
    }
}

/// Filters requested but no listing produced: report an empty list.
fn finish(result: ScrapeResult, request: &ScrapeRequest) -> ScrapeResult {
    match result {
        ScrapeResult::Single(page) if request.criteria.is_active() => {
            tracing::info!(
                url = %page.url,
                "filters requested on a detail page, returning empty list"
            );
            ScrapeResult::List(ListPage::new(
                &page.domain,
                &page.url,
                page.method,
                1,
                true,
                Vec::new(),
            ))
        }
        other => {
            tracing::info!(
                method = %other.method(),
                products = other.products().len(),
                "scrape finished"
            );
            other
        }
    }
}

/// Builds a detail result. The document is parsed and dropped here so it
/// never lives across an await.
fn single(
    domain: &str,
    url: &str,
    method: FetchMethod,
    page: &LoadedPage,
    merchant: Option<Merchant>,
) -> ScrapeResult {
    let (data, summary) = detail(&page.html, &page.url, merchant);
    ScrapeResult::Single(SinglePage {
        domain: domain.to_owned(),
        url: url.to_owned(),
        timestamp: Utc::now(),
        method,
        data,
        summary,
    })
}

fn detail(
    html: &str,
    page_url: &str,
    merchant: Option<Merchant>,
) -> (Option<ProductFields>, PageSummary) {
    let document = Html::parse_document(html);
    let data = merchant.map(|m| resolve_fields(&document, page_url, &m.config().detail));
    (data, page_summary(&document))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auto_on_plain_site_tries_http_then_browser() {
        assert_eq!(
            strategy_plan(FetchMode::Auto, Some(Merchant::Tunisianet), true),
            &[FetchMethod::Http, FetchMethod::Browser]
        );
        assert_eq!(
            strategy_plan(FetchMode::Auto, None, true),
            &[FetchMethod::Http, FetchMethod::Browser]
        );
    }

    #[test]
    fn auto_on_script_site_goes_straight_to_browser() {
        assert_eq!(
            strategy_plan(FetchMode::Auto, Some(Merchant::Mytek), true),
            &[FetchMethod::Browser]
        );
    }

    #[test]
    fn auto_without_a_browser_is_http_only() {
        assert_eq!(
            strategy_plan(FetchMode::Auto, Some(Merchant::Mytek), false),
            &[FetchMethod::Http]
        );
        assert_eq!(
            strategy_plan(FetchMode::Auto, Some(Merchant::Tunisianet), false),
            &[FetchMethod::Http]
        );
    }

    #[test]
    fn explicit_modes_have_no_fallback() {
        assert_eq!(
            strategy_plan(FetchMode::Http, Some(Merchant::Mytek), true),
            &[FetchMethod::Http]
        );
        assert_eq!(
            strategy_plan(FetchMode::Browser, None, false),
            &[FetchMethod::Browser]
        );
    }

    #[test]
    fn request_defaults_to_auto_without_filters() {
        let request = ScrapeRequest::new("https://spacenet.tn/74-pc-portable");
        assert_eq!(request.mode, FetchMode::Auto);
        assert!(!request.criteria.is_active());
        assert!(request.max_pages.is_none());
    }
}
