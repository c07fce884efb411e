//! Listing-page walker.
//!
//! Follows a merchant's "next" control from page to page, parsing cards and
//! filtering them as it goes. A walk is bounded by a page cap that depends on
//! how pages are fetched, and by a visited-URL set so no URL is fetched twice.
//!
//! A failure on any page after the first ends the walk with the items
//! gathered so far. A failure on the first page is returned to the caller.

use std::collections::HashSet;
use std::future::Future;
use std::time::Duration;

use pricewatch_core::{BrowserTimings, ExtractedItem, FetchMethod, FilterCriteria};

use crate::error::ScraperError;
use crate::fetch::{BrowserSession, PageFetcher};
use crate::filter::apply_filters;
use crate::listing::parse_listing_page;
use crate::sites::Merchant;

/// Page cap for plain HTTP walks.
pub const HTTP_PAGE_CAP: usize = 50;

/// Page cap for browser walks; each page costs several seconds of settle time.
pub const BROWSER_PAGE_CAP: usize = 10;

/// A page as seen by the walker: where it ended up and what it contained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedPage {
    pub url: String,
    pub html: String,
}

/// One way of loading listing pages.
pub trait PageDriver {
    fn method(&self) -> FetchMethod;

    fn default_page_cap(&self) -> usize;

    /// Loads `url` directly.
    fn open(&self, url: &str) -> impl Future<Output = Result<LoadedPage, ScraperError>>;

    /// Moves from the current page to the next one. `next_url` is the
    /// resolved target of the control matched by `next_selector`.
    fn advance(
        &self,
        next_url: &str,
        next_selector: &str,
    ) -> impl Future<Output = Result<LoadedPage, ScraperError>>;
}

/// Follows hyperlinks with plain GET requests.
pub struct HttpDriver<'a, F> {
    fetcher: &'a F,
}

impl<'a, F: PageFetcher> HttpDriver<'a, F> {
    pub fn new(fetcher: &'a F) -> Self {
        Self { fetcher }
    }
}

impl<F: PageFetcher> PageDriver for HttpDriver<'_, F> {
    fn method(&self) -> FetchMethod {
        FetchMethod::Http
    }

    fn default_page_cap(&self) -> usize {
        HTTP_PAGE_CAP
    }

    async fn open(&self, url: &str) -> Result<LoadedPage, ScraperError> {
        let page = self.fetcher.fetch(url).await?;
        Ok(LoadedPage {
            url: page.final_url,
            html: page.html,
        })
    }

    async fn advance(
        &self,
        next_url: &str,
        _next_selector: &str,
    ) -> Result<LoadedPage, ScraperError> {
        self.open(next_url).await
    }
}

/// Drives a live browser session. Pagination scrolls to the next control
/// and clicks it, since script-driven pagers may have no navigable link.
pub struct BrowserDriver<'a, S> {
    session: &'a S,
    timings: BrowserTimings,
}

impl<'a, S: BrowserSession> BrowserDriver<'a, S> {
    pub fn new(session: &'a S, timings: BrowserTimings) -> Self {
        Self { session, timings }
    }

    async fn settle(delay: Duration) {
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }

    async fn snapshot(&self, fallback_url: &str) -> Result<LoadedPage, ScraperError> {
        let html = self.session.rendered_html().await?;
        let url = match self.session.current_url().await {
            Ok(url) => url,
            Err(e) => {
                tracing::debug!(error = %e, "current url unavailable, keeping requested url");
                fallback_url.to_owned()
            }
        };
        Ok(LoadedPage { url, html })
    }

    /// Scroll-then-click on the first element matching `next_selector`.
    async fn click_next(&self, next_selector: &str) -> Result<bool, ScraperError> {
        let controls = self.session.find_elements(next_selector).await?;
        let Some(control) = controls.into_iter().next() else {
            return Ok(false);
        };
        self.session.scroll_to(&control).await?;
        Self::settle(self.timings.scroll_delay).await;
        self.session.click(&control).await?;
        Self::settle(self.timings.click_delay).await;
        Ok(true)
    }
}

impl<S: BrowserSession> PageDriver for BrowserDriver<'_, S> {
    fn method(&self) -> FetchMethod {
        FetchMethod::Browser
    }

    fn default_page_cap(&self) -> usize {
        BROWSER_PAGE_CAP
    }

    async fn open(&self, url: &str) -> Result<LoadedPage, ScraperError> {
        self.session.navigate(url).await?;
        Self::settle(self.timings.load_delay).await;
        self.snapshot(url).await
    }

    /// After a click the page is keyed on `next_url`: in-place pagers swap
    /// the cards without changing the address bar.
    async fn advance(
        &self,
        next_url: &str,
        next_selector: &str,
    ) -> Result<LoadedPage, ScraperError> {
        match self.click_next(next_selector).await {
            Ok(true) => Ok(LoadedPage {
                url: next_url.to_owned(),
                html: self.session.rendered_html().await?,
            }),
            Ok(false) => {
                tracing::debug!(next_url, "next control not clickable, navigating to its target");
                self.open(next_url).await
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    next_url,
                    "clicking next control failed, navigating instead"
                );
                self.open(next_url).await
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct WalkOptions<'c> {
    /// Caller's page limit; clamped to `1..=driver cap`.
    pub max_pages: Option<usize>,
    /// Pause between consecutive page loads.
    pub page_delay: Duration,
    pub criteria: &'c FilterCriteria,
}

#[derive(Debug, Clone, PartialEq)]
pub enum WalkOutcome {
    /// Filtered items in page order and the number of pages processed.
    Listing {
        items: Vec<ExtractedItem>,
        pages: usize,
    },
    /// The first page had no cards and no filters were requested; it is a
    /// product detail page.
    SinglePage(LoadedPage),
}

/// Effective page cap for a walk.
#[must_use]
pub fn page_cap(requested: Option<usize>, driver_cap: usize) -> usize {
    requested.map_or(driver_cap, |n| n.clamp(1, driver_cap))
}

/// Walks a merchant listing starting at `start_url`.
///
/// # Errors
///
/// Returns the driver's error when the first page cannot be loaded. Later
/// failures end the walk with partial results instead.
pub async fn walk_listing<D: PageDriver>(
    driver: &D,
    start_url: &str,
    merchant: Merchant,
    opts: &WalkOptions<'_>,
) -> Result<WalkOutcome, ScraperError> {
    let cap = page_cap(opts.max_pages, driver.default_page_cap());
    let next_selector = merchant.config().listing.next;

    let mut visited: HashSet<String> = HashSet::new();
    let mut items: Vec<ExtractedItem> = Vec::new();
    let mut pages = 0usize;

    visited.insert(start_url.to_owned());
    let mut page = driver.open(start_url).await?;

    loop {
        visited.insert(page.url.clone());
        pages += 1;

        let listing = parse_listing_page(&page.html, &page.url, merchant);

        if pages == 1 && listing.card_count == 0 {
            if opts.criteria.is_active() {
                tracing::info!(
                    url = %page.url,
                    "no product cards on first page, filters requested"
                );
                return Ok(WalkOutcome::Listing {
                    items: Vec::new(),
                    pages,
                });
            }
            tracing::info!(
                url = %page.url,
                "no product cards on first page, treating as detail page"
            );
            return Ok(WalkOutcome::SinglePage(page));
        }

        let kept = apply_filters(listing.items, opts.criteria);
        tracing::info!(
            page = pages,
            url = %page.url,
            cards = listing.card_count,
            kept = kept.len(),
            "listing page scraped"
        );
        items.extend(kept);

        if pages >= cap {
            tracing::info!(cap, "page cap reached");
            break;
        }
        let Some(next_url) = listing.next_url else {
            break;
        };
        if !visited.insert(next_url.clone()) {
            tracing::debug!(next_url = %next_url, "next page already visited");
            break;
        }

        if !opts.page_delay.is_zero() {
            tokio::time::sleep(opts.page_delay).await;
        }

        match driver.advance(&next_url, next_selector).await {
            // A redirect back onto a page already scraped.
            Ok(next) if next.url != next_url && visited.contains(&next.url) => {
                tracing::debug!(landed = %next.url, "advance redirected to a visited page");
                break;
            }
            Ok(next) => page = next,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    page = pages + 1,
                    next_url = %next_url,
                    "stopping walk after page failure, keeping earlier pages"
                );
                break;
            }
        }
    }

    Ok(WalkOutcome::Listing { items, pages })
}

#[cfg(test)]
#[path = "pagination_test.rs"]
mod tests;
