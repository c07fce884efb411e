//! Page retrieval: plain HTTP and WebDriver browser automation.
//!
//! Both strategies sit behind small traits so the walker and orchestrator
//! can be driven by in-memory fakes in tests. Futures carry no `Send` bound;
//! a scrape runs to completion on one task.

mod http;
mod webdriver;

use std::future::Future;

use crate::error::ScraperError;

pub use http::HttpFetcher;
pub use webdriver::{WebDriverLauncher, WebDriverSession};

/// A successfully retrieved HTML document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    pub status: u16,
    /// URL after redirects.
    pub final_url: String,
    pub html: String,
}

/// Plain document fetch.
pub trait PageFetcher {
    /// Fetches `url`. Timeouts, connection errors and non-2xx statuses are
    /// errors.
    fn fetch(&self, url: &str) -> impl Future<Output = Result<FetchedPage, ScraperError>>;
}

/// Opaque reference to an element inside a live browser session.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ElementHandle(String);

impl ElementHandle {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.0
    }
}

/// One browser session. Obtained from a [`BrowserLauncher`] and consumed by
/// [`BrowserSession::quit`].
pub trait BrowserSession {
    fn navigate(&self, url: &str) -> impl Future<Output = Result<(), ScraperError>>;

    /// Current DOM serialized as HTML, after scripts have run.
    fn rendered_html(&self) -> impl Future<Output = Result<String, ScraperError>>;

    fn find_elements(
        &self,
        css_selector: &str,
    ) -> impl Future<Output = Result<Vec<ElementHandle>, ScraperError>>;

    fn click(&self, element: &ElementHandle) -> impl Future<Output = Result<(), ScraperError>>;

    /// Scrolls `element` into the viewport.
    fn scroll_to(&self, element: &ElementHandle) -> impl Future<Output = Result<(), ScraperError>>;

    fn current_url(&self) -> impl Future<Output = Result<String, ScraperError>>;

    /// Ends the session and releases the browser.
    fn quit(self) -> impl Future<Output = Result<(), ScraperError>>;
}

/// Starts browser sessions on demand.
pub trait BrowserLauncher {
    type Session: BrowserSession;

    fn launch(&self) -> impl Future<Output = Result<Self::Session, ScraperError>>;
}
