use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("request to {url} timed out")]
    Timeout { url: String },

    #[error("rate limited by {domain} (retry after {retry_after_secs}s)")]
    RateLimited {
        domain: String,
        retry_after_secs: u64,
    },

    #[error("page not found: {url}")]
    NotFound { url: String },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("no site configuration for domain {domain}")]
    UnsupportedDomain { domain: String },

    #[error("could not parse product card {index} on {url}: {reason}")]
    Card {
        index: usize,
        url: String,
        reason: String,
    },

    #[error("invalid URL \"{url}\": {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("WebDriver command {command} failed: {reason}")]
    WebDriver { command: String, reason: String },

    #[error("browser automation is not configured (set PRICEWATCH_WEBDRIVER_URL)")]
    BrowserUnavailable,
}

impl ScraperError {
    /// Returns `true` for failures that mean "the page could not be
    /// retrieved", as opposed to configuration or parsing problems.
    /// [`ScraperError::BrowserUnavailable`] is a configuration problem.
    #[must_use]
    pub fn is_fetch_failure(&self) -> bool {
        matches!(
            self,
            ScraperError::Http(_)
                | ScraperError::Timeout { .. }
                | ScraperError::RateLimited { .. }
                | ScraperError::NotFound { .. }
                | ScraperError::UnexpectedStatus { .. }
                | ScraperError::WebDriver { .. }
        )
    }
}
