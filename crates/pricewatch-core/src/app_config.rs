use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Fixed settle delays around browser-automation navigation.
///
/// Dynamic storefronts render prices and pagination controls from script
/// after the document loads, so every interaction waits a fixed amount of
/// time before the rendered HTML is read back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BrowserTimings {
    /// Wait after `navigate(url)` before reading the page.
    pub load_delay: Duration,
    /// Wait after scrolling the "next" control into view.
    pub scroll_delay: Duration,
    /// Wait after clicking the "next" control.
    pub click_delay: Duration,
}

impl Default for BrowserTimings {
    fn default() -> Self {
        Self {
            load_delay: Duration::from_millis(5000),
            scroll_delay: Duration::from_millis(1000),
            click_delay: Duration::from_millis(3000),
        }
    }
}

impl BrowserTimings {
    /// No settle delays at all. Used by tests and fake sessions.
    #[must_use]
    pub fn immediate() -> Self {
        Self {
            load_delay: Duration::ZERO,
            scroll_delay: Duration::ZERO,
            click_delay: Duration::ZERO,
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    /// Postgres URL. `None` disables persistence; URL targets still scrape.
    pub database_url: Option<String>,
    pub env: Environment,
    pub log_level: String,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    pub scraper_request_timeout_secs: u64,
    pub scraper_user_agent: String,
    pub scraper_page_delay_ms: u64,
    pub scraper_max_retries: u32,
    pub scraper_retry_backoff_base_secs: u64,
    /// WebDriver endpoint, e.g. `http://localhost:9515` for chromedriver.
    pub webdriver_url: Option<String>,
    pub browser_timings: BrowserTimings,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field(
                "database_url",
                &self.database_url.as_ref().map(|_| "[redacted]"),
            )
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field(
                "scraper_request_timeout_secs",
                &self.scraper_request_timeout_secs,
            )
            .field("scraper_user_agent", &self.scraper_user_agent)
            .field("scraper_page_delay_ms", &self.scraper_page_delay_ms)
            .field("scraper_max_retries", &self.scraper_max_retries)
            .field(
                "scraper_retry_backoff_base_secs",
                &self.scraper_retry_backoff_base_secs,
            )
            .field("webdriver_url", &self.webdriver_url)
            .field("browser_timings", &self.browser_timings)
            .finish()
    }
}
