pub mod fetch;
pub mod filter;
pub mod listing;
pub mod normalize;
pub mod orchestrator;
pub mod pagination;
pub mod reference;
pub mod resolve;
pub mod sites;
pub mod urls;

mod error;
mod rate_limit;

pub use error::ScraperError;
pub use fetch::{
    BrowserLauncher, BrowserSession, ElementHandle, FetchedPage, HttpFetcher, PageFetcher,
    WebDriverLauncher, WebDriverSession,
};
pub use filter::apply_filters;
pub use normalize::normalize_price;
pub use orchestrator::{ScrapeRequest, Scraper};
pub use reference::reference_from_url;
pub use sites::{Merchant, SiteConfig};
