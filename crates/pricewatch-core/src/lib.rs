pub mod app_config;
pub mod config;
pub mod products;

pub use app_config::{AppConfig, BrowserTimings, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use products::{
    ExtractedItem, FetchMethod, FetchMode, FilterCriteria, ListPage, PageSummary, ProductFields,
    ScrapeResult, SinglePage, NOT_FOUND,
};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid fetch mode: {0} (expected auto, http or browser)")]
    InvalidFetchMode(String),
}
