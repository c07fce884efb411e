use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::CoreError;

/// Sentinel stored in every detail-page field that could not be resolved.
pub const NOT_FOUND: &str = "Not found";

/// How the caller wants pages fetched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchMode {
    /// Browser automation for script-rendered domains, plain HTTP otherwise,
    /// falling back to the browser when plain HTTP fails.
    #[default]
    Auto,
    Http,
    Browser,
}

impl std::fmt::Display for FetchMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchMode::Auto => write!(f, "auto"),
            FetchMode::Http => write!(f, "http"),
            FetchMode::Browser => write!(f, "browser"),
        }
    }
}

impl std::str::FromStr for FetchMode {
    type Err = CoreError;

    /// Accepts `static` and `selenium` as aliases used by older callers.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(FetchMode::Auto),
            "http" | "static" => Ok(FetchMode::Http),
            "browser" | "selenium" => Ok(FetchMode::Browser),
            other => Err(CoreError::InvalidFetchMode(other.to_string())),
        }
    }
}

/// The strategy that actually produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchMethod {
    Http,
    Browser,
}

impl std::fmt::Display for FetchMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchMethod::Http => write!(f, "http"),
            FetchMethod::Browser => write!(f, "browser"),
        }
    }
}

/// One product card scraped from a listing page.
///
/// Absent fields are omitted from the serialized form. `price_amount` is
/// always derived from `price` by the price normalizer and is `0` when no
/// price was found.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
    #[serde(with = "rust_decimal::serde::float")]
    pub price_amount: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overview: Option<String>,
}

/// Fields resolved from a single product page. Unresolved fields hold
/// [`NOT_FOUND`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductFields {
    pub name: String,
    pub price: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price_amount: Decimal,
    pub reference: String,
    pub overview: String,
    pub category: String,
    pub url: String,
}

impl ProductFields {
    /// Returns `true` when `field` holds a real value rather than the sentinel.
    #[must_use]
    pub fn is_found(field: &str) -> bool {
        field != NOT_FOUND
    }

    /// Converts to the list-item shape, dropping sentinel values.
    #[must_use]
    pub fn to_item(&self) -> ExtractedItem {
        let keep = |v: &str| Self::is_found(v).then(|| v.to_string());
        ExtractedItem {
            name: keep(&self.name),
            price: keep(&self.price),
            price_amount: self.price_amount,
            reference: keep(&self.reference),
            url: Some(self.url.clone()),
            image: None,
            category: keep(&self.category),
            overview: keep(&self.overview),
        }
    }
}

/// Generic facts about any fetched page, independent of site configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSummary {
    pub title: String,
    pub meta_description: String,
    pub h1: Vec<String>,
    pub links_count: usize,
    pub images_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SinglePage {
    pub domain: String,
    pub url: String,
    pub timestamp: DateTime<Utc>,
    pub method: FetchMethod,
    /// `None` when the domain has no site configuration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<ProductFields>,
    pub summary: PageSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListPage {
    pub domain: String,
    pub url: String,
    pub timestamp: DateTime<Utc>,
    pub method: FetchMethod,
    pub pages_scraped: usize,
    pub count: usize,
    pub filters_applied: bool,
    pub data: Vec<ExtractedItem>,
}

impl ListPage {
    #[must_use]
    pub fn new(
        domain: &str,
        url: &str,
        method: FetchMethod,
        pages_scraped: usize,
        filters_applied: bool,
        data: Vec<ExtractedItem>,
    ) -> Self {
        Self {
            domain: domain.to_string(),
            url: url.to_string(),
            timestamp: Utc::now(),
            method,
            pages_scraped,
            count: data.len(),
            filters_applied,
            data,
        }
    }
}

/// Outcome of one scrape invocation. Built once and never mutated after it
/// is returned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ScrapeResult {
    Single(SinglePage),
    List(ListPage),
}

impl ScrapeResult {
    #[must_use]
    pub fn domain(&self) -> &str {
        match self {
            ScrapeResult::Single(page) => &page.domain,
            ScrapeResult::List(page) => &page.domain,
        }
    }

    #[must_use]
    pub fn url(&self) -> &str {
        match self {
            ScrapeResult::Single(page) => &page.url,
            ScrapeResult::List(page) => &page.url,
        }
    }

    #[must_use]
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            ScrapeResult::Single(page) => page.timestamp,
            ScrapeResult::List(page) => page.timestamp,
        }
    }

    #[must_use]
    pub fn method(&self) -> FetchMethod {
        match self {
            ScrapeResult::Single(page) => page.method,
            ScrapeResult::List(page) => page.method,
        }
    }

    /// Products worth persisting: list items with a name and url, or the
    /// single-page fields when a name was resolved.
    #[must_use]
    pub fn products(&self) -> Vec<ExtractedItem> {
        match self {
            ScrapeResult::List(page) => page
                .data
                .iter()
                .filter(|item| item.name.is_some() && item.url.is_some())
                .cloned()
                .collect(),
            ScrapeResult::Single(page) => page
                .data
                .as_ref()
                .filter(|fields| ProductFields::is_found(&fields.name))
                .map(ProductFields::to_item)
                .into_iter()
                .collect(),
        }
    }
}

/// Optional post-extraction predicates, combined with AND.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    /// Inclusive lower bound on `price_amount`.
    pub min_price: Option<Decimal>,
    /// Inclusive upper bound on `price_amount`.
    pub max_price: Option<Decimal>,
    /// Case-insensitive substring of the item name.
    pub name_filter: Option<String>,
    /// Case-insensitive substring of the reference or the name.
    pub reference_filter: Option<String>,
}

impl FilterCriteria {
    /// `true` when at least one predicate was supplied.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.min_price.is_some()
            || self.max_price.is_some()
            || self.name_filter.is_some()
            || self.reference_filter.is_some()
    }
}
