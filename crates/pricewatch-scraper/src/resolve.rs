//! Detail-page field resolution.
//!
//! Fields are resolved in a fixed order:
//!
//! 1. price from page metadata (`product:price:amount` and friends)
//! 2. reference, then name, each from the first candidate selector with text
//! 3. remaining fields searched near the anchor element (the reference
//!    element, else the name element), widening up to
//!    [`MAX_ANCESTOR_LEVELS`] ancestors
//! 4. remaining fields searched across the whole page
//! 5. anything still missing becomes [`NOT_FOUND`]

use pricewatch_core::{PageSummary, ProductFields, NOT_FOUND};
use rust_decimal::Decimal;
use scraper::{ElementRef, Html, Selector};

use crate::normalize::{format_metadata_price, normalize_price};
use crate::sites::DetailProfile;

/// How far above the anchor element the local search may climb.
pub const MAX_ANCESTOR_LEVELS: usize = 6;

/// Price candidates found by anchor search longer than this are rejected.
pub const MAX_PRICE_TEXT_LEN: usize = 25;

/// Metadata price tags, highest priority first.
const METADATA_PRICE: [&str; 3] = [
    "meta[property='product:price:amount']",
    "meta[itemprop='price']",
    "meta[property='og:price:amount']",
];

const METADATA_CURRENCY: [&str; 3] = [
    "meta[property='product:price:currency']",
    "meta[itemprop='priceCurrency']",
    "meta[property='og:price:currency']",
];

/// Parses a candidate selector, skipping it with a log line if invalid.
pub(crate) fn selector(raw: &str) -> Option<Selector> {
    match Selector::parse(raw) {
        Ok(sel) => Some(sel),
        Err(e) => {
            tracing::warn!(selector = raw, error = %e, "skipping invalid selector");
            None
        }
    }
}

/// Element text with runs of whitespace collapsed to single spaces.
pub(crate) fn collapsed_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// First element under `scope` matched by any candidate (in candidate
/// order) whose text passes `accept`.
fn first_match<'a>(
    scope: ElementRef<'a>,
    candidates: &[&str],
    accept: impl Fn(&str) -> bool,
) -> Option<(ElementRef<'a>, String)> {
    candidates.iter().filter_map(|raw| selector(raw)).find_map(|sel| {
        scope.select(&sel).find_map(|el| {
            let text = collapsed_text(el);
            (!text.is_empty() && accept(&text)).then_some((el, text))
        })
    })
}

fn any_text(_: &str) -> bool {
    true
}

fn plausible_price(text: &str) -> bool {
    text.chars().count() <= MAX_PRICE_TEXT_LEN && text.chars().any(|c| c.is_ascii_digit())
}

/// Searches the anchor, then each ancestor up to [`MAX_ANCESTOR_LEVELS`].
fn near_anchor(
    anchor: ElementRef<'_>,
    candidates: &[&str],
    accept: impl Fn(&str) -> bool + Copy,
) -> Option<String> {
    std::iter::successors(Some(anchor), |el| el.parent().and_then(ElementRef::wrap))
        .take(MAX_ANCESTOR_LEVELS + 1)
        .find_map(|scope| first_match(scope, candidates, accept).map(|(_, text)| text))
}

/// Display price and amount from a structured metadata tag, if present.
fn metadata_price(document: &Html) -> Option<(String, Decimal)> {
    let content = METADATA_PRICE
        .iter()
        .filter_map(|raw| selector(raw))
        .find_map(|sel| {
            document
                .select(&sel)
                .filter_map(|el| el.value().attr("content"))
                .find(|content| content.chars().any(|c| c.is_ascii_digit()))
        })?;

    let currency = METADATA_CURRENCY
        .iter()
        .filter_map(|raw| selector(raw))
        .find_map(|sel| {
            document
                .select(&sel)
                .find_map(|el| el.value().attr("content"))
        });

    let display = format_metadata_price(content, currency);
    let amount = normalize_price(&display);
    Some((display, amount))
}

/// Resolves every detail field of `document` using `profile`.
#[must_use]
pub fn resolve_fields(document: &Html, page_url: &str, profile: &DetailProfile) -> ProductFields {
    let root = document.root_element();

    let mut price = metadata_price(document).map(|(display, _)| display);
    let reference = first_match(root, profile.reference, any_text);
    let name = first_match(root, profile.name, any_text);

    let mut overview = None;
    let mut category = None;

    let anchor = reference
        .as_ref()
        .or(name.as_ref())
        .map(|(element, _)| *element);
    if let Some(anchor) = anchor {
        if price.is_none() {
            price = near_anchor(anchor, profile.price, plausible_price);
        }
        overview = near_anchor(anchor, profile.overview, any_text);
        category = near_anchor(anchor, profile.category, any_text);
    }

    let global = |current: Option<String>, candidates: &[&str]| {
        current.or_else(|| first_match(root, candidates, any_text).map(|(_, text)| text))
    };
    let price = global(price, profile.price);
    let overview = global(overview, profile.overview);
    let category = global(category, profile.category);

    let price_amount = price.as_deref().map_or(Decimal::ZERO, normalize_price);
    let or_sentinel = |value: Option<String>| value.unwrap_or_else(|| NOT_FOUND.to_string());

    ProductFields {
        name: or_sentinel(name.map(|(_, text)| text)),
        price: or_sentinel(price),
        price_amount,
        reference: or_sentinel(reference.map(|(_, text)| text)),
        overview: or_sentinel(overview),
        category: or_sentinel(category),
        url: page_url.to_string(),
    }
}

/// Site-independent facts about a page.
#[must_use]
pub fn page_summary(document: &Html) -> PageSummary {
    let texts = |raw: &str| -> Vec<String> {
        selector(raw)
            .map(|sel| {
                document
                    .select(&sel)
                    .map(collapsed_text)
                    .filter(|t| !t.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    };
    let count = |raw: &str| selector(raw).map_or(0, |sel| document.select(&sel).count());

    let meta_description = selector("meta[name='description']")
        .and_then(|sel| {
            document
                .select(&sel)
                .find_map(|el| el.value().attr("content"))
                .map(|c| c.trim().to_string())
        })
        .unwrap_or_default();

    PageSummary {
        title: texts("title").into_iter().next().unwrap_or_default(),
        meta_description,
        h1: texts("h1"),
        links_count: count("a"),
        images_count: count("img"),
    }
}

#[cfg(test)]
#[path = "resolve_test.rs"]
mod tests;
