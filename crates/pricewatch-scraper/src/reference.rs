//! Product reference recovery from URL slugs.
//!
//! Used only when a card or detail page carries no reference element.

use std::sync::LazyLock;

use regex::Regex;

use crate::sites::{Merchant, ReferenceRule};

/// Trailing page-extension marker on a slug (`.html`, `.php`, ...).
static PAGE_EXTENSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\.(html?|php|aspx?)$").expect("valid page-extension regex")
});

/// Minimum length (exclusive) of an alphanumeric SKU token.
const MIN_SKU_TOKEN_LEN: usize = 5;

/// Derives a product reference from `url` using the merchant's slug rule.
///
/// Returns `None` when the merchant has no rule or the slug yields nothing.
#[must_use]
pub fn reference_from_url(url: &str, merchant: Merchant) -> Option<String> {
    let rule = merchant.config().reference_rule;
    if rule == ReferenceRule::None {
        return None;
    }

    let slug = final_slug(url)?;
    let tokens: Vec<&str> = slug.split('-').filter(|t| !t.is_empty()).collect();

    match rule {
        ReferenceRule::FinalSlugToken => final_token(&tokens),
        ReferenceRule::AlphanumericToken => tokens
            .iter()
            .rev()
            .find(|t| looks_like_sku(t))
            .map(|t| (*t).to_string()),
        ReferenceRule::None => None,
    }
}

/// Last path segment of `url` with query, fragment and page extension removed.
fn final_slug(url: &str) -> Option<String> {
    let path = url.split(['?', '#']).next().unwrap_or_default();
    let segment = path.trim_end_matches('/').rsplit('/').next()?;
    let slug = PAGE_EXTENSION.replace(segment, "");
    (!slug.is_empty()).then(|| slug.into_owned())
}

fn final_token(tokens: &[&str]) -> Option<String> {
    match tokens {
        [] => None,
        [.., prev, last] if last.chars().count() <= 2 => Some(format!("{prev}-{last}")),
        [.., last] => Some((*last).to_string()),
    }
}

fn looks_like_sku(token: &str) -> bool {
    token.chars().count() > MIN_SKU_TOKEN_LEN
        && token.chars().any(|c| c.is_ascii_digit())
        && token.chars().any(char::is_alphabetic)
}
