//! Listing-page card extraction.

use pricewatch_core::ExtractedItem;
use rust_decimal::Decimal;
use scraper::{ElementRef, Html};

use crate::error::ScraperError;
use crate::normalize::normalize_price;
use crate::reference::reference_from_url;
use crate::resolve::{collapsed_text, selector};
use crate::sites::Merchant;
use crate::urls::join_href;

/// Image attributes in lookup order; lazy-loading themes keep the real
/// source in a data attribute.
const IMAGE_ATTRS: [&str; 3] = ["data-src", "data-original", "src"];

/// Everything pulled from one listing page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListingPage {
    /// Cards that produced both a name and a URL, in page order.
    pub items: Vec<ExtractedItem>,
    /// Number of elements matched by the card selector, kept or not.
    pub card_count: usize,
    /// Absolute URL of the "next" control, if the page has one.
    pub next_url: Option<String>,
}

/// Parses every card on a listing page.
///
/// A card that cannot be read is logged and skipped. A card missing its
/// name or URL is dropped.
#[must_use]
pub fn parse_listing_page(html: &str, page_url: &str, merchant: Merchant) -> ListingPage {
    let document = Html::parse_document(html);
    let profile = merchant.config().listing;

    let Some(card_sel) = selector(profile.card) else {
        return ListingPage::default();
    };

    let mut page = ListingPage::default();
    for (index, card) in document.select(&card_sel).enumerate() {
        page.card_count += 1;
        match parse_card(index, card, page_url, merchant) {
            Ok(Some(item)) => page.items.push(item),
            Ok(None) => tracing::debug!(index, page_url, "card has no name or url"),
            Err(e) => tracing::warn!(error = %e, "skipping product card"),
        }
    }

    page.next_url = next_href(&document, profile.next, page_url);
    page
}

/// Absolute URL of the pagination control matched by `next`, if any.
#[must_use]
pub fn next_href(document: &Html, next: &str, page_url: &str) -> Option<String> {
    let sel = selector(next)?;
    document
        .select(&sel)
        .filter_map(|el| el.value().attr("href"))
        .find_map(|href| join_href(page_url, href))
}

fn parse_card<'a>(
    index: usize,
    card: ElementRef<'a>,
    page_url: &str,
    merchant: Merchant,
) -> Result<Option<ExtractedItem>, ScraperError> {
    let profile = merchant.config().listing;

    let first = |raw: &str| -> Result<Option<ElementRef<'a>>, ScraperError> {
        let sel = scraper::Selector::parse(raw).map_err(|e| ScraperError::Card {
            index,
            url: page_url.to_string(),
            reason: format!("selector {raw:?}: {e}"),
        })?;
        Ok(card.select(&sel).next())
    };
    let text_of = |raw: &str| -> Result<Option<String>, ScraperError> {
        Ok(first(raw)?
            .map(collapsed_text)
            .filter(|text| !text.is_empty()))
    };

    let name = text_of(profile.name)?;
    let url = first(profile.url)?
        .and_then(|el| el.value().attr("href"))
        .and_then(|href| join_href(page_url, href));

    let (Some(name), Some(url)) = (name, url) else {
        return Ok(None);
    };

    let price = text_of(profile.price)?;
    let price_amount = price.as_deref().map_or(Decimal::ZERO, normalize_price);

    let image = first(profile.image)?.and_then(|el| {
        IMAGE_ATTRS
            .iter()
            .filter_map(|attr| el.value().attr(attr))
            .find_map(|src| join_href(page_url, src))
    });

    let reference = match profile.reference {
        Some(raw) => text_of(raw)?,
        None => None,
    }
    .or_else(|| reference_from_url(&url, merchant));

    Ok(Some(ExtractedItem {
        name: Some(name),
        price,
        price_amount,
        reference,
        url: Some(url),
        image,
        category: None,
        overview: None,
    }))
}
