//! Per-merchant selector tables.
//!
//! Each supported storefront is a [`Merchant`] variant. [`Merchant::classify`]
//! maps a URL onto a variant by domain substring and [`Merchant::config`]
//! returns its static [`SiteConfig`]. Supporting another storefront means
//! adding a variant, a `SiteConfig` constant and one `config` arm; nothing
//! in the resolver or the walker changes.

use crate::error::ScraperError;
use crate::urls::extract_domain;

/// Ordered candidate selectors for each field of a product detail page.
///
/// Candidates are tried in declared order; the first match with non-empty
/// text wins.
#[derive(Debug, Clone, Copy)]
pub struct DetailProfile {
    pub name: &'static [&'static str],
    pub price: &'static [&'static str],
    pub reference: &'static [&'static str],
    pub overview: &'static [&'static str],
    pub category: &'static [&'static str],
}

/// Selectors for one product card on a listing page, relative to the card.
#[derive(Debug, Clone, Copy)]
pub struct ListProfile {
    /// Selects every card on the page.
    pub card: &'static str,
    pub name: &'static str,
    pub price: &'static str,
    /// Element whose `href` is the product URL.
    pub url: &'static str,
    pub image: &'static str,
    /// `None` when cards never carry a reference; the URL fallback is used.
    pub reference: Option<&'static str>,
    /// Pagination "next" control, selected from the whole page.
    pub next: &'static str,
}

/// How to recover a product reference from its URL slug.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceRule {
    /// Last hyphen-delimited token; a token of one or two characters is
    /// joined with the token before it (`...-82x7-1` → `82x7-1`).
    FinalSlugToken,
    /// Last token (scanning right to left) longer than five characters that
    /// mixes digits and letters.
    AlphanumericToken,
    /// No reference can be derived from URLs on this site.
    None,
}

#[derive(Debug, Clone, Copy)]
pub struct SiteConfig {
    /// Substring matched against the URL host.
    pub domain: &'static str,
    pub detail: DetailProfile,
    pub listing: ListProfile,
    pub reference_rule: ReferenceRule,
    /// Prices and pagination are rendered by script; `auto` mode goes
    /// straight to browser automation when a browser is configured.
    pub requires_script: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Merchant {
    Tunisianet,
    Mytek,
    Spacenet,
}

impl Merchant {
    pub const ALL: [Merchant; 3] = [Merchant::Tunisianet, Merchant::Mytek, Merchant::Spacenet];

    /// Maps a URL (or bare host) to a configured merchant.
    #[must_use]
    pub fn classify(url: &str) -> Option<Self> {
        let host = extract_domain(url).to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|merchant| host.contains(merchant.config().domain))
    }

    /// Like [`Merchant::classify`], but an unconfigured host is an error.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::UnsupportedDomain`] naming the host.
    pub fn require(url: &str) -> Result<Self, ScraperError> {
        Self::classify(url).ok_or_else(|| ScraperError::UnsupportedDomain {
            domain: extract_domain(url),
        })
    }

    #[must_use]
    pub fn config(self) -> &'static SiteConfig {
        match self {
            Merchant::Tunisianet => &TUNISIANET,
            Merchant::Mytek => &MYTEK,
            Merchant::Spacenet => &SPACENET,
        }
    }
}

impl std::fmt::Display for Merchant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.config().domain)
    }
}

// PrestaShop 1.7 theme.
static TUNISIANET: SiteConfig = SiteConfig {
    domain: "tunisianet.com.tn",
    detail: DetailProfile {
        name: &["h1[itemprop='name']", "h1.h1", "h1"],
        price: &[
            "span[itemprop='price']",
            ".current-price span",
            ".product-price",
            ".price",
        ],
        reference: &[
            "span[itemprop='sku']",
            ".product-reference span",
            ".product-reference",
        ],
        overview: &[
            "div[id^='product-description-short']",
            "div[itemprop='description']",
            ".product-description",
        ],
        category: &[
            ".breadcrumb li:nth-last-child(2) span",
            ".breadcrumb li:nth-last-child(2) a",
        ],
    },
    listing: ListProfile {
        card: ".product-miniature",
        name: ".product-title a",
        price: ".price",
        url: ".product-title a",
        image: "img",
        reference: Some(".product-reference"),
        next: "a.next",
    },
    reference_rule: ReferenceRule::AlphanumericToken,
    requires_script: false,
};

// Magento 2 theme; listing prices are filled in client-side.
static MYTEK: SiteConfig = SiteConfig {
    domain: "mytek.tn",
    detail: DetailProfile {
        name: &["h1.page-title span", "h1.page-title", "h1"],
        price: &[
            ".product-info-price .price",
            "span[data-price-type='finalPrice'] .price",
            ".price",
        ],
        reference: &[".product.attribute.sku .value", "div[itemprop='sku']"],
        overview: &[
            ".product.attribute.overview .value",
            "#description .value",
        ],
        category: &[".breadcrumbs li:nth-last-child(2) a"],
    },
    listing: ListProfile {
        card: ".product-item",
        name: ".product-item-link",
        price: ".price",
        url: ".product-item-link",
        image: "img.product-image-photo",
        reference: Some(".sku"),
        next: "a.action.next",
    },
    reference_rule: ReferenceRule::FinalSlugToken,
    requires_script: true,
};

// PrestaShop theme with custom card markup.
static SPACENET: SiteConfig = SiteConfig {
    domain: "spacenet.tn",
    detail: DetailProfile {
        name: &["h1.product_name", "h1[itemprop='name']", "h1"],
        price: &[
            "span[itemprop='price']",
            ".current-price span",
            ".price",
        ],
        reference: &[".product-reference span", "span[itemprop='sku']"],
        overview: &[
            "div[id^='product-description-short']",
            ".product-description",
        ],
        category: &[".breadcrumb li:nth-last-child(2) span"],
    },
    listing: ListProfile {
        card: ".product-miniature",
        name: ".product_name a",
        price: ".price",
        url: ".product_name a",
        image: "img",
        reference: Some(".product-reference span"),
        next: "a.next",
    },
    reference_rule: ReferenceRule::None,
    requires_script: false,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_matches_subdomains() {
        assert_eq!(
            Merchant::classify("https://www.tunisianet.com.tn/301-pc-portable-tunisie"),
            Some(Merchant::Tunisianet)
        );
        assert_eq!(
            Merchant::classify("https://www.mytek.tn/informatique.html"),
            Some(Merchant::Mytek)
        );
        assert_eq!(
            Merchant::classify("https://spacenet.tn/74-pc-portable"),
            Some(Merchant::Spacenet)
        );
    }

    #[test]
    fn classify_is_case_insensitive() {
        assert_eq!(
            Merchant::classify("https://WWW.MYTEK.TN/"),
            Some(Merchant::Mytek)
        );
    }

    #[test]
    fn classify_unknown_domain_is_none() {
        assert!(Merchant::classify("https://example.com/shop").is_none());
    }

    #[test]
    fn require_names_the_unsupported_host() {
        assert_eq!(
            Merchant::require("https://www.spacenet.tn/").expect("configured"),
            Merchant::Spacenet
        );
        let err = Merchant::require("https://shop.example.com/catalog").expect_err("unknown");
        assert!(
            matches!(
                err,
                ScraperError::UnsupportedDomain { ref domain } if domain == "shop.example.com"
            ),
            "{err:?}"
        );
    }

    #[test]
    fn classify_ignores_domain_in_path() {
        assert!(Merchant::classify("https://example.com/mytek.tn/page").is_none());
    }

    #[test]
    fn every_selector_compiles() {
        for merchant in Merchant::ALL {
            let cfg = merchant.config();
            let detail = cfg.detail;
            let lists = [
                detail.name,
                detail.price,
                detail.reference,
                detail.overview,
                detail.category,
            ];
            let listing = cfg.listing;
            let singles = [
                listing.card,
                listing.name,
                listing.price,
                listing.url,
                listing.image,
                listing.next,
            ];
            for selector in lists
                .iter()
                .flat_map(|l| l.iter().copied())
                .chain(singles)
                .chain(listing.reference)
            {
                assert!(
                    scraper::Selector::parse(selector).is_ok(),
                    "{merchant}: selector {selector:?} does not compile"
                );
            }
        }
    }

    #[test]
    fn only_mytek_requires_script() {
        let script: Vec<_> = Merchant::ALL
            .into_iter()
            .filter(|m| m.config().requires_script)
            .collect();
        assert_eq!(script, vec![Merchant::Mytek]);
    }
}
