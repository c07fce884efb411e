//! URL parsing helpers shared by the resolver, walker and orchestrator.

use reqwest::Url;

use crate::error::ScraperError;

/// Parses an absolute `http`/`https` URL.
///
/// # Errors
///
/// Returns [`ScraperError::InvalidUrl`] when `raw` is not an absolute web URL.
pub fn parse_target(raw: &str) -> Result<Url, ScraperError> {
    let url = Url::parse(raw.trim()).map_err(|e| ScraperError::InvalidUrl {
        url: raw.to_owned(),
        reason: e.to_string(),
    })?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(ScraperError::InvalidUrl {
            url: raw.to_owned(),
            reason: "expected an http(s) URL with a host".to_owned(),
        });
    }
    Ok(url)
}

/// Extracts the hostname from a URL, e.g. `"www.tunisianet.com.tn"`.
///
/// Falls back to the full string if parsing fails.
#[must_use]
pub fn extract_domain(url: &str) -> String {
    Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_owned))
        .unwrap_or_else(|| url.to_owned())
}

/// Resolves `href` against the page it was found on.
///
/// Returns `None` for fragments, `javascript:` pseudo-links and anything
/// that does not resolve to an `http(s)` URL.
#[must_use]
pub fn join_href(base: &str, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty()
        || href.starts_with('#')
        || href.to_ascii_lowercase().starts_with("javascript:")
    {
        return None;
    }
    let base = Url::parse(base).ok()?;
    let joined = base.join(href).ok()?;
    matches!(joined.scheme(), "http" | "https").then(|| joined.to_string())
}
