use rust_decimal::Decimal;

use super::*;
use crate::sites::Merchant;

const URL: &str = "https://www.tunisianet.com.tn/pc-portable/1234-hp-15s-fq5034nk.html";

fn resolve(html: &str) -> ProductFields {
    let document = Html::parse_document(html);
    resolve_fields(&document, URL, &Merchant::Tunisianet.config().detail)
}

#[test]
fn metadata_price_beats_anchor_candidates() {
    let fields = resolve(
        r#"<html><head>
            <meta property="product:price:amount" content="1299.000">
            <meta property="product:price:currency" content="TND">
        </head><body>
            <div class="product">
                <h1 class="h1">HP 15s</h1>
                <span itemprop="price">999,000 DT</span>
            </div>
        </body></html>"#,
    );
    assert_eq!(fields.price, "1299.000 TND");
    assert_eq!(fields.price_amount, Decimal::from(1299));
}

#[test]
fn metadata_priority_prefers_product_tag_over_itemprop() {
    let fields = resolve(
        r#"<html><head>
            <meta itemprop="price" content="500.000">
            <meta property="product:price:amount" content="450.000">
        </head><body><h1>X</h1></body></html>"#,
    );
    assert_eq!(fields.price, "450.000");
}

#[test]
fn metadata_without_digit_is_ignored() {
    let fields = resolve(
        r#"<html><head><meta property="product:price:amount" content="N/A"></head>
        <body><div><h1>X</h1><span class="price">120,000 DT</span></div></body></html>"#,
    );
    assert_eq!(fields.price, "120,000 DT");
    assert_eq!(fields.price_amount, Decimal::from(120));
}

#[test]
fn price_found_two_levels_above_name() {
    let fields = resolve(
        r#"<html><body>
            <aside class="promo"><span class="price">9,900 DT</span></aside>
            <div class="product">
                <div class="pricing"><span class="price">1 099,000 DT</span></div>
                <div class="info"><h1 class="h1">HP 15s   Laptop</h1></div>
            </div>
        </body></html>"#,
    );
    assert_eq!(fields.name, "HP 15s Laptop");
    assert_eq!(fields.price, "1 099,000 DT");
    assert_eq!(fields.price_amount, Decimal::from(1099));
}

#[test]
fn reference_element_is_the_preferred_anchor() {
    let fields = resolve(
        r#"<html><body>
            <div class="a"><h1>Name block</h1><span class="price">100,000 DT</span></div>
            <div class="b">
                <span class="product-reference"><span>FQ5034NK</span></span>
                <span class="price">200,000 DT</span>
            </div>
        </body></html>"#,
    );
    assert_eq!(fields.reference, "FQ5034NK");
    assert_eq!(fields.price, "200,000 DT");
}

#[test]
fn long_promotional_price_text_is_skipped() {
    let fields = resolve(
        r#"<html><body><div class="product">
            <span class="price">Economisez jusqu'a 200 DT sur votre commande</span>
            <span class="price">349,000 DT</span>
            <h1>Souris</h1>
        </div></body></html>"#,
    );
    assert_eq!(fields.price, "349,000 DT");
}

#[test]
fn global_fallback_when_anchor_search_misses() {
    let fields = resolve(
        r#"<html><body>
            <section><div><div><div><div><div><div><div><h1>Deep</h1></div></div></div></div></div></div></div></section>
            <footer><div id="product-description-short-1234">Compact and light.</div></footer>
        </body></html>"#,
    );
    assert_eq!(fields.overview, "Compact and light.");
}

#[test]
fn unresolved_fields_hold_sentinel() {
    let fields = resolve("<html><body><p>nothing here</p></body></html>");
    assert_eq!(fields.name, NOT_FOUND);
    assert_eq!(fields.price, NOT_FOUND);
    assert_eq!(fields.reference, NOT_FOUND);
    assert_eq!(fields.overview, NOT_FOUND);
    assert_eq!(fields.category, NOT_FOUND);
    assert_eq!(fields.price_amount, Decimal::ZERO);
    assert_eq!(fields.url, URL);
}

#[test]
fn category_from_breadcrumb() {
    let fields = resolve(
        r#"<html><body>
            <nav class="breadcrumb"><ol>
                <li><a href="/"><span>Accueil</span></a></li>
                <li><a href="/301"><span>PC Portable</span></a></li>
                <li><span>HP 15s</span></li>
            </ol></nav>
            <h1>HP 15s</h1>
        </body></html>"#,
    );
    assert_eq!(fields.category, "PC Portable");
}

#[test]
fn summary_counts_links_and_images() {
    let document = Html::parse_document(
        r#"<html><head><title> Shop </title>
            <meta name="description" content=" Best prices ">
        </head><body>
            <h1>One</h1><h1> Two </h1>
            <a href="/a">a</a><a href="/b">b</a><img src="x.png">
        </body></html>"#,
    );
    let summary = page_summary(&document);
    assert_eq!(summary.title, "Shop");
    assert_eq!(summary.meta_description, "Best prices");
    assert_eq!(summary.h1, vec!["One", "Two"]);
    assert_eq!(summary.links_count, 2);
    assert_eq!(summary.images_count, 1);
}
