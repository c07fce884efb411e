//! Live integration tests for pricewatch-db using `#[sqlx::test]`.
//!
//! Each test gets a fresh, fully-migrated Postgres database spun up by the
//! sqlx test harness. The `migrations` path is relative to the crate root
//! (`crates/pricewatch-db/`), so `"../../migrations"` resolves to the
//! workspace migration directory.

use pricewatch_db::{
    create_website, get_website, list_products, list_websites, update_website_scrape_summary,
    upsert_product, DbError, NewWebsite, ProductQuery, ProductUpsert, WebsiteListFilters,
};
use rust_decimal::Decimal;
use serde_json::json;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn website<'a>(name: &'a str, url: &'a str, category: Option<&'a str>) -> NewWebsite<'a> {
    NewWebsite {
        name,
        url,
        category,
        ..NewWebsite::default()
    }
}

fn product<'a>(url: &'a str, name: &'a str, amount: i64) -> ProductUpsert<'a> {
    ProductUpsert {
        website_id: None,
        url,
        name,
        price: None,
        price_amount: Decimal::from(amount),
        reference: None,
        image: None,
        category: Some("PC Portable"),
        overview: None,
        domain: "www.tunisianet.com.tn",
    }
}

// ---------------------------------------------------------------------------
// Websites
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn create_website_applies_column_defaults(pool: sqlx::PgPool) {
    let row = create_website(
        &pool,
        website("Tunisianet", "https://www.tunisianet.com.tn/301-pc-portable", None),
    )
    .await
    .expect("create_website failed");

    assert_eq!(row.category, "general");
    assert_eq!(row.scrape_frequency, "on-demand");
    assert_eq!(row.description, "");
    assert!(row.is_active);
    assert!(row.last_scraped.is_none());
    assert_eq!(row.scraped_data, json!({}));

    let fetched = get_website(&pool, row.id)
        .await
        .expect("get_website failed")
        .expect("website should exist");
    assert_eq!(fetched.url, row.url);
}

#[sqlx::test(migrations = "../../migrations")]
async fn duplicate_website_url_is_rejected(pool: sqlx::PgPool) {
    let url = "https://www.mytek.tn/informatique.html";
    create_website(&pool, website("Mytek", url, None))
        .await
        .expect("first insert");

    let err = create_website(&pool, website("Mytek again", url, None))
        .await
        .expect_err("second insert should fail");
    assert!(matches!(err, DbError::Duplicate(_)), "got {err:?}");
}

#[sqlx::test(migrations = "../../migrations")]
async fn unknown_website_id_returns_none(pool: sqlx::PgPool) {
    let row = get_website(&pool, Uuid::new_v4()).await.expect("query");
    assert!(row.is_none());
}

#[sqlx::test(migrations = "../../migrations")]
async fn list_websites_filters_and_paginates(pool: sqlx::PgPool) {
    for (name, url, category) in [
        ("A", "https://a.example.tn/", Some("electronics")),
        ("B", "https://b.example.tn/", Some("electronics")),
        ("C", "https://c.example.tn/", Some("books")),
    ] {
        create_website(&pool, website(name, url, category))
            .await
            .expect("insert");
    }

    let (rows, total) = list_websites(
        &pool,
        WebsiteListFilters {
            category: Some("electronics"),
            page: 1,
            limit: 1,
            ..WebsiteListFilters::default()
        },
    )
    .await
    .expect("list_websites failed");

    assert_eq!(total, 2);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].category, "electronics");
}

#[sqlx::test(migrations = "../../migrations")]
async fn scrape_summary_is_stored_and_stamped(pool: sqlx::PgPool) {
    let row = create_website(&pool, website("Spacenet", "https://spacenet.tn/", None))
        .await
        .expect("insert");
    let summary = json!({ "type": "list", "count": 45, "domain": "spacenet.tn" });

    update_website_scrape_summary(&pool, row.id, &summary)
        .await
        .expect("update failed");

    let updated = get_website(&pool, row.id)
        .await
        .expect("query")
        .expect("website should exist");
    assert_eq!(updated.scraped_data, summary);
    assert!(updated.last_scraped.is_some());
}

#[sqlx::test(migrations = "../../migrations")]
async fn scrape_summary_for_missing_website_is_not_found(pool: sqlx::PgPool) {
    let err = update_website_scrape_summary(&pool, Uuid::new_v4(), &json!({}))
        .await
        .expect_err("no such website");
    assert!(matches!(err, DbError::NotFound));
}

// ---------------------------------------------------------------------------
// Products
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn upsert_product_updates_in_place_by_url(pool: sqlx::PgPool) {
    let url = "https://www.tunisianet.com.tn/pc-portable/1-asus-x1504za.html";
    let first = upsert_product(&pool, &product(url, "Asus Vivobook", 1149))
        .await
        .expect("insert");
    let second = upsert_product(&pool, &product(url, "Asus Vivobook 15", 1099))
        .await
        .expect("update");
    assert_eq!(first, second);

    let (rows, total) = list_products(&pool, ProductQuery::default())
        .await
        .expect("list");
    assert_eq!(total, 1);
    assert_eq!(rows[0].name, "Asus Vivobook 15");
    assert_eq!(rows[0].price_amount, Decimal::from(1099));
}

#[sqlx::test(migrations = "../../migrations")]
async fn upsert_stores_amounts_without_rounding(pool: sqlx::PgPool) {
    for (i, raw) in ["12345678.901234", "12345678901.234"].into_iter().enumerate() {
        let url = format!("https://www.tunisianet.com.tn/pc-portable/{i}-wide.html");
        let mut wide = product(&url, "Wide price", 0);
        wide.price_amount = raw.parse::<Decimal>().expect("decimal");
        upsert_product(&pool, &wide).await.expect("insert");
    }

    let (rows, total) = list_products(
        &pool,
        ProductQuery {
            name: Some("wide"),
            ..ProductQuery::default()
        },
    )
    .await
    .expect("list");
    assert_eq!(total, 2);
    let mut amounts: Vec<String> = rows.iter().map(|r| r.price_amount.to_string()).collect();
    amounts.sort();
    assert_eq!(amounts, vec!["12345678.901234", "12345678901.234"]);
}

#[sqlx::test(migrations = "../../migrations")]
async fn upsert_keeps_existing_website_link(pool: sqlx::PgPool) {
    let site = create_website(&pool, website("Tunisianet", "https://www.tunisianet.com.tn/", None))
        .await
        .expect("insert website");
    let url = "https://www.tunisianet.com.tn/pc-portable/2-hp-15.html";

    let mut linked = product(url, "HP 15", 999);
    linked.website_id = Some(site.id);
    upsert_product(&pool, &linked).await.expect("insert");
    upsert_product(&pool, &product(url, "HP 15", 949))
        .await
        .expect("update without website");

    let (rows, _) = list_products(
        &pool,
        ProductQuery {
            website_id: Some(site.id),
            ..ProductQuery::default()
        },
    )
    .await
    .expect("list");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].price_amount, Decimal::from(949));
}

#[sqlx::test(migrations = "../../migrations")]
async fn list_products_applies_price_and_name_filters(pool: sqlx::PgPool) {
    for (url, name, amount) in [
        ("https://www.tunisianet.com.tn/a.html", "Asus Vivobook", 1149),
        ("https://www.tunisianet.com.tn/b.html", "ASUS TUF Gaming", 2499),
        ("https://www.tunisianet.com.tn/c.html", "Lenovo IdeaPad", 1099),
    ] {
        upsert_product(&pool, &product(url, name, amount))
            .await
            .expect("insert");
    }

    let (rows, total) = list_products(
        &pool,
        ProductQuery {
            min_price: Some(Decimal::from(1000)),
            max_price: Some(Decimal::from(2000)),
            name: Some("asus"),
            ..ProductQuery::default()
        },
    )
    .await
    .expect("list");

    assert_eq!(total, 1);
    assert_eq!(rows[0].name, "Asus Vivobook");
}
