//! Database operations for the `products` table.

use chrono::{DateTime, Utc};
use pricewatch_core::ExtractedItem;
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

// ---------------------------------------------------------------------------
// Row and parameter types
// ---------------------------------------------------------------------------

/// A row from the `products` table. `url` is the natural key.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProductRow {
    pub id: i64,
    pub website_id: Option<Uuid>,
    pub url: String,
    pub name: String,
    /// Price text as displayed by the merchant.
    pub price: Option<String>,
    pub price_amount: Decimal,
    pub reference: Option<String>,
    pub image: Option<String>,
    pub category: Option<String>,
    pub overview: Option<String>,
    pub domain: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One scraped product ready to be written.
#[derive(Debug, Clone, Copy)]
pub struct ProductUpsert<'a> {
    pub website_id: Option<Uuid>,
    pub url: &'a str,
    pub name: &'a str,
    pub price: Option<&'a str>,
    pub price_amount: Decimal,
    pub reference: Option<&'a str>,
    pub image: Option<&'a str>,
    pub category: Option<&'a str>,
    pub overview: Option<&'a str>,
    pub domain: &'a str,
}

impl<'a> ProductUpsert<'a> {
    /// Borrows a scraped item. Returns `None` when the item has no url or
    /// no name, since neither column may be null.
    #[must_use]
    pub fn from_item(
        item: &'a ExtractedItem,
        domain: &'a str,
        website_id: Option<Uuid>,
    ) -> Option<Self> {
        Some(Self {
            website_id,
            url: item.url.as_deref()?,
            name: item.name.as_deref()?,
            price: item.price.as_deref(),
            price_amount: item.price_amount,
            reference: item.reference.as_deref(),
            image: item.image.as_deref(),
            category: item.category.as_deref(),
            overview: item.overview.as_deref(),
            domain,
        })
    }
}

/// Filters for [`list_products`]. `page` is 1-based.
#[derive(Debug, Clone, Copy)]
pub struct ProductQuery<'a> {
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    /// Case-insensitive substring of the name.
    pub name: Option<&'a str>,
    pub category: Option<&'a str>,
    pub website_id: Option<Uuid>,
    pub domain: Option<&'a str>,
    pub page: i64,
    pub limit: i64,
}

impl Default for ProductQuery<'_> {
    fn default() -> Self {
        Self {
            min_price: None,
            max_price: None,
            name: None,
            category: None,
            website_id: None,
            domain: None,
            page: 1,
            limit: 20,
        }
    }
}

const PRODUCT_FILTER: &str = "WHERE ($1::NUMERIC IS NULL OR price_amount >= $1) \
       AND ($2::NUMERIC IS NULL OR price_amount <= $2) \
       AND ($3::TEXT IS NULL OR name ILIKE '%' || $3 || '%') \
       AND ($4::TEXT IS NULL OR category = $4) \
       AND ($5::UUID IS NULL OR website_id = $5) \
       AND ($6::TEXT IS NULL OR domain = $6)";

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

/// Inserts a product, or updates the row that already has this `url`.
///
/// An existing `website_id` is kept when the new value is `None`.
///
/// Returns the internal `id` of the upserted row.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the upsert fails.
pub async fn upsert_product(pool: &PgPool, product: &ProductUpsert<'_>) -> Result<i64, DbError> {
    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO products \
             (website_id, url, name, price, price_amount, reference, image, \
              category, overview, domain) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
         ON CONFLICT (url) DO UPDATE SET \
             website_id   = COALESCE(EXCLUDED.website_id, products.website_id), \
             name         = EXCLUDED.name, \
             price        = EXCLUDED.price, \
             price_amount = EXCLUDED.price_amount, \
             reference    = EXCLUDED.reference, \
             image        = EXCLUDED.image, \
             category     = EXCLUDED.category, \
             overview     = EXCLUDED.overview, \
             domain       = EXCLUDED.domain, \
             updated_at   = NOW() \
         RETURNING id",
    )
    .bind(product.website_id)
    .bind(product.url)
    .bind(product.name)
    .bind(product.price)
    .bind(product.price_amount)
    .bind(product.reference)
    .bind(product.image)
    .bind(product.category)
    .bind(product.overview)
    .bind(product.domain)
    .fetch_one(pool)
    .await?;

    Ok(id)
}

/// Returns one page of products, most recently updated first, plus the
/// total matching count.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if either query fails.
pub async fn list_products(
    pool: &PgPool,
    query: ProductQuery<'_>,
) -> Result<(Vec<ProductRow>, i64), DbError> {
    let limit = query.limit.max(1);
    let offset = (query.page.max(1) - 1) * limit;
    let name = query.name.map(str::trim).filter(|n| !n.is_empty());

    let rows = sqlx::query_as::<_, ProductRow>(&format!(
        "SELECT id, website_id, url, name, price, price_amount, reference, image, \
                category, overview, domain, created_at, updated_at \
         FROM products {PRODUCT_FILTER} \
         ORDER BY updated_at DESC, id DESC \
         LIMIT $7 OFFSET $8"
    ))
    .bind(query.min_price)
    .bind(query.max_price)
    .bind(name)
    .bind(query.category)
    .bind(query.website_id)
    .bind(query.domain)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    let total = sqlx::query_scalar::<_, i64>(&format!(
        "SELECT COUNT(*) FROM products {PRODUCT_FILTER}"
    ))
    .bind(query.min_price)
    .bind(query.max_price)
    .bind(name)
    .bind(query.category)
    .bind(query.website_id)
    .bind(query.domain)
    .fetch_one(pool)
    .await?;

    Ok((rows, total))
}
