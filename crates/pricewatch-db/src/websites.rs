//! Database operations for the `websites` table.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

// ---------------------------------------------------------------------------
// Row and parameter types
// ---------------------------------------------------------------------------

/// A row from the `websites` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct WebsiteRow {
    pub id: Uuid,
    pub name: String,
    pub url: String,
    pub description: String,
    pub category: String,
    /// One of `daily`, `weekly`, `monthly`, `on-demand`.
    pub scrape_frequency: String,
    pub is_active: bool,
    pub last_scraped: Option<DateTime<Utc>>,
    /// Summary of the most recent scrape; `{}` until the first one.
    pub scraped_data: serde_json::Value,
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for [`create_website`]. `None` fields take the column defaults.
#[derive(Debug, Clone, Copy, Default)]
pub struct NewWebsite<'a> {
    pub name: &'a str,
    pub url: &'a str,
    pub description: Option<&'a str>,
    pub category: Option<&'a str>,
    pub scrape_frequency: Option<&'a str>,
}

/// Filters for [`list_websites`]. `page` is 1-based.
#[derive(Debug, Clone, Copy)]
pub struct WebsiteListFilters<'a> {
    pub category: Option<&'a str>,
    pub is_active: Option<bool>,
    pub page: i64,
    pub limit: i64,
}

impl Default for WebsiteListFilters<'_> {
    fn default() -> Self {
        Self {
            category: None,
            is_active: None,
            page: 1,
            limit: 10,
        }
    }
}

const WEBSITE_COLUMNS: &str = "id, name, url, description, category, scrape_frequency, \
     is_active, last_scraped, scraped_data, metadata, created_at, updated_at";

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Returns a website by id, or `None` if not found.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_website(pool: &PgPool, id: Uuid) -> Result<Option<WebsiteRow>, DbError> {
    let row = sqlx::query_as::<_, WebsiteRow>(&format!(
        "SELECT {WEBSITE_COLUMNS} FROM websites WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Creates a website and returns the inserted row.
///
/// # Errors
///
/// Returns [`DbError::Duplicate`] if the URL is already registered, or
/// [`DbError::Sqlx`] for any other failure (including the URL and
/// frequency check constraints).
pub async fn create_website(pool: &PgPool, website: NewWebsite<'_>) -> Result<WebsiteRow, DbError> {
    sqlx::query_as::<_, WebsiteRow>(&format!(
        "INSERT INTO websites (name, url, description, category, scrape_frequency) \
         VALUES ($1, $2, COALESCE($3, ''), COALESCE($4, 'general'), COALESCE($5, 'on-demand')) \
         RETURNING {WEBSITE_COLUMNS}"
    ))
    .bind(website.name.trim())
    .bind(website.url.trim())
    .bind(website.description)
    .bind(website.category.map(str::trim))
    .bind(website.scrape_frequency)
    .fetch_one(pool)
    .await
    .map_err(|e| DbError::from_insert(e, format!("website {}", website.url.trim())))
}

/// Returns one page of websites, newest first, plus the total matching count.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if either query fails.
pub async fn list_websites(
    pool: &PgPool,
    filters: WebsiteListFilters<'_>,
) -> Result<(Vec<WebsiteRow>, i64), DbError> {
    let limit = filters.limit.max(1);
    let offset = (filters.page.max(1) - 1) * limit;

    let rows = sqlx::query_as::<_, WebsiteRow>(&format!(
        "SELECT {WEBSITE_COLUMNS} FROM websites \
         WHERE ($1::TEXT IS NULL OR category = $1) \
           AND ($2::BOOLEAN IS NULL OR is_active = $2) \
         ORDER BY created_at DESC, id \
         LIMIT $3 OFFSET $4"
    ))
    .bind(filters.category)
    .bind(filters.is_active)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    let total = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM websites \
         WHERE ($1::TEXT IS NULL OR category = $1) \
           AND ($2::BOOLEAN IS NULL OR is_active = $2)",
    )
    .bind(filters.category)
    .bind(filters.is_active)
    .fetch_one(pool)
    .await?;

    Ok((rows, total))
}

/// Stores the summary of a finished scrape and stamps `last_scraped`.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no website has this id, or
/// [`DbError::Sqlx`] if the update fails.
pub async fn update_website_scrape_summary(
    pool: &PgPool,
    id: Uuid,
    summary: &serde_json::Value,
) -> Result<(), DbError> {
    let rows_affected = sqlx::query(
        "UPDATE websites \
         SET scraped_data = $1, last_scraped = NOW(), updated_at = NOW() \
         WHERE id = $2",
    )
    .bind(summary)
    .bind(id)
    .execute(pool)
    .await?
    .rows_affected();

    if rows_affected == 0 {
        return Err(DbError::NotFound);
    }
    Ok(())
}
