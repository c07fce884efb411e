//! Stored product query command handlers for the CLI.

use clap::{Args, Subcommand};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::websites::total_pages;

/// Sub-commands available under `products`.
#[derive(Debug, Subcommand)]
pub enum ProductCommands {
    /// List stored products, most recently updated first
    List(ProductListArgs),
}

#[derive(Debug, Args)]
pub struct ProductListArgs {
    #[arg(long)]
    pub min_price: Option<Decimal>,
    #[arg(long)]
    pub max_price: Option<Decimal>,
    /// Case-insensitive substring of the product name
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub category: Option<String>,
    /// Website id the products were scraped for
    #[arg(long)]
    pub website: Option<Uuid>,
    /// Exact merchant host, e.g. www.mytek.tn
    #[arg(long)]
    pub domain: Option<String>,
    #[arg(long, default_value = "1")]
    pub page: i64,
    #[arg(long, default_value = "20")]
    pub limit: i64,
}

/// Prints one page of stored products.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub(crate) async fn run_products_list(
    pool: &sqlx::PgPool,
    args: &ProductListArgs,
) -> anyhow::Result<()> {
    let query = pricewatch_db::ProductQuery {
        min_price: args.min_price,
        max_price: args.max_price,
        name: args.name.as_deref(),
        category: args.category.as_deref(),
        website_id: args.website,
        domain: args.domain.as_deref(),
        page: args.page,
        limit: args.limit,
    };
    let (products, total) = pricewatch_db::list_products(pool, query).await?;

    if products.is_empty() {
        println!("no products found");
        return Ok(());
    }

    println!("{:>12}  {:<16}{:<22}NAME", "PRICE", "REFERENCE", "DOMAIN");
    for product in &products {
        let name = if product.name.chars().count() > 60 {
            format!("{}...", product.name.chars().take(60).collect::<String>())
        } else {
            product.name.clone()
        };
        let price = product.price_amount.round_dp(3).to_string();
        println!(
            "{:>12}  {:<16}{:<22}{}",
            price,
            product.reference.as_deref().unwrap_or("-"),
            product.domain,
            name
        );
    }
    println!(
        "page {} of {} ({total} products)",
        args.page.max(1),
        total_pages(total, args.limit)
    );

    Ok(())
}
