use clap::{Parser, Subcommand};
use pricewatch_core::Environment;
use tracing_subscriber::EnvFilter;

mod products;
mod scrape;
mod websites;

use products::ProductCommands;
use scrape::ScrapeArgs;
use websites::WebsiteCommands;

#[derive(Debug, Parser)]
#[command(name = "pricewatch")]
#[command(about = "Scrape product listings and prices from merchant websites")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Scrape a page or a registered website and print one JSON envelope
    Scrape(ScrapeArgs),
    /// Manage registered websites
    Websites {
        #[command(subcommand)]
        command: WebsiteCommands,
    },
    /// Query stored products
    Products {
        #[command(subcommand)]
        command: ProductCommands,
    },
    /// Database maintenance
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
}

#[derive(Debug, Subcommand)]
enum DbCommands {
    /// Apply pending migrations
    Migrate,
    /// Check connectivity
    Ping,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match pricewatch_core::load_app_config() {
        Ok(config) => config,
        Err(e) if matches!(cli.command, Commands::Scrape(_)) => {
            scrape::emit(&scrape::Envelope::failure(&e));
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    // Logs go to stderr; stdout is reserved for command output.
    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&config.log_level))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_ansi(log_ansi(&config.env))
        .init();
    tracing::debug!(env = %config.env, "configuration loaded");

    match cli.command {
        Commands::Scrape(args) => {
            scrape::run_scrape(&config, &args).await;
        }
        Commands::Websites { command } => {
            let pool = pricewatch_db::connect_pool_from_config(&config).await?;
            match command {
                WebsiteCommands::Add {
                    name,
                    url,
                    category,
                    description,
                    frequency,
                } => {
                    websites::run_websites_add(
                        &pool,
                        &name,
                        &url,
                        category.as_deref(),
                        description.as_deref(),
                        frequency.as_deref(),
                    )
                    .await?;
                }
                WebsiteCommands::List {
                    category,
                    active,
                    page,
                    limit,
                } => {
                    websites::run_websites_list(&pool, category.as_deref(), active, page, limit)
                        .await?;
                }
            }
        }
        Commands::Products { command } => {
            let pool = pricewatch_db::connect_pool_from_config(&config).await?;
            match command {
                ProductCommands::List(args) => products::run_products_list(&pool, &args).await?,
            }
        }
        Commands::Db { command } => {
            let pool = pricewatch_db::connect_pool_from_config(&config).await?;
            match command {
                DbCommands::Migrate => {
                    let applied = pricewatch_db::run_migrations(&pool).await?;
                    println!("applied {applied} migrations");
                }
                DbCommands::Ping => {
                    pricewatch_db::ping(&pool).await?;
                    println!("database reachable");
                }
            }
        }
    }

    Ok(())
}

/// Colored log output is for development shells; other environments feed
/// log collectors.
fn log_ansi(env: &Environment) -> bool {
    matches!(env, Environment::Development)
}
