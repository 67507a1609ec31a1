//! CLI administration tool for url-shortener.
//!
//! Creates, inspects and deactivates short URLs and performs database checks
//! without requiring HTTP API access.
//!
//! # Usage
//!
//! ```bash
//! # Create a short URL
//! cargo run --bin admin -- create https://example.com/a/b --title "Example"
//!
//! # Show a short URL with its current click count
//! cargo run --bin admin -- show aZ3kT9q
//!
//! # Deactivate a short URL
//! cargo run --bin admin -- deactivate aZ3kT9q
//!
//! # View statistics
//! cargo run --bin admin -- stats
//!
//! # Check database connection
//! cargo run --bin admin -- db check
//! ```
//!
//! # Environment Variables
//!
//! Same as the server (see `url_shortener::config`). `DATABASE_URL` is
//! required. When `REDIS_URL` is set, deactivation also evicts the shared
//! cache entry.

use url_shortener::application::services::ShortenerService;
use url_shortener::config::{self, Config, StorageBackend};
use url_shortener::domain::click_event::ClickEvent;
use url_shortener::domain::click_worker::ClickRecorder;
use url_shortener::domain::entities::{CreateShortUrl, ShortUrl};
use url_shortener::infrastructure::cache::{NullCache, RedisResolutionCache, ResolutionCache};
use url_shortener::infrastructure::persistence::PgShortUrlRepository;
use url_shortener::server::connect_pool;

use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::Confirm;
use sqlx::PgPool;
use std::sync::Arc;
use tokio::sync::mpsc::Receiver;

/// CLI tool for managing url-shortener.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Top-level commands.
#[derive(Subcommand)]
enum Commands {
    /// Create a short URL
    Create {
        /// Target URL (http or https)
        url: String,

        #[arg(short, long)]
        title: Option<String>,

        /// Custom alias (5-10 letters and digits)
        #[arg(short, long)]
        code: Option<String>,

        /// Expire the short URL after this many days
        #[arg(short, long)]
        expires_in_days: Option<i64>,
    },

    /// Show a short URL and its click count
    Show {
        code: String,
    },

    /// Deactivate a short URL
    Deactivate {
        code: String,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Show statistics
    Stats,

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

/// Database operation subcommands.
#[derive(Subcommand)]
enum DbAction {
    /// Check database connection
    Check,

    /// Show database info
    Info,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = config::load_from_env()?;
    if config.storage_backend != StorageBackend::Postgres {
        anyhow::bail!("The admin tool requires STORAGE_BACKEND=postgres");
    }

    let pool = connect_pool(&config).await?;

    match cli.command {
        Commands::Create {
            url,
            title,
            code,
            expires_in_days,
        } => {
            let request = CreateShortUrl {
                long_url: url,
                title,
                description: None,
                expires_at: expires_in_days.map(|days| Utc::now() + Duration::days(days)),
                custom_code: code,
            };
            create_short_url(&config, &pool, request).await?
        }
        Commands::Show { code } => show_short_url(&config, &pool, &code).await?,
        Commands::Deactivate { code, yes } => {
            deactivate_short_url(&config, &pool, &code, yes).await?
        }
        Commands::Stats => handle_stats(&pool).await?,
        Commands::Db { action } => handle_db_action(action, &pool).await?,
    }

    Ok(())
}

/// Builds a shortener over the database.
///
/// The admin tool never resolves codes, so the click receiver is returned
/// only to keep the channel open for the lifetime of the service.
async fn build_service(
    config: &Config,
    pool: &PgPool,
) -> Result<(ShortenerService, Receiver<ClickEvent>)> {
    let repository = Arc::new(PgShortUrlRepository::new(Arc::new(pool.clone())));

    let cache: Arc<dyn ResolutionCache> = match (&config.redis_url, config.cache_enabled) {
        (Some(redis_url), true) => Arc::new(
            RedisResolutionCache::connect(redis_url, config.cache_ttl())
                .await
                .map_err(|e| anyhow::anyhow!("Failed to connect to Redis: {}", e))?,
        ),
        _ => Arc::new(NullCache::new()),
    };

    let (clicks, click_rx) = ClickRecorder::channel(1);
    let service =
        ShortenerService::new(repository, cache, clicks, config.shortener_settings())?;

    Ok((service, click_rx))
}

async fn create_short_url(config: &Config, pool: &PgPool, request: CreateShortUrl) -> Result<()> {
    println!("{}", "✨ Create Short URL".bright_blue().bold());
    println!();

    let (service, _click_rx) = build_service(config, pool).await?;

    let record = service
        .create_short_url(request)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create short URL: {}", e))?;

    print_record(config, &record);
    println!("{}", "✅ Short URL created successfully!".green().bold());
    println!();

    Ok(())
}

async fn show_short_url(config: &Config, pool: &PgPool, code: &str) -> Result<()> {
    let (service, _click_rx) = build_service(config, pool).await?;

    let record = service
        .get_short_url(code)
        .await
        .map_err(|e| anyhow::anyhow!("{}", e))?;

    print_record(config, &record);
    Ok(())
}

/// Deactivates a short URL with confirmation prompt.
///
/// Requires confirmation (default: No) unless `--yes` is given.
async fn deactivate_short_url(
    config: &Config,
    pool: &PgPool,
    code: &str,
    skip_confirm: bool,
) -> Result<()> {
    println!("{}", "🔒 Deactivate Short URL".bright_blue().bold());
    println!();

    let (service, _click_rx) = build_service(config, pool).await?;

    let record = service
        .get_short_url(code)
        .await
        .map_err(|e| anyhow::anyhow!("{}", e))?;

    if !record.is_active {
        println!("{}", "⚠️  This short URL is already inactive".yellow());
        return Ok(());
    }

    print_record(config, &record);

    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt("Deactivate this short URL?")
            .default(false)
            .interact()?;

        if !confirmed {
            println!("{}", "❌ Cancelled".red());
            return Ok(());
        }
    }

    service
        .deactivate_short_url(code)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to deactivate short URL: {}", e))?;

    println!();
    println!("{}", "✅ Short URL deactivated".green().bold());
    if config.redis_url.is_none() {
        println!(
            "{}",
            "   Servers using the in-process cache may redirect until the entry expires."
                .bright_black()
        );
    }
    println!();

    Ok(())
}

fn print_record(config: &Config, record: &ShortUrl) {
    let status = if !record.is_active {
        "INACTIVE".red()
    } else if record.is_expired() {
        "EXPIRED".yellow()
    } else {
        "ACTIVE".green()
    };

    println!(
        "  Short URL:  {}",
        ShortenerService::short_url(&config.base_url, &record.short_code)
            .bright_yellow()
            .bold()
    );
    println!("  Target:     {}", record.long_url.cyan());
    if let Some(title) = &record.title {
        println!("  Title:      {}", title);
    }
    println!("  Status:     {}", status);
    println!(
        "  Clicks:     {}",
        record.click_count.to_string().bright_green().bold()
    );
    println!(
        "  Created:    {}",
        record
            .created_at
            .format("%Y-%m-%d %H:%M")
            .to_string()
            .bright_black()
    );
    if let Some(expires_at) = record.expires_at {
        println!(
            "  Expires:    {}",
            expires_at.format("%Y-%m-%d %H:%M").to_string().bright_black()
        );
    }
    if let Some(last) = record.last_accessed_at {
        println!(
            "  Last click: {}",
            last.format("%Y-%m-%d %H:%M").to_string().bright_black()
        );
    }
    println!();
}

/// Displays system statistics.
///
/// Shows:
/// - Total number of short URLs
/// - Number of active short URLs
/// - Total number of recorded clicks
async fn handle_stats(pool: &PgPool) -> Result<()> {
    println!("{}", "📊 Statistics".bright_blue().bold());
    println!();

    let (total, active, clicks): (i64, i64, i64) = sqlx::query_as(
        r#"
        SELECT COUNT(*),
               COUNT(*) FILTER (WHERE is_active),
               COALESCE(SUM(click_count), 0)::BIGINT
        FROM short_urls
        "#,
    )
    .fetch_one(pool)
    .await
    .context("Failed to query statistics")?;

    println!("  Short URLs:    {}", total.to_string().bright_green().bold());
    println!("  Active:        {}", active.to_string().bright_green().bold());
    println!("  Clicks:        {}", clicks.to_string().bright_green().bold());
    println!();

    Ok(())
}

/// Handles database diagnostic commands.
async fn handle_db_action(action: DbAction, pool: &PgPool) -> Result<()> {
    match action {
        DbAction::Check => {
            println!("{}", "🔍 Checking database connection...".bright_blue());

            sqlx::query("SELECT 1").fetch_one(pool).await?;

            println!("{}", "✅ Database connection OK".green().bold());
        }
        DbAction::Info => {
            println!("{}", "ℹ️  Database Information".bright_blue().bold());
            println!();

            let version: String = sqlx::query_scalar("SELECT version()")
                .fetch_one(pool)
                .await?;

            println!("  PostgreSQL: {}", version.bright_white());
            println!();
        }
    }

    Ok(())
}
