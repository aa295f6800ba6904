//! CLI administration tool for shortlink-bot.
//!
//! Inspects stored links and the database without going through the chat.
//!
//! # Usage
//!
//! ```bash
//! # Newest links of one Telegram user (prompts for the id when omitted)
//! cargo run --bin admin -- links --owner 123456789 --limit 20
//!
//! # One link by short code
//! cargo run --bin admin -- link promo
//!
//! # Totals
//! cargo run --bin admin -- stats
//!
//! # Check database connection
//! cargo run --bin admin -- db check
//! ```
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` (required): PostgreSQL connection string

use shortlink_bot::domain::entities::ShortLink;
use shortlink_bot::domain::repositories::LinkStore;
use shortlink_bot::infrastructure::persistence::PgLinkStore;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::Input;
use sqlx::PgPool;
use std::sync::Arc;

/// CLI tool for inspecting shortlink-bot data.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List a user's links, newest first
    Links {
        /// Owner's chat user id
        #[arg(short, long)]
        owner: Option<String>,

        /// Maximum number of links to show
        #[arg(short, long, default_value_t = 10)]
        limit: i64,
    },

    /// Show one link by short code
    Link {
        code: String,
    },

    /// Show totals
    Stats,

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

#[derive(Subcommand)]
enum DbAction {
    /// Check database connection
    Check,

    /// Show database info
    Info,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;

    let pool = PgPool::connect(&database_url)
        .await
        .context("Failed to connect to database")?;
    let store = PgLinkStore::new(Arc::new(pool.clone()));

    match cli.command {
        Commands::Links { owner, limit } => list_links(&store, owner, limit).await?,
        Commands::Link { code } => show_link(&store, &code).await?,
        Commands::Stats => handle_stats(&pool).await?,
        Commands::Db { action } => handle_db_action(action, &pool).await?,
    }

    Ok(())
}

/// Prints a user's newest links as a table.
///
/// ```text
/// 🔗 Links of 123456789
///
///   Code                 Clicks   Created            URL
///   ─────────────────────────────────────────────────────────────────
///   promo                12       2025-01-15 10:30   https://example.com/...
/// ```
async fn list_links(store: &PgLinkStore, owner: Option<String>, limit: i64) -> Result<()> {
    let owner = match owner {
        Some(owner) => owner,
        None => Input::new().with_prompt("Owner user id").interact_text()?,
    };

    println!("{} {}", "🔗 Links of".bright_blue().bold(), owner.cyan());
    println!();

    let links = store
        .list_by_owner(&owner, limit.clamp(1, 1000))
        .await
        .map_err(|e| anyhow::anyhow!("Failed to list links: {}", e))?;

    if links.is_empty() {
        println!("{}", "  No links found".yellow());
        return Ok(());
    }

    println!(
        "  {:<20} {:<8} {:<18} {}",
        "Code".bright_white().bold(),
        "Clicks".bright_white().bold(),
        "Created".bright_white().bold(),
        "URL".bright_white().bold()
    );
    println!("  {}", "─".repeat(75).bright_black());

    for link in &links {
        println!(
            "  {:<20} {:<8} {:<18} {}",
            link.short_code.cyan(),
            link.click_count.to_string().bright_green(),
            link.created_at
                .format("%Y-%m-%d %H:%M")
                .to_string()
                .bright_black(),
            preview(&link.original_url, 60)
        );
    }

    println!();
    println!("  Shown: {}", links.len().to_string().bright_white().bold());
    println!();

    Ok(())
}

async fn show_link(store: &PgLinkStore, code: &str) -> Result<()> {
    let link: ShortLink = store
        .find_by_code(code)
        .await
        .map_err(|e| anyhow::anyhow!("Database error: {}", e))?
        .context("Link not found")?;

    println!("{}", "🔎 Short Link".bright_blue().bold());
    println!();
    println!("  Code:    {}", link.short_code.cyan());
    println!("  URL:     {}", link.original_url.bright_white());
    println!("  Owner:   {}", link.created_by);
    println!(
        "  Created: {}",
        link.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    println!(
        "  Clicks:  {}",
        link.click_count.to_string().bright_green().bold()
    );
    println!();

    Ok(())
}

/// Total links, clicks and distinct owners.
async fn handle_stats(pool: &PgPool) -> Result<()> {
    println!("{}", "📊 Statistics".bright_blue().bold());
    println!();

    let (links, clicks, owners): (i64, i64, i64) = sqlx::query_as(
        "SELECT COUNT(*), COALESCE(SUM(click_count), 0)::BIGINT, COUNT(DISTINCT created_by) FROM short_links",
    )
    .fetch_one(pool)
    .await?;

    println!("  Links:  {}", links.to_string().bright_green().bold());
    println!("  Clicks: {}", clicks.to_string().bright_green().bold());
    println!("  Owners: {}", owners.to_string().bright_green().bold());
    println!();

    Ok(())
}

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

fn preview(url: &str, max_chars: usize) -> String {
    match url.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &url[..cut]),
        None => url.to_string(),
    }
}
