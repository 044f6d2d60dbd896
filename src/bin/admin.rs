//! CLI administration tool for the book club backend.
//!
//! Provides commands for managing accounts and tokens, viewing statistics,
//! and performing database operations without going through the HTTP API.
//!
//! # Usage
//!
//! ```bash
//! # Activate an account whose activation email never arrived
//! cargo run --bin admin -- user activate reader@example.com
//!
//! # Log a user out everywhere
//! cargo run --bin admin -- token revoke reader@example.com --scope authentication
//!
//! # Delete expired tokens
//! cargo run --bin admin -- token purge-expired
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
//! Same database settings as the server (`DATABASE_URL` or `DB_*`).

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use dialoguer::Confirm;
use sqlx::PgPool;

use bookclub::config;
use bookclub::domain::entities::{TokenScope, User};
use bookclub::domain::repositories::{
    BookRepository, ReadingListRepository, ReviewRepository, TokenRepository, UserRepository,
};
use bookclub::error::AppError;
use bookclub::infrastructure::persistence::{
    PgBookRepository, PgReadingListRepository, PgReviewRepository, PgTokenRepository,
    PgUserRepository,
};
use bookclub::server;

/// CLI tool for managing the book club backend.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Top-level command groups.
#[derive(Subcommand)]
enum Commands {
    /// Manage user accounts
    User {
        #[command(subcommand)]
        action: UserAction,
    },

    /// Manage bearer tokens
    Token {
        #[command(subcommand)]
        action: TokenAction,
    },

    /// Show statistics
    Stats,

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

#[derive(Subcommand)]
enum UserAction {
    /// Activate an account without an activation token
    Activate {
        email: String,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum TokenAction {
    /// Delete every token of a user in one scope
    Revoke {
        email: String,

        #[arg(short, long, value_enum, default_value_t = ScopeArg::Authentication)]
        scope: ScopeArg,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Delete tokens whose expiry has passed
    PurgeExpired,
}

#[derive(Clone, Copy, ValueEnum)]
enum ScopeArg {
    Activation,
    Authentication,
}

impl From<ScopeArg> for TokenScope {
    fn from(scope: ScopeArg) -> Self {
        match scope {
            ScopeArg::Activation => TokenScope::Activation,
            ScopeArg::Authentication => TokenScope::Authentication,
        }
    }
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
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = config::load_from_env().context("Invalid configuration")?;
    let pool = server::connect(&config).await?;

    match cli.command {
        Commands::User { action } => handle_user_action(action, &pool).await?,
        Commands::Token { action } => handle_token_action(action, &pool).await?,
        Commands::Stats => handle_stats(&pool).await?,
        Commands::Db { action } => handle_db_action(action, &pool).await?,
    }

    Ok(())
}

async fn handle_user_action(action: UserAction, pool: &PgPool) -> Result<()> {
    let users = PgUserRepository::new(Arc::new(pool.clone()));

    match action {
        UserAction::Activate { email, yes } => {
            println!("{}", "👤 Activate User".bright_blue().bold());
            println!();

            let mut user = find_user(&users, &email).await?;

            if user.activated {
                println!("{}", "⚠️  This account is already activated".yellow());
                return Ok(());
            }

            println!("  User:  {}", user.username.cyan());
            println!("  Email: {}", user.email.cyan());
            println!("  ID:    {}", user.id.to_string().bright_black());
            println!();

            if !yes && !confirm("Activate this account?", true)? {
                println!("{}", "❌ Cancelled".red());
                return Ok(());
            }

            user.activated = true;
            users.update(user).await.context("Failed to activate user")?;

            println!("{}", "✅ User activated".green().bold());
        }
    }

    Ok(())
}

async fn handle_token_action(action: TokenAction, pool: &PgPool) -> Result<()> {
    let pool = Arc::new(pool.clone());
    let tokens = PgTokenRepository::new(pool.clone());

    match action {
        TokenAction::Revoke { email, scope, yes } => {
            println!("{}", "🔒 Revoke Tokens".bright_blue().bold());
            println!();

            let users = PgUserRepository::new(pool);
            let user = find_user(&users, &email).await?;
            let scope = TokenScope::from(scope);

            println!("  User:  {}", user.email.cyan());
            println!("  Scope: {}", scope.as_str().cyan());
            println!();

            if !yes && !confirm("Revoke every token in this scope?", false)? {
                println!("{}", "❌ Cancelled".red());
                return Ok(());
            }

            let removed = tokens
                .delete_all_for_user(scope, user.id)
                .await
                .context("Failed to revoke tokens")?;

            println!(
                "{} {}",
                "✅ Tokens revoked:".green().bold(),
                removed.to_string().bright_white().bold()
            );
        }
        TokenAction::PurgeExpired => {
            let removed = tokens
                .delete_expired()
                .await
                .context("Failed to purge tokens")?;

            println!(
                "{} {}",
                "🧹 Expired tokens deleted:".bright_blue(),
                removed.to_string().bright_white().bold()
            );
        }
    }

    Ok(())
}

/// Displays row counts per resource.
async fn handle_stats(pool: &PgPool) -> Result<()> {
    println!("{}", "📊 Statistics".bright_blue().bold());
    println!();

    let pool = Arc::new(pool.clone());
    let (users, activated) = PgUserRepository::new(pool.clone()).count().await?;
    let books = PgBookRepository::new(pool.clone()).count().await?;
    let lists = PgReadingListRepository::new(pool.clone()).count().await?;
    let reviews = PgReviewRepository::new(pool).count().await?;

    println!(
        "  Users:         {} ({} activated)",
        users.to_string().bright_green().bold(),
        activated.to_string().bright_white()
    );
    println!("  Books:         {}", books.to_string().bright_green().bold());
    println!("  Reading lists: {}", lists.to_string().bright_green().bold());
    println!("  Reviews:       {}", reviews.to_string().bright_green().bold());
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
            let migrations: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations")
                .fetch_one(pool)
                .await?;

            println!("  PostgreSQL: {}", version.bright_white());
            println!("  Migrations: {}", migrations.to_string().bright_white());
            println!();
        }
    }

    Ok(())
}

async fn find_user(users: &PgUserRepository, email: &str) -> Result<User> {
    match users.get_by_email(email).await {
        Ok(user) => Ok(user),
        Err(AppError::NotFound) => anyhow::bail!("No user with email '{email}'"),
        Err(e) => Err(e.into()),
    }
}

fn confirm(prompt: &str, default: bool) -> Result<bool> {
    Ok(Confirm::new()
        .with_prompt(prompt)
        .default(default)
        .interact()?)
}
