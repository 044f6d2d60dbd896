//! HTTP server initialization and runtime setup.
//!
//! Handles the database pool, migrations, service wiring, the rate limiter
//! sweeper and the Axum server lifecycle including graceful shutdown.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tokio::signal;

use crate::config::Config;
use crate::infrastructure::mailer::{Mailer, NullMailer, SmtpMailer};
use crate::infrastructure::persistence::{
    PgBookRepository, PgReadingListRepository, PgReviewRepository, PgTokenRepository,
    PgUserRepository,
};
use crate::routes::app_router;
use crate::state::{AppState, Repositories};

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - PostgreSQL connection pool
/// - Apply migrations
/// - SMTP mailer (or NullMailer fallback)
/// - Rate limiter sweeper
/// - Axum HTTP server
///
/// On SIGINT or SIGTERM the server stops accepting connections, finishes
/// in-flight requests and then waits up to `SHUTDOWN_TIMEOUT` seconds for
/// background email tasks.
///
/// # Errors
///
/// Returns an error if:
/// - Database connection fails
/// - Migrations fail
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let pool = connect(&config).await?;
    tracing::info!("Connected to database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;

    let state = build_state(&config, Arc::new(pool))?;

    let sweeper = state
        .rate_limiter
        .settings()
        .enabled
        .then(|| state.rate_limiter.start_sweeper());

    let app = app_router(state.clone());

    let addr: SocketAddr = config
        .listen_addr
        .parse()
        .with_context(|| format!("Invalid LISTEN address '{}'", config.listen_addr))?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(env = %config.environment, "Listening on http://{addr}");

    axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    if let Some(sweeper) = sweeper {
        sweeper.abort();
    }

    tracing::info!(
        pending = state.background.len(),
        "Completing background tasks"
    );
    if !state
        .background
        .wait(Duration::from_secs(config.shutdown_timeout))
        .await
    {
        tracing::warn!("Background tasks did not finish before the shutdown timeout");
    }

    tracing::info!("Server stopped");
    Ok(())
}

/// Opens the connection pool with the configured limits.
///
/// # Errors
///
/// Returns an error if the database is unreachable.
pub async fn connect(config: &Config) -> Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
        .idle_timeout(Duration::from_secs(config.db_idle_timeout))
        .max_lifetime(Duration::from_secs(config.db_max_lifetime))
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")
}

/// Wires repositories, services and shared infrastructure.
///
/// # Errors
///
/// Returns an error if SMTP is configured with an invalid sender or host.
pub fn build_state(config: &Config, pool: Arc<PgPool>) -> Result<AppState> {
    let query_timeout = config.query_timeout();

    let repos = Repositories {
        users: Arc::new(PgUserRepository::new(pool.clone()).with_query_timeout(query_timeout)),
        tokens: Arc::new(PgTokenRepository::new(pool.clone()).with_query_timeout(query_timeout)),
        books: Arc::new(PgBookRepository::new(pool.clone()).with_query_timeout(query_timeout)),
        lists: Arc::new(
            PgReadingListRepository::new(pool.clone()).with_query_timeout(query_timeout),
        ),
        reviews: Arc::new(PgReviewRepository::new(pool).with_query_timeout(query_timeout)),
    };

    let mailer: Arc<dyn Mailer> = match config.smtp_settings() {
        Some(settings) => {
            let mailer = SmtpMailer::new(&settings).context("Failed to configure SMTP")?;
            tracing::info!(host = %settings.host, "Email enabled (SMTP)");
            Arc::new(mailer)
        }
        None => {
            tracing::info!("Email disabled (NullMailer)");
            Arc::new(NullMailer::new())
        }
    };

    Ok(AppState::new(
        repos,
        mailer,
        config.account_settings(),
        config.rate_limit_settings(),
        config.environment.clone(),
        config.behind_proxy,
    ))
}

/// Resolves on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut s) => {
                s.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
