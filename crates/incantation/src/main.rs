mod app;
mod handlers;
mod purge;
mod state;
mod storage;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use incantation_auth::{AuthConfig, AuthState, GoogleProvider};
use incantation_core::auth::SessionRepository;
use listenfd::ListenFd;
use tokio::{net::TcpListener, signal};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::{
    app::create_app, purge::spawn_session_purge, state::AppState, storage::StorageBackend,
};

/// Incantation - Sign in with Google and keep a server-side session
#[derive(Parser, Debug)]
#[command(name = "incantation")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Host address to bind the server to
    #[arg(long, short = 'H', default_value = "0.0.0.0", env = "HOST")]
    host: String,

    /// Port to listen on
    #[arg(long, short, default_value = "8000", env = "PORT")]
    port: u16,

    /// User storage backend
    #[arg(long, value_enum, default_value = "sqlite", env = "STORAGE")]
    storage: StorageBackend,

    /// Path to the SQLite database file
    #[arg(long, default_value = "incantation.db", env = "DATABASE_PATH")]
    database: String,

    /// Seconds between sweeps of expired sessions
    #[arg(long, default_value = "300", env = "SESSION_PURGE_INTERVAL_SECS")]
    purge_interval_secs: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing subscriber
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "incantation=debug,incantation_auth=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let auth_config = AuthConfig::from_env()?;
    if !auth_config.cookie_secure {
        tracing::warn!("Debug mode: session cookies are sent without the Secure flag");
    }

    let users = storage::open_user_repository(cli.storage, &cli.database).await?;
    let sessions = open_session_store(&cli.database).await?;
    let provider = Arc::new(GoogleProvider::new(&auth_config.google)?);

    let state = AppState::new(AuthState::new(sessions, users, provider, auth_config)?);

    let purge = spawn_session_purge(
        state.auth.sessions.clone(),
        Duration::from_secs(cli.purge_interval_secs.max(1)),
        state.subscribe_shutdown(),
    );

    // Build the application router
    let app = create_app(state.clone());

    // Auto-reload support via listenfd
    let mut listenfd = ListenFd::from_env();
    let listener = match listenfd.take_tcp_listener(0)? {
        // If we are given a tcp listener on listen fd 0, use that one
        Some(listener) => {
            listener.set_nonblocking(true)?;
            TcpListener::from_std(listener)?
        }
        // Otherwise fall back to CLI-specified host:port
        None => {
            let addr = format!("{}:{}", cli.host, cli.port);
            TcpListener::bind(&addr).await?
        }
    };

    tracing::info!("listening on {}", listener.local_addr()?);

    // Run the server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(state))
        .await?;

    purge.await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Sessions live in the SQLite database alongside users.
#[cfg(feature = "session-sqlite")]
async fn open_session_store(database_path: &str) -> Result<Arc<dyn SessionRepository>> {
    use incantation_auth::SqliteSessionStore;
    use sqlx::sqlite::{SqliteConnectOptions, SqlitePool};

    let options = SqliteConnectOptions::new()
        .filename(database_path)
        .create_if_missing(true);
    let store = SqliteSessionStore::new(SqlitePool::connect_with(options).await?);
    store.migrate().await?;

    tracing::info!(path = %database_path, "Using SQLite session storage");
    Ok(Arc::new(store))
}

/// Sessions live in process memory and are lost on restart.
#[cfg(not(feature = "session-sqlite"))]
async fn open_session_store(_database_path: &str) -> Result<Arc<dyn SessionRepository>> {
    tracing::info!("Using in-memory session storage");
    Ok(Arc::new(incantation_auth::MemorySessionStore::new()))
}

/// Wait for shutdown signals (Ctrl+C or SIGTERM) and notify background tasks.
async fn shutdown_signal(state: AppState) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, shutting down...");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, shutting down...");
        }
    }

    // Stop the session purge task
    state.signal_shutdown();
}
