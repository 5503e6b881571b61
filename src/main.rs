//! Sentinel Server: token lifecycle and revocation service.
//!
//! Main entry point that wires all crates together and starts the server.

use std::sync::Arc;

use tracing_subscriber::{EnvFilter, fmt};

use sentinel_api::AppState;
use sentinel_auth::{AuthGuard, AuthSessionService, PasswordHasher, SystemClock, TokenSigner};
use sentinel_cache::RevocationStoreManager;
use sentinel_core::config::{AppConfig, DirectoryProvider};
use sentinel_core::error::AppError;
use sentinel_core::traits::credential::CredentialVerifier;
use sentinel_database::{DatabasePool, MemoryUserDirectory, PgUserDirectory};
use sentinel_entity::user::UserDirectory;

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!(error = %e, "Server error");
        std::process::exit(1);
    }
}

/// Load configuration from files and environment
fn load_configuration() -> Result<AppConfig, AppError> {
    let env = std::env::var("SENTINEL_ENV").unwrap_or_else(|_| "development".to_string());
    AppConfig::load(&env)
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting Sentinel v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: User directory ───────────────────────────────────
    let (directory, db_pool): (Arc<dyn UserDirectory>, Option<DatabasePool>) =
        match config.database.provider {
            DirectoryProvider::Postgres => {
                let pool = DatabasePool::connect(&config.database).await?;
                if config.database.run_migrations {
                    sentinel_database::migration::run_migrations(pool.pool()).await?;
                }
                let directory: Arc<dyn UserDirectory> =
                    Arc::new(PgUserDirectory::new(pool.pool().clone()));
                (directory, Some(pool))
            }
            DirectoryProvider::Memory => {
                tracing::warn!("Using in-memory user directory; users are lost on restart");
                let directory: Arc<dyn UserDirectory> = Arc::new(MemoryUserDirectory::new());
                (directory, None)
            }
        };

    // ── Step 2: Revocation store ─────────────────────────────────
    let revocation = RevocationStoreManager::connect(&config.revocation).await?;
    let store = revocation.store();
    tracing::info!(
        provider = revocation.provider(),
        failure_policy = ?config.revocation.failure_policy,
        "Revocation store ready"
    );

    // ── Step 3: Auth system ──────────────────────────────────────
    let signer = Arc::new(TokenSigner::new(&config.auth, Arc::new(SystemClock)));
    let verifier: Arc<dyn CredentialVerifier> = Arc::new(PasswordHasher::new());
    let guard = Arc::new(AuthGuard::new(
        Arc::clone(&signer),
        Arc::clone(&store),
        Arc::clone(&directory),
        config.revocation.failure_policy,
    ));
    let sessions = Arc::new(AuthSessionService::new(
        signer,
        Arc::clone(&store),
        Arc::clone(&directory),
        verifier,
        Arc::clone(&guard),
        &config.auth,
    )?);

    // ── Step 4: HTTP server ──────────────────────────────────────
    let addr = config.server.bind_address();
    let app_state = AppState {
        config: Arc::new(config),
        sessions,
        guard,
        directory,
        revocation_store: store,
        db_pool: db_pool.clone(),
    };
    let app = sentinel_api::build_router(app_state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    tracing::info!("Sentinel server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            shutdown_signal().await;
            tracing::info!("Shutdown signal received, starting graceful shutdown...");
        })
        .await
        .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

    // ── Step 5: Release backends ─────────────────────────────────
    revocation.close().await;
    if let Some(pool) = db_pool {
        pool.close().await;
    }

    tracing::info!("Sentinel server shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
