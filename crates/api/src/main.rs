//! Bolao API - identity and user management service.
//!
//! # Architecture
//!
//! - Axum web framework
//! - `SQLite` via sqlx for accounts and reset tokens
//! - Argon2id password verifiers
//! - HS256 bearer tokens
//!
//! Migrations are applied on start-up; an administrator account is ensured
//! when `BOLAO_ADMIN_EMAIL` and `BOLAO_ADMIN_PASSWORD` are set.

#![cfg_attr(not(test), forbid(unsafe_code))]

use bolao_api::config::ApiConfig;
use bolao_api::services::{SeedOutcome, ensure_admin};
use bolao_api::state::AppState;
use bolao_api::{db, routes};
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &ApiConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            send_default_pii: false,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

/// Install the global subscriber: env filter, text or JSON output, Sentry.
fn init_tracing(log_json: bool) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "bolao_api=info,tower_http=debug".into());

    let json_layer = log_json.then(|| tracing_subscriber::fmt::layer().json().flatten_event(true));
    let text_layer = (!log_json).then(tracing_subscriber::fmt::layer);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();
}

/// Ensure the configured administrator exists. Failure is logged, not fatal.
async fn seed_admin(state: &AppState) {
    let Some(seed) = &state.config().admin_seed else {
        return;
    };

    match ensure_admin(&state.credentials(), seed).await {
        Ok(SeedOutcome::Created) => {}
        Ok(SeedOutcome::AlreadyPresent) => {
            tracing::debug!(email = %seed.email, "Administrator account already present");
        }
        Err(e) => tracing::warn!(error = %e, "Could not seed administrator account"),
    }
}

#[tokio::main]
async fn main() {
    let config = ApiConfig::from_env().expect("Failed to load configuration");

    // Sentry before the subscriber so the tracing layer has a client
    let _sentry_guard = init_sentry(&config);
    init_tracing(config.log_json);

    let pool = db::create_pool(&config.database_url)
        .await
        .expect("Failed to open database");
    db::run_migrations(&pool)
        .await
        .expect("Failed to run migrations");
    tracing::info!("Database ready");

    let addr = config.socket_addr();
    let state = AppState::new(config, pool).expect("Failed to create application state");
    seed_admin(&state).await;

    let app = routes::app(state)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction());

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");
    tracing::info!(%addr, "bolao-api listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
