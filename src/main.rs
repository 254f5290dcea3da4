//! age-gate server binary.
//!
//! Configuration comes from `AGE_GATE__*` environment variables (see
//! `age_gate::config`). Redis and PostgreSQL are optional; without them the
//! corresponding store is kept in memory.

use std::sync::Arc;

use age_gate::adapters::auth::JwtSessionValidator;
use age_gate::adapters::http::middleware::{AuthState, SessionCookie};
use age_gate::adapters::http::verification::CALLBACK_PATH;
use age_gate::adapters::http::{app_router, VerificationAppState};
use age_gate::adapters::oidc::OidcProviderFactory;
use age_gate::adapters::profile_store::{InMemoryProfileStore, PostgresProfileStore};
use age_gate::adapters::session_store::{InMemorySessionStore, RedisSessionStore};
use age_gate::application::StatusStore;
use age_gate::config::{AppConfig, ServerConfig};
use age_gate::ports::{ProfileStore, SessionStore};
use tokio::net::TcpListener;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

fn init_tracing(server: &ServerConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(server.log_level.as_str()));

    if server.is_production() {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

async fn session_store(config: &AppConfig) -> Result<Arc<dyn SessionStore>, BoxError> {
    match &config.redis {
        Some(redis) => {
            let store = tokio::time::timeout(
                redis.connect_timeout(),
                RedisSessionStore::connect(&redis.url, config.session.ttl()),
            )
            .await
            .map_err(|_| "timed out connecting to Redis")??;
            tracing::info!("Using Redis session store");
            Ok(Arc::new(store))
        }
        None => {
            tracing::warn!("No Redis configured; sessions are kept in memory");
            Ok(Arc::new(
                InMemorySessionStore::new().with_ttl(config.session.ttl()),
            ))
        }
    }
}

async fn profile_store(config: &AppConfig) -> Result<Arc<dyn ProfileStore>, BoxError> {
    match &config.database {
        Some(database) => {
            let store = PostgresProfileStore::new(database.connect_lazy()?);
            if database.run_migrations {
                store.migrate().await?;
                tracing::info!("Database migrations applied");
            }
            tracing::info!("Using PostgreSQL profile store");
            Ok(Arc::new(store))
        }
        None => {
            tracing::warn!("No database configured; verification records are not durable");
            Ok(Arc::new(InMemoryProfileStore::new()))
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutting down");
}

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let mut config = AppConfig::load()?;
    config.validate()?;
    init_tracing(&config.server);

    // The callback URL defaults to this server's own callback route.
    if config.verification.redirect_uri.is_none() {
        config.verification.redirect_uri = config.server.public_url(CALLBACK_PATH);
    }
    if !config.verification.has_credentials() {
        tracing::warn!("Age verification credentials are missing; checkout will be blocked");
    }

    let status_store = StatusStore::new(session_store(&config).await?, profile_store(&config).await?);
    let providers = Arc::new(OidcProviderFactory::new(config.verification.clone()));
    let state = VerificationAppState::new(status_store, providers, &config.verification)?;

    let validator: Option<AuthState> = config
        .auth
        .as_ref()
        .map(|auth| Arc::new(JwtSessionValidator::from_config(auth)) as AuthState);
    if validator.is_none() {
        tracing::info!("No customer auth configured; all visitors are anonymous");
    }

    let app = app_router(state, SessionCookie::from_config(&config.session), validator)
        .layer(TimeoutLayer::new(config.server.request_timeout()))
        .layer(TraceLayer::new_for_http());

    let addr = config.server.socket_addr();
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, environment = ?config.server.environment, "age-gate listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}
