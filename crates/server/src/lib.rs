//! SmartTravel API Server Library
//!
//! Auth (bcrypt + JWT session cookie), AI chat history, and trip management
//! over axum + SQLite.

pub mod ai;
pub mod auth;
pub mod config;
pub mod ctx;
pub mod error;
pub mod handlers;
pub mod models;
pub mod store;
pub mod validate;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, Method},
    middleware,
    routing::{delete, get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use ai::GenAiProvider;
use auth::middleware::mw_require_auth;
use config::{AppConfig, AppState};
use store::UserStore;

/// Build the application router for the given state.
pub fn app(state: AppState) -> Router {
    let protected = Router::new()
        .route("/api/v1/user/auth-status", get(handlers::auth::auth_status))
        .route("/api/v1/user/logout", get(handlers::auth::logout))
        .route("/api/v1/chat/new", post(handlers::chat::new_message))
        .route("/api/v1/chat/all-chats", get(handlers::chat::all_chats))
        .route("/api/v1/chat/delete", delete(handlers::chat::delete_chats))
        .route(
            "/api/v1/trips",
            post(handlers::trips::create_trip).get(handlers::trips::list_trips),
        )
        .route(
            "/api/v1/trips/{trip_id}",
            get(handlers::trips::get_trip)
                .put(handlers::trips::update_trip)
                .delete(handlers::trips::delete_trip),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            mw_require_auth,
        ));

    let public = Router::new()
        .route("/api/v1/user", get(handlers::auth::list_users))
        .route("/api/v1/user/signup", post(handlers::auth::signup))
        .route("/api/v1/user/login", post(handlers::auth::login))
        .route("/health", get(health_check));

    let cors = cors_layer(&state.config);

    Router::new()
        .merge(protected)
        .merge(public)
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

// Credentialed CORS needs an exact origin; a permissive layer would make
// the browser drop the session cookie.
fn cors_layer(config: &AppConfig) -> CorsLayer {
    match config.cors_origin.parse::<HeaderValue>() {
        Ok(origin) => CorsLayer::new()
            .allow_origin(origin)
            .allow_credentials(true)
            .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
            .allow_headers([header::CONTENT_TYPE]),
        Err(_) => {
            warn!("Invalid CORS_ORIGIN {:?}, allowing any origin", config.cors_origin);
            CorsLayer::permissive()
        }
    }
}

/// Run the server: load config, open the store, wire the provider, serve.
pub async fn run() -> anyhow::Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "smarttravel_server=debug,info".into());
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();

    info!("=== SmartTravel Server ===");

    let config = Arc::new(AppConfig::from_env()?);

    let store = Arc::new(UserStore::open(&config.data_dir).await?);
    info!("Credential store initialized");

    let provider = Arc::new(GenAiProvider::new(config.model.clone(), config.ai_timeout));
    info!("Completion provider ready: {}", config.model);

    let state = AppState {
        config: config.clone(),
        store,
        provider,
    };

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app(state)).await?;

    Ok(())
}

async fn health_check() -> &'static str {
    "OK - SmartTravel Server"
}
