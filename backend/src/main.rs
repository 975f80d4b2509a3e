use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::http::{HeaderValue, Method};
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use clubhub_backend::{api, config, store, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present (dev convenience)
    let _ = dotenvy::dotenv();

    let cfg = config::Config::from_env()?;

    // Tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());
    if cfg.json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    let store = store::connect(&cfg.storage).await?;

    let state = AppState {
        store,
        jwt_secret: cfg.jwt_secret.clone(),
        jwt_expiry_hours: cfg.jwt_expiry_hours,
        debug_routes: cfg.enable_debug_routes,
    };

    // Sign-up/sign-in: 5 request burst per client IP, refilled every 2 seconds
    let governor = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(2)
            .burst_size(5)
            .finish()
            .context("invalid rate limit configuration")?,
    );
    let auth_routes = api::auth_router(state.clone()).layer(GovernorLayer { config: governor });

    // CORS
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers(Any)
        .allow_origin(
            cfg.cors_origins
                .iter()
                .filter_map(|o| o.parse::<HeaderValue>().ok())
                .collect::<Vec<_>>(),
        );

    let app = api::router(state)
        .merge(auth_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new());

    let listener = tokio::net::TcpListener::bind(&cfg.listen_addr).await?;
    tracing::info!("Listening on {}", cfg.listen_addr);

    // The rate limiter keys on the peer address
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
