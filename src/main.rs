use axum::routing::get;
use dotenvy::dotenv;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;
mod db;
mod error;
mod middleware;
mod routes;
mod state;

#[cfg(test)]
mod business_logic_tests;
#[cfg(test)]
mod integration_tests;

use state::AppState;

#[tokio::main]
async fn main() {
    dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting LoungeOS backend...");

    let config = Arc::new(config::Config::from_env());

    let pool = match db::init_pool(&config.database_path).await {
        Ok(pool) => {
            tracing::info!(path = %config.database_path.display(), "Database opened");
            if let Err(e) = db::init_database(&pool).await {
                tracing::error!("Failed to run migrations: {}", e);
                return;
            }
            pool
        }
        Err(e) => {
            tracing::error!("Failed to open database: {}", e);
            return;
        }
    };

    let app_state = AppState {
        pool: pool.clone(),
        config: config.clone(),
    };

    tokio::spawn(commands::backup::auto::run_backup_scheduler(
        pool,
        config.clone(),
    ));

    let app = routes::create_router()
        .route("/", get(root))
        .route("/api/ping", get(ping))
        .layer(axum::middleware::from_fn_with_state(
            app_state.clone(),
            middleware::auth::auth_middleware,
        ))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(app_state);

    let addr_str = format!("{}:{}", config.host, config.port);
    let addr = addr_str.parse::<SocketAddr>().expect("Invalid address");

    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}

async fn root() -> &'static str {
    "LoungeOS backend is running"
}

async fn ping() -> &'static str {
    "pong"
}
