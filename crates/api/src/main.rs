//! API server entry point.

use std::sync::Arc;

use catalog::PostgresCatalogStore;
use orders::PostgresOrderRepository;
use tokio::signal;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Waits for a shutdown signal (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install SIGINT handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("received SIGINT, starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("received SIGTERM, starting graceful shutdown");
        }
    }
}

async fn serve(app: axum::Router, addr: &str) {
    tracing::info!(%addr, "starting API server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("failed to bind address");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server error");

    tracing::info!("server shut down gracefully");
}

#[tokio::main]
async fn main() {
    // 1. Initialize tracing
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // 2. Install Prometheus metrics recorder
    let prometheus_builder = metrics_exporter_prometheus::PrometheusBuilder::new();
    let metrics_handle = prometheus_builder
        .install_recorder()
        .expect("failed to install Prometheus recorder");

    // 3. Build state over PostgreSQL when configured, otherwise run on
    //    the in-memory stores with the seed catalog
    let config = api::config::Config::from_env();

    match &config.database_url {
        Some(url) => {
            let pool = sqlx::postgres::PgPoolOptions::new()
                .max_connections(10)
                .connect(url)
                .await
                .expect("failed to connect to database");

            let catalog_store = Arc::new(PostgresCatalogStore::new(pool.clone()));
            catalog_store
                .run_migrations()
                .await
                .expect("failed to run migrations");
            let repository = PostgresOrderRepository::new(pool);

            let state = api::create_state(catalog_store, repository);
            let app = api::create_app(state, metrics_handle);
            serve(app, &config.addr()).await;
        }
        None => {
            tracing::info!("DATABASE_URL not set, using in-memory stores with seed catalog");
            let state = api::create_seeded_state()
                .await
                .expect("failed to seed catalog");
            let app = api::create_app(state, metrics_handle);
            serve(app, &config.addr()).await;
        }
    }
}
