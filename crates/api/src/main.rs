use std::net::SocketAddr;
use std::sync::Arc;

use sqlx::PgPool;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use taskforge_api::app::{build_app, cors_layer};
use taskforge_api::config::ServerConfig;
use taskforge_api::state::AppState;
use taskforge_llm::TaskGenerator;

const DEFAULT_LOG_FILTER: &str = "taskforge_api=debug,taskforge_llm=debug,tower_http=debug";

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = ServerConfig::from_env();
    tracing::info!(
        host = %config.host,
        port = config.port,
        allow_anonymous = config.allow_anonymous,
        "Loaded server configuration"
    );

    let pool = connect_database().await;

    let generator =
        TaskGenerator::from_config(&config.generation).expect("Failed to build task generator");
    if generator.has_model() {
        tracing::info!(model = %config.generation.model, "Task generation model configured");
    } else {
        tracing::warn!("GEMINI_API_KEY not set, generated tasks come from the fallback list");
    }

    let cors = cors_layer(&config.cors_origins)
        .unwrap_or_else(|e| panic!("Invalid CORS origin in {:?}: {e}", config.cors_origins));
    let addr = SocketAddr::new(
        config.host.parse().expect("HOST must be an IP address"),
        config.port,
    );

    let state = AppState {
        pool,
        config: Arc::new(config),
        generator: Arc::new(generator),
    };
    let app = build_app(state, cors);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .unwrap_or_else(|e| panic!("Failed to bind {addr}: {e}"));
    tracing::info!(%addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    tracing::info!("Shut down cleanly");
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Connect, verify, and migrate. Any failure aborts startup.
async fn connect_database() -> PgPool {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = taskforge_db::create_pool(&url)
        .await
        .expect("Failed to connect to database");
    taskforge_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    taskforge_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database ready");
    pool
}

/// Resolves on Ctrl-C, or SIGTERM on Unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Ctrl-C handler failed");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "SIGTERM handler failed");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("Ctrl-C received, draining connections"),
        () = terminate => tracing::info!("SIGTERM received, draining connections"),
    }
}
