use anyhow::anyhow;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tubetalk::config::AppConfig;
use tubetalk::http;
use tubetalk::infra::{db::MongoStore, memory::MemoryStore, store::SharedStore};
use tubetalk::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;

    let store: SharedStore = match config.store_backend.as_str() {
        "mongo" => Arc::new(MongoStore::connect(&config).await?),
        "memory" => {
            tracing::warn!("using the in-memory store; nothing survives a restart");
            Arc::new(MemoryStore::new())
        }
        other => return Err(anyhow!("unknown STORE_BACKEND: {}", other)),
    };

    let state = AppState::new(store, &config);
    let app = http::with_layers(http::router(state), config.max_body_bytes);

    let listener = tokio::net::TcpListener::bind(&config.http_addr).await?;
    tracing::info!("listening on {}", config.http_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to install Ctrl+C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to install SIGTERM handler");
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("shutdown signal received");
}
