use telegram_bots_hub::{
    api::{self, AppState},
    Config, Hub,
};

use redis::aio::ConnectionManager;
use std::sync::Arc;
use tracing::{event, Level};
use tracing_subscriber::{fmt, layer::SubscriberExt as _, util::SubscriberInitExt as _, EnvFilter};

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut sigint = signal(SignalKind::interrupt()).expect("Failed to register SIGINT handler");
        let mut sigterm =
            signal(SignalKind::terminate()).expect("Failed to register SIGTERM handler");

        tokio::select! {
            _ = sigint.recv() => {
                event!(Level::WARN, "SIGINT signal received");
            },
            _ = sigterm.recv() => {
                event!(Level::WARN, "SIGTERM signal received");
            },
        }
    }
    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to register CTRL+C handler");

        event!(Level::WARN, "CTRL+C signal received");
    }
}

#[tokio::main(flavor = "multi_thread")]
async fn main() {
    let _ = dotenvy::dotenv();

    let config = match Config::from_env() {
        Ok(config) => Arc::new(config),
        Err(err) => {
            eprintln!("Configuration error: {err}");

            std::process::exit(1);
        }
    };

    let default_filter = if config.debug { "debug" } else { "info" };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::try_from_env("RUST_LOG").unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();

    let redis_client = match redis::Client::open(config.redis_url.as_str()) {
        Ok(client) => client,
        Err(err) => {
            event!(Level::ERROR, error = %err, "Invalid redis URL");

            std::process::exit(1);
        }
    };
    let redis = match ConnectionManager::new(redis_client).await {
        Ok(connection) => connection,
        Err(err) => {
            event!(Level::ERROR, error = %err, "Cannot connect to redis");

            std::process::exit(1);
        }
    };

    let hub = Hub::new(Arc::clone(&config), redis);
    let app = api::router(AppState {
        hub,
        config: Arc::clone(&config),
    });

    let address = format!("0.0.0.0:{port}", port = config.port);
    let listener = match tokio::net::TcpListener::bind(&address).await {
        Ok(listener) => listener,
        Err(err) => {
            event!(Level::ERROR, error = %err, address, "Cannot bind the listener");

            std::process::exit(1);
        }
    };

    event!(Level::INFO, address, "Telegram Bots Hub is listening");

    if let Err(err) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        event!(Level::ERROR, error = %err, "Server error");
    }
}
