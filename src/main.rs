//! Chatroom server entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use chatroom::adapters::http::app_router;
use chatroom::application::chat::{Broadcaster, ChatRoom};
use chatroom::config::AppConfig;
use chatroom::domain::chat::MessagePipeline;
use chatroom::domain::identity::IdentityIssuer;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load_validated()?;

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.server.log_level));
    if config.is_production() {
        tracing_subscriber::fmt().json().with_env_filter(env_filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let addr = config.server.socket_addr()?;

    let filter = config.chat.content_filter();
    if filter.is_empty() {
        tracing::info!("No sensitive words configured, content passes unfiltered");
    }

    let broadcaster = Arc::new(Broadcaster::new());
    let room = Arc::new(ChatRoom::new(
        broadcaster.clone(),
        Arc::new(IdentityIssuer::new(config.chat.token_codec())),
        MessagePipeline::new(Arc::new(filter)),
        config.chat.room_settings(),
    ));

    let app = app_router(room);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, environment = ?config.server.environment, "Chatroom listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal(broadcaster))
    .await?;

    tracing::info!("Chatroom stopped");
    Ok(())
}

/// Resolves on Ctrl-C or SIGTERM after telling every session to stop.
async fn shutdown_signal(broadcaster: Arc<Broadcaster>) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
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
                tracing::error!("Failed to listen for SIGTERM: {}", e);
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

    tracing::info!("Shutdown signal received");
    broadcaster.shutdown();
}
