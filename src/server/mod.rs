//! Web server exposing the OCR pipeline.
//!
//! Routes:
//! - `GET /` liveness text
//! - `POST /ocr` fetch an image URL and return `{"text": ...}`
//! - `GET /logs` the audit log wrapped in `<pre>`

mod handlers;
mod routes;
mod types;

pub use handlers::{HOME_MESSAGE, NO_LOGS_MESSAGE};
pub use routes::create_router;
pub use types::{ErrorResponse, OcrRequest, OcrResponse};

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::signal;

use crate::config::Settings;
use crate::services::OcrService;

/// Shared state for the web server.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<OcrService>,
}

impl AppState {
    pub fn new(service: OcrService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }

    /// Build the production state: Tesseract plus the on-disk audit store.
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        Ok(Self::new(OcrService::from_settings(settings)?))
    }
}

/// Start the web server and run until Ctrl+C or SIGTERM.
pub async fn serve(settings: &Settings, host: &str, port: u16) -> anyhow::Result<()> {
    settings.ensure_directories()?;

    let state = AppState::from_settings(settings)?;
    if !state.service.backend().is_available() {
        tracing::warn!("{}", state.service.backend().availability_hint());
    }
    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    tracing::info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Resolve when the process is asked to stop.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::warn!("Received Ctrl+C, shutting down...");
        },
        _ = terminate => {
            tracing::warn!("Received terminate signal, shutting down...");
        },
    }
}
