//! HTTP server lifecycle: bind, spawn the axum task, hand back a handle
//! with a shutdown channel.

use std::net::SocketAddr;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use crate::api::router::api_router;
use crate::api::types::ApiContext;
use crate::config::ConfigError;
use crate::db::DatabaseError;
use crate::llm::LlmError;
use crate::prediction::PredictionError;

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("History store error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Model client error: {0}")]
    Llm(#[from] LlmError),

    #[error("Prediction client error: {0}")]
    Prediction(#[from] PredictionError),

    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        source: std::io::Error,
    },

    #[error("Server task failed: {0}")]
    Task(String),
}

/// Handle to a running server.
pub struct ApiServer {
    pub addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl ApiServer {
    /// Signal a graceful shutdown. In-flight requests are allowed to finish.
    pub fn shutdown(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
            tracing::info!("API server shutdown signal sent");
        }
    }

    /// Wait for the server task to end.
    pub async fn wait(self) -> Result<(), ServerError> {
        self.task
            .await
            .map_err(|e| ServerError::Task(e.to_string()))
    }
}

/// Bind `addr` (port 0 picks an ephemeral port) and serve the API on it.
pub async fn start_api_server(ctx: ApiContext, addr: SocketAddr) -> Result<ApiServer, ServerError> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|source| ServerError::Bind { addr, source })?;
    let addr = listener
        .local_addr()
        .map_err(|source| ServerError::Bind { addr, source })?;

    let app = api_router(ctx);
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    let task = tokio::spawn(async move {
        let shutdown_signal = async move {
            let _ = shutdown_rx.await;
            tracing::info!("API server received shutdown signal");
        };

        tracing::info!(%addr, "API server started");

        if let Err(e) = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal)
            .await
        {
            tracing::error!("API server error: {e}");
        }

        tracing::info!("API server stopped");
    });

    Ok(ApiServer {
        addr,
        shutdown_tx: Some(shutdown_tx),
        task,
    })
}

#[cfg(test)]
mod tests {
    use std::net::Ipv4Addr;

    use super::*;
    use crate::api::types::test_context;

    fn localhost() -> SocketAddr {
        SocketAddr::from((Ipv4Addr::LOCALHOST, 0))
    }

    #[tokio::test]
    async fn start_and_stop_server() {
        let mut server = start_api_server(test_context::context("http://127.0.0.1:9/chat"), localhost())
            .await
            .expect("server should start");
        assert!(server.addr.port() > 0);

        let url = format!("http://{}/api/health", server.addr);
        let resp = reqwest::get(&url).await.unwrap();
        assert_eq!(resp.status(), 200);
        let json: serde_json::Value = resp.json().await.unwrap();
        assert_eq!(json["status"], "ok");

        server.shutdown();
        server.wait().await.unwrap();
    }

    #[tokio::test]
    async fn server_imports_over_http() {
        let mut server = start_api_server(test_context::context("http://127.0.0.1:9/chat"), localhost())
            .await
            .unwrap();

        let client = reqwest::Client::new();
        let resp = client
            .post(format!("http://{}/api/import/xml", server.addr))
            .body("<r><age>54</age><sex>0</sex></r>")
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
        let json: serde_json::Value = resp.json().await.unwrap();
        assert_eq!(json["fieldCount"], 2);
        assert_eq!(json["parsedData"]["AGE"], 54.0);

        server.shutdown();
    }

    #[tokio::test]
    async fn binding_a_taken_port_fails() {
        let taken = tokio::net::TcpListener::bind(localhost()).await.unwrap();
        let addr = taken.local_addr().unwrap();
        let result = start_api_server(test_context::context("http://127.0.0.1:9/chat"), addr).await;
        assert!(matches!(result, Err(ServerError::Bind { .. })));
    }
}
