//! Throwaway HTTP servers standing in for upstream services in tests.

use std::net::{Ipv4Addr, SocketAddr};

use axum::Router;

/// Serve `app` on an ephemeral localhost port and return its base URL.
///
/// The server task lives until the test runtime shuts down.
pub async fn spawn_upstream(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind(SocketAddr::from((Ipv4Addr::LOCALHOST, 0)))
        .await
        .unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

/// A base URL on which nothing is listening.
pub async fn closed_port_url() -> String {
    let listener = tokio::net::TcpListener::bind(SocketAddr::from((Ipv4Addr::LOCALHOST, 0)))
        .await
        .unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}
