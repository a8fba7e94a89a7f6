//! A canned-response HTTP server on the loopback interface.
//!
//! The server runs an `axum` router on its own Tokio runtime, so blocking
//! clients under test can call it from ordinary `#[test]` functions.

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use axum::http::{Method, StatusCode, Uri, header};
use parking_lot::Mutex;
use tokio::runtime::Runtime;

/// A server answering every request with the same status and body.
///
/// The server stops when this value is dropped.
pub struct TestServer {
    url: String,
    requests: Arc<Mutex<Vec<String>>>,
    _runtime: Runtime,
}

impl TestServer {
    /// Base URL of the server, without a trailing slash.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Requests received so far, as `METHOD /path` without the query.
    #[must_use]
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().clone()
    }
}

/// Start a server answering every request with `status` and `body`.
///
/// # Errors
///
/// Returns an error if `status` is not a valid HTTP status code, the runtime
/// cannot start, or no loopback port can be bound.
pub fn serve(status: u16, body: impl Into<String>) -> Result<TestServer> {
    let status = StatusCode::from_u16(status).context("status code")?;
    let body: String = body.into();
    let requests = Arc::new(Mutex::new(Vec::new()));
    let log = Arc::clone(&requests);
    let router = Router::new().fallback(move |method: Method, uri: Uri| {
        let body = body.clone();
        let log = Arc::clone(&log);
        async move {
            log.lock().push(format!("{method} {}", uri.path()));
            (status, [(header::CONTENT_TYPE, "application/yaml")], body)
        }
    });

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .enable_all()
        .build()
        .context("start runtime")?;
    let listener = runtime
        .block_on(tokio::net::TcpListener::bind("127.0.0.1:0"))
        .context("bind loopback")?;
    let url = format!("http://{}", listener.local_addr().context("local addr")?);
    runtime.spawn(async move { axum::serve(listener, router).await });
    Ok(TestServer {
        url,
        requests,
        _runtime: runtime,
    })
}
