//! Host runtime detection and the adapters that bridge native HTTP
//! primitives to the canonical exchange model.
//!
//! Classification runs once at startup and selects exactly one adapter;
//! nothing re-detects per request. Each adapter owns process bootstrap
//! (listen, startup logging) and translates between its host's native
//! request/response mechanism and `CanonicalRequest`/`CanonicalResponse`.
//!
//! # Adapters
//!
//! - `standalone`: axum server that binds its own listener (`PORT`, 8000).
//! - `socket`: raw accept loop with per-connection HTTP/1 serving
//!   (`PORT`, 3000); exports the reusable [`ProxyService`].
//! - `edge`: serves on a listener inherited from the invoker, never binds.
//!
//! Author: kelexine (<https://github.com/kelexine>)

pub mod edge;
pub mod socket;
pub mod standalone;

pub use socket::ProxyService;

use crate::error::{ProxyError, Result};
use crate::exchange::{BodySource, CanonicalRequest, CanonicalResponse, ResponseBody};
use bytes::Bytes;
use futures::TryStreamExt;
use http_body::Frame;
use http_body_util::combinators::UnsyncBoxBody;
use http_body_util::{BodyDataStream, BodyExt, Empty, Full, StreamBody};
use std::fmt;
use std::net::SocketAddr;
use tokio::signal;
use tracing::info;
use url::Url;

/// The closed set of host environments the proxy can serve under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeKind {
    EdgeWorker,
    Standalone,
    SocketServer,
}

impl fmt::Display for RuntimeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RuntimeKind::EdgeWorker => "edge-worker",
            RuntimeKind::Standalone => "standalone",
            RuntimeKind::SocketServer => "socket-server",
        };
        f.write_str(name)
    }
}

impl RuntimeKind {
    /// Classify the host environment from its ambient variables.
    ///
    /// `INFRADASH_RUNTIME` overrides detection; otherwise each platform
    /// marker is an independent presence check: `LISTEN_FDS` (an invoker
    /// owns the listening socket), `K_SERVICE` (managed standalone
    /// platform), `SERVER_SOFTWARE` (supervised socket server). `None`
    /// means unsupported: the caller logs and never starts listening.
    pub fn classify(var: impl Fn(&str) -> Option<String>) -> Option<Self> {
        if let Some(explicit) = var("INFRADASH_RUNTIME") {
            return match explicit.as_str() {
                "edge" | "edge-worker" => Some(RuntimeKind::EdgeWorker),
                "standalone" | "server" => Some(RuntimeKind::Standalone),
                "socket" | "socket-server" => Some(RuntimeKind::SocketServer),
                _ => None,
            };
        }

        if var("LISTEN_FDS").is_some() {
            return Some(RuntimeKind::EdgeWorker);
        }
        if var("K_SERVICE").is_some() {
            return Some(RuntimeKind::Standalone);
        }
        if var("SERVER_SOFTWARE").is_some() {
            return Some(RuntimeKind::SocketServer);
        }
        None
    }

    /// Detect the runtime this process was launched under.
    pub fn detect() -> Option<Self> {
        Self::classify(|name| std::env::var(name).ok())
    }
}

/// Boxed response body shared by the hyper-based adapters; axum wraps it
/// natively. Unsync because relayed upstream streams are only `Send`.
pub type ProxyBody = UnsyncBoxBody<Bytes, ProxyError>;

/// Normalize a native request into the canonical model.
///
/// Host request objects expose only a path, so the absolute URL is
/// reconstructed from the Host header (scheme + host + path + query).
/// The body is wrapped as a lazy stream; nothing is read here.
pub fn canonical_request<B>(request: http::Request<B>) -> Result<CanonicalRequest>
where
    B: http_body::Body<Data = Bytes> + Send + 'static,
    B::Error: std::error::Error + Send + Sync + 'static,
{
    let (parts, body) = request.into_parts();

    let host = parts
        .headers
        .get(http::header::HOST)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("localhost")
        .to_string();
    let target = parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");

    let url = match Url::parse(&format!("http://{host}{target}")) {
        Ok(url) => url,
        // A garbage Host header must not take the request down.
        Err(_) => Url::parse(&format!("http://localhost{target}"))
            .map_err(|e| ProxyError::Config(format!("invalid request target: {e}")))?,
    };

    let stream = BodyDataStream::new(body).map_err(|e| ProxyError::Io(std::io::Error::other(e)));

    Ok(CanonicalRequest::new(
        parts.method,
        url,
        parts.headers,
        BodySource::Stream(Box::pin(stream)),
    ))
}

/// Translate a canonical response into the native http form shared by
/// every adapter. Stream bodies are forwarded frame by frame, so chunk
/// boundaries survive and backpressure propagates to the upstream.
pub fn native_response(response: CanonicalResponse) -> http::Response<ProxyBody> {
    let (status, headers, body) = response.into_parts();

    let body: ProxyBody = match body {
        ResponseBody::Empty => Empty::<Bytes>::new()
            .map_err(|never| match never {})
            .boxed_unsync(),
        ResponseBody::Full(bytes) => Full::new(bytes)
            .map_err(|never| match never {})
            .boxed_unsync(),
        ResponseBody::Stream(stream) => {
            StreamBody::new(stream.map_ok(Frame::data)).boxed_unsync()
        }
    };

    let mut native = http::Response::new(body);
    *native.status_mut() = status;
    *native.headers_mut() = headers;
    native
}

/// Startup lines every adapter prints once it is reachable.
pub(crate) fn log_endpoints(addr: SocketAddr, kind: RuntimeKind) {
    info!("Listening on http://{addr}");
    info!("Models endpoint: http://{addr}/v1/models");
    info!("Chat endpoint: http://{addr}/v1/chat/completions");
    info!("Host runtime: {kind}");
}

pub(crate) async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            info!("Received SIGTERM signal");
        },
    }
}
