// Standalone server adapter (axum)
// Author: kelexine (https://github.com/kelexine)

use crate::config::AppConfig;
use crate::dispatch::{self, ProxyState};
use crate::error::{ProxyError, Result};
use crate::exchange::CanonicalResponse;
use crate::runtime::{self, RuntimeKind};
use axum::body::Body;
use axum::extract::{Request, State};
use axum::response::Response;
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

const DEFAULT_PORT: u16 = 8000;

/// Build the application router. Route matching lives in the dispatcher,
/// so the framework surface is a single catch-all handler.
pub fn create_router(state: Arc<ProxyState>) -> Router {
    Router::new()
        .fallback(handle)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn handle(State(state): State<Arc<ProxyState>>, request: Request) -> Response {
    let canonical = match runtime::canonical_request(request) {
        Ok(canonical) => canonical,
        Err(err) => {
            return runtime::native_response(CanonicalResponse::from_error(&err)).map(Body::new)
        }
    };

    let response = dispatch::dispatch(canonical, &state).await;
    runtime::native_response(response).map(Body::new)
}

/// Bind the configured address and serve until shutdown.
pub async fn run(state: Arc<ProxyState>, config: &AppConfig) -> Result<()> {
    let port = config.port.unwrap_or(DEFAULT_PORT);
    let addr: SocketAddr = format!("{}:{}", config.host, port)
        .parse()
        .map_err(|e| ProxyError::Config(format!("invalid listen address: {e}")))?;

    let listener = TcpListener::bind(addr).await?;
    runtime::log_endpoints(listener.local_addr()?, RuntimeKind::Standalone);
    serve(listener, state).await
}

/// Serve on an already-bound listener.
pub async fn serve(listener: TcpListener, state: Arc<ProxyState>) -> Result<()> {
    let app = create_router(state);
    axum::serve(listener, app)
        .with_graceful_shutdown(runtime::shutdown_signal())
        .await?;
    Ok(())
}
