// Socket server adapter: raw accept loop with per-connection HTTP/1 serving
// Author: kelexine (https://github.com/kelexine)

use crate::config::AppConfig;
use crate::dispatch::{self, ProxyState};
use crate::error::{ProxyError, Result};
use crate::exchange::CanonicalResponse;
use crate::runtime::{self, ProxyBody, RuntimeKind};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::Service;
use hyper_util::rt::TokioIo;
use std::future::Future;
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{debug, info, warn};

const DEFAULT_PORT: u16 = 3000;

/// The connection-level request handler.
///
/// Exported so embedders can mount the proxy on listeners they manage
/// themselves; `serve` below is exactly that plus an accept loop.
#[derive(Clone)]
pub struct ProxyService {
    state: Arc<ProxyState>,
}

impl ProxyService {
    pub fn new(state: Arc<ProxyState>) -> Self {
        Self { state }
    }
}

impl Service<hyper::Request<Incoming>> for ProxyService {
    type Response = hyper::Response<ProxyBody>;
    type Error = std::convert::Infallible;
    type Future = Pin<Box<dyn Future<Output = std::result::Result<Self::Response, Self::Error>> + Send>>;

    fn call(&self, request: hyper::Request<Incoming>) -> Self::Future {
        let state = self.state.clone();
        Box::pin(async move {
            let response = match runtime::canonical_request(request) {
                Ok(canonical) => dispatch::dispatch(canonical, &state).await,
                Err(err) => CanonicalResponse::from_error(&err),
            };
            Ok(runtime::native_response(response))
        })
    }
}

/// Bind the configured address and serve until shutdown.
pub async fn run(state: Arc<ProxyState>, config: &AppConfig) -> Result<()> {
    let port = config.port.unwrap_or(DEFAULT_PORT);
    let addr: SocketAddr = format!("{}:{}", config.host, port)
        .parse()
        .map_err(|e| ProxyError::Config(format!("invalid listen address: {e}")))?;

    let listener = TcpListener::bind(addr).await?;
    runtime::log_endpoints(listener.local_addr()?, RuntimeKind::SocketServer);
    serve(listener, state).await
}

/// Accept connections until shutdown, serving each socket on its own task.
pub async fn serve(listener: TcpListener, state: Arc<ProxyState>) -> Result<()> {
    let shutdown = runtime::shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            accepted = listener.accept() => {
                let (stream, peer) = accepted?;
                debug!("accepted connection from {peer}");
                let service = ProxyService::new(state.clone());
                tokio::spawn(async move {
                    let io = TokioIo::new(stream);
                    if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                        warn!("connection error from {peer}: {err}");
                    }
                });
            }
            _ = &mut shutdown => {
                info!("Shutting down socket server");
                break;
            }
        }
    }

    Ok(())
}
