// Edge worker adapter: serve on a listener inherited from the invoker
// Author: kelexine (https://github.com/kelexine)

use crate::config::AppConfig;
use crate::dispatch::ProxyState;
use crate::error::{ProxyError, Result};
use crate::runtime::{self, ProxyService, RuntimeKind};
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto;
use listenfd::ListenFd;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

/// The edge invoker owns the socket lifecycle; the worker only answers
/// requests on the listener it was handed. `PORT` does not apply here.
pub async fn run(state: Arc<ProxyState>, _config: &AppConfig) -> Result<()> {
    let mut fds = ListenFd::from_env();
    let std_listener = fds
        .take_tcp_listener(0)
        .map_err(|e| ProxyError::Config(format!("inherited listener unavailable: {e}")))?
        .ok_or_else(|| {
            ProxyError::Config("LISTEN_FDS is set but no TCP socket was passed".to_string())
        })?;
    std_listener.set_nonblocking(true)?;

    let listener = TcpListener::from_std(std_listener)?;
    runtime::log_endpoints(listener.local_addr()?, RuntimeKind::EdgeWorker);
    serve(listener, state).await
}

/// Serve connections on the inherited listener until shutdown.
pub async fn serve(listener: TcpListener, state: Arc<ProxyState>) -> Result<()> {
    let shutdown = runtime::shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            accepted = listener.accept() => {
                let (stream, peer) = accepted?;
                let service = ProxyService::new(state.clone());
                tokio::spawn(async move {
                    let io = TokioIo::new(stream);
                    let builder = auto::Builder::new(TokioExecutor::new());
                    if let Err(err) = builder.serve_connection(io, service).await {
                        warn!("connection error from {peer}: {err}");
                    }
                });
            }
            _ = &mut shutdown => {
                info!("Shutting down edge worker");
                break;
            }
        }
    }

    Ok(())
}
