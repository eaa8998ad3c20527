// Route dispatcher: the single entry point for every inbound request
// Author: kelexine (https://github.com/kelexine)

mod auth;

pub use auth::{authorize, AuthConfig};

use crate::error::{ProxyError, Result};
use crate::exchange::{CanonicalRequest, CanonicalResponse};
use crate::models;
use crate::relay::UpstreamRelay;
use crate::runtime::RuntimeKind;
use http::{Method, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

/// Shared per-process state, read-only after startup. The config
/// snapshot is taken once and passed by reference; request handling
/// never reads the ambient environment.
pub struct ProxyState {
    pub runtime: RuntimeKind,
    pub auth: AuthConfig,
    pub relay: UpstreamRelay,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
    pub timestamp: String,
    pub environment: String,
}

/// Dispatch one canonical request. Request-scoped failures never escape
/// this boundary; they are rendered as JSON error responses here.
pub async fn dispatch(request: CanonicalRequest, state: &ProxyState) -> CanonicalResponse {
    match route(request, state).await {
        Ok(response) => response,
        Err(err) => {
            error!("request failed: {err}");
            CanonicalResponse::from_error(&err)
        }
    }
}

/// Route matches are evaluated in fixed priority order; the first match
/// wins and there is no fallthrough.
async fn route(mut request: CanonicalRequest, state: &ProxyState) -> Result<CanonicalResponse> {
    if request.method() == Method::OPTIONS {
        return Ok(CanonicalResponse::preflight());
    }

    if request.method() == Method::GET && request.path() == "/v1/models" {
        if !authorize(&request, &state.auth) {
            return Err(ProxyError::Unauthorized);
        }
        debug!("serving model listing");
        return Ok(CanonicalResponse::json(StatusCode::OK, models::listing())?.with_cors());
    }

    if request.method() == Method::GET && request.path() == "/" {
        let health = HealthResponse {
            status: "ok".to_string(),
            message: "DeepInfra API proxy is running".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            environment: state.runtime.to_string(),
        };
        return Ok(CanonicalResponse::json(StatusCode::OK, &health)?.with_cors());
    }

    if request.method() != Method::POST {
        return Err(ProxyError::MethodNotAllowed);
    }

    if !authorize(&request, &state.auth) {
        return Err(ProxyError::Unauthorized);
    }

    // Any POST path is a chat-completion proxy request; the upstream
    // rejects what it does not recognize.
    let body = request.json_body().await?;
    info!(
        model = body.get("model").and_then(|m| m.as_str()).unwrap_or("unknown"),
        stream = body.get("stream").and_then(|s| s.as_bool()).unwrap_or(false),
        "proxying chat completion"
    );
    state.relay.forward(&body).await
}
