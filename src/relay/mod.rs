// Upstream relay to the DeepInfra chat-completions endpoint
// Author: kelexine (https://github.com/kelexine)

use crate::config::UpstreamConfig;
use crate::error::{ProxyError, Result};
use crate::exchange::CanonicalResponse;
use futures::TryStreamExt;
use http::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::Client;
use serde_json::Value;
use std::sync::OnceLock;
use std::time::Duration;
use tracing::debug;

/// Fixed outbound header bundle. These impersonate the browser session
/// the upstream web endpoint expects and are never derived from the
/// inbound request.
static UPSTREAM_HEADERS: OnceLock<HeaderMap> = OnceLock::new();

fn upstream_headers() -> &'static HeaderMap {
    UPSTREAM_HEADERS.get_or_init(|| {
        let pairs: [(&str, &str); 13] = [
            (
                "user-agent",
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/133.0.0.0 Safari/537.36 Edg/133.0.0.0",
            ),
            ("accept", "text/event-stream"),
            ("accept-encoding", "gzip, deflate, br, zstd"),
            ("content-type", "application/json"),
            ("sec-ch-ua-platform", "Windows"),
            ("x-deepinfra-source", "web-page"),
            (
                "sec-ch-ua",
                "\"Not(A:Brand\";v=\"99\", \"Microsoft Edge\";v=\"133\", \"Chromium\";v=\"133\"",
            ),
            ("sec-ch-ua-mobile", "?0"),
            ("origin", "https://deepinfra.com"),
            ("sec-fetch-site", "same-site"),
            ("sec-fetch-mode", "cors"),
            ("sec-fetch-dest", "empty"),
            ("referer", "https://deepinfra.com/"),
        ];

        let mut headers = HeaderMap::new();
        for (name, value) in pairs {
            headers.insert(HeaderName::from_static(name), HeaderValue::from_static(value));
        }
        headers
    })
}

/// Client for the upstream inference API.
///
/// Issues the outbound chat-completion POST and hands the response body
/// back as a live byte stream so event-stream chunks reach the caller
/// with upstream's boundaries and latency.
pub struct UpstreamRelay {
    client: Client,
    url: String,
}

impl UpstreamRelay {
    /// Build the relay client with connection pooling and keep-alive.
    ///
    /// Deliberately no request or connect timeout: an upstream hang
    /// stalls only its own request task, which is accepted observable
    /// behavior for this surface.
    pub fn new(config: &UpstreamConfig) -> Result<Self> {
        let client = Client::builder()
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Some(Duration::from_secs(60)))
            .tcp_nodelay(true)
            .use_rustls_tls()
            .build()
            .map_err(|e| ProxyError::Config(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            url: config.chat_completions_url.clone(),
        })
    }

    /// Forward a parsed chat-completion body and mirror the upstream
    /// response: status as-is, Content-Type copied (JSON default),
    /// remaining end-to-end headers passed through, body streamed
    /// without buffering.
    pub async fn forward(&self, body: &Value) -> Result<CanonicalResponse> {
        debug!("forwarding chat completion to {}", self.url);

        let response = self
            .client
            .post(&self.url)
            .headers(upstream_headers().clone())
            .json(body)
            .send()
            .await
            .map_err(|e| ProxyError::Upstream(e.to_string()))?;

        let status = response.status();
        debug!("upstream answered {status}");

        let mut headers = HeaderMap::new();
        for (name, value) in response.headers() {
            if is_hop_by_hop_or_framing_header(name.as_str()) {
                continue;
            }
            headers.append(name.clone(), value.clone());
        }
        if !headers.contains_key(CONTENT_TYPE) {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }

        let stream = response
            .bytes_stream()
            .map_err(|e| ProxyError::Upstream(e.to_string()));

        Ok(CanonicalResponse::new(status)
            .headers(headers)
            .stream(Box::pin(stream))
            .with_cors())
    }
}

/// Hop-by-hop and framing headers must not be copied through; the
/// serving layer re-frames the relayed body itself. Everything else
/// (rate-limit info, tracing ids) passes through untouched.
fn is_hop_by_hop_or_framing_header(name: &str) -> bool {
    name.eq_ignore_ascii_case("content-length")
        || name.eq_ignore_ascii_case("transfer-encoding")
        || name.eq_ignore_ascii_case("connection")
        || name.eq_ignore_ascii_case("keep-alive")
        || name.eq_ignore_ascii_case("proxy-authenticate")
        || name.eq_ignore_ascii_case("proxy-authorization")
        || name.eq_ignore_ascii_case("te")
        || name.eq_ignore_ascii_case("trailer")
        || name.eq_ignore_ascii_case("upgrade")
}
