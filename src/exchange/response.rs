// Canonical outbound response builder
// Author: kelexine (https://github.com/kelexine)

use super::request::ByteStream;
use crate::error::{ProxyError, Result};
use bytes::Bytes;
use http::header::{HeaderName, HeaderValue, CONTENT_TYPE};
use http::{HeaderMap, StatusCode};
use serde::Serialize;
use serde_json::json;

/// Cross-origin header set applied to every response the proxy emits,
/// preflight and error paths included.
pub const CORS_HEADERS: [(&str, &str); 4] = [
    ("access-control-allow-origin", "*"),
    ("access-control-allow-methods", "POST, GET, OPTIONS"),
    ("access-control-allow-headers", "Content-Type, Authorization"),
    ("access-control-max-age", "86400"),
];

pub enum ResponseBody {
    Empty,
    Full(Bytes),
    Stream(ByteStream),
}

/// Runtime-independent HTTP response, consumed exactly once by the
/// adapter that returns it to the host.
pub struct CanonicalResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: ResponseBody,
}

impl CanonicalResponse {
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: ResponseBody::Empty,
        }
    }

    /// JSON response with Content-Type set.
    pub fn json<T: Serialize>(status: StatusCode, value: &T) -> Result<Self> {
        let bytes = serde_json::to_vec(value)?;
        let mut response = Self::new(status);
        response
            .headers
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        response.body = ResponseBody::Full(Bytes::from(bytes));
        Ok(response)
    }

    /// Error payload in the surface's uniform shape, CORS included.
    pub fn error(status: StatusCode, message: &str) -> Self {
        let body = json!({ "error": message });
        let mut response = Self::new(status);
        response
            .headers
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        response.body = ResponseBody::Full(Bytes::from(body.to_string()));
        response.with_cors()
    }

    pub fn from_error(err: &ProxyError) -> Self {
        Self::error(err.status(), &err.to_string())
    }

    /// Empty CORS-only answer for preflight requests.
    pub fn preflight() -> Self {
        Self::new(StatusCode::NO_CONTENT).with_cors()
    }

    /// Replace the header map wholesale. Used by the relay, which builds
    /// its map from the upstream response.
    pub fn headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    pub fn stream(mut self, stream: ByteStream) -> Self {
        self.body = ResponseBody::Stream(stream);
        self
    }

    /// Merge the CORS set into the response headers, overwriting on
    /// collision (last write wins).
    pub fn with_cors(mut self) -> Self {
        for (name, value) in CORS_HEADERS {
            self.headers
                .insert(HeaderName::from_static(name), HeaderValue::from_static(value));
        }
        self
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn header_map(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn into_parts(self) -> (StatusCode, HeaderMap, ResponseBody) {
        (self.status, self.headers, self.body)
    }
}
