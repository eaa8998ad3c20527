// Canonical inbound request model
// Author: kelexine (https://github.com/kelexine)

use crate::error::{ProxyError, Result};
use bytes::{Bytes, BytesMut};
use futures::{Stream, StreamExt};
use http::{HeaderMap, Method};
use serde_json::Value;
use std::pin::Pin;
use url::Url;

pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes>> + Send + 'static>>;

/// Where an inbound request body comes from. Socket-style hosts buffer
/// before handing over, fetch-style hosts expose a live reader; either
/// way the dispatcher sees one shape.
pub enum BodySource {
    Empty,
    Buffered(Bytes),
    Stream(ByteStream),
}

/// One canonical request per inbound call, owned by the dispatcher
/// invocation that receives it.
pub struct CanonicalRequest {
    method: Method,
    url: Url,
    headers: HeaderMap,
    body: BodySource,
}

impl CanonicalRequest {
    pub fn new(method: Method, url: Url, headers: HeaderMap, body: BodySource) -> Self {
        Self {
            method,
            url,
            headers,
            body,
        }
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn path(&self) -> &str {
        self.url.path()
    }

    /// Case-insensitive single-header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }

    /// Buffer the request body to completion and parse it as JSON.
    ///
    /// This is the single suspension point of a request: GET and OPTIONS
    /// routes never call it, POST routes call it exactly once. Anything
    /// that does not parse, an empty body included, is a `MalformedBody`.
    pub async fn json_body(&mut self) -> Result<Value> {
        let source = std::mem::replace(&mut self.body, BodySource::Empty);
        let bytes = match source {
            BodySource::Empty => Bytes::new(),
            BodySource::Buffered(bytes) => bytes,
            BodySource::Stream(mut stream) => {
                let mut buffer = BytesMut::new();
                while let Some(chunk) = stream.next().await {
                    buffer.extend_from_slice(&chunk?);
                }
                buffer.freeze()
            }
        };

        serde_json::from_slice(&bytes).map_err(|e| ProxyError::MalformedBody(e.to_string()))
    }
}
