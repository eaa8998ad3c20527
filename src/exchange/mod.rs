//! Runtime-independent model of an HTTP exchange.
//!
//! The host runtime's native request/response objects never cross into
//! the dispatcher or the relay; adapters translate them into the
//! canonical types defined here and back out again.
//!
//! Author: kelexine (<https://github.com/kelexine>)

mod request;
mod response;

pub use request::{BodySource, ByteStream, CanonicalRequest};
pub use response::{CanonicalResponse, ResponseBody, CORS_HEADERS};
