//! Utility functions and helpers for the infradash proxy.
//!
//! Author: kelexine (<https://github.com/kelexine>)

pub mod logging;
