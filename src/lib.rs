// infradash - Runtime-portable OpenAI-compatible proxy for the DeepInfra inference API
// Author: kelexine (https://github.com/kelexine)

pub mod cli;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod exchange;
pub mod models;
pub mod relay;
pub mod runtime;
pub mod utils;
