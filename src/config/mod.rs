// Configuration module
// Author: kelexine (https://github.com/kelexine)

mod models;

pub use models::*;

use crate::error::{ProxyError, Result};
use config::{Config, Environment};

impl AppConfig {
    /// Load configuration: environment variables layered over struct
    /// defaults. The variables are read unprefixed so `PORT`, `TOKEN`,
    /// and `HOST` keep the same names under every host runtime.
    pub fn load() -> Result<Self> {
        let config = Config::builder()
            .add_source(
                Config::try_from(&Self::default()).map_err(|e| ProxyError::Config(e.to_string()))?,
            )
            .add_source(Environment::default())
            .build()
            .map_err(|e| ProxyError::Config(e.to_string()))?;

        config
            .try_deserialize()
            .map_err(|e| ProxyError::Config(e.to_string()))
    }
}
