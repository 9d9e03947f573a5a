//! Config module contains the top-level config for the app.
use std::env;

use config_crate::{Config as RawConfig, ConfigError, Environment, File};

/// Basic settings - HTTP binding address and database DSN
#[derive(Debug, Deserialize, Clone)]
pub struct Server {
    pub host: String,
    pub port: String,
    pub database: String,
    pub thread_count: usize,
    pub db_pool_size: Option<u32>,
}

/// Service configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: Server,
}

/// Creates new app config struct
/// #Examples
/// ```
/// use catalog_lib::config::*;
///
/// let config = Config::new();
/// ```
impl Config {
    pub fn new() -> Result<Self, ConfigError> {
        let mut s = RawConfig::new();
        s.merge(File::with_name("config/base"))?;

        // Note that this file is _optional_
        let env = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());
        s.merge(File::with_name(&format!("config/{}", env)).required(false))?;

        // Add in settings from the environment (with a prefix of CATALOG)
        s.merge(Environment::with_prefix("CATALOG"))?;

        s.try_into()
    }
}
