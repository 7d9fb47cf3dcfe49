//! Engine configuration.
//!
//! The configuration is an explicit value handed to [`crate::SqliteDatabase::new`] and the API constructors. Nothing
//! in the engine reads the environment on its own; call [`EngineConfig::from_env_or_default`] at start-up if you want
//! environment-driven settings.
use std::{env, str::FromStr, time::Duration};

use log::*;
use shop_common::parse_boolean_flag;

const DEFAULT_DATABASE_URL: &str = "sqlite://data/orders.db";
const DEFAULT_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);
const DEFAULT_EVENT_BUFFER_SIZE: usize = 25;

#[derive(Clone, Debug)]
pub struct EngineConfig {
    /// The SQLite connection URL, e.g. `sqlite://data/orders.db`
    pub database_url: String,
    /// The maximum number of pooled connections. Every order attempt holds one connection for the lifetime of its
    /// transaction.
    pub max_connections: u32,
    /// How long a writer waits for the database lock before the attempt fails.
    pub busy_timeout: Duration,
    /// Create the database file if it does not exist yet.
    pub create_if_missing: bool,
    /// Capacity of each event hook channel.
    pub event_buffer_size: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            busy_timeout: DEFAULT_BUSY_TIMEOUT,
            create_if_missing: false,
            event_buffer_size: DEFAULT_EVENT_BUFFER_SIZE,
        }
    }
}

impl EngineConfig {
    pub fn new<S: Into<String>>(database_url: S) -> Self {
        Self { database_url: database_url.into(), ..Default::default() }
    }

    pub fn with_max_connections(mut self, max_connections: u32) -> Self {
        self.max_connections = max_connections;
        self
    }

    pub fn with_busy_timeout(mut self, busy_timeout: Duration) -> Self {
        self.busy_timeout = busy_timeout;
        self
    }

    pub fn with_create_if_missing(mut self, create: bool) -> Self {
        self.create_if_missing = create;
        self
    }

    /// Reads the configuration from `ORDERS_*` environment variables. Missing or malformed values fall back to the
    /// defaults (malformed ones are logged).
    pub fn from_env_or_default() -> Self {
        let defaults = Self::default();
        let database_url = env::var("ORDERS_DATABASE_URL").unwrap_or_else(|_| {
            info!("🪛️ ORDERS_DATABASE_URL is not set. Using the default, {DEFAULT_DATABASE_URL}.");
            defaults.database_url.clone()
        });
        let max_connections = parse_env("ORDERS_DB_MAX_CONNECTIONS", defaults.max_connections);
        let busy_timeout = Duration::from_millis(parse_env(
            "ORDERS_DB_BUSY_TIMEOUT_MS",
            u64::try_from(defaults.busy_timeout.as_millis()).unwrap_or(u64::MAX),
        ));
        let create_if_missing =
            parse_boolean_flag(env::var("ORDERS_DB_CREATE").ok().as_deref(), defaults.create_if_missing);
        let event_buffer_size = parse_env("ORDERS_EVENT_BUFFER_SIZE", defaults.event_buffer_size);
        let config = Self { database_url, max_connections, busy_timeout, create_if_missing, event_buffer_size };
        debug!("🪛️ Engine configuration: {config:?}");
        config
    }
}

fn parse_env<T>(key: &str, default: T) -> T
where
    T: FromStr + std::fmt::Display + Copy,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(s) => s.trim().parse::<T>().unwrap_or_else(|e| {
            error!("🪛️ {s} is not a valid value for {key}. {e} Using the default, {default}, instead.");
            default
        }),
        Err(_) => default,
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn builder_overrides_defaults() {
        let config = EngineConfig::new("sqlite::memory:")
            .with_max_connections(2)
            .with_busy_timeout(Duration::from_millis(250))
            .with_create_if_missing(true);
        assert_eq!(config.database_url, "sqlite::memory:");
        assert_eq!(config.max_connections, 2);
        assert_eq!(config.busy_timeout, Duration::from_millis(250));
        assert!(config.create_if_missing);
        assert_eq!(config.event_buffer_size, DEFAULT_EVENT_BUFFER_SIZE);
    }

    #[test]
    fn malformed_values_fall_back() {
        env::set_var("ORDERS_TEST_PARSE_ENV", "not-a-number");
        assert_eq!(parse_env("ORDERS_TEST_PARSE_ENV", 7u32), 7);
        env::set_var("ORDERS_TEST_PARSE_ENV", " 12 ");
        assert_eq!(parse_env("ORDERS_TEST_PARSE_ENV", 7u32), 12);
        env::remove_var("ORDERS_TEST_PARSE_ENV");
        assert_eq!(parse_env("ORDERS_TEST_PARSE_ENV", 7u32), 7);
    }
}
