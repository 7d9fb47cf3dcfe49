//! # SQLite Database methods
//!
//! This module contains "low-level" SQLite database interactions.
//!
//! All these interaction are maintained by simple functions (rather than stateful structs) that accept a
//! `&mut SqliteConnection` argument. Callers can obtain a connection from a pool,
//! or create an atomic transaction as the need arises and call through to the functions without any other changes.
use std::{str::FromStr, time::Duration};

use log::info;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
    Error as SqlxError,
    SqlitePool,
};

pub mod buyers;
pub mod orders;
pub mod products;

/// Options for opening the connection pool.
#[derive(Debug, Clone, Copy)]
pub struct PoolSettings {
    pub max_connections: u32,
    pub busy_timeout: Duration,
    pub create_if_missing: bool,
}

/// Opens a connection pool for the given URL.
///
/// Connections use WAL journalling and enforce foreign keys. Writers that find the database locked wait for up to
/// `busy_timeout` before giving up.
pub async fn new_pool(url: &str, settings: PoolSettings) -> Result<SqlitePool, SqlxError> {
    let options = SqliteConnectOptions::from_str(url)?
        .create_if_missing(settings.create_if_missing)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(settings.busy_timeout)
        .foreign_keys(true);
    let pool = SqlitePoolOptions::new().max_connections(settings.max_connections).connect_with(options).await?;
    info!("🗃️ Opened SQLite pool for {url} with up to {} connections", settings.max_connections);
    Ok(pool)
}
