//! # PostgreSQL Store
//!
//! Typed data-access layer over a `deadpool_postgres` pool. One method per
//! operation the dashboard and public pages need; callers follow a
//! refetch-after-write strategy, so mutations return ids (or nothing) and
//! the state containers reload the full tree afterwards.
//!
//! Atomicity is per statement: multi-row writes (a batch plus its default
//! subjects, for instance) are separate round trips. The only transaction
//! in this layer is the backup restore, which replaces the whole tree.

mod backups;
mod content;
mod live_classes;
mod settings;
mod users;

use deadpool_postgres::{
    Config as PoolConfig, ManagerConfig, Object, Pool, RecyclingMethod, Runtime,
};
use thiserror::Error;
use tokio_postgres::NoTls;

const SCHEMA_SQL: &str = include_str!("schema.sql");

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to get connection from pool: {0}")]
    Pool(#[from] deadpool_postgres::PoolError),
    #[error("database error: {0}")]
    Db(#[from] tokio_postgres::Error),
    #[error("stored data could not be decoded: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("invalid store configuration: {0}")]
    Config(String),
}

/// Shared handle to the database. Cheap to clone; all clones use the same
/// underlying pool.
#[derive(Clone)]
pub struct Store {
    pool: Pool,
}

impl Store {
    /// Creates the connection pool for the given database URL.
    pub fn connect(db_url: &str) -> Result<Self, StoreError> {
        let mut cfg = PoolConfig::new();
        cfg.url = Some(db_url.to_string());
        cfg.manager = Some(ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        });

        let pool = cfg
            .create_pool(Some(Runtime::Tokio1), NoTls)
            .map_err(|e| StoreError::Config(format!("failed to create database pool: {}", e)))?;

        Ok(Self { pool })
    }

    /// Applies `schema.sql`. Safe to run against an existing database.
    pub async fn init_schema(&self) -> Result<(), StoreError> {
        let client = self.client().await?;
        client.batch_execute(SCHEMA_SQL).await?;
        tracing::info!("database schema ensured");
        Ok(())
    }

    pub(crate) async fn client(&self) -> Result<Object, StoreError> {
        Ok(self.pool.get().await?)
    }
}
