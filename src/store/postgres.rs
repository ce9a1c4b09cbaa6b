//! Postgres Store
//!
//! Scoped connection handling: connect, run inside a transaction, commit or
//! roll back, close. No pooling and no retries.

use async_trait::async_trait;
use futures::future::BoxFuture;
use sqlx::postgres::{PgConnectOptions, PgConnection};
use sqlx::Connection;
use tracing::{error, warn};

use crate::config::DatabaseConfig;
use crate::store::{RecordStore, StoreResult, TestRecord};

/// Relational store backed by Postgres.
#[derive(Debug, Clone)]
pub struct PgStore {
    config: DatabaseConfig,
}

impl PgStore {
    pub fn new(config: DatabaseConfig) -> Self {
        Self { config }
    }

    /// Builds connect options, resolved fresh for each acquisition.
    ///
    /// Unset parameters fall back to the driver defaults (`PG*` variables).
    fn connect_options(&self) -> PgConnectOptions {
        let mut options = PgConnectOptions::new().port(self.config.port);
        if let Some(host) = &self.config.host {
            options = options.host(host);
        }
        if let Some(name) = &self.config.name {
            options = options.database(name);
        }
        if let Some(user) = &self.config.user {
            options = options.username(user);
        }
        if let Some(password) = &self.config.password {
            options = options.password(password);
        }
        options
    }

    /// Runs `f` on a freshly opened connection inside a transaction.
    ///
    /// Commits when `f` succeeds, rolls back and returns the error when it
    /// fails. The connection is closed on every path.
    pub async fn with_connection<T, F>(&self, f: F) -> StoreResult<T>
    where
        T: Send,
        F: for<'c> FnOnce(&'c mut PgConnection) -> BoxFuture<'c, Result<T, sqlx::Error>> + Send,
    {
        let mut conn = PgConnection::connect_with(&self.connect_options())
            .await
            .inspect_err(|e| error!("DB Error: {}", e))?;

        let outcome = run_in_transaction(&mut conn, f).await;

        if let Err(e) = conn.close().await {
            warn!("Failed to close DB connection: {}", e);
        }

        outcome
    }
}

async fn run_in_transaction<T, F>(conn: &mut PgConnection, f: F) -> StoreResult<T>
where
    F: for<'c> FnOnce(&'c mut PgConnection) -> BoxFuture<'c, Result<T, sqlx::Error>>,
{
    let mut tx = conn.begin().await?;

    match f(&mut *tx).await {
        Ok(value) => {
            tx.commit().await?;
            Ok(value)
        }
        Err(e) => {
            error!("DB Error: {}", e);
            if let Err(rollback_err) = tx.rollback().await {
                warn!("Rollback failed: {}", rollback_err);
            }
            Err(e.into())
        }
    }
}

#[async_trait]
impl RecordStore for PgStore {
    async fn ping(&self) -> StoreResult<()> {
        self.with_connection(|_conn| Box::pin(async { Ok(()) }))
            .await
    }

    async fn list_records(&self, limit: i64) -> StoreResult<Vec<TestRecord>> {
        self.with_connection(move |conn| {
            Box::pin(async move {
                sqlx::query_as::<_, TestRecord>(
                    "SELECT id, name, value, created_at FROM test_table LIMIT $1",
                )
                .bind(limit)
                .fetch_all(conn)
                .await
            })
        })
        .await
    }

    async fn insert_record(&self, name: &str, value: &str) -> StoreResult<TestRecord> {
        let name = name.to_string();
        let value = value.to_string();

        self.with_connection(move |conn| {
            Box::pin(async move {
                sqlx::query_as::<_, TestRecord>(
                    r#"
                    INSERT INTO test_table (name, value)
                    VALUES ($1, $2)
                    RETURNING id, name, value, created_at
                    "#,
                )
                .bind(name)
                .bind(value)
                .fetch_one(conn)
                .await
            })
        })
        .await
    }

    async fn count_records(&self) -> StoreResult<i64> {
        self.with_connection(|conn| {
            Box::pin(async move {
                sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM test_table")
                    .fetch_one(conn)
                    .await
            })
        })
        .await
    }
}
