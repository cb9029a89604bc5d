//! Database layer: SQLite pool bootstrap and the write-transaction helper.
//!
//! All inventory-critical writes go through either a single conditional
//! statement (`UPDATE ... WHERE guard`) or an [`ImmediateTxn`], which takes
//! SQLite's write lock up front (`BEGIN IMMEDIATE`). Together with the
//! busy timeout this serializes check-then-act sequences per database, so
//! two checkouts can never both observe stale available stock.

pub mod repository;

use std::str::FromStr;
use std::time::Duration;

use sqlx::pool::PoolConnection;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{Sqlite, SqliteConnection, SqlitePool};

use repository::{RepoError, RepoResult};

/// Open the pool and run embedded migrations.
pub async fn init_pool(database_url: &str) -> anyhow::Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(5))
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(8)
        .connect_with(options)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    tracing::info!(database_url, "Database ready");
    Ok(pool)
}

/// A connection holding SQLite's write lock.
///
/// Every path through callers must end in [`commit`](Self::commit) or
/// [`rollback`](Self::rollback); a transaction dropped open detaches its
/// connection from the pool instead of returning it poisoned.
pub struct ImmediateTxn {
    conn: Option<PoolConnection<Sqlite>>,
    done: bool,
}

impl ImmediateTxn {
    pub async fn begin(pool: &SqlitePool) -> RepoResult<Self> {
        let mut conn = pool.acquire().await.map_err(RepoError::from)?;
        sqlx::query("BEGIN IMMEDIATE")
            .execute(&mut *conn)
            .await
            .map_err(RepoError::from)?;
        Ok(Self {
            conn: Some(conn),
            done: false,
        })
    }

    /// The underlying connection, for running statements inside the
    /// transaction.
    pub fn conn(&mut self) -> &mut SqliteConnection {
        self.conn
            .as_mut()
            .expect("transaction connection already taken")
    }

    pub async fn commit(mut self) -> RepoResult<()> {
        sqlx::query("COMMIT")
            .execute(&mut **self.conn.as_mut().expect("transaction connection already taken"))
            .await
            .map_err(RepoError::from)?;
        self.done = true;
        Ok(())
    }

    pub async fn rollback(mut self) -> RepoResult<()> {
        sqlx::query("ROLLBACK")
            .execute(&mut **self.conn.as_mut().expect("transaction connection already taken"))
            .await
            .map_err(RepoError::from)?;
        self.done = true;
        Ok(())
    }
}

impl Drop for ImmediateTxn {
    fn drop(&mut self) {
        if !self.done
            && let Some(conn) = self.conn.take()
        {
            // Closing the connection aborts the open transaction.
            tracing::warn!("write transaction dropped without commit/rollback; closing connection");
            drop(conn.detach());
        }
    }
}
