use std::str::FromStr;

use anyhow::Result;
use sqlx::{
    query::{Query, QueryAs},
    sqlite::{
        SqliteArguments, SqliteConnectOptions, SqlitePoolOptions, SqliteQueryResult, SqliteRow,
    },
    Error, Pool, Sqlite, Transaction,
};
use tokio::sync::{Mutex, MutexGuard};

use crate::query::{shop_unit, shop_unit_statistic};

pub const IN_MEMORY: &str = ":memory:";

pub struct SqliteDb {
    pool: Pool<Sqlite>,
    write_lock: Mutex<()>,
}

impl SqliteDb {
    /// Opens (creating when missing) the database file at `path`. The special
    /// path `:memory:` keeps one in-memory database alive for the lifetime of
    /// the pool. Every SQLite connection to `:memory:` gets a database of its
    /// own, so that pool holds a single connection whatever `max_connections`
    /// says.
    pub async fn new(path: &str, max_connections: &u32) -> Result<Self> {
        gs_log::info(Some("⚡"), "[SQLite] Initializing component");

        let pool = if path == IN_MEMORY {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect_with(SqliteConnectOptions::from_str("sqlite::memory:")?)
                .await?
        } else {
            SqlitePoolOptions::new()
                .max_connections(*max_connections)
                .connect_with(
                    SqliteConnectOptions::new()
                        .filename(path)
                        .create_if_missing(true),
                )
                .await?
        };

        Self::init(&pool).await?;

        Ok(Self {
            pool,
            write_lock: Mutex::new(()),
        })
    }

    pub async fn execute<'a>(
        &self,
        query: Query<'a, Sqlite, SqliteArguments<'a>>,
    ) -> Result<SqliteQueryResult, Error> {
        query.execute(&self.pool).await
    }

    pub async fn fetch_optional<'a, T: Send + Unpin + for<'r> sqlx::FromRow<'r, SqliteRow>>(
        &self,
        query: QueryAs<'a, Sqlite, T, SqliteArguments<'a>>,
    ) -> Result<Option<T>, Error> {
        query.fetch_optional(&self.pool).await
    }

    pub async fn fetch_all<'a, T: Send + Unpin + for<'r> sqlx::FromRow<'r, SqliteRow>>(
        &self,
        query: QueryAs<'a, Sqlite, T, SqliteArguments<'a>>,
    ) -> Result<Vec<T>, Error> {
        query.fetch_all(&self.pool).await
    }

    pub async fn begin(&self) -> Result<Transaction<'static, Sqlite>, Error> {
        self.pool.begin().await
    }

    pub async fn lock_writes(&self) -> MutexGuard<'_, ()> {
        self.write_lock.lock().await
    }

    async fn init(pool: &Pool<Sqlite>) -> Result<()> {
        shop_unit::init(pool).await?;
        shop_unit_statistic::init(pool).await
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;

    #[tokio::test]
    async fn in_memory_pool_shares_one_database() {
        let db = SqliteDb::new(IN_MEMORY, &4).await.unwrap();
        let ids = [Uuid::from_u128(1)];

        let (a, b, c, d) = tokio::try_join!(
            db.select_many_shop_units_by_ids(&ids),
            db.select_many_shop_units_by_ids(&ids),
            db.select_shop_unit_subtree(&ids[0]),
            db.select_shop_unit_ancestors(&ids),
        )
        .unwrap();
        assert!(a.is_empty() && b.is_empty() && c.is_empty() && d.is_empty());
    }
}
