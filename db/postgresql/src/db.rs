use anyhow::Result;
use sqlx::{
    postgres::{PgArguments, PgPoolOptions, PgQueryResult, PgRow},
    query::{Query, QueryAs},
    Error, Pool, Postgres, Transaction,
};
use tokio::sync::{Mutex, MutexGuard};

use crate::query::{shop_unit, shop_unit_statistic};

pub struct PostgresDb {
    pool: Pool<Postgres>,
    write_lock: Mutex<()>,
}

impl PostgresDb {
    pub async fn new(
        user: &str,
        password: &str,
        host: &str,
        port: &str,
        db_name: &str,
        max_connections: &u32,
    ) -> Result<Self> {
        gs_log::info(Some("⚡"), "[PostgreSQL] Initializing component");

        let url = format!("postgres://{user}:{password}@{host}:{port}/{db_name}");
        let pool = PgPoolOptions::new()
            .max_connections(*max_connections)
            .connect(&url)
            .await?;

        Self::init(&pool).await?;

        Ok(Self {
            pool,
            write_lock: Mutex::new(()),
        })
    }

    pub async fn execute(
        &self,
        query: Query<'_, Postgres, PgArguments>,
    ) -> Result<PgQueryResult, Error> {
        query.execute(&self.pool).await
    }

    pub async fn fetch_optional<T: Send + Unpin + for<'r> sqlx::FromRow<'r, PgRow>>(
        &self,
        query: QueryAs<'_, Postgres, T, PgArguments>,
    ) -> Result<Option<T>, Error> {
        query.fetch_optional(&self.pool).await
    }

    pub async fn fetch_all<T: Send + Unpin + for<'r> sqlx::FromRow<'r, PgRow>>(
        &self,
        query: QueryAs<'_, Postgres, T, PgArguments>,
    ) -> Result<Vec<T>, Error> {
        query.fetch_all(&self.pool).await
    }

    pub async fn begin(&self) -> Result<Transaction<'static, Postgres>, Error> {
        self.pool.begin().await
    }

    /// Serializes writers inside this process. Hold the guard across the
    /// validation reads and the write transaction of one operation.
    pub async fn lock_writes(&self) -> MutexGuard<'_, ()> {
        self.write_lock.lock().await
    }

    async fn init(pool: &Pool<Postgres>) -> Result<()> {
        shop_unit::init(pool).await?;
        shop_unit_statistic::init(pool).await
    }
}
