use gs_db_postgresql::db::PostgresDb;
use gs_db_sqlite::db::SqliteDb;
use tokio::sync::MutexGuard;

pub mod import;
pub mod shop_unit;
pub mod shop_unit_statistic;
pub mod tree;

pub enum Db {
    PostgresqlDb(PostgresDb),
    SqliteDb(SqliteDb),
}

impl Db {
    pub async fn lock_writes(&self) -> MutexGuard<'_, ()> {
        match self {
            Self::PostgresqlDb(db) => db.lock_writes().await,
            Self::SqliteDb(db) => db.lock_writes().await,
        }
    }
}

#[cfg(test)]
pub(crate) mod test_util {
    use chrono::{DateTime, Utc};
    use gs_db_sqlite::db::{SqliteDb, IN_MEMORY};
    use uuid::Uuid;

    use crate::Db;

    pub async fn memory_db() -> Db {
        Db::SqliteDb(SqliteDb::new(IN_MEMORY, &1).await.unwrap())
    }

    pub fn id(n: u128) -> Uuid {
        Uuid::from_u128(n)
    }

    pub fn date(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }
}
