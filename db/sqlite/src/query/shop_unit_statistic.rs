use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::{Executor, Pool, Sqlite};
use uuid::Uuid;

use crate::{
    db::SqliteDb,
    model::{shop_unit::ShopUnitModel, shop_unit_statistic::ShopUnitStatisticModel},
};

pub(crate) const INSERT: &str = "INSERT INTO \"shop_unit_statistics\" (\"statistic_id\", \"unit_id\", \"name\", \"parent_id\", \"kind\", \"price\", \"date\") VALUES (?, ?, ?, ?, ?, ?, ?)";
const SELECT_MANY_BY_UNIT_ID: &str = "SELECT \"statistic_id\", \"unit_id\", \"name\", \"parent_id\", \"kind\", \"price\", \"date\" FROM \"shop_unit_statistics\" WHERE \"unit_id\" = ?1 AND (?2 IS NULL OR \"date\" >= ?2) AND (?3 IS NULL OR \"date\" < ?3) ORDER BY \"date\" ASC, \"statistic_id\" ASC";
const SELECT_SALES: &str = "SELECT u.\"id\", u.\"name\", u.\"parent_id\", u.\"kind\", u.\"price\", u.\"date\" FROM \"shop_units\" u JOIN (SELECT \"unit_id\" FROM \"shop_unit_statistics\" WHERE \"kind\" = 'OFFER' AND \"date\" <= ?1 GROUP BY \"unit_id\" HAVING COUNT(*) > 1 AND MAX(\"date\") >= ?2) s ON u.\"id\" = s.\"unit_id\" ORDER BY u.\"id\" ASC";
pub(crate) const DELETE_SUBTREE: &str = "WITH RECURSIVE \"subtree\" AS (SELECT \"id\" FROM \"shop_units\" WHERE \"id\" = ? UNION ALL SELECT u.\"id\" FROM \"shop_units\" u JOIN \"subtree\" s ON u.\"parent_id\" = s.\"id\") DELETE FROM \"shop_unit_statistics\" WHERE \"unit_id\" IN (SELECT \"id\" FROM \"subtree\")";

pub async fn init(pool: &Pool<Sqlite>) -> Result<()> {
    gs_log::info(Some("🔧"), "[SQLite] Setting up shop_unit_statistics table");

    pool.execute("CREATE TABLE IF NOT EXISTS \"shop_unit_statistics\" (\"statistic_id\" blob, \"unit_id\" blob NOT NULL, \"name\" text NOT NULL, \"parent_id\" blob, \"kind\" text NOT NULL, \"price\" integer, \"date\" datetime NOT NULL, PRIMARY KEY (\"statistic_id\"))").await?;
    pool.execute("CREATE INDEX IF NOT EXISTS \"shop_unit_statistics_unit_id_date\" ON \"shop_unit_statistics\" (\"unit_id\", \"date\")").await?;

    pool.prepare(INSERT).await?;
    pool.prepare(SELECT_MANY_BY_UNIT_ID).await?;
    pool.prepare(SELECT_SALES).await?;
    pool.prepare(DELETE_SUBTREE).await?;

    Ok(())
}

impl SqliteDb {
    pub async fn select_many_shop_unit_statistics_by_unit_id(
        &self,
        unit_id: &Uuid,
        date_start: &Option<DateTime<Utc>>,
        date_end: &Option<DateTime<Utc>>,
    ) -> Result<Vec<ShopUnitStatisticModel>> {
        Ok(self
            .fetch_all(
                sqlx::query_as(SELECT_MANY_BY_UNIT_ID)
                    .bind(unit_id)
                    .bind(date_start)
                    .bind(date_end),
            )
            .await?)
    }

    pub async fn select_many_shop_unit_sales(
        &self,
        date_since: &DateTime<Utc>,
        date_to: &DateTime<Utc>,
    ) -> Result<Vec<ShopUnitModel>> {
        Ok(self
            .fetch_all(sqlx::query_as(SELECT_SALES).bind(date_to).bind(date_since))
            .await?)
    }
}
