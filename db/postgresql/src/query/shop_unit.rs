use ahash::{HashSet, HashSetExt};
use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::{Executor, Pool, Postgres};
use uuid::Uuid;

use crate::{db::PostgresDb, model::shop_unit::ShopUnitModel, query::shop_unit_statistic};

const UPSERT: &str = "INSERT INTO \"shop_units\" (\"id\", \"name\", \"parent_id\", \"kind\", \"price\", \"date\") VALUES ($1, $2, $3, $4, $5, $6) ON CONFLICT (\"id\") DO UPDATE SET \"name\" = EXCLUDED.\"name\", \"parent_id\" = EXCLUDED.\"parent_id\", \"kind\" = EXCLUDED.\"kind\", \"price\" = EXCLUDED.\"price\", \"date\" = EXCLUDED.\"date\"";
const SELECT: &str = "SELECT \"id\", \"name\", \"parent_id\", \"kind\", \"price\", \"date\" FROM \"shop_units\" WHERE \"id\" = $1";
const SELECT_MANY_BY_IDS: &str = "SELECT \"id\", \"name\", \"parent_id\", \"kind\", \"price\", \"date\" FROM \"shop_units\" WHERE \"id\" = ANY($1)";
const SELECT_SUBTREE: &str = "WITH RECURSIVE \"subtree\" AS (SELECT \"id\", \"name\", \"parent_id\", \"kind\", \"price\", \"date\" FROM \"shop_units\" WHERE \"id\" = $1 UNION ALL SELECT u.\"id\", u.\"name\", u.\"parent_id\", u.\"kind\", u.\"price\", u.\"date\" FROM \"shop_units\" u JOIN \"subtree\" s ON u.\"parent_id\" = s.\"id\") SELECT \"id\", \"name\", \"parent_id\", \"kind\", \"price\", \"date\" FROM \"subtree\"";
const SELECT_ANCESTORS: &str = "WITH RECURSIVE \"ancestors\" AS (SELECT \"id\", \"name\", \"parent_id\", \"kind\", \"price\", \"date\" FROM \"shop_units\" WHERE \"id\" = ANY($1) UNION SELECT u.\"id\", u.\"name\", u.\"parent_id\", u.\"kind\", u.\"price\", u.\"date\" FROM \"shop_units\" u JOIN \"ancestors\" a ON u.\"id\" = a.\"parent_id\") SELECT \"id\", \"name\", \"parent_id\", \"kind\", \"price\", \"date\" FROM \"ancestors\"";
const SELECT_PARENT_IDS: &str = "SELECT \"parent_id\" FROM \"shop_units\" WHERE \"id\" = ANY($1) AND \"parent_id\" IS NOT NULL";
const SELECT_ANCESTOR_IDS: &str = "WITH RECURSIVE \"ancestors\" AS (SELECT \"id\", \"parent_id\" FROM \"shop_units\" WHERE \"id\" = ANY($1) UNION SELECT u.\"id\", u.\"parent_id\" FROM \"shop_units\" u JOIN \"ancestors\" a ON u.\"id\" = a.\"parent_id\") SELECT \"id\" FROM \"ancestors\"";
const SELECT_DESCENDANT_PRICES: &str = "WITH RECURSIVE \"subtree\" AS (SELECT \"id\", \"price\" FROM \"shop_units\" WHERE \"parent_id\" = $1 UNION ALL SELECT u.\"id\", u.\"price\" FROM \"shop_units\" u JOIN \"subtree\" s ON u.\"parent_id\" = s.\"id\") SELECT \"price\" FROM \"subtree\" WHERE \"price\" IS NOT NULL";
const UPDATE_DATE_MANY: &str = "UPDATE \"shop_units\" SET \"date\" = $1 WHERE \"id\" = ANY($2)";
const DELETE_SUBTREE: &str = "WITH RECURSIVE \"subtree\" AS (SELECT \"id\" FROM \"shop_units\" WHERE \"id\" = $1 UNION ALL SELECT u.\"id\" FROM \"shop_units\" u JOIN \"subtree\" s ON u.\"parent_id\" = s.\"id\") DELETE FROM \"shop_units\" WHERE \"id\" IN (SELECT \"id\" FROM \"subtree\")";

pub async fn init(pool: &Pool<Postgres>) -> Result<()> {
    gs_log::info(Some("🔧"), "[PostgreSQL] Setting up shop_units table");

    pool.execute("CREATE TABLE IF NOT EXISTS \"shop_units\" (\"id\" uuid, \"name\" text NOT NULL, \"parent_id\" uuid, \"kind\" text NOT NULL, \"price\" bigint, \"date\" timestamptz NOT NULL, PRIMARY KEY (\"id\"))").await?;
    pool.execute("CREATE INDEX IF NOT EXISTS \"shop_units_parent_id\" ON \"shop_units\" (\"parent_id\")").await?;

    tokio::try_join!(
        pool.prepare(UPSERT),
        pool.prepare(SELECT),
        pool.prepare(SELECT_MANY_BY_IDS),
        pool.prepare(SELECT_SUBTREE),
        pool.prepare(SELECT_ANCESTORS),
        pool.prepare(SELECT_PARENT_IDS),
        pool.prepare(SELECT_ANCESTOR_IDS),
        pool.prepare(SELECT_DESCENDANT_PRICES),
        pool.prepare(UPDATE_DATE_MANY),
        pool.prepare(DELETE_SUBTREE),
    )?;

    Ok(())
}

impl PostgresDb {
    pub async fn select_shop_unit(&self, id: &Uuid) -> Result<Option<ShopUnitModel>> {
        Ok(self.fetch_optional(sqlx::query_as(SELECT).bind(id)).await?)
    }

    pub async fn select_many_shop_units_by_ids(&self, ids: &[Uuid]) -> Result<Vec<ShopUnitModel>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        Ok(self
            .fetch_all(sqlx::query_as(SELECT_MANY_BY_IDS).bind(ids))
            .await?)
    }

    /// The unit with `id` followed by every descendant, in no particular order.
    pub async fn select_shop_unit_subtree(&self, id: &Uuid) -> Result<Vec<ShopUnitModel>> {
        Ok(self.fetch_all(sqlx::query_as(SELECT_SUBTREE).bind(id)).await?)
    }

    /// The units with `ids` together with all of their stored ancestors.
    pub async fn select_shop_unit_ancestors(&self, ids: &[Uuid]) -> Result<Vec<ShopUnitModel>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        Ok(self
            .fetch_all(sqlx::query_as(SELECT_ANCESTORS).bind(ids))
            .await?)
    }

    /// Writes one import batch atomically: upserts the units, re-dates every
    /// ancestor on the old and new parent chains, then snapshots all touched
    /// units with category prices taken from the resulting tree.
    pub async fn import_shop_units(
        &self,
        units: &[ShopUnitModel],
        date: &DateTime<Utc>,
        average_price: fn(&[i64]) -> Option<i64>,
    ) -> Result<()> {
        let ids: Vec<Uuid> = units.iter().map(|unit| *unit.id()).collect();

        let mut tx = self.begin().await?;

        let previous_parent_ids: Vec<Uuid> = sqlx::query_scalar(SELECT_PARENT_IDS)
            .bind(&ids)
            .fetch_all(&mut *tx)
            .await?;

        for unit in units {
            sqlx::query(UPSERT)
                .bind(unit.id())
                .bind(unit.name())
                .bind(unit.parent_id())
                .bind(unit.kind())
                .bind(unit.price())
                .bind(unit.date())
                .execute(&mut *tx)
                .await?;
        }

        let mut parent_ids: HashSet<Uuid> = previous_parent_ids.into_iter().collect();
        parent_ids.extend(units.iter().filter_map(|unit| *unit.parent_id()));

        let mut touched_ids = HashSet::with_capacity(ids.len());
        touched_ids.extend(ids.iter().copied());

        if !parent_ids.is_empty() {
            let parent_ids: Vec<Uuid> = parent_ids.into_iter().collect();
            let ancestor_ids: Vec<Uuid> = sqlx::query_scalar(SELECT_ANCESTOR_IDS)
                .bind(&parent_ids)
                .fetch_all(&mut *tx)
                .await?;
            sqlx::query(UPDATE_DATE_MANY)
                .bind(date)
                .bind(&ancestor_ids)
                .execute(&mut *tx)
                .await?;
            touched_ids.extend(ancestor_ids);
        }

        for id in &touched_ids {
            let unit: ShopUnitModel = sqlx::query_as(SELECT).bind(id).fetch_one(&mut *tx).await?;
            let price = match unit.price() {
                Some(price) => Some(*price),
                None => {
                    let prices = sqlx::query_scalar::<_, i64>(SELECT_DESCENDANT_PRICES)
                        .bind(id)
                        .fetch_all(&mut *tx)
                        .await?;
                    average_price(&prices)
                }
            };
            sqlx::query(shop_unit_statistic::INSERT)
                .bind(Uuid::now_v7())
                .bind(unit.id())
                .bind(unit.name())
                .bind(unit.parent_id())
                .bind(unit.kind())
                .bind(price)
                .bind(unit.date())
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        Ok(())
    }

    /// Removes the unit, its subtree and their statistics in one transaction.
    pub async fn delete_shop_unit_subtree(&self, id: &Uuid) -> Result<()> {
        let mut tx = self.begin().await?;

        sqlx::query(shop_unit_statistic::DELETE_SUBTREE)
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query(DELETE_SUBTREE)
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(())
    }
}
