use ahash::{HashSet, HashSetExt};
use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::{Executor, Pool, Sqlite};
use uuid::Uuid;

use crate::{
    db::SqliteDb,
    model::shop_unit::ShopUnitModel,
    query::{placeholders, shop_unit_statistic},
};

const UPSERT: &str = "INSERT INTO \"shop_units\" (\"id\", \"name\", \"parent_id\", \"kind\", \"price\", \"date\") VALUES (?, ?, ?, ?, ?, ?) ON CONFLICT (\"id\") DO UPDATE SET \"name\" = excluded.\"name\", \"parent_id\" = excluded.\"parent_id\", \"kind\" = excluded.\"kind\", \"price\" = excluded.\"price\", \"date\" = excluded.\"date\"";
const SELECT: &str = "SELECT \"id\", \"name\", \"parent_id\", \"kind\", \"price\", \"date\" FROM \"shop_units\" WHERE \"id\" = ?";
const SELECT_SUBTREE: &str = "WITH RECURSIVE \"subtree\" AS (SELECT \"id\", \"name\", \"parent_id\", \"kind\", \"price\", \"date\" FROM \"shop_units\" WHERE \"id\" = ? UNION ALL SELECT u.\"id\", u.\"name\", u.\"parent_id\", u.\"kind\", u.\"price\", u.\"date\" FROM \"shop_units\" u JOIN \"subtree\" s ON u.\"parent_id\" = s.\"id\") SELECT \"id\", \"name\", \"parent_id\", \"kind\", \"price\", \"date\" FROM \"subtree\"";
const SELECT_DESCENDANT_PRICES: &str = "WITH RECURSIVE \"subtree\" AS (SELECT \"id\", \"price\" FROM \"shop_units\" WHERE \"parent_id\" = ? UNION ALL SELECT u.\"id\", u.\"price\" FROM \"shop_units\" u JOIN \"subtree\" s ON u.\"parent_id\" = s.\"id\") SELECT \"price\" FROM \"subtree\" WHERE \"price\" IS NOT NULL";
const DELETE_SUBTREE: &str = "WITH RECURSIVE \"subtree\" AS (SELECT \"id\" FROM \"shop_units\" WHERE \"id\" = ? UNION ALL SELECT u.\"id\" FROM \"shop_units\" u JOIN \"subtree\" s ON u.\"parent_id\" = s.\"id\") DELETE FROM \"shop_units\" WHERE \"id\" IN (SELECT \"id\" FROM \"subtree\")";

fn select_many_by_ids(len: usize) -> String {
    format!("SELECT \"id\", \"name\", \"parent_id\", \"kind\", \"price\", \"date\" FROM \"shop_units\" WHERE \"id\" IN ({})", placeholders(len))
}

fn select_ancestors(len: usize) -> String {
    format!("WITH RECURSIVE \"ancestors\" AS (SELECT \"id\", \"name\", \"parent_id\", \"kind\", \"price\", \"date\" FROM \"shop_units\" WHERE \"id\" IN ({}) UNION SELECT u.\"id\", u.\"name\", u.\"parent_id\", u.\"kind\", u.\"price\", u.\"date\" FROM \"shop_units\" u JOIN \"ancestors\" a ON u.\"id\" = a.\"parent_id\") SELECT \"id\", \"name\", \"parent_id\", \"kind\", \"price\", \"date\" FROM \"ancestors\"", placeholders(len))
}

fn select_parent_ids(len: usize) -> String {
    format!("SELECT \"parent_id\" FROM \"shop_units\" WHERE \"id\" IN ({}) AND \"parent_id\" IS NOT NULL", placeholders(len))
}

fn select_ancestor_ids(len: usize) -> String {
    format!("WITH RECURSIVE \"ancestors\" AS (SELECT \"id\", \"parent_id\" FROM \"shop_units\" WHERE \"id\" IN ({}) UNION SELECT u.\"id\", u.\"parent_id\" FROM \"shop_units\" u JOIN \"ancestors\" a ON u.\"id\" = a.\"parent_id\") SELECT \"id\" FROM \"ancestors\"", placeholders(len))
}

fn update_date_many(len: usize) -> String {
    format!("UPDATE \"shop_units\" SET \"date\" = ? WHERE \"id\" IN ({})", placeholders(len))
}

pub async fn init(pool: &Pool<Sqlite>) -> Result<()> {
    gs_log::info(Some("🔧"), "[SQLite] Setting up shop_units table");

    pool.execute("CREATE TABLE IF NOT EXISTS \"shop_units\" (\"id\" blob, \"name\" text NOT NULL, \"parent_id\" blob, \"kind\" text NOT NULL, \"price\" integer, \"date\" datetime NOT NULL, PRIMARY KEY (\"id\"))").await?;
    pool.execute("CREATE INDEX IF NOT EXISTS \"shop_units_parent_id\" ON \"shop_units\" (\"parent_id\")").await?;

    pool.prepare(UPSERT).await?;
    pool.prepare(SELECT).await?;
    pool.prepare(SELECT_SUBTREE).await?;
    pool.prepare(SELECT_DESCENDANT_PRICES).await?;
    pool.prepare(DELETE_SUBTREE).await?;

    Ok(())
}

impl SqliteDb {
    pub async fn select_shop_unit(&self, id: &Uuid) -> Result<Option<ShopUnitModel>> {
        Ok(self.fetch_optional(sqlx::query_as(SELECT).bind(id)).await?)
    }

    pub async fn select_many_shop_units_by_ids(&self, ids: &[Uuid]) -> Result<Vec<ShopUnitModel>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let sql = select_many_by_ids(ids.len());
        let mut query = sqlx::query_as(&sql);
        for id in ids {
            query = query.bind(id);
        }
        Ok(self.fetch_all(query).await?)
    }

    pub async fn select_shop_unit_subtree(&self, id: &Uuid) -> Result<Vec<ShopUnitModel>> {
        Ok(self.fetch_all(sqlx::query_as(SELECT_SUBTREE).bind(id)).await?)
    }

    pub async fn select_shop_unit_ancestors(&self, ids: &[Uuid]) -> Result<Vec<ShopUnitModel>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let sql = select_ancestors(ids.len());
        let mut query = sqlx::query_as(&sql);
        for id in ids {
            query = query.bind(id);
        }
        Ok(self.fetch_all(query).await?)
    }

    pub async fn import_shop_units(
        &self,
        units: &[ShopUnitModel],
        date: &DateTime<Utc>,
        average_price: fn(&[i64]) -> Option<i64>,
    ) -> Result<()> {
        if units.is_empty() {
            return Ok(());
        }
        let ids: Vec<Uuid> = units.iter().map(|unit| *unit.id()).collect();

        let mut tx = self.begin().await?;

        let sql = select_parent_ids(ids.len());
        let mut query = sqlx::query_scalar::<_, Uuid>(&sql);
        for id in &ids {
            query = query.bind(id);
        }
        let previous_parent_ids = query.fetch_all(&mut *tx).await?;

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

            let sql = select_ancestor_ids(parent_ids.len());
            let mut query = sqlx::query_scalar::<_, Uuid>(&sql);
            for id in &parent_ids {
                query = query.bind(id);
            }
            let ancestor_ids = query.fetch_all(&mut *tx).await?;

            if !ancestor_ids.is_empty() {
                let sql = update_date_many(ancestor_ids.len());
                let mut query = sqlx::query(&sql).bind(date);
                for id in &ancestor_ids {
                    query = query.bind(id);
                }
                query.execute(&mut *tx).await?;
            }

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
