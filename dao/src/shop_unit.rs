use std::str::FromStr;

use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use gs_db_postgresql::model::shop_unit::ShopUnitModel as ShopUnitPostgresModel;
use gs_db_sqlite::model::shop_unit::ShopUnitModel as ShopUnitSqliteModel;
use gs_error::Error;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use uuid::Uuid;

use crate::{
    tree::{PriceTally, ShopUnitTreeDao},
    Db,
};

/// Stored and sent over the wire in upper case: `OFFER`, `CATEGORY`.
#[derive(
    Deserialize, Serialize, Display, EnumString, PartialEq, Eq, Clone, Copy, Debug, Hash,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ShopUnitType {
    Offer,
    Category,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ShopUnitDao {
    id: Uuid,
    name: String,
    parent_id: Option<Uuid>,
    kind: ShopUnitType,
    price: Option<i64>,
    date: DateTime<Utc>,
}

impl ShopUnitDao {
    pub fn new(
        id: &Uuid,
        name: &str,
        parent_id: &Option<Uuid>,
        kind: &ShopUnitType,
        price: &Option<i64>,
        date: &DateTime<Utc>,
    ) -> Self {
        Self {
            id: *id,
            name: name.to_owned(),
            parent_id: *parent_id,
            kind: *kind,
            price: *price,
            date: *date,
        }
    }

    pub fn id(&self) -> &Uuid {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent_id(&self) -> &Option<Uuid> {
        &self.parent_id
    }

    pub fn kind(&self) -> &ShopUnitType {
        &self.kind
    }

    pub fn price(&self) -> &Option<i64> {
        &self.price
    }

    pub fn date(&self) -> &DateTime<Utc> {
        &self.date
    }

    pub(crate) fn set_price(&mut self, price: &Option<i64>) {
        self.price = *price;
    }

    pub async fn db_select(db: &Db, id: &Uuid) -> Result<Self> {
        let model = match db {
            Db::PostgresqlDb(db) => db
                .select_shop_unit(id)
                .await?
                .map(|model| Self::from_postgresdb_model(&model))
                .transpose()?,
            Db::SqliteDb(db) => db
                .select_shop_unit(id)
                .await?
                .map(|model| Self::from_sqlitedb_model(&model))
                .transpose()?,
        };
        match model {
            Some(model) => Ok(model),
            None => Err(Error::not_found(format!("Shop unit {id} does not exist")).into()),
        }
    }

    pub async fn db_select_many_by_ids(db: &Db, ids: &[Uuid]) -> Result<Vec<Self>> {
        match db {
            Db::PostgresqlDb(db) => db
                .select_many_shop_units_by_ids(ids)
                .await?
                .iter()
                .map(Self::from_postgresdb_model)
                .collect(),
            Db::SqliteDb(db) => db
                .select_many_shop_units_by_ids(ids)
                .await?
                .iter()
                .map(Self::from_sqlitedb_model)
                .collect(),
        }
    }

    /// Stored units with `ids` plus all of their stored ancestors.
    pub async fn db_select_many_with_ancestors(db: &Db, ids: &[Uuid]) -> Result<Vec<Self>> {
        match db {
            Db::PostgresqlDb(db) => db
                .select_shop_unit_ancestors(ids)
                .await?
                .iter()
                .map(Self::from_postgresdb_model)
                .collect(),
            Db::SqliteDb(db) => db
                .select_shop_unit_ancestors(ids)
                .await?
                .iter()
                .map(Self::from_sqlitedb_model)
                .collect(),
        }
    }

    /// The unit with its whole subtree, category prices filled in.
    pub async fn db_select_tree(db: &Db, id: &Uuid) -> Result<ShopUnitTreeDao> {
        let units: Vec<Self> = match db {
            Db::PostgresqlDb(db) => db
                .select_shop_unit_subtree(id)
                .await?
                .iter()
                .map(Self::from_postgresdb_model)
                .collect::<Result<_>>()?,
            Db::SqliteDb(db) => db
                .select_shop_unit_subtree(id)
                .await?
                .iter()
                .map(Self::from_sqlitedb_model)
                .collect::<Result<_>>()?,
        };
        match ShopUnitTreeDao::build(id, units) {
            Some(tree) => Ok(tree),
            None => Err(Error::not_found(format!("Shop unit {id} does not exist")).into()),
        }
    }

    /// Offers re-imported within `[date - 24h, date]`, in their current state.
    pub async fn db_select_many_sales(db: &Db, date: &DateTime<Utc>) -> Result<Vec<Self>> {
        let date_since = *date - Duration::hours(24);
        match db {
            Db::PostgresqlDb(db) => db
                .select_many_shop_unit_sales(&date_since, date)
                .await?
                .iter()
                .map(Self::from_postgresdb_model)
                .collect(),
            Db::SqliteDb(db) => db
                .select_many_shop_unit_sales(&date_since, date)
                .await?
                .iter()
                .map(Self::from_sqlitedb_model)
                .collect(),
        }
    }

    pub(crate) async fn db_import_many(
        db: &Db,
        units: &[Self],
        date: &DateTime<Utc>,
    ) -> Result<()> {
        match db {
            Db::PostgresqlDb(db) => {
                let models: Vec<_> = units.iter().map(Self::to_postgresdb_model).collect();
                db.import_shop_units(&models, date, Self::average_price).await
            }
            Db::SqliteDb(db) => {
                let models: Vec<_> = units.iter().map(Self::to_sqlitedb_model).collect();
                db.import_shop_units(&models, date, Self::average_price).await
            }
        }
    }

    fn average_price(prices: &[i64]) -> Option<i64> {
        PriceTally::from_prices(prices).average()
    }

    /// Deletes the unit together with its subtree and history.
    pub async fn db_delete(db: &Db, id: &Uuid) -> Result<()> {
        let _guard = db.lock_writes().await;

        Self::db_select(db, id).await?;

        match db {
            Db::PostgresqlDb(db) => db.delete_shop_unit_subtree(id).await,
            Db::SqliteDb(db) => db.delete_shop_unit_subtree(id).await,
        }
    }

    fn from_postgresdb_model(model: &ShopUnitPostgresModel) -> Result<Self> {
        Ok(Self {
            id: *model.id(),
            name: model.name().to_owned(),
            parent_id: *model.parent_id(),
            kind: ShopUnitType::from_str(model.kind())?,
            price: *model.price(),
            date: *model.date(),
        })
    }

    fn to_postgresdb_model(&self) -> ShopUnitPostgresModel {
        ShopUnitPostgresModel::new(
            &self.id,
            &self.name,
            &self.parent_id,
            &self.kind.to_string(),
            &self.price,
            &self.date,
        )
    }

    fn from_sqlitedb_model(model: &ShopUnitSqliteModel) -> Result<Self> {
        Ok(Self {
            id: *model.id(),
            name: model.name().to_owned(),
            parent_id: *model.parent_id(),
            kind: ShopUnitType::from_str(model.kind())?,
            price: *model.price(),
            date: *model.date(),
        })
    }

    fn to_sqlitedb_model(&self) -> ShopUnitSqliteModel {
        ShopUnitSqliteModel::new(
            &self.id,
            &self.name,
            &self.parent_id,
            &self.kind.to_string(),
            &self.price,
            &self.date,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        import::{self, ShopUnitImportDao},
        test_util::{date, id, memory_db},
    };

    #[test]
    fn kind_text_matches_storage_literals() {
        assert_eq!(ShopUnitType::Offer.to_string(), "OFFER");
        assert_eq!(ShopUnitType::Category.to_string(), "CATEGORY");
        assert_eq!(
            ShopUnitType::from_str("CATEGORY").unwrap(),
            ShopUnitType::Category
        );
        assert!(ShopUnitType::from_str("offer").is_err());
    }

    #[tokio::test]
    async fn select_unknown_is_not_found() {
        let db = memory_db().await;
        let err = ShopUnitDao::db_select(&db, &id(1)).await.unwrap_err();
        assert_eq!(err.downcast_ref::<Error>().map(Error::code), Some(404));
    }

    #[tokio::test]
    async fn delete_removes_subtree() {
        let db = memory_db().await;
        import::db_import(
            &db,
            &[
                ShopUnitImportDao::new(&id(1), "root", &None, &ShopUnitType::Category, &None),
                ShopUnitImportDao::new(&id(2), "leaf", &Some(id(1)), &ShopUnitType::Offer, &Some(10)),
                ShopUnitImportDao::new(&id(3), "other", &None, &ShopUnitType::Offer, &Some(5)),
            ],
            &date("2022-02-01T12:00:00Z"),
        )
        .await
        .unwrap();

        ShopUnitDao::db_delete(&db, &id(1)).await.unwrap();

        assert!(ShopUnitDao::db_select(&db, &id(1)).await.is_err());
        assert!(ShopUnitDao::db_select(&db, &id(2)).await.is_err());
        assert_eq!(ShopUnitDao::db_select(&db, &id(3)).await.unwrap().price(), &Some(5));

        let err = ShopUnitDao::db_delete(&db, &id(1)).await.unwrap_err();
        assert_eq!(err.downcast_ref::<Error>().map(Error::code), Some(404));
    }

    #[tokio::test]
    async fn sales_need_a_reimport_inside_the_window() {
        let db = memory_db().await;
        let offer = |price| {
            [ShopUnitImportDao::new(&id(7), "tv", &None, &ShopUnitType::Offer, &Some(price))]
        };
        import::db_import(&db, &offer(100), &date("2022-02-01T12:00:00Z"))
            .await
            .unwrap();

        let sales = ShopUnitDao::db_select_many_sales(&db, &date("2022-02-01T12:00:00Z"))
            .await
            .unwrap();
        assert!(sales.is_empty());

        import::db_import(&db, &offer(90), &date("2022-02-03T12:00:00Z"))
            .await
            .unwrap();

        let sales = ShopUnitDao::db_select_many_sales(&db, &date("2022-02-04T12:00:00Z"))
            .await
            .unwrap();
        assert_eq!(sales.len(), 1);
        assert_eq!(sales[0].price(), &Some(90));

        let too_late = ShopUnitDao::db_select_many_sales(&db, &date("2022-02-04T12:00:01Z"))
            .await
            .unwrap();
        assert!(too_late.is_empty());

        let too_early = ShopUnitDao::db_select_many_sales(&db, &date("2022-02-02T12:00:00Z"))
            .await
            .unwrap();
        assert!(too_early.is_empty());
    }
}
