use std::str::FromStr;

use anyhow::Result;
use chrono::{DateTime, Utc};
use gs_db_postgresql::model::shop_unit_statistic::ShopUnitStatisticModel as ShopUnitStatisticPostgresModel;
use gs_db_sqlite::model::shop_unit_statistic::ShopUnitStatisticModel as ShopUnitStatisticSqliteModel;
use gs_error::Error;
use uuid::Uuid;

use crate::{
    shop_unit::{ShopUnitDao, ShopUnitType},
    Db,
};

/// The state of one shop unit right after an import touched it.
#[derive(Clone, Debug, PartialEq)]
pub struct ShopUnitStatisticDao {
    statistic_id: Uuid,
    unit_id: Uuid,
    name: String,
    parent_id: Option<Uuid>,
    kind: ShopUnitType,
    price: Option<i64>,
    date: DateTime<Utc>,
}

impl ShopUnitStatisticDao {
    pub fn statistic_id(&self) -> &Uuid {
        &self.statistic_id
    }

    pub fn unit_id(&self) -> &Uuid {
        &self.unit_id
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

    /// History of `unit_id` with `date_start <= date < date_end`. A missing
    /// bound leaves that side open.
    pub async fn db_select_many_by_unit_id(
        db: &Db,
        unit_id: &Uuid,
        date_start: &Option<DateTime<Utc>>,
        date_end: &Option<DateTime<Utc>>,
    ) -> Result<Vec<Self>> {
        if let (Some(start), Some(end)) = (date_start, date_end) {
            if start > end {
                return Err(Error::bad_request(format!(
                    "Interval start {start} is after its end {end}"
                ))
                .into());
            }
        }

        ShopUnitDao::db_select(db, unit_id).await?;

        match db {
            Db::PostgresqlDb(db) => db
                .select_many_shop_unit_statistics_by_unit_id(unit_id, date_start, date_end)
                .await?
                .iter()
                .map(Self::from_postgresdb_model)
                .collect(),
            Db::SqliteDb(db) => db
                .select_many_shop_unit_statistics_by_unit_id(unit_id, date_start, date_end)
                .await?
                .iter()
                .map(Self::from_sqlitedb_model)
                .collect(),
        }
    }

    fn from_postgresdb_model(model: &ShopUnitStatisticPostgresModel) -> Result<Self> {
        Ok(Self {
            statistic_id: *model.statistic_id(),
            unit_id: *model.unit_id(),
            name: model.name().to_owned(),
            parent_id: *model.parent_id(),
            kind: ShopUnitType::from_str(model.kind())?,
            price: *model.price(),
            date: *model.date(),
        })
    }

    fn from_sqlitedb_model(model: &ShopUnitStatisticSqliteModel) -> Result<Self> {
        Ok(Self {
            statistic_id: *model.statistic_id(),
            unit_id: *model.unit_id(),
            name: model.name().to_owned(),
            parent_id: *model.parent_id(),
            kind: ShopUnitType::from_str(model.kind())?,
            price: *model.price(),
            date: *model.date(),
        })
    }
}
