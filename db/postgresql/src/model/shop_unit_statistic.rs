use chrono::{DateTime, Utc};
use sqlx::prelude::FromRow;
use uuid::Uuid;

#[derive(FromRow)]
pub struct ShopUnitStatisticModel {
    statistic_id: Uuid,
    unit_id: Uuid,
    name: String,
    parent_id: Option<Uuid>,
    kind: String,
    price: Option<i64>,
    date: DateTime<Utc>,
}

impl ShopUnitStatisticModel {
    pub fn new(
        statistic_id: &Uuid,
        unit_id: &Uuid,
        name: &str,
        parent_id: &Option<Uuid>,
        kind: &str,
        price: &Option<i64>,
        date: &DateTime<Utc>,
    ) -> Self {
        Self {
            statistic_id: *statistic_id,
            unit_id: *unit_id,
            name: name.to_owned(),
            parent_id: *parent_id,
            kind: kind.to_owned(),
            price: *price,
            date: *date,
        }
    }

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

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn price(&self) -> &Option<i64> {
        &self.price
    }

    pub fn date(&self) -> &DateTime<Utc> {
        &self.date
    }
}
