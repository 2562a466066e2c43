use chrono::{DateTime, Utc};
use sqlx::prelude::FromRow;
use uuid::Uuid;

#[derive(FromRow, Clone)]
pub struct ShopUnitModel {
    id: Uuid,
    name: String,
    parent_id: Option<Uuid>,
    kind: String,
    price: Option<i64>,
    date: DateTime<Utc>,
}

impl ShopUnitModel {
    pub fn new(
        id: &Uuid,
        name: &str,
        parent_id: &Option<Uuid>,
        kind: &str,
        price: &Option<i64>,
        date: &DateTime<Utc>,
    ) -> Self {
        Self {
            id: *id,
            name: name.to_owned(),
            parent_id: *parent_id,
            kind: kind.to_owned(),
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
