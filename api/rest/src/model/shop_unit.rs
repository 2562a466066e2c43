use chrono::{DateTime, Utc};
use gs_dao::{
    import::ShopUnitImportDao,
    shop_unit::{ShopUnitDao, ShopUnitType},
    shop_unit_statistic::ShopUnitStatisticDao,
    tree::ShopUnitTreeDao,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::util::iso8601;

#[derive(Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ImportShopUnitsReqJson {
    #[validate(length(min = 1))]
    items: Vec<ShopUnitImportReqJson>,
    #[serde(deserialize_with = "iso8601::deserialize")]
    update_date: DateTime<Utc>,
}

impl ImportShopUnitsReqJson {
    pub fn items(&self) -> &Vec<ShopUnitImportReqJson> {
        &self.items
    }

    pub fn update_date(&self) -> &DateTime<Utc> {
        &self.update_date
    }
}

#[derive(Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShopUnitImportReqJson {
    id: Uuid,
    name: String,
    #[serde(default)]
    parent_id: Option<Uuid>,
    #[serde(rename = "type")]
    kind: ShopUnitType,
    #[serde(default)]
    price: Option<i64>,
}

impl ShopUnitImportReqJson {
    pub fn to_dao(&self) -> ShopUnitImportDao {
        ShopUnitImportDao::new(
            &self.id,
            &self.name,
            &self.parent_id,
            &self.kind,
            &self.price,
        )
    }
}

#[derive(Deserialize)]
pub struct ShopUnitReqPath {
    id: Uuid,
}

impl ShopUnitReqPath {
    pub fn id(&self) -> &Uuid {
        &self.id
    }
}

/// A node with its subtree. Offers carry `children: null`, categories an
/// array that may be empty.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShopUnitNodeResJson {
    id: Uuid,
    name: String,
    parent_id: Option<Uuid>,
    #[serde(rename = "type")]
    kind: ShopUnitType,
    price: Option<i64>,
    #[serde(serialize_with = "iso8601::serialize")]
    date: DateTime<Utc>,
    children: Option<Vec<ShopUnitNodeResJson>>,
}

impl ShopUnitNodeResJson {
    pub fn from_dao(tree: &ShopUnitTreeDao) -> Self {
        let unit = tree.unit();
        Self {
            id: *unit.id(),
            name: unit.name().to_owned(),
            parent_id: *unit.parent_id(),
            kind: *unit.kind(),
            price: *unit.price(),
            date: *unit.date(),
            children: tree
                .children()
                .as_ref()
                .map(|children| children.iter().map(Self::from_dao).collect()),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShopUnitStatisticUnitResJson {
    id: Uuid,
    name: String,
    parent_id: Option<Uuid>,
    #[serde(rename = "type")]
    kind: ShopUnitType,
    price: Option<i64>,
    #[serde(serialize_with = "iso8601::serialize")]
    date: DateTime<Utc>,
}

impl ShopUnitStatisticUnitResJson {
    pub fn from_shop_unit_dao(unit: &ShopUnitDao) -> Self {
        Self {
            id: *unit.id(),
            name: unit.name().to_owned(),
            parent_id: *unit.parent_id(),
            kind: *unit.kind(),
            price: *unit.price(),
            date: *unit.date(),
        }
    }

    pub fn from_statistic_dao(statistic: &ShopUnitStatisticDao) -> Self {
        Self {
            id: *statistic.unit_id(),
            name: statistic.name().to_owned(),
            parent_id: *statistic.parent_id(),
            kind: *statistic.kind(),
            price: *statistic.price(),
            date: *statistic.date(),
        }
    }
}

#[derive(Serialize)]
pub struct ShopUnitStatisticResJson {
    items: Vec<ShopUnitStatisticUnitResJson>,
}

impl ShopUnitStatisticResJson {
    pub fn new(items: Vec<ShopUnitStatisticUnitResJson>) -> Self {
        Self { items }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn import_request_rejects_empty_items() {
        let empty: ImportShopUnitsReqJson = serde_json::from_str(
            r#"{ "items": [], "updateDate": "2022-02-01T12:00:00.000Z" }"#,
        )
        .unwrap();
        assert!(empty.validate().is_err());

        let one: ImportShopUnitsReqJson = serde_json::from_str(
            r#"{
                "items": [{
                    "id": "069cb8d7-bbdd-47d3-ad8f-82ef4c269df1",
                    "name": "Товары",
                    "parentId": null,
                    "type": "CATEGORY"
                }],
                "updateDate": "2022-02-01T12:00:00.000Z"
            }"#,
        )
        .unwrap();
        assert!(one.validate().is_ok());
        assert_eq!(one.items().len(), 1);
        assert_eq!(one.items()[0].to_dao().kind(), &ShopUnitType::Category);
    }
}
