use ahash::{HashMap, HashMapExt, HashSet, HashSetExt};
use anyhow::Result;
use chrono::{DateTime, Utc};
use gs_error::Error;
use itertools::Itertools;
use uuid::Uuid;

use crate::{
    shop_unit::{ShopUnitDao, ShopUnitType},
    Db,
};

pub struct ShopUnitImportDao {
    id: Uuid,
    name: String,
    parent_id: Option<Uuid>,
    kind: ShopUnitType,
    price: Option<i64>,
}

impl ShopUnitImportDao {
    pub fn new(
        id: &Uuid,
        name: &str,
        parent_id: &Option<Uuid>,
        kind: &ShopUnitType,
        price: &Option<i64>,
    ) -> Self {
        Self {
            id: *id,
            name: name.to_owned(),
            parent_id: *parent_id,
            kind: *kind,
            price: *price,
        }
    }

    pub fn id(&self) -> &Uuid {
        &self.id
    }

    pub fn parent_id(&self) -> &Option<Uuid> {
        &self.parent_id
    }

    pub fn kind(&self) -> &ShopUnitType {
        &self.kind
    }

    fn to_shop_unit(&self, date: &DateTime<Utc>) -> ShopUnitDao {
        ShopUnitDao::new(
            &self.id,
            &self.name,
            &self.parent_id,
            &self.kind,
            &self.price,
            date,
        )
    }
}

/// Validates and stores one import batch. Every element of the batch gets
/// `update_date`, and so does every category above it.
pub async fn db_import(
    db: &Db,
    items: &[ShopUnitImportDao],
    update_date: &DateTime<Utc>,
) -> Result<()> {
    validate_batch(items)?;

    let _guard = db.lock_writes().await;

    let ids: Vec<Uuid> = items.iter().map(|item| item.id).collect();
    let stored = ShopUnitDao::db_select_many_by_ids(db, &ids).await?;
    validate_kinds_unchanged(items, &stored)?;

    let batch_ids: HashSet<Uuid> = ids.iter().copied().collect();
    let outside_parent_ids: Vec<Uuid> = items
        .iter()
        .filter_map(|item| item.parent_id)
        .filter(|parent_id| !batch_ids.contains(parent_id))
        .unique()
        .collect();
    let outside = ShopUnitDao::db_select_many_with_ancestors(db, &outside_parent_ids).await?;
    validate_parents(items, &outside)?;

    let stored_parents: HashMap<Uuid, Option<Uuid>> = outside
        .iter()
        .map(|unit| (*unit.id(), *unit.parent_id()))
        .collect();
    if let Some(id) = find_cycle(items, &stored_parents) {
        return Err(Error::bad_request(format!("Shop unit {id} would become its own ancestor")).into());
    }

    let units: Vec<ShopUnitDao> = items
        .iter()
        .map(|item| item.to_shop_unit(update_date))
        .collect();
    ShopUnitDao::db_import_many(db, &units, update_date).await
}

/// Checks that need nothing but the batch itself.
pub fn validate_batch(items: &[ShopUnitImportDao]) -> Result<(), Error> {
    if items.is_empty() {
        return Err(Error::bad_request("Import batch is empty"));
    }

    if let Some(id) = items.iter().map(|item| item.id).duplicates().next() {
        return Err(Error::bad_request(format!(
            "Shop unit {id} appears more than once in the batch"
        )));
    }

    for item in items {
        if item.parent_id == Some(item.id) {
            return Err(Error::bad_request(format!(
                "Shop unit {} is its own parent",
                item.id
            )));
        }
        match (item.kind, item.price) {
            (ShopUnitType::Offer, None) => {
                return Err(Error::bad_request(format!(
                    "Offer {} must have a price",
                    item.id
                )))
            }
            (ShopUnitType::Offer, Some(price)) if price < 0 => {
                return Err(Error::bad_request(format!(
                    "Offer {} has a negative price",
                    item.id
                )))
            }
            (ShopUnitType::Category, Some(_)) => {
                return Err(Error::bad_request(format!(
                    "Category {} must not have a price",
                    item.id
                )))
            }
            _ => {}
        }
    }

    Ok(())
}

fn validate_kinds_unchanged(items: &[ShopUnitImportDao], stored: &[ShopUnitDao]) -> Result<(), Error> {
    let stored_kinds: HashMap<&Uuid, &ShopUnitType> =
        stored.iter().map(|unit| (unit.id(), unit.kind())).collect();
    for item in items {
        if let Some(kind) = stored_kinds.get(&item.id) {
            if **kind != item.kind {
                return Err(Error::bad_request(format!(
                    "Shop unit {} is stored as {kind} and cannot become {}",
                    item.id, item.kind
                )));
            }
        }
    }
    Ok(())
}

/// Every parent must be a category, either from the batch or already stored.
fn validate_parents(items: &[ShopUnitImportDao], outside: &[ShopUnitDao]) -> Result<(), Error> {
    let mut kinds: HashMap<Uuid, ShopUnitType> = HashMap::with_capacity(items.len() + outside.len());
    kinds.extend(outside.iter().map(|unit| (*unit.id(), *unit.kind())));
    kinds.extend(items.iter().map(|item| (item.id, item.kind)));

    for item in items {
        let Some(parent_id) = item.parent_id else {
            continue;
        };
        match kinds.get(&parent_id) {
            Some(ShopUnitType::Category) => {}
            Some(ShopUnitType::Offer) => {
                return Err(Error::bad_request(format!(
                    "Parent {parent_id} of shop unit {} is an offer",
                    item.id
                )))
            }
            None => {
                return Err(Error::bad_request(format!(
                    "Parent {parent_id} of shop unit {} does not exist",
                    item.id
                )))
            }
        }
    }
    Ok(())
}

/// Walks up from every batch element through the parent links the store
/// would hold after the import. Returns an element that reaches itself.
pub fn find_cycle(
    items: &[ShopUnitImportDao],
    stored_parents: &HashMap<Uuid, Option<Uuid>>,
) -> Option<Uuid> {
    let batch_parents: HashMap<Uuid, Option<Uuid>> =
        items.iter().map(|item| (item.id, item.parent_id)).collect();
    let parent_of = |id: &Uuid| -> Option<Uuid> {
        match batch_parents.get(id) {
            Some(parent_id) => *parent_id,
            None => stored_parents.get(id).copied().flatten(),
        }
    };

    for item in items {
        let mut visited = HashSet::new();
        let mut current = item.parent_id;
        while let Some(id) = current {
            if id == item.id {
                return Some(item.id);
            }
            if !visited.insert(id) {
                break;
            }
            current = parent_of(&id);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{
        shop_unit_statistic::ShopUnitStatisticDao,
        test_util::{date, id, memory_db},
    };

    fn category(n: u128, parent: Option<u128>) -> ShopUnitImportDao {
        ShopUnitImportDao::new(
            &id(n),
            &format!("category {n}"),
            &parent.map(id),
            &ShopUnitType::Category,
            &None,
        )
    }

    fn offer(n: u128, parent: Option<u128>, price: i64) -> ShopUnitImportDao {
        ShopUnitImportDao::new(
            &id(n),
            &format!("offer {n}"),
            &parent.map(id),
            &ShopUnitType::Offer,
            &Some(price),
        )
    }

    fn code(err: &anyhow::Error) -> Option<u16> {
        err.downcast_ref::<Error>().map(Error::code)
    }

    #[test]
    fn rejects_empty_batch() {
        assert!(validate_batch(&[]).is_err());
    }

    #[test]
    fn rejects_duplicate_ids() {
        let err = validate_batch(&[category(1, None), offer(1, None, 3)]).unwrap_err();
        assert_eq!(err.code(), 400);
    }

    #[test]
    fn rejects_wrong_prices() {
        let priceless = ShopUnitImportDao::new(&id(1), "x", &None, &ShopUnitType::Offer, &None);
        assert!(validate_batch(&[priceless]).is_err());
        assert!(validate_batch(&[offer(1, None, -1)]).is_err());
        let priced_category =
            ShopUnitImportDao::new(&id(1), "x", &None, &ShopUnitType::Category, &Some(1));
        assert!(validate_batch(&[priced_category]).is_err());
        assert!(validate_batch(&[offer(1, None, 0)]).is_ok());
    }

    #[test]
    fn rejects_self_parent() {
        assert!(validate_batch(&[category(1, Some(1))]).is_err());
    }

    #[test]
    fn detects_cycle_through_stored_units() {
        // stored: 1 <- 2 <- 3; batch moves 1 under 3
        let stored = HashMap::from_iter([(id(2), Some(id(1))), (id(3), Some(id(2)))]);
        assert_eq!(find_cycle(&[category(1, Some(3))], &stored), Some(id(1)));
        assert_eq!(find_cycle(&[category(3, Some(1))], &stored), None);
    }

    #[test]
    fn detects_cycle_inside_batch() {
        let stored = HashMap::new();
        let batch = [category(1, Some(2)), category(2, Some(1))];
        assert!(find_cycle(&batch, &stored).is_some());
    }

    #[tokio::test]
    async fn rejects_type_change() {
        let db = memory_db().await;
        db_import(&db, &[category(1, None)], &date("2022-02-01T12:00:00Z"))
            .await
            .unwrap();

        let err = db_import(&db, &[offer(1, None, 5)], &date("2022-02-02T12:00:00Z"))
            .await
            .unwrap_err();
        assert_eq!(code(&err), Some(400));
    }

    #[tokio::test]
    async fn rejects_unknown_or_offer_parent() {
        let db = memory_db().await;
        let err = db_import(&db, &[offer(2, Some(1), 5)], &date("2022-02-01T12:00:00Z"))
            .await
            .unwrap_err();
        assert_eq!(code(&err), Some(400));

        db_import(&db, &[offer(1, None, 5)], &date("2022-02-01T12:00:00Z"))
            .await
            .unwrap();
        let err = db_import(&db, &[offer(2, Some(1), 5)], &date("2022-02-01T12:00:00Z"))
            .await
            .unwrap_err();
        assert_eq!(code(&err), Some(400));
    }

    #[tokio::test]
    async fn rejects_moving_category_under_descendant() {
        let db = memory_db().await;
        db_import(
            &db,
            &[category(1, None), category(2, Some(1)), category(3, Some(2))],
            &date("2022-02-01T12:00:00Z"),
        )
        .await
        .unwrap();

        let err = db_import(&db, &[category(1, Some(3))], &date("2022-02-02T12:00:00Z"))
            .await
            .unwrap_err();
        assert_eq!(code(&err), Some(400));
    }

    #[tokio::test]
    async fn parent_may_come_later_in_the_batch() {
        let db = memory_db().await;
        db_import(
            &db,
            &[offer(2, Some(1), 10), category(1, None)],
            &date("2022-02-01T12:00:00Z"),
        )
        .await
        .unwrap();

        let tree = ShopUnitDao::db_select_tree(&db, &id(1)).await.unwrap();
        assert_eq!(tree.unit().price(), &Some(10));
    }

    #[tokio::test]
    async fn import_redates_old_and_new_ancestors() {
        let db = memory_db().await;
        db_import(
            &db,
            &[
                category(1, None),
                category(2, Some(1)),
                category(3, None),
                offer(10, Some(2), 100),
            ],
            &date("2022-02-01T12:00:00Z"),
        )
        .await
        .unwrap();

        db_import(&db, &[offer(10, Some(3), 100)], &date("2022-02-02T12:00:00Z"))
            .await
            .unwrap();

        for n in [1, 2, 3, 10] {
            let unit = ShopUnitDao::db_select(&db, &id(n)).await.unwrap();
            assert_eq!(unit.date(), &date("2022-02-02T12:00:00Z"), "unit {n}");
        }
        let old_root = ShopUnitDao::db_select_tree(&db, &id(1)).await.unwrap();
        assert_eq!(old_root.unit().price(), &None);
        let new_root = ShopUnitDao::db_select_tree(&db, &id(3)).await.unwrap();
        assert_eq!(new_root.unit().price(), &Some(100));
    }

    #[tokio::test]
    async fn category_history_holds_average_of_huge_prices() {
        let db = memory_db().await;
        db_import(
            &db,
            &[
                category(1, None),
                offer(2, Some(1), i64::MAX),
                offer(3, Some(1), i64::MAX),
            ],
            &date("2022-02-01T12:00:00Z"),
        )
        .await
        .unwrap();

        let history =
            ShopUnitStatisticDao::db_select_many_by_unit_id(&db, &id(1), &None, &None)
                .await
                .unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].price(), &Some(i64::MAX));

        let tree = ShopUnitDao::db_select_tree(&db, &id(1)).await.unwrap();
        assert_eq!(tree.unit().price(), &Some(i64::MAX));
    }
}
