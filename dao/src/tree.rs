use ahash::{HashMap, HashMapExt};
use uuid::Uuid;

use crate::shop_unit::{ShopUnitDao, ShopUnitType};

/// A unit with its children. Offers have no children list; categories always
/// have one, possibly empty.
#[derive(Debug, PartialEq)]
pub struct ShopUnitTreeDao {
    unit: ShopUnitDao,
    children: Option<Vec<ShopUnitTreeDao>>,
}

impl ShopUnitTreeDao {
    pub fn unit(&self) -> &ShopUnitDao {
        &self.unit
    }

    pub fn children(&self) -> &Option<Vec<ShopUnitTreeDao>> {
        &self.children
    }

    /// Assembles the tree rooted at `root_id` out of the flat subtree rows.
    /// Category prices become the floor of the mean over every descendant
    /// offer. Returns `None` when `root_id` is not among `units`.
    pub fn build(root_id: &Uuid, units: Vec<ShopUnitDao>) -> Option<Self> {
        let mut root = None;
        let mut by_parent: HashMap<Uuid, Vec<ShopUnitDao>> = HashMap::new();
        for unit in units {
            if unit.id() == root_id {
                root = Some(unit);
            } else if let Some(parent_id) = unit.parent_id() {
                by_parent.entry(*parent_id).or_default().push(unit);
            }
        }
        let (tree, _) = Self::assemble(root?, &mut by_parent);
        Some(tree)
    }

    fn assemble(
        mut unit: ShopUnitDao,
        by_parent: &mut HashMap<Uuid, Vec<ShopUnitDao>>,
    ) -> (Self, PriceTally) {
        if unit.kind() == &ShopUnitType::Offer {
            let tally = PriceTally::of(unit.price());
            return (
                Self {
                    unit,
                    children: None,
                },
                tally,
            );
        }

        let mut child_units = by_parent.remove(unit.id()).unwrap_or_default();
        child_units.sort_by(|a, b| a.id().cmp(b.id()));

        let mut tally = PriceTally::default();
        let mut children = Vec::with_capacity(child_units.len());
        for child in child_units {
            let (child, child_tally) = Self::assemble(child, by_parent);
            tally.merge(&child_tally);
            children.push(child);
        }

        unit.set_price(&tally.average());
        (
            Self {
                unit,
                children: Some(children),
            },
            tally,
        )
    }
}

#[derive(Default, Clone, Copy, Debug, PartialEq)]
pub struct PriceTally {
    sum: i128,
    count: i64,
}

impl PriceTally {
    fn of(price: &Option<i64>) -> Self {
        match price {
            Some(price) => Self {
                sum: i128::from(*price),
                count: 1,
            },
            None => Self::default(),
        }
    }

    pub fn from_prices(prices: &[i64]) -> Self {
        Self {
            sum: prices.iter().map(|price| i128::from(*price)).sum(),
            count: prices.len() as i64,
        }
    }

    fn merge(&mut self, other: &Self) {
        self.sum += other.sum;
        self.count += other.count;
    }

    /// Floor of the mean, `None` without any price.
    pub fn average(&self) -> Option<i64> {
        if self.count == 0 {
            return None;
        }
        i64::try_from(self.sum.div_euclid(i128::from(self.count))).ok()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::test_util::{date, id};

    fn category(n: u128, parent: Option<u128>) -> ShopUnitDao {
        ShopUnitDao::new(
            &id(n),
            &format!("category {n}"),
            &parent.map(id),
            &ShopUnitType::Category,
            &None,
            &date("2022-02-01T12:00:00Z"),
        )
    }

    fn offer(n: u128, parent: Option<u128>, price: i64) -> ShopUnitDao {
        ShopUnitDao::new(
            &id(n),
            &format!("offer {n}"),
            &parent.map(id),
            &ShopUnitType::Offer,
            &Some(price),
            &date("2022-02-01T12:00:00Z"),
        )
    }

    #[test]
    fn average_floors_over_all_descendant_offers() {
        // 1 -> (2 -> [10: 79999, 11: 59999]), (3 -> [12: 32999, 13: 49999, 14: 50000])
        let units = vec![
            offer(14, Some(3), 50000),
            category(1, None),
            offer(10, Some(2), 79999),
            category(3, Some(1)),
            offer(12, Some(3), 32999),
            category(2, Some(1)),
            offer(11, Some(2), 59999),
            offer(13, Some(3), 49999),
        ];

        let tree = ShopUnitTreeDao::build(&id(1), units).unwrap();

        assert_eq!(tree.unit().price(), &Some(54599));
        let children = tree.children().as_ref().unwrap();
        assert_eq!(children.len(), 2);
        assert_eq!(children[0].unit().id(), &id(2));
        assert_eq!(children[0].unit().price(), &Some(69999));
        assert_eq!(children[1].unit().price(), &Some(44332));
        let grandchildren = children[1].children().as_ref().unwrap();
        assert_eq!(grandchildren.len(), 3);
        assert!(grandchildren.iter().all(|child| child.children().is_none()));
    }

    #[test]
    fn empty_category_has_null_price_and_empty_children() {
        let tree = ShopUnitTreeDao::build(
            &id(1),
            vec![category(1, None), category(2, Some(1))],
        )
        .unwrap();

        assert_eq!(tree.unit().price(), &None);
        let children = tree.children().as_ref().unwrap();
        assert_eq!(children[0].unit().price(), &None);
        assert_eq!(children[0].children(), &Some(Vec::new()));
    }

    #[test]
    fn offer_root_keeps_its_price() {
        let tree = ShopUnitTreeDao::build(&id(5), vec![offer(5, Some(1), 42)]).unwrap();
        assert_eq!(tree.unit().price(), &Some(42));
        assert!(tree.children().is_none());
    }

    #[test]
    fn missing_root_yields_none() {
        assert!(ShopUnitTreeDao::build(&id(9), vec![category(1, None)]).is_none());
    }

    #[test]
    fn tally_average() {
        assert_eq!(PriceTally::default().average(), None);
        let mut tally = PriceTally::of(&Some(1));
        tally.merge(&PriceTally::of(&Some(2)));
        assert_eq!(tally.average(), Some(1));
        tally.merge(&PriceTally::of(&None));
        assert_eq!(tally.average(), Some(1));
    }

    #[test]
    fn tally_from_prices_holds_sums_beyond_i64() {
        assert_eq!(PriceTally::from_prices(&[]).average(), None);
        assert_eq!(
            PriceTally::from_prices(&[i64::MAX, i64::MAX]).average(),
            Some(i64::MAX)
        );
        assert_eq!(PriceTally::from_prices(&[i64::MAX, 1]).average(), Some(i64::MAX / 2 + 1));
    }
}
