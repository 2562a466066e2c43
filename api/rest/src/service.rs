pub mod docs;
pub mod root;
pub mod sales;
pub mod shop_unit;
pub mod statistic;
