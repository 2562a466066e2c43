pub mod shop_unit;
pub mod shop_unit_statistic;
