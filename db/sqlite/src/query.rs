use itertools::Itertools;

pub mod shop_unit;
pub mod shop_unit_statistic;

/// `?, ?, ?` for an `IN (...)` list of `len` bound values.
pub(crate) fn placeholders(len: usize) -> String {
    std::iter::repeat("?").take(len).join(", ")
}

#[cfg(test)]
mod tests {
    use super::placeholders;

    #[test]
    fn placeholders_are_comma_separated() {
        assert_eq!(placeholders(1), "?");
        assert_eq!(placeholders(3), "?, ?, ?");
        assert_eq!(placeholders(0), "");
    }
}
