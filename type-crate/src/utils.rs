use crate::constants::MICROALGO_PER_ALGO;

/// Renders a microAlgo amount as whole ALGO with all six decimals, e.g. `1.500000 ALGO`.
pub fn formatted_algo_amount(amount: u64) -> String {
    format!(
        "{}.{:06} ALGO",
        amount / MICROALGO_PER_ALGO,
        amount % MICROALGO_PER_ALGO
    )
}

/// Renders a minute count as minutes, hours and minutes, or days, hours and minutes.
pub fn formatted_minutes(mins: u64) -> String {
    if mins < 60 {
        format!("{mins} minutes")
    } else if mins < 1440 {
        format!("{} hours, {} minutes", mins / 60, mins % 60)
    } else {
        let days = mins / 1440;
        let rest = mins % 1440;
        format!("{} days, {} hours, {} minutes", days, rest / 60, rest % 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    #[test_case(0, "0 minutes")]
    #[test_case(59, "59 minutes")]
    #[test_case(60, "1 hours, 0 minutes")]
    #[test_case(1439, "23 hours, 59 minutes")]
    #[test_case(1440, "1 days, 0 hours, 0 minutes")]
    #[test_case(2 * 1440 + 61, "2 days, 1 hours, 1 minutes")]
    fn minutes_are_split_into_units(mins: u64, expected: &str) {
        assert_eq!(formatted_minutes(mins), expected);
    }

    #[test]
    fn algo_amounts_keep_six_decimals() {
        assert_eq!(formatted_algo_amount(1_500_000), "1.500000 ALGO");
        assert_eq!(formatted_algo_amount(42), "0.000042 ALGO");
    }
}
