//! Arbitrary-precision decimal helpers shared by the journal and the
//! trading service. `spec.md` §9 requires scale-2 USD, scale-8 gas/price,
//! and scale-2 volume; `BigDecimal` everywhere avoids the float drift a
//! `f64` notional would accumulate over thousands of scheduled trades.

use bigdecimal::BigDecimal;
use std::str::FromStr;

pub const USD_SCALE: i64 = 2;
pub const GAS_SCALE: i64 = 8;
pub const PRICE_SCALE: i64 = 8;

pub fn usd(value: &BigDecimal) -> BigDecimal {
    value.with_scale(USD_SCALE)
}

pub fn gas(value: &BigDecimal) -> BigDecimal {
    value.with_scale(GAS_SCALE)
}

pub fn price(value: &BigDecimal) -> BigDecimal {
    value.with_scale(PRICE_SCALE)
}

/// Parse a column read back from SQLite TEXT storage. Corrupt/empty values
/// are a bug in our own writer, not a user-facing condition, so this panics
/// like any other "the database disagrees with its own schema" failure.
pub fn parse(text: &str) -> BigDecimal {
    BigDecimal::from_str(text).unwrap_or_else(|e| panic!("corrupt decimal column {text:?}: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_text() {
        let value = BigDecimal::from_str("12.340000005").unwrap();
        let text = value.to_string();
        assert_eq!(parse(&text), value);
    }
}
