//! Shared big-integer/decimal conversions for the EVM adapters
//! (`spec.md` §9 decimal-arithmetic requirement: token-amount math stays
//! in big integers until the final USD/native conversion).

use alloy::primitives::U256;
use bigdecimal::BigDecimal;
use num_bigint::BigInt;
use std::str::FromStr;

const WEI_PER_NATIVE: u32 = 18;

/// `amountNative` (e.g. `0.05` ETH) to wei, truncating at 18 decimals.
pub fn to_wei(amount_native: &BigDecimal) -> U256 {
    let scaled = amount_native.with_scale(WEI_PER_NATIVE as i64);
    let (digits, _) = scaled.as_bigint_and_exponent();
    u256_from_bigint(digits)
}

/// `U256` raw token units to a `BigDecimal` given the token's `decimals()`.
pub fn from_units(raw: U256, decimals: u8) -> BigDecimal {
    let digits = bigint_from_u256(raw);
    BigDecimal::new(digits, decimals as i64)
}

/// `minOut = expectedOut * floor((1 - slippage/100) * 1000) / 1000`
/// (`spec.md` §4.4.1 step 4), computed entirely in integers.
pub fn apply_slippage_floor(expected_out: U256, slippage_percent: f64) -> U256 {
    let factor = ((1.0 - slippage_percent / 100.0) * 1000.0).floor().max(0.0) as u64;
    (expected_out * U256::from(factor)) / U256::from(1000u64)
}

fn u256_from_bigint(value: BigInt) -> U256 {
    let (sign, bytes) = value.to_bytes_be();
    debug_assert!(sign != num_bigint::Sign::Minus, "native amount must be non-negative");
    U256::from_be_slice(&bytes)
}

fn bigint_from_u256(value: U256) -> BigInt {
    BigInt::from_bytes_be(num_bigint::Sign::Plus, &value.to_be_bytes::<32>())
}

pub fn u256_to_f64(value: U256) -> f64 {
    value.to_string().parse::<f64>().unwrap_or(f64::MAX)
}

/// USD value of a native-denominated `BigDecimal` at the given price.
pub fn to_usd(native_amount: &BigDecimal, native_price_usd: &BigDecimal) -> BigDecimal {
    native_amount * native_price_usd
}

pub fn parse_native(text: &str) -> BigDecimal {
    BigDecimal::from_str(text).unwrap_or_else(|_| BigDecimal::from(0))
}
