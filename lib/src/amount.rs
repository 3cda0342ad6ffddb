//! Fixed-point rendering of base-unit amounts.
//!
//! Amounts are arbitrary precision integers. Everything here stays in integer
//! arithmetic, so supplies far beyond `u64` render without drift.

use num_bigint::BigUint;

/// Number of fractional digits `format_amount` pads to.
pub const FRACTION_WIDTH: usize = 6;

/// Returns `10^decimals`.
pub fn scale(decimals: u16) -> BigUint {
    BigUint::from(10u32).pow(u32::from(decimals))
}

/// Renders `amount / scale` as `"{whole}.{frac}"` with `frac` zero-padded to
/// six digits.
///
/// The padding is a minimum width: with a scale above `10^6` the remainder
/// is printed with all of its digits.
///
/// Panics if `scale` is zero.
pub fn format_amount(amount: &BigUint, scale: &BigUint) -> String {
    let whole = amount / scale;
    let frac = amount % scale;

    format!("{whole}.{frac:0width$}", width = FRACTION_WIDTH)
}

pub mod serde {
    /// (De)serializes a `BigUint` as a base-10 string, like the Cosmos SDK
    /// encodes `sdk.Int`.
    pub mod as_str {
        use num_bigint::BigUint;
        use serde::{de, Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(amount: &BigUint, s: S) -> Result<S::Ok, S::Error> {
            s.collect_str(amount)
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<BigUint, D::Error> {
            let s = String::deserialize(d)?;

            if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
                return Err(de::Error::custom(format!("invalid amount `{s}`")));
            }

            s.parse::<BigUint>().map_err(de::Error::custom)
        }
    }
}
