//! Money amounts: whole cents only, always rendered with two decimals.

use rust_decimal::Decimal;
use serde::{Serialize, Serializer};

/// Number of decimal places stored in every money column.
pub const MONEY_SCALE: u32 = 2;

/// Whether `amount` is expressible in whole cents.
///
/// Trailing zeros do not count, so `1.500` is a valid amount.
pub fn is_whole_cents(amount: Decimal) -> bool {
    amount.normalize().scale() <= MONEY_SCALE
}

/// `amount` with exactly two decimal places, e.g. `0` becomes `0.00`.
pub fn to_cents(amount: Decimal) -> Decimal {
    let mut scaled = amount.round_dp(MONEY_SCALE);
    scaled.rescale(MONEY_SCALE);
    scaled
}

/// Display form used by the print view and the CSV exports.
pub fn format_money(amount: Decimal) -> String {
    to_cents(amount).to_string()
}

/// `serialize_with` helper for money fields.
pub fn serialize<S: Serializer>(amount: &Decimal, serializer: S) -> Result<S::Ok, S::Error> {
    Serialize::serialize(&to_cents(*amount), serializer)
}

/// `serialize_with` helper for optional money fields.
pub fn serialize_option<S: Serializer>(
    amount: &Option<Decimal>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    amount.map(to_cents).serialize(serializer)
}
