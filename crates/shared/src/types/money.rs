//! Money-scale rules for fixed-point currency amounts.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! All amounts are `rust_decimal::Decimal` with at most [`MONEY_SCALE`]
//! fractional digits; inputs with more precision are rejected at the
//! API boundary rather than silently rounded.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

/// Number of fractional digits carried by all monetary amounts.
pub const MONEY_SCALE: u32 = 2;

/// Returns true if `amount` fits in the money scale (cents).
///
/// Trailing zeros do not count against the scale: `1.500` is valid,
/// `1.505` is not.
#[must_use]
pub fn valid_money_scale(amount: Decimal) -> bool {
    amount.normalize().scale() <= MONEY_SCALE
}

/// Converts an amount to minor units (cents) for the ledger contract.
///
/// Returns `None` if the amount does not fit the money scale or
/// overflows an `i64`.
#[must_use]
pub fn to_minor_units(amount: Decimal) -> Option<i64> {
    if !valid_money_scale(amount) {
        return None;
    }
    (amount * Decimal::from(100u32)).to_i64()
}
