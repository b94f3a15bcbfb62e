//! Fixed point value conversion
//!
//! Amounts, exchange rates and fractions carry 18 decimals (WAD), USD prices
//! carry 8. Every product is formed in full before the single truncating
//! division, inside a 512-bit intermediate.

#![allow(clippy::assign_op_pattern)]
#![allow(clippy::ptr_offset_with_cast)]
#![allow(clippy::manual_range_contains)]

use uint::construct_uint;

use crate::{
    constants::{PRICE_SCALE, WAD},
    error::{VaultError, VaultResult},
};

construct_uint! {
    /// 512-bit unsigned integer for intermediate products
    pub struct U512(8);
}

/// Narrow a wide value back to u128
pub fn to_u128(value: U512) -> VaultResult<u128> {
    if value > U512::from(u128::MAX) {
        return Err(VaultError::ArithmeticOverflow);
    }
    Ok(value.low_u128())
}

/// a * b / c, truncating
pub fn mul_div(a: u128, b: u128, c: u128) -> VaultResult<u128> {
    if c == 0 {
        return Err(VaultError::DivisionByZero);
    }
    // u128 * u128 always fits in 512 bits
    let product = U512::from(a) * U512::from(b);
    to_u128(product / U512::from(c))
}

/// a * b / c, truncating and clamped to `u128::MAX`
pub fn mul_div_saturating(a: u128, b: u128, c: u128) -> VaultResult<u128> {
    if c == 0 {
        return Err(VaultError::DivisionByZero);
    }
    let quotient = U512::from(a) * U512::from(b) / U512::from(c);
    Ok(to_u128(quotient).unwrap_or(u128::MAX))
}

/// a * b * c / d, truncating
pub fn mul_mul_div(a: u128, b: u128, c: u128, d: u128) -> VaultResult<u128> {
    if d == 0 {
        return Err(VaultError::DivisionByZero);
    }
    let product = U512::from(a) * U512::from(b) * U512::from(c);
    to_u128(product / U512::from(d))
}

pub fn wad_mul(a: u128, b: u128) -> VaultResult<u128> {
    mul_div(a, b, WAD)
}

pub fn wad_div(a: u128, b: u128) -> VaultResult<u128> {
    mul_div(a, WAD, b)
}

/// USD value (WAD) of `amount` receipt units.
///
/// value = amount × rate × price / (WAD × PRICE_SCALE)
pub fn collateral_to_usd(amount: u128, price: u128, rate: u128) -> VaultResult<u128> {
    let numerator = U512::from(amount)
        .checked_mul(U512::from(rate))
        .and_then(|v| v.checked_mul(U512::from(price)))
        .ok_or(VaultError::ArithmeticOverflow)?;
    let denominator = U512::from(WAD) * U512::from(PRICE_SCALE);

    to_u128(numerator / denominator)
}

/// Receipt units worth `amount` stable units (WAD).
///
/// units = amount × WAD × PRICE_SCALE / (price × rate)
pub fn stable_to_collateral(amount: u128, price: u128, rate: u128) -> VaultResult<u128> {
    if price == 0 || rate == 0 {
        return Err(VaultError::DivisionByZero);
    }

    let numerator = U512::from(amount)
        .checked_mul(U512::from(WAD))
        .and_then(|v| v.checked_mul(U512::from(PRICE_SCALE)))
        .ok_or(VaultError::ArithmeticOverflow)?;
    let denominator = U512::from(price) * U512::from(rate);

    to_u128(numerator / denominator)
}

/// Receipt units minted for `amount` base asset at `rate`
pub fn base_to_receipt(amount: u128, rate: u128) -> VaultResult<u128> {
    mul_div(amount, WAD, rate)
}

/// Base asset released for `units` receipt units at `rate`
pub fn receipt_to_base(units: u128, rate: u128) -> VaultResult<u128> {
    mul_div(units, rate, WAD)
}
