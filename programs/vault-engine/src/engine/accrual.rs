use solana_program::{clock::UnixTimestamp, msg};

use crate::{
    constants::{SECONDS_PER_YEAR, WAD},
    error::{VaultError, VaultResult},
    math::mul_mul_div,
    state::Position,
};

/// Linear interest on `debt` for `elapsed` seconds at `apr` (WAD)
pub fn interest_for(debt: u128, apr: u128, elapsed: i64) -> VaultResult<u128> {
    if debt == 0 || elapsed <= 0 {
        return Ok(0);
    }
    mul_mul_div(debt, apr, elapsed as u128, SECONDS_PER_YEAR * WAD)
}

/// Bring the position's debt up to `now`; returns the interest added.
///
/// Interest is charged on the full debt, so unpaid interest compounds at
/// every checkpoint. Debt-free positions keep their timestamp.
pub fn accrue_interest(position: &mut Position, apr: u128, now: UnixTimestamp) -> VaultResult<u128> {
    if position.debt == 0 {
        return Ok(0);
    }

    let elapsed = now.saturating_sub(position.last_accrual_time);
    if elapsed <= 0 {
        return Ok(0);
    }

    let interest = interest_for(position.debt, apr, elapsed)?;
    position.debt = position
        .debt
        .checked_add(interest)
        .ok_or(VaultError::ArithmeticOverflow)?;
    position.last_accrual_time = now;

    if interest > 0 {
        msg!("Accrued {} interest on {} debt over {}s", interest, position.debt, elapsed);
    }

    Ok(interest)
}
