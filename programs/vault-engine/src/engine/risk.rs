use crate::{
    constants::{MAX_HEALTH_FACTOR, WAD},
    error::VaultResult,
    math::{collateral_to_usd, mul_div_saturating, stable_to_collateral, wad_mul},
    oracle::PriceQuote,
    state::{Position, RiskParameters},
};

/// USD value of the position's collateral (WAD)
pub fn collateral_value(position: &Position, quote: &PriceQuote) -> VaultResult<u128> {
    collateral_to_usd(
        position.collateral,
        quote.asset_price_usd,
        quote.receipt_exchange_rate,
    )
}

/// Collateral value over debt (WAD); `MAX_HEALTH_FACTOR` without debt.
/// Dust debt saturates at `MAX_HEALTH_FACTOR`.
pub fn health_factor(position: &Position, quote: &PriceQuote) -> VaultResult<u128> {
    if position.debt == 0 {
        return Ok(MAX_HEALTH_FACTOR);
    }
    let health = mul_div_saturating(collateral_value(position, quote)?, WAD, position.debt)?;
    Ok(health.min(MAX_HEALTH_FACTOR))
}

/// Strictly below the threshold; equality is still safe
pub fn is_liquidatable(
    position: &Position,
    quote: &PriceQuote,
    params: &RiskParameters,
) -> VaultResult<bool> {
    Ok(health_factor(position, quote)? < params.liquidation_threshold)
}

/// Stable units the position may still borrow
pub fn borrow_capacity(
    position: &Position,
    quote: &PriceQuote,
    params: &RiskParameters,
) -> VaultResult<u128> {
    if position.collateral == 0 {
        return Ok(0);
    }
    let max_borrow = wad_mul(collateral_value(position, quote)?, params.borrow_limit_fraction)?;
    Ok(max_borrow.saturating_sub(position.debt))
}

/// Receipt units that must stay in custody to back the debt at the threshold
pub fn required_collateral(
    position: &Position,
    quote: &PriceQuote,
    params: &RiskParameters,
) -> VaultResult<u128> {
    if position.debt == 0 {
        return Ok(0);
    }
    let debt_in_collateral = stable_to_collateral(
        position.debt,
        quote.asset_price_usd,
        quote.receipt_exchange_rate,
    )?;
    wad_mul(debt_in_collateral, params.liquidation_threshold)
}

pub fn max_withdrawable(
    position: &Position,
    quote: &PriceQuote,
    params: &RiskParameters,
) -> VaultResult<u128> {
    let required = required_collateral(position, quote, params)?;
    Ok(position.collateral.saturating_sub(required))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::PRICE_SCALE;
    use solana_program::pubkey::Pubkey;

    fn quote(price_usd: u128) -> PriceQuote {
        PriceQuote {
            asset_price_usd: price_usd * PRICE_SCALE,
            receipt_exchange_rate: WAD,
        }
    }

    fn position(collateral: u128, debt: u128) -> Position {
        let mut position = Position::new(Pubkey::new_unique());
        position.collateral = collateral;
        position.debt = debt;
        position.principal = debt;
        position
    }

    #[test]
    fn test_borrow_capacity_scenario() {
        let params = RiskParameters::new(Pubkey::new_unique());
        let capacity = borrow_capacity(&position(10 * WAD, 0), &quote(3_000), &params).unwrap();
        assert_eq!(capacity, 19_980 * WAD);

        let capacity = borrow_capacity(&position(10 * WAD, 19_000 * WAD), &quote(3_000), &params).unwrap();
        assert_eq!(capacity, 980 * WAD);

        // Debt above the limit leaves no capacity rather than failing
        let capacity = borrow_capacity(&position(10 * WAD, 25_000 * WAD), &quote(3_000), &params).unwrap();
        assert_eq!(capacity, 0);
    }

    #[test]
    fn test_no_collateral_no_capacity() {
        let params = RiskParameters::new(Pubkey::new_unique());
        assert_eq!(borrow_capacity(&position(0, 0), &quote(3_000), &params).unwrap(), 0);
    }

    #[test]
    fn test_health_factor_scenario() {
        let hf = health_factor(&position(10 * WAD, 10_000 * WAD), &quote(3_000)).unwrap();
        assert_eq!(hf, 3 * WAD);
    }

    #[test]
    fn test_health_factor_without_debt() {
        let hf = health_factor(&position(10 * WAD, 0), &quote(3_000)).unwrap();
        assert_eq!(hf, MAX_HEALTH_FACTOR);
    }

    #[test]
    fn test_health_factor_saturates_on_dust_debt() {
        let params = RiskParameters::new(Pubkey::new_unique());
        // 30000 USD over 1 wei of debt overflows u128 before clamping
        let dust = position(10 * WAD, 1);
        assert_eq!(health_factor(&dust, &quote(3_000)).unwrap(), MAX_HEALTH_FACTOR);
        assert!(!is_liquidatable(&dust, &quote(3_000), &params).unwrap());
    }

    #[test]
    fn test_threshold_is_exclusive() {
        let params = RiskParameters::new(Pubkey::new_unique());
        // 10 units at 1100 against 10000 debt: exactly 1.10
        let at_threshold = position(10 * WAD, 10_000 * WAD);
        assert_eq!(health_factor(&at_threshold, &quote(1_100)).unwrap(), params.liquidation_threshold);
        assert!(!is_liquidatable(&at_threshold, &quote(1_100), &params).unwrap());
        assert!(is_liquidatable(&at_threshold, &quote(1_099), &params).unwrap());
    }

    #[test]
    fn test_max_withdrawable() {
        let params = RiskParameters::new(Pubkey::new_unique());
        // 3000 debt at 3000 USD is 1 unit; 1.1 units must stay
        let withdrawable = max_withdrawable(&position(10 * WAD, 3_000 * WAD), &quote(3_000), &params).unwrap();
        assert_eq!(withdrawable, 8_900_000_000_000_000_000);

        let withdrawable = max_withdrawable(&position(10 * WAD, 0), &quote(3_000), &params).unwrap();
        assert_eq!(withdrawable, 10 * WAD);
    }
}
