use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::{clock::UnixTimestamp, msg, pubkey::Pubkey};

use crate::{
    constants::*,
    error::{VaultError, VaultResult},
    math::wad_mul,
};

/// Process-wide risk configuration. All fractions are WAD fixed point.
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct RiskParameters {
    /// Account discriminator
    pub discriminator: [u8; 8],

    /// Authority that can update parameters
    pub authority: Pubkey,

    /// Share of collateral value that may be borrowed (0.666 = 66.6%)
    pub borrow_limit_fraction: u128,

    /// Health factor below which a position is liquidatable (1.10 = 110%)
    pub liquidation_threshold: u128,

    /// Fee taken from each borrow
    pub borrow_fee_fraction: u128,

    /// Annual interest rate charged on debt
    pub borrow_apr: u128,

    /// Bonus granted to liquidators on seized collateral
    pub liquidation_discount: u128,

    /// Largest share of a position's debt one liquidation may repay
    pub max_liquidation_fraction: u128,

    /// Share of seized collateral routed to the fee sink
    pub liquidation_fee_fraction: u128,

    /// Share of repaid interest routed to the fee sink
    pub interest_fee_sink_share: u128,

    /// Minimum seconds between rebases
    pub rebase_interval: i64,

    /// Last update timestamp
    pub last_update: UnixTimestamp,
}

/// Settable risk fields
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterUpdate {
    BorrowLimitFraction(u128),
    LiquidationThreshold(u128),
    BorrowFeeFraction(u128),
    BorrowApr(u128),
}

impl RiskParameters {
    pub const DISCRIMINATOR: [u8; 8] = [86, 76, 84, 95, 82, 73, 83, 75]; // "VLT_RISK"

    pub const LEN: usize = 8 + // discriminator
        32 + // authority
        16 + // borrow_limit_fraction
        16 + // liquidation_threshold
        16 + // borrow_fee_fraction
        16 + // borrow_apr
        16 + // liquidation_discount
        16 + // max_liquidation_fraction
        16 + // liquidation_fee_fraction
        16 + // interest_fee_sink_share
        8 + // rebase_interval
        8; // last_update

    /// Default configuration owned by `authority`
    pub fn new(authority: Pubkey) -> Self {
        Self {
            discriminator: Self::DISCRIMINATOR,
            authority,
            borrow_limit_fraction: DEFAULT_BORROW_LIMIT_FRACTION,
            liquidation_threshold: DEFAULT_LIQUIDATION_THRESHOLD,
            borrow_fee_fraction: DEFAULT_BORROW_FEE_FRACTION,
            borrow_apr: DEFAULT_BORROW_APR,
            liquidation_discount: DEFAULT_LIQUIDATION_DISCOUNT,
            max_liquidation_fraction: DEFAULT_MAX_LIQUIDATION_FRACTION,
            liquidation_fee_fraction: DEFAULT_LIQUIDATION_FEE_FRACTION,
            interest_fee_sink_share: DEFAULT_INTEREST_FEE_SINK_SHARE,
            rebase_interval: DEFAULT_REBASE_INTERVAL,
            last_update: 0,
        }
    }

    pub fn validate(&self) -> VaultResult<()> {
        if self.discriminator != Self::DISCRIMINATOR {
            return Err(VaultError::InvalidParameter);
        }

        if self.borrow_limit_fraction == 0 || self.borrow_limit_fraction >= WAD {
            msg!("Borrow limit fraction out of range: {}", self.borrow_limit_fraction);
            return Err(VaultError::InvalidParameter);
        }

        if self.liquidation_threshold < WAD {
            msg!("Liquidation threshold below 1.0: {}", self.liquidation_threshold);
            return Err(VaultError::InvalidParameter);
        }

        // A position opened at the borrow limit must not start out liquidatable
        let limit_at_threshold = wad_mul(self.borrow_limit_fraction, self.liquidation_threshold)?;
        if limit_at_threshold > WAD {
            msg!(
                "Borrow limit {} incompatible with threshold {}",
                self.borrow_limit_fraction,
                self.liquidation_threshold
            );
            return Err(VaultError::InvalidParameter);
        }

        if self.borrow_fee_fraction >= WAD
            || self.borrow_apr > MAX_BORROW_APR
            || self.liquidation_discount >= WAD
            || self.liquidation_fee_fraction >= WAD
            || self.interest_fee_sink_share > WAD
        {
            return Err(VaultError::InvalidParameter);
        }

        if self.max_liquidation_fraction == 0 || self.max_liquidation_fraction > WAD {
            return Err(VaultError::InvalidParameter);
        }

        if self.rebase_interval <= 0 {
            return Err(VaultError::InvalidParameter);
        }

        Ok(())
    }

    pub fn set_borrow_limit_fraction(&mut self, value: u128, now: UnixTimestamp) -> VaultResult<()> {
        self.try_update(now, |params| params.borrow_limit_fraction = value)
    }

    pub fn set_liquidation_threshold(&mut self, value: u128, now: UnixTimestamp) -> VaultResult<()> {
        self.try_update(now, |params| params.liquidation_threshold = value)
    }

    pub fn set_borrow_fee_fraction(&mut self, value: u128, now: UnixTimestamp) -> VaultResult<()> {
        self.try_update(now, |params| params.borrow_fee_fraction = value)
    }

    pub fn set_borrow_apr(&mut self, value: u128, now: UnixTimestamp) -> VaultResult<()> {
        self.try_update(now, |params| params.borrow_apr = value)
    }

    /// Route an update to its typed setter
    pub fn apply(&mut self, update: ParameterUpdate, now: UnixTimestamp) -> VaultResult<()> {
        match update {
            ParameterUpdate::BorrowLimitFraction(value) => self.set_borrow_limit_fraction(value, now),
            ParameterUpdate::LiquidationThreshold(value) => self.set_liquidation_threshold(value, now),
            ParameterUpdate::BorrowFeeFraction(value) => self.set_borrow_fee_fraction(value, now),
            ParameterUpdate::BorrowApr(value) => self.set_borrow_apr(value, now),
        }
    }

    /// Apply `change` to a copy, validate it, then commit
    fn try_update<F>(&mut self, now: UnixTimestamp, change: F) -> VaultResult<()>
    where
        F: FnOnce(&mut Self),
    {
        let mut candidate = self.clone();
        change(&mut candidate);
        candidate.validate()?;
        candidate.last_update = now;
        *self = candidate;
        Ok(())
    }
}

impl Default for RiskParameters {
    fn default() -> Self {
        Self::new(Pubkey::default())
    }
}
