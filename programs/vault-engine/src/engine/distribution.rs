//! Interest distribution and exchange rate rebase
//!
//! Repaid interest is split between the fee sink and the receipt holders.
//! The holders' share is converted to receipt units and accumulated until
//! the rebase interval has passed, then folded into the exchange rate.
//!
//! The whole distribution is planned before any collaborator is called, and
//! the exchange rate update is the last call an operation makes.

use solana_program::{
    clock::{Clock, UnixTimestamp},
    msg,
};

use crate::{
    collaborators::{BaseAsset, FeeSink, FeeToken, PriceOracle, ReceiptToken, StableUnit},
    constants::WAD,
    error::{VaultError, VaultResult},
    math::{mul_div, stable_to_collateral, wad_mul},
    oracle::PriceQuote,
    state::{RebaseAccumulator, RebaseOutcome, VaultTotals},
};

use super::{
    settlement::{Settlement, TokenMovement},
    VaultEngine,
};

/// Where one interest payment went
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Distribution {
    /// Stable units forwarded to the fee sink
    pub to_fee_sink: u128,
    /// Stable units credited to receipt holders
    pub to_pool: u128,
    /// `to_pool` expressed in receipt units
    pub pool_units: u128,
    pub rebase: Option<RebaseOutcome>,
}

/// (to_fee_sink, to_pool)
pub fn split_interest(interest: u128, fee_sink_share: u128) -> VaultResult<(u128, u128)> {
    let to_fee_sink = wad_mul(interest, fee_sink_share)?;
    let to_pool = interest
        .checked_sub(to_fee_sink)
        .ok_or(VaultError::ArithmeticOverflow)?;
    Ok((to_fee_sink, to_pool))
}

/// Exchange rate increase for `pending` units spread over `supply`
pub fn rate_increment(pending: u128, supply: u128) -> VaultResult<u128> {
    mul_div(pending, WAD, supply)
}

impl<R, S, B, O, F> VaultEngine<R, S, B, O, F>
where
    R: ReceiptToken,
    S: StableUnit,
    B: BaseAsset,
    O: PriceOracle,
    F: FeeSink,
{
    /// Size the split of `interest` and stage its bookkeeping.
    ///
    /// No collaborator is touched. The caller moves the fee sink share with
    /// `forward_interest_fee` and finishes with `finish_distribution`.
    pub(crate) fn plan_distribution(
        &self,
        interest: u128,
        quote: &PriceQuote,
        now: UnixTimestamp,
        rebase: &mut RebaseAccumulator,
        totals: &mut VaultTotals,
    ) -> VaultResult<Distribution> {
        if interest == 0 {
            return Ok(Distribution::default());
        }

        let (to_fee_sink, to_pool) = split_interest(interest, self.params.interest_fee_sink_share)?;
        if to_fee_sink > 0 {
            totals.record_fee(FeeToken::Stable, to_fee_sink)?;
        }

        let pool_units = stable_to_collateral(
            to_pool,
            quote.asset_price_usd,
            quote.receipt_exchange_rate,
        )?;
        if pool_units > 0 {
            rebase.accumulate(pool_units)?;
        }
        totals.record_distribution(interest)?;

        msg!(
            "Distributing {} interest: {} to fee sink, {} receipt units pending",
            interest,
            to_fee_sink,
            rebase.pending_interest
        );

        let rebase_outcome = if rebase.is_due(now, self.params.rebase_interval) {
            self.plan_rebase(rebase, now)?
        } else {
            None
        };

        Ok(Distribution {
            to_fee_sink,
            to_pool,
            pool_units,
            rebase: rebase_outcome,
        })
    }

    /// Move the fee sink share out of custody
    pub(crate) fn forward_interest_fee(
        &mut self,
        settlement: &mut Settlement,
        distribution: &Distribution,
    ) -> VaultResult<()> {
        if distribution.to_fee_sink == 0 {
            return Ok(());
        }
        let custody = self.custody;
        let sink = self.fee_sink.account();
        self.execute(
            settlement,
            TokenMovement::StableTransfer {
                from: custody,
                to: sink,
                amount: distribution.to_fee_sink,
            },
        )
    }

    /// Notify the fee sink, record pool interest and apply the planned rebase.
    ///
    /// None of these calls can be reversed; run after every token movement.
    pub(crate) fn finish_distribution(&mut self, distribution: &Distribution) -> VaultResult<()> {
        if distribution.to_fee_sink > 0 {
            self.fee_sink
                .receive_fee(FeeToken::Stable, distribution.to_fee_sink)?;
        }
        if distribution.pool_units > 0 {
            self.receipt.add_interest(distribution.pool_units)?;
        }
        if let Some(outcome) = distribution.rebase {
            self.apply_rebase(&outcome)?;
        }
        Ok(())
    }

    /// Compute the rate a rebase would set and reset the staged accumulator.
    ///
    /// Leaves the accumulator untouched when supply is zero or the increment
    /// truncates to nothing.
    fn plan_rebase(
        &self,
        rebase: &mut RebaseAccumulator,
        now: UnixTimestamp,
    ) -> VaultResult<Option<RebaseOutcome>> {
        let supply = self.receipt.total_supply();
        if supply == 0 {
            msg!("Rebase skipped: receipt supply is zero");
            return Ok(None);
        }

        let increment = rate_increment(rebase.pending_interest, supply)?;
        if increment == 0 {
            return Ok(None);
        }

        let previous_rate = self.receipt.exchange_rate();
        let new_rate = previous_rate
            .checked_add(increment)
            .ok_or(VaultError::ArithmeticOverflow)?;

        let outcome = RebaseOutcome {
            previous_rate,
            new_rate,
            distributed: rebase.pending_interest,
        };
        rebase.reset(now);
        Ok(Some(outcome))
    }

    fn apply_rebase(&mut self, outcome: &RebaseOutcome) -> VaultResult<()> {
        self.receipt.update_exchange_rate(outcome.new_rate)?;
        msg!("Rebase applied: rate {} -> {}", outcome.previous_rate, outcome.new_rate);
        Ok(())
    }

    /// Apply a rebase on demand once the interval has elapsed.
    ///
    /// `Ok(None)` when nothing is pending or there is no supply to spread it over.
    pub fn trigger_rebase(&mut self, clock: &Clock) -> VaultResult<Option<RebaseOutcome>> {
        let _guard = self.lock.acquire()?;
        let now = clock.unix_timestamp;

        if !self.rebase.interval_elapsed(now, self.params.rebase_interval) {
            msg!(
                "Rebase not due: last at {}, interval {}",
                self.rebase.last_rebase_time,
                self.params.rebase_interval
            );
            return Err(VaultError::RebaseNotDue);
        }

        if self.rebase.pending_interest == 0 {
            return Ok(None);
        }

        let mut rebase = self.rebase.clone();
        let outcome = self.plan_rebase(&mut rebase, now)?;
        if let Some(outcome) = &outcome {
            self.apply_rebase(outcome)?;
        }
        self.rebase = rebase;
        Ok(outcome)
    }
}
