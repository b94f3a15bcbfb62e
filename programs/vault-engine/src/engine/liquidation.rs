//! Partial liquidation of unhealthy positions
//!
//! A liquidator repays part of the borrower's debt and receives collateral
//! worth the repaid amount plus the liquidation discount, minus the fee sink
//! cut. Every amount is planned before the first token moves, and the fee
//! sink is only notified once all tokens have moved.

use solana_program::{clock::Clock, msg, pubkey::Pubkey};

use crate::{
    collaborators::{BaseAsset, FeeSink, FeeToken, PriceOracle, ReceiptToken, StableUnit},
    constants::WAD,
    error::{VaultError, VaultResult},
    math::{mul_div, stable_to_collateral, wad_mul},
    oracle::PriceQuote,
    state::{Position, RebaseOutcome, RepaymentSplit, RiskParameters},
};

use super::{
    accrue_interest, ensure_address, ensure_amount, risk, settlement::TokenMovement, VaultEngine,
};

/// Amounts a liquidation will move, computed up front
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LiquidationPlan {
    /// Stable units taken from the liquidator after the close factor cap
    pub repaid: u128,
    pub split: RepaymentSplit,
    /// Receipt units removed from the position
    pub seized: u128,
    /// Part of `seized` sent to the fee sink
    pub fee: u128,
    pub to_liquidator: u128,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LiquidationOutcome {
    pub repaid: u128,
    pub interest_repaid: u128,
    pub principal_repaid: u128,
    pub seized: u128,
    pub fee: u128,
    pub to_liquidator: u128,
    /// Stable units forwarded to the fee sink from the interest share
    pub interest_to_fee_sink: u128,
    pub burned: u128,
    pub rebase: Option<RebaseOutcome>,
}

/// Size a liquidation of `position` for a requested repayment
pub fn plan_liquidation(
    position: &Position,
    requested: u128,
    quote: &PriceQuote,
    params: &RiskParameters,
) -> VaultResult<LiquidationPlan> {
    // Dust debt below the fraction's resolution stays repayable
    let max_repay = match wad_mul(position.debt, params.max_liquidation_fraction)? {
        0 if position.debt > 0 => 1,
        cap => cap,
    };
    let repaid = requested.min(max_repay);
    if repaid == 0 {
        return Err(VaultError::ZeroAmount);
    }

    let split = position.split_repayment(repaid);

    let repaid_in_collateral =
        stable_to_collateral(repaid, quote.asset_price_usd, quote.receipt_exchange_rate)?;
    let discount_base = WAD
        .checked_sub(params.liquidation_discount)
        .ok_or(VaultError::InvalidParameter)?;
    let seized = mul_div(repaid_in_collateral, WAD, discount_base)?;
    if seized > position.collateral {
        msg!("Seizure of {} exceeds collateral {}", seized, position.collateral);
        return Err(VaultError::InsufficientCollateral);
    }

    let fee = wad_mul(seized, params.liquidation_fee_fraction)?;

    Ok(LiquidationPlan {
        repaid,
        split,
        seized,
        fee,
        to_liquidator: seized - fee,
    })
}

impl<R, S, B, O, F> VaultEngine<R, S, B, O, F>
where
    R: ReceiptToken,
    S: StableUnit,
    B: BaseAsset,
    O: PriceOracle,
    F: FeeSink,
{
    pub fn liquidate(
        &mut self,
        liquidator: &Pubkey,
        borrower: &Pubkey,
        debt_to_repay: u128,
        clock: &Clock,
    ) -> VaultResult<LiquidationOutcome> {
        let _guard = self.lock.acquire()?;
        ensure_address(liquidator)?;
        ensure_address(borrower)?;
        ensure_amount(debt_to_repay)?;
        if liquidator == borrower {
            msg!("Self-liquidation rejected for {}", borrower);
            return Err(VaultError::InvalidAddress);
        }

        let now = clock.unix_timestamp;
        let quote = self.quote(clock)?;
        let mut position = self.ledger.load(borrower);
        let mut totals = self.totals.clone();
        let mut rebase = self.rebase.clone();

        let accrued = accrue_interest(&mut position, self.params.borrow_apr, now)?;
        totals.add_interest(accrued)?;

        if !risk::is_liquidatable(&position, &quote, &self.params)? {
            msg!(
                "Position {} healthy at threshold {}",
                borrower,
                self.params.liquidation_threshold
            );
            return Err(VaultError::NotLiquidatable);
        }

        let plan = plan_liquidation(&position, debt_to_repay, &quote, &self.params)?;
        let distribution =
            self.plan_distribution(plan.split.interest, &quote, now, &mut rebase, &mut totals)?;
        let burned = plan.repaid - distribution.to_fee_sink;
        if plan.fee > 0 {
            totals.record_fee(FeeToken::Receipt, plan.fee)?;
        }
        position.apply_repayment(&plan.split)?;
        position.debit_collateral(plan.seized)?;
        position.last_accrual_time = now;
        totals.remove_debt(plan.split.interest, plan.split.principal)?;
        totals.remove_collateral(plan.seized)?;

        let receiver = *liquidator;
        self.settle(|engine, settlement| {
            let custody = engine.custody;
            let sink = engine.fee_sink.account();

            // Settle
            engine.execute(
                settlement,
                TokenMovement::StablePull { owner: receiver, amount: plan.repaid },
            )?;
            engine.forward_interest_fee(settlement, &distribution)?;
            if burned > 0 {
                engine.execute(settlement, TokenMovement::StableBurn { from: custody, amount: burned })?;
            }

            // Seize
            if plan.fee > 0 {
                engine.execute(
                    settlement,
                    TokenMovement::ReceiptTransfer { from: custody, to: sink, amount: plan.fee },
                )?;
            }
            if plan.to_liquidator > 0 {
                engine.execute(
                    settlement,
                    TokenMovement::ReceiptTransfer {
                        from: custody,
                        to: receiver,
                        amount: plan.to_liquidator,
                    },
                )?;
            }

            // Notify
            if plan.fee > 0 {
                engine.fee_sink.receive_fee(FeeToken::Receipt, plan.fee)?;
            }
            engine.finish_distribution(&distribution)
        })?;

        msg!(
            "Liquidated {}: repaid {}, seized {} ({} fee)",
            borrower,
            plan.repaid,
            plan.seized,
            plan.fee
        );
        self.commit(position, rebase, totals);

        Ok(LiquidationOutcome {
            repaid: plan.repaid,
            interest_repaid: plan.split.interest,
            principal_repaid: plan.split.principal,
            seized: plan.seized,
            fee: plan.fee,
            to_liquidator: plan.to_liquidator,
            interest_to_fee_sink: distribution.to_fee_sink,
            burned,
            rebase: distribution.rebase,
        })
    }
}
