use solana_program::{clock::Clock, msg, pubkey::Pubkey};

use crate::{
    collaborators::{BaseAsset, FeeSink, FeeToken, PriceOracle, ReceiptToken, StableUnit},
    error::{VaultError, VaultResult},
    math::{base_to_receipt, receipt_to_base, wad_mul},
    state::RebaseOutcome,
};

use super::{
    accrue_interest, distribution::Distribution, ensure_address, ensure_amount, risk,
    settlement::TokenMovement, VaultEngine,
};

/// Result of a repayment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RepayOutcome {
    pub interest_paid: u128,
    pub principal_paid: u128,
    /// Stable units forwarded to the fee sink
    pub to_fee_sink: u128,
    /// Stable units destroyed
    pub burned: u128,
    pub rebase: Option<RebaseOutcome>,
}

impl<R, S, B, O, F> VaultEngine<R, S, B, O, F>
where
    R: ReceiptToken,
    S: StableUnit,
    B: BaseAsset,
    O: PriceOracle,
    F: FeeSink,
{
    /// Swap base asset for receipt units at the current exchange rate.
    /// Returns the receipt units minted.
    pub fn deposit(&mut self, caller: &Pubkey, amount: u128) -> VaultResult<u128> {
        let _guard = self.lock.acquire()?;
        ensure_address(caller)?;
        ensure_amount(amount)?;

        let rate = self.checked_exchange_rate()?;
        let minted = base_to_receipt(amount, rate)?;
        if minted == 0 {
            msg!("Deposit of {} mints no receipt units at rate {}", amount, rate);
            return Err(VaultError::ZeroAmount);
        }

        let depositor = *caller;
        self.settle(|engine, settlement| {
            engine.execute(settlement, TokenMovement::BaseReceive { from: depositor, amount })?;
            engine.execute(settlement, TokenMovement::ReceiptMint { to: depositor, amount: minted })
        })?;

        msg!("Deposited {} base asset, minted {} receipt units", amount, minted);
        Ok(minted)
    }

    /// Move receipt units from the caller into custody as collateral
    pub fn collateralize(&mut self, caller: &Pubkey, amount: u128, clock: &Clock) -> VaultResult<()> {
        let _guard = self.lock.acquire()?;
        ensure_address(caller)?;
        ensure_amount(amount)?;

        let mut position = self.ledger.load(caller);
        let mut totals = self.totals.clone();

        let accrued = accrue_interest(&mut position, self.params.borrow_apr, clock.unix_timestamp)?;
        totals.add_interest(accrued)?;

        position.credit_collateral(amount)?;
        totals.add_collateral(amount)?;

        let owner = *caller;
        self.settle(|engine, settlement| {
            engine.execute(settlement, TokenMovement::ReceiptPull { owner, amount })
        })?;

        msg!("Collateral of {} increased by {} to {}", caller, amount, position.collateral);
        let rebase = self.rebase.clone();
        self.commit(position, rebase, totals);
        Ok(())
    }

    /// Mint `amount` of new debt against the caller's collateral.
    /// Returns the stable units received after the borrow fee.
    pub fn borrow(&mut self, caller: &Pubkey, amount: u128, clock: &Clock) -> VaultResult<u128> {
        let _guard = self.lock.acquire()?;
        ensure_address(caller)?;
        ensure_amount(amount)?;

        let now = clock.unix_timestamp;
        let quote = self.quote(clock)?;
        let mut position = self.ledger.load(caller);
        let mut totals = self.totals.clone();

        let accrued = accrue_interest(&mut position, self.params.borrow_apr, now)?;
        totals.add_interest(accrued)?;

        let capacity = risk::borrow_capacity(&position, &quote, &self.params)?;
        if amount > capacity {
            msg!("Borrow of {} exceeds capacity {}", amount, capacity);
            return Err(VaultError::ExceedsBorrowLimit);
        }

        let fee = wad_mul(amount, self.params.borrow_fee_fraction)?;
        let net = amount - fee;

        position.add_debt(amount)?;
        position.last_accrual_time = now;
        totals.add_borrow(amount)?;

        if fee > 0 {
            totals.record_fee(FeeToken::Stable, fee)?;
        }

        let borrower = *caller;
        self.settle(|engine, settlement| {
            if net > 0 {
                engine.execute(settlement, TokenMovement::StableMint { to: borrower, amount: net })?;
            }
            if fee > 0 {
                let sink = engine.fee_sink.account();
                engine.execute(settlement, TokenMovement::StableMint { to: sink, amount: fee })?;
                engine.fee_sink.receive_fee(FeeToken::Stable, fee)?;
            }
            Ok(())
        })?;

        msg!(
            "Borrowed {} ({} fee), debt now {}, capacity left {}",
            amount,
            fee,
            position.debt,
            capacity - amount
        );
        let rebase = self.rebase.clone();
        self.commit(position, rebase, totals);
        Ok(net)
    }

    /// Pay down the caller's debt, interest first
    pub fn repay(&mut self, caller: &Pubkey, amount: u128, clock: &Clock) -> VaultResult<RepayOutcome> {
        let _guard = self.lock.acquire()?;
        ensure_address(caller)?;
        ensure_amount(amount)?;

        let now = clock.unix_timestamp;
        let mut position = self.ledger.load(caller);
        let mut totals = self.totals.clone();
        let mut rebase = self.rebase.clone();

        let accrued = accrue_interest(&mut position, self.params.borrow_apr, now)?;
        totals.add_interest(accrued)?;

        if amount > position.debt {
            msg!("Repay of {} exceeds debt {}", amount, position.debt);
            return Err(VaultError::RepayExceedsDebt);
        }

        let split = position.split_repayment(amount);
        // Interest is valued in receipt units, so only then is a price needed
        let quote = match split.interest {
            0 => None,
            _ => Some(self.quote(clock)?),
        };

        let distribution = match quote {
            Some(quote) => {
                self.plan_distribution(split.interest, &quote, now, &mut rebase, &mut totals)?
            }
            None => Distribution::default(),
        };
        let burned = amount - distribution.to_fee_sink;
        position.apply_repayment(&split)?;
        totals.remove_debt(split.interest, split.principal)?;

        let payer = *caller;
        self.settle(|engine, settlement| {
            engine.execute(settlement, TokenMovement::StablePull { owner: payer, amount })?;
            engine.forward_interest_fee(settlement, &distribution)?;
            if burned > 0 {
                let custody = engine.custody;
                engine.execute(settlement, TokenMovement::StableBurn { from: custody, amount: burned })?;
            }
            engine.finish_distribution(&distribution)
        })?;

        msg!(
            "Repaid {} interest and {} principal, debt now {}",
            split.interest,
            split.principal,
            position.debt
        );
        self.commit(position, rebase, totals);

        Ok(RepayOutcome {
            interest_paid: split.interest,
            principal_paid: split.principal,
            to_fee_sink: distribution.to_fee_sink,
            burned,
            rebase: distribution.rebase,
        })
    }

    /// Return up to `amount` collateral as base asset, keeping the position
    /// above the liquidation threshold. Returns the receipt units withdrawn.
    pub fn withdraw(&mut self, caller: &Pubkey, amount: u128, clock: &Clock) -> VaultResult<u128> {
        let _guard = self.lock.acquire()?;
        ensure_address(caller)?;
        ensure_amount(amount)?;

        let mut position = self.ledger.load(caller);
        let mut totals = self.totals.clone();

        let accrued = accrue_interest(&mut position, self.params.borrow_apr, clock.unix_timestamp)?;
        totals.add_interest(accrued)?;

        let (available, rate) = if position.debt == 0 {
            (position.collateral, self.checked_exchange_rate()?)
        } else {
            let quote = self.quote(clock)?;
            (
                risk::max_withdrawable(&position, &quote, &self.params)?,
                quote.receipt_exchange_rate,
            )
        };

        let withdrawn = amount.min(available);
        if withdrawn == 0 {
            msg!("Nothing withdrawable: collateral {}, debt {}", position.collateral, position.debt);
            return Err(VaultError::InsufficientCollateral);
        }

        let base_out = receipt_to_base(withdrawn, rate)?;
        let reserve = self.base.reserve();
        if reserve < base_out {
            msg!("Reserve {} cannot cover {} base asset", reserve, base_out);
            return Err(VaultError::InsufficientReserve);
        }

        position.debit_collateral(withdrawn)?;
        totals.remove_collateral(withdrawn)?;

        let owner = *caller;
        self.settle(|engine, settlement| {
            let custody = engine.custody;
            engine.execute(settlement, TokenMovement::ReceiptBurn { from: custody, amount: withdrawn })?;
            engine.execute(settlement, TokenMovement::BaseRelease { to: owner, amount: base_out })
        })?;

        msg!("Withdrew {} receipt units as {} base asset", withdrawn, base_out);
        let rebase = self.rebase.clone();
        self.commit(position, rebase, totals);
        Ok(withdrawn)
    }
}
