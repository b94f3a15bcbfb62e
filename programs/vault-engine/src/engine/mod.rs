//! Vault accounting and liquidation engine
//!
//! Every mutating call takes the execution lock, loads a working copy of the
//! affected position, accrues interest, runs its checks and collaborator
//! calls, and only then commits the copy back into the ledger. Token
//! movements made before a failing collaborator call are reversed.

pub mod accrual;
pub mod distribution;
pub mod guard;
pub mod lending;
pub mod liquidation;
pub mod risk;
pub mod settlement;

use solana_program::{clock::Clock, msg, pubkey::Pubkey};

use crate::{
    collaborators::{BaseAsset, FeeSink, PriceOracle, ReceiptToken, StableUnit},
    constants::WAD,
    error::{VaultError, VaultResult},
    oracle::PriceQuote,
    state::{ParameterUpdate, Position, PositionLedger, RebaseAccumulator, RiskParameters, VaultTotals},
};

pub use accrual::accrue_interest;
pub use distribution::Distribution;
pub use guard::{ExecutionGuard, ExecutionLock};
pub use lending::RepayOutcome;
pub use liquidation::{LiquidationOutcome, LiquidationPlan};
pub use settlement::{Settlement, TokenMovement};

/// External parties the engine drives
pub struct Collaborators<R, S, B, O, F> {
    pub receipt: R,
    pub stable: S,
    pub base: B,
    pub oracle: O,
    pub fee_sink: F,
}

pub struct VaultEngine<R, S, B, O, F> {
    /// Account holding collateral and in-flight stable units
    custody: Pubkey,
    params: RiskParameters,
    ledger: PositionLedger,
    rebase: RebaseAccumulator,
    totals: VaultTotals,
    lock: ExecutionLock,
    receipt: R,
    stable: S,
    base: B,
    oracle: O,
    fee_sink: F,
}

pub(crate) fn ensure_address(key: &Pubkey) -> VaultResult<()> {
    if *key == Pubkey::default() {
        msg!("Rejected default address");
        return Err(VaultError::InvalidAddress);
    }
    Ok(())
}

pub(crate) fn ensure_amount(amount: u128) -> VaultResult<()> {
    if amount == 0 {
        return Err(VaultError::ZeroAmount);
    }
    Ok(())
}

impl<R, S, B, O, F> VaultEngine<R, S, B, O, F>
where
    R: ReceiptToken,
    S: StableUnit,
    B: BaseAsset,
    O: PriceOracle,
    F: FeeSink,
{
    pub fn new(
        custody: Pubkey,
        params: RiskParameters,
        collaborators: Collaborators<R, S, B, O, F>,
        clock: &Clock,
    ) -> VaultResult<Self> {
        ensure_address(&custody)?;
        ensure_address(&params.authority)?;
        params.validate()?;

        msg!("Vault engine initialized with custody {}", custody);

        Ok(Self {
            custody,
            params,
            ledger: PositionLedger::new(),
            rebase: RebaseAccumulator::new(clock.unix_timestamp),
            totals: VaultTotals::default(),
            lock: ExecutionLock::new(),
            receipt: collaborators.receipt,
            stable: collaborators.stable,
            base: collaborators.base,
            oracle: collaborators.oracle,
            fee_sink: collaborators.fee_sink,
        })
    }

    /// Current price and exchange rate, both validated
    pub fn quote(&self, clock: &Clock) -> VaultResult<PriceQuote> {
        let asset_price_usd = self.oracle.get_asset_price_usd(clock)?;
        if asset_price_usd == 0 {
            return Err(VaultError::PriceInvalid);
        }
        Ok(PriceQuote {
            asset_price_usd,
            receipt_exchange_rate: self.checked_exchange_rate()?,
        })
    }

    fn checked_exchange_rate(&self) -> VaultResult<u128> {
        let rate = self.receipt.exchange_rate();
        if rate < WAD {
            msg!("Exchange rate below one: {}", rate);
            return Err(VaultError::InvalidExchangeRate);
        }
        Ok(rate)
    }

    fn commit(&mut self, position: Position, rebase: RebaseAccumulator, totals: VaultTotals) {
        self.ledger.store(position);
        self.rebase = rebase;
        self.totals = totals;
    }

    /// Working copy of `owner`'s position with interest brought up to now
    fn projected_position(&self, owner: &Pubkey, clock: &Clock) -> VaultResult<Position> {
        let mut position = self.ledger.load(owner);
        accrue_interest(&mut position, self.params.borrow_apr, clock.unix_timestamp)?;
        Ok(position)
    }

    fn authorize(&self, signer: &Pubkey) -> VaultResult<()> {
        if *signer != self.params.authority {
            msg!("Unauthorized signer {}", signer);
            return Err(VaultError::Unauthorized);
        }
        Ok(())
    }

    // Administration

    pub fn update_parameter(
        &mut self,
        signer: &Pubkey,
        update: ParameterUpdate,
        clock: &Clock,
    ) -> VaultResult<()> {
        let _guard = self.lock.acquire()?;
        self.authorize(signer)?;

        self.params.apply(update, clock.unix_timestamp)?;
        msg!("Risk parameter updated: {:?}", update);
        Ok(())
    }

    pub fn set_authority(&mut self, signer: &Pubkey, new_authority: Pubkey) -> VaultResult<()> {
        let _guard = self.lock.acquire()?;
        self.authorize(signer)?;
        ensure_address(&new_authority)?;

        self.params.authority = new_authority;
        msg!("Authority transferred to {}", new_authority);
        Ok(())
    }

    /// Swap the price source; returns the previous one
    pub fn replace_oracle(&mut self, signer: &Pubkey, oracle: O) -> VaultResult<O> {
        let _guard = self.lock.acquire()?;
        self.authorize(signer)?;
        Ok(std::mem::replace(&mut self.oracle, oracle))
    }

    /// Swap the fee sink; returns the previous one
    pub fn replace_fee_sink(&mut self, signer: &Pubkey, fee_sink: F) -> VaultResult<F> {
        let _guard = self.lock.acquire()?;
        self.authorize(signer)?;
        ensure_address(&fee_sink.account())?;
        Ok(std::mem::replace(&mut self.fee_sink, fee_sink))
    }

    // Views

    pub fn position(&self, owner: &Pubkey) -> Option<&Position> {
        self.ledger.get(owner)
    }

    pub fn positions(&self) -> impl Iterator<Item = &Position> {
        self.ledger.iter()
    }

    pub fn health_factor(&self, owner: &Pubkey, clock: &Clock) -> VaultResult<u128> {
        let position = self.projected_position(owner, clock)?;
        risk::health_factor(&position, &self.quote(clock)?)
    }

    pub fn borrow_capacity(&self, owner: &Pubkey, clock: &Clock) -> VaultResult<u128> {
        let position = self.projected_position(owner, clock)?;
        risk::borrow_capacity(&position, &self.quote(clock)?, &self.params)
    }

    pub fn max_withdrawable(&self, owner: &Pubkey, clock: &Clock) -> VaultResult<u128> {
        let position = self.projected_position(owner, clock)?;
        if position.debt == 0 {
            return Ok(position.collateral);
        }
        risk::max_withdrawable(&position, &self.quote(clock)?, &self.params)
    }

    pub fn risk_parameters(&self) -> &RiskParameters {
        &self.params
    }

    pub fn rebase_state(&self) -> &RebaseAccumulator {
        &self.rebase
    }

    pub fn totals(&self) -> &VaultTotals {
        &self.totals
    }

    pub fn custody(&self) -> Pubkey {
        self.custody
    }

    /// Handle on the engine's execution lock
    pub fn execution_lock(&self) -> ExecutionLock {
        self.lock.clone()
    }

    pub fn receipt(&self) -> &R {
        &self.receipt
    }

    pub fn stable(&self) -> &S {
        &self.stable
    }

    pub fn base(&self) -> &B {
        &self.base
    }

    pub fn oracle(&self) -> &O {
        &self.oracle
    }

    pub fn fee_sink(&self) -> &F {
        &self.fee_sink
    }

    pub fn receipt_mut(&mut self) -> &mut R {
        &mut self.receipt
    }

    pub fn stable_mut(&mut self) -> &mut S {
        &mut self.stable
    }

    pub fn base_mut(&mut self) -> &mut B {
        &mut self.base
    }

    pub fn oracle_mut(&mut self) -> &mut O {
        &mut self.oracle
    }

    pub fn fee_sink_mut(&mut self) -> &mut F {
        &mut self.fee_sink
    }
}
