#![allow(dead_code)]

use std::collections::HashMap;

use solana_program::{
    clock::{Clock, UnixTimestamp},
    pubkey::Pubkey,
};
use vault_engine::{
    constants::{PRICE_SCALE, WAD},
    BaseAsset, Collaborators, ExecutionLock, FeeSink, FeeToken, PriceFeed, ReceiptToken,
    RiskParameters, StableUnit, VaultEngine, VaultError, VaultResult,
};

pub const START: UnixTimestamp = 1_700_000_000;
pub const DAY: i64 = 86_400;
pub const YEAR: i64 = 31_536_000;

pub type TestEngine = VaultEngine<ReceiptLedger, StableLedger, BaseCustody, PriceFeed, FeeRecorder>;

/// Balances, allowances and supply of a fungible token
#[derive(Debug, Default)]
pub struct TokenLedger {
    pub balances: HashMap<Pubkey, u128>,
    /// (owner, spender) -> remaining allowance
    pub allowances: HashMap<(Pubkey, Pubkey), u128>,
    pub supply: u128,
    /// Transfers into or out of this account fail
    pub frozen: Option<Pubkey>,
}

impl TokenLedger {
    pub fn balance_of(&self, account: &Pubkey) -> u128 {
        self.balances.get(account).copied().unwrap_or(0)
    }

    pub fn approve(&mut self, owner: &Pubkey, spender: &Pubkey, amount: u128) {
        self.allowances.insert((*owner, *spender), amount);
    }

    pub fn mint(&mut self, to: &Pubkey, amount: u128) -> VaultResult<()> {
        *self.balances.entry(*to).or_insert(0) += amount;
        self.supply += amount;
        Ok(())
    }

    pub fn burn(&mut self, from: &Pubkey, amount: u128) -> VaultResult<()> {
        let balance = self.balance_of(from);
        if balance < amount {
            return Err(VaultError::InsufficientBalance);
        }
        self.balances.insert(*from, balance - amount);
        self.supply -= amount;
        Ok(())
    }

    pub fn transfer(&mut self, from: &Pubkey, to: &Pubkey, amount: u128) -> VaultResult<()> {
        if matches!(self.frozen, Some(account) if account == *from || account == *to) {
            return Err(VaultError::InvalidAddress);
        }
        let balance = self.balance_of(from);
        if balance < amount {
            return Err(VaultError::InsufficientBalance);
        }
        self.balances.insert(*from, balance - amount);
        *self.balances.entry(*to).or_insert(0) += amount;
        Ok(())
    }

    pub fn transfer_from(
        &mut self,
        spender: &Pubkey,
        owner: &Pubkey,
        to: &Pubkey,
        amount: u128,
    ) -> VaultResult<()> {
        let allowance = self.allowances.get(&(*owner, *spender)).copied().unwrap_or(0);
        if allowance < amount {
            return Err(VaultError::InsufficientAllowance);
        }
        self.transfer(owner, to, amount)?;
        self.allowances.insert((*owner, *spender), allowance - amount);
        Ok(())
    }
}

#[derive(Debug)]
pub struct ReceiptLedger {
    pub tokens: TokenLedger,
    pub rate: u128,
    pub interest_added: u128,
    /// When set, every mint tries to enter the engine through this lock
    pub reentry_lock: Option<ExecutionLock>,
    pub reentry_result: Option<VaultResult<()>>,
}

impl Default for ReceiptLedger {
    fn default() -> Self {
        Self {
            tokens: TokenLedger::default(),
            rate: WAD,
            interest_added: 0,
            reentry_lock: None,
            reentry_result: None,
        }
    }
}

impl ReceiptToken for ReceiptLedger {
    fn mint(&mut self, to: &Pubkey, amount: u128) -> VaultResult<()> {
        if let Some(lock) = &self.reentry_lock {
            self.reentry_result = Some(lock.acquire().map(|_| ()));
        }
        self.tokens.mint(to, amount)
    }

    fn burn(&mut self, from: &Pubkey, amount: u128) -> VaultResult<()> {
        self.tokens.burn(from, amount)
    }

    fn transfer(&mut self, from: &Pubkey, to: &Pubkey, amount: u128) -> VaultResult<()> {
        self.tokens.transfer(from, to, amount)
    }

    fn transfer_from(
        &mut self,
        spender: &Pubkey,
        owner: &Pubkey,
        to: &Pubkey,
        amount: u128,
    ) -> VaultResult<()> {
        self.tokens.transfer_from(spender, owner, to, amount)
    }

    fn total_supply(&self) -> u128 {
        self.tokens.supply
    }

    fn exchange_rate(&self) -> u128 {
        self.rate
    }

    fn update_exchange_rate(&mut self, new_rate: u128) -> VaultResult<()> {
        if new_rate < self.rate {
            return Err(VaultError::ExchangeRateDecrease);
        }
        self.rate = new_rate;
        Ok(())
    }

    fn add_interest(&mut self, amount: u128) -> VaultResult<()> {
        self.interest_added += amount;
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct StableLedger {
    pub tokens: TokenLedger,
}

impl StableUnit for StableLedger {
    fn mint(&mut self, to: &Pubkey, amount: u128) -> VaultResult<()> {
        self.tokens.mint(to, amount)
    }

    fn burn(&mut self, from: &Pubkey, amount: u128) -> VaultResult<()> {
        self.tokens.burn(from, amount)
    }

    fn transfer(&mut self, from: &Pubkey, to: &Pubkey, amount: u128) -> VaultResult<()> {
        self.tokens.transfer(from, to, amount)
    }

    fn transfer_from(
        &mut self,
        spender: &Pubkey,
        owner: &Pubkey,
        to: &Pubkey,
        amount: u128,
    ) -> VaultResult<()> {
        self.tokens.transfer_from(spender, owner, to, amount)
    }
}

/// Base asset wallets plus the vault reserve
#[derive(Debug, Default)]
pub struct BaseCustody {
    pub wallets: HashMap<Pubkey, u128>,
    pub reserve: u128,
}

impl BaseCustody {
    pub fn wallet(&self, owner: &Pubkey) -> u128 {
        self.wallets.get(owner).copied().unwrap_or(0)
    }
}

impl BaseAsset for BaseCustody {
    fn receive(&mut self, from: &Pubkey, amount: u128) -> VaultResult<()> {
        let balance = self.wallet(from);
        if balance < amount {
            return Err(VaultError::InsufficientBalance);
        }
        self.wallets.insert(*from, balance - amount);
        self.reserve += amount;
        Ok(())
    }

    fn release(&mut self, to: &Pubkey, amount: u128) -> VaultResult<()> {
        if self.reserve < amount {
            return Err(VaultError::InsufficientReserve);
        }
        self.reserve -= amount;
        *self.wallets.entry(*to).or_insert(0) += amount;
        Ok(())
    }

    fn reserve(&self) -> u128 {
        self.reserve
    }
}

#[derive(Debug)]
pub struct FeeRecorder {
    pub account: Pubkey,
    pub received: Vec<(FeeToken, u128)>,
    /// Notifications for this token are refused
    pub rejects: Option<FeeToken>,
}

impl FeeRecorder {
    pub fn new() -> Self {
        Self {
            account: Pubkey::new_unique(),
            received: Vec::new(),
            rejects: None,
        }
    }

    pub fn rejecting(token: FeeToken) -> Self {
        Self {
            rejects: Some(token),
            ..Self::new()
        }
    }

    pub fn total(&self, token: FeeToken) -> u128 {
        self.received
            .iter()
            .filter(|(t, _)| *t == token)
            .map(|(_, amount)| amount)
            .sum()
    }
}

impl FeeSink for FeeRecorder {
    fn account(&self) -> Pubkey {
        self.account
    }

    fn receive_fee(&mut self, token: FeeToken, amount: u128) -> VaultResult<()> {
        if self.rejects == Some(token) {
            return Err(VaultError::Unauthorized);
        }
        self.received.push((token, amount));
        Ok(())
    }
}

pub fn clock_at(unix_timestamp: UnixTimestamp) -> Clock {
    Clock {
        unix_timestamp,
        ..Clock::default()
    }
}

pub fn feed_price(usd: u128) -> i64 {
    (usd * PRICE_SCALE) as i64
}

/// Engine at `START` with default parameters and a fresh price
pub fn new_engine(price_usd: u128) -> (TestEngine, Pubkey) {
    let authority = Pubkey::new_unique();
    let collaborators = Collaborators {
        receipt: ReceiptLedger::default(),
        stable: StableLedger::default(),
        base: BaseCustody::default(),
        oracle: PriceFeed::new(feed_price(price_usd), START),
        fee_sink: FeeRecorder::new(),
    };
    let engine = VaultEngine::new(
        Pubkey::new_unique(),
        RiskParameters::new(authority),
        collaborators,
        &clock_at(START),
    )
    .unwrap();
    (engine, authority)
}

pub fn set_price(engine: &mut TestEngine, usd: u128, now: UnixTimestamp) {
    engine.oracle_mut().update(feed_price(usd), now);
}

/// Deposit `units` of base asset and lock every minted receipt unit as collateral
pub fn open_position(engine: &mut TestEngine, user: &Pubkey, units: u128, now: UnixTimestamp) {
    let custody = engine.custody();
    *engine.base_mut().wallets.entry(*user).or_insert(0) += units;
    let minted = engine.deposit(user, units).unwrap();
    engine.receipt_mut().tokens.approve(user, &custody, minted);
    engine.collateralize(user, minted, &clock_at(now)).unwrap();
}

/// Credit `amount` stable units to `user` and let custody pull them
pub fn fund_stable(engine: &mut TestEngine, user: &Pubkey, amount: u128) {
    let custody = engine.custody();
    let stable = &mut engine.stable_mut().tokens;
    stable.mint(user, amount).unwrap();
    let allowance = stable.allowances.get(&(*user, custody)).copied().unwrap_or(0);
    stable.approve(user, &custody, allowance + amount);
}

pub fn approve_stable(engine: &mut TestEngine, user: &Pubkey, amount: u128) {
    let custody = engine.custody();
    engine.stable_mut().tokens.approve(user, &custody, amount);
}

pub fn stable_balance(engine: &TestEngine, account: &Pubkey) -> u128 {
    engine.stable().tokens.balance_of(account)
}

pub fn receipt_balance(engine: &TestEngine, account: &Pubkey) -> u128 {
    engine.receipt().tokens.balance_of(account)
}

pub fn assert_totals_match(engine: &TestEngine) {
    assert!(
        engine.totals().matches(engine.positions()),
        "totals {:?} diverged from ledger",
        engine.totals()
    );
}

/// Every collaborator balance a failed operation must leave untouched
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerSnapshot {
    pub stable: Vec<u128>,
    pub receipt: Vec<u128>,
    pub base: Vec<u128>,
    pub reserve: u128,
    pub stable_supply: u128,
    pub receipt_supply: u128,
    pub rate: u128,
    pub interest_added: u128,
}

/// Snapshot `accounts` plus custody and the fee sink
pub fn snapshot(engine: &TestEngine, accounts: &[Pubkey]) -> LedgerSnapshot {
    let mut tracked = accounts.to_vec();
    tracked.push(engine.custody());
    tracked.push(engine.fee_sink().account);

    LedgerSnapshot {
        stable: tracked.iter().map(|a| stable_balance(engine, a)).collect(),
        receipt: tracked.iter().map(|a| receipt_balance(engine, a)).collect(),
        base: tracked.iter().map(|a| engine.base().wallet(a)).collect(),
        reserve: engine.base().reserve,
        stable_supply: engine.stable().tokens.supply,
        receipt_supply: engine.receipt().tokens.supply,
        rate: engine.receipt().rate,
        interest_added: engine.receipt().interest_added,
    }
}
