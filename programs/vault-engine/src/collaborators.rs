//! Interfaces the engine requires from the token ledgers, the base asset
//! custody, the price source and the fee sink.
//!
//! `transfer_from` moves `owner` funds on the strength of an allowance
//! granted to `spender`; the engine always passes its custody account.

use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::{clock::Clock, pubkey::Pubkey};

use crate::error::VaultResult;

/// Yield-bearing receipt token with a rebasing exchange rate
pub trait ReceiptToken {
    fn mint(&mut self, to: &Pubkey, amount: u128) -> VaultResult<()>;

    fn burn(&mut self, from: &Pubkey, amount: u128) -> VaultResult<()>;

    fn transfer(&mut self, from: &Pubkey, to: &Pubkey, amount: u128) -> VaultResult<()>;

    fn transfer_from(
        &mut self,
        spender: &Pubkey,
        owner: &Pubkey,
        to: &Pubkey,
        amount: u128,
    ) -> VaultResult<()>;

    fn total_supply(&self) -> u128;

    /// Base asset per receipt unit (WAD), never decreasing
    fn exchange_rate(&self) -> u128;

    /// Must fail with `ExchangeRateDecrease` when `new_rate` is below the current rate
    fn update_exchange_rate(&mut self, new_rate: u128) -> VaultResult<()>;

    /// Bookkeeping of interest earmarked for holders
    fn add_interest(&mut self, amount: u128) -> VaultResult<()>;
}

/// Pegged debt unit
pub trait StableUnit {
    fn mint(&mut self, to: &Pubkey, amount: u128) -> VaultResult<()>;

    fn burn(&mut self, from: &Pubkey, amount: u128) -> VaultResult<()>;

    fn transfer(&mut self, from: &Pubkey, to: &Pubkey, amount: u128) -> VaultResult<()>;

    fn transfer_from(
        &mut self,
        spender: &Pubkey,
        owner: &Pubkey,
        to: &Pubkey,
        amount: u128,
    ) -> VaultResult<()>;
}

/// Custody of the deposited base asset
pub trait BaseAsset {
    /// Pull `amount` from `from` into custody
    fn receive(&mut self, from: &Pubkey, amount: u128) -> VaultResult<()>;

    /// Pay `amount` out of custody to `to`
    fn release(&mut self, to: &Pubkey, amount: u128) -> VaultResult<()>;

    /// Base asset currently held
    fn reserve(&self) -> u128;
}

/// Source of the base asset USD price (8 decimals)
pub trait PriceOracle {
    /// Fails with `PriceStale` past the validity window, `PriceInvalid` for non-positive quotes
    fn get_asset_price_usd(&self, clock: &Clock) -> VaultResult<u128>;
}

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeeToken {
    Stable,
    Receipt,
}

/// Treasury collecting protocol fees
pub trait FeeSink {
    /// Account fee transfers are sent to
    fn account(&self) -> Pubkey;

    /// Called once `amount` of `token` has been transferred to `account()`
    fn receive_fee(&mut self, token: FeeToken, amount: u128) -> VaultResult<()>;
}
