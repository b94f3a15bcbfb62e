//! Price feed adapter
//!
//! Stores the last published base asset price and refuses to serve it once
//! it has aged past the validity window.

use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::{
    clock::{Clock, UnixTimestamp},
    msg,
};

use crate::{
    collaborators::PriceOracle,
    constants::DEFAULT_MAX_PRICE_AGE,
    error::{VaultError, VaultResult},
};

/// Prices fetched for a single operation; never persisted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceQuote {
    /// USD per base asset unit (8 decimals)
    pub asset_price_usd: u128,

    /// Base asset per receipt unit (WAD)
    pub receipt_exchange_rate: u128,
}

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct PriceFeed {
    /// Account discriminator
    pub discriminator: [u8; 8],

    /// Last published price (8 decimals)
    pub price: i64,

    /// Publish timestamp of `price`
    pub publish_time: UnixTimestamp,

    /// Validity window in seconds
    pub max_age: i64,
}

impl PriceFeed {
    pub const DISCRIMINATOR: [u8; 8] = [86, 76, 84, 95, 70, 69, 69, 68]; // "VLT_FEED"

    pub const LEN: usize = 8 + 8 + 8 + 8;

    pub fn new(price: i64, publish_time: UnixTimestamp) -> Self {
        Self {
            discriminator: Self::DISCRIMINATOR,
            price,
            publish_time,
            max_age: DEFAULT_MAX_PRICE_AGE,
        }
    }

    pub fn with_max_age(mut self, max_age: i64) -> Self {
        self.max_age = max_age;
        self
    }

    pub fn update(&mut self, price: i64, publish_time: UnixTimestamp) {
        self.price = price;
        self.publish_time = publish_time;
    }
}

impl PriceOracle for PriceFeed {
    fn get_asset_price_usd(&self, clock: &Clock) -> VaultResult<u128> {
        let age = clock.unix_timestamp.saturating_sub(self.publish_time);
        if age > self.max_age {
            msg!("Price data stale: {} seconds old", age);
            return Err(VaultError::PriceStale);
        }

        if self.price <= 0 {
            msg!("Invalid price: {}", self.price);
            return Err(VaultError::PriceInvalid);
        }

        Ok(self.price as u128)
    }
}
