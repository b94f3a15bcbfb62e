use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::clock::UnixTimestamp;

use crate::error::{VaultError, VaultResult};

/// Interest waiting to be folded into the receipt exchange rate
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct RebaseAccumulator {
    /// Pool share of realized interest, in receipt units
    pub pending_interest: u128,

    /// Time of the last applied rebase
    pub last_rebase_time: UnixTimestamp,
}

impl RebaseAccumulator {
    pub const LEN: usize = 16 + 8;

    pub fn new(now: UnixTimestamp) -> Self {
        Self {
            pending_interest: 0,
            last_rebase_time: now,
        }
    }

    pub fn accumulate(&mut self, units: u128) -> VaultResult<()> {
        self.pending_interest = self
            .pending_interest
            .checked_add(units)
            .ok_or(VaultError::ArithmeticOverflow)?;
        Ok(())
    }

    pub fn interval_elapsed(&self, now: UnixTimestamp, interval: i64) -> bool {
        now.saturating_sub(self.last_rebase_time) >= interval
    }

    pub fn is_due(&self, now: UnixTimestamp, interval: i64) -> bool {
        self.pending_interest > 0 && self.interval_elapsed(now, interval)
    }

    pub fn reset(&mut self, now: UnixTimestamp) {
        self.pending_interest = 0;
        self.last_rebase_time = now;
    }
}

/// Applied exchange rate change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RebaseOutcome {
    pub previous_rate: u128,
    pub new_rate: u128,
    pub distributed: u128,
}
