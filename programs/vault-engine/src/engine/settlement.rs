//! Token movements with compensating reversals
//!
//! Mutating operations run their collaborator calls inside `settle`. Every
//! mint, burn and transfer is journaled as it completes; if a later call
//! fails the journal is replayed backwards with the opposite movement, so
//! the ledgers end where they started.
//!
//! Fee notifications, interest bookkeeping and exchange rate updates have no
//! reversal. Operations issue them only after every token has moved.

use solana_program::{msg, pubkey::Pubkey};

use crate::{
    collaborators::{BaseAsset, FeeSink, PriceOracle, ReceiptToken, StableUnit},
    error::VaultResult,
};

use super::VaultEngine;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenMovement {
    /// Stable units pulled from `owner` into custody under the custody allowance
    StablePull { owner: Pubkey, amount: u128 },
    StableTransfer { from: Pubkey, to: Pubkey, amount: u128 },
    StableMint { to: Pubkey, amount: u128 },
    StableBurn { from: Pubkey, amount: u128 },
    /// Receipt units pulled from `owner` into custody under the custody allowance
    ReceiptPull { owner: Pubkey, amount: u128 },
    ReceiptTransfer { from: Pubkey, to: Pubkey, amount: u128 },
    ReceiptMint { to: Pubkey, amount: u128 },
    ReceiptBurn { from: Pubkey, amount: u128 },
    BaseReceive { from: Pubkey, amount: u128 },
    BaseRelease { to: Pubkey, amount: u128 },
}

impl TokenMovement {
    /// Movement that undoes `self`; pulls are refunded by a plain transfer
    pub fn reversal(&self, custody: &Pubkey) -> TokenMovement {
        match *self {
            TokenMovement::StablePull { owner, amount } => TokenMovement::StableTransfer {
                from: *custody,
                to: owner,
                amount,
            },
            TokenMovement::StableTransfer { from, to, amount } => {
                TokenMovement::StableTransfer { from: to, to: from, amount }
            }
            TokenMovement::StableMint { to, amount } => TokenMovement::StableBurn { from: to, amount },
            TokenMovement::StableBurn { from, amount } => TokenMovement::StableMint { to: from, amount },
            TokenMovement::ReceiptPull { owner, amount } => TokenMovement::ReceiptTransfer {
                from: *custody,
                to: owner,
                amount,
            },
            TokenMovement::ReceiptTransfer { from, to, amount } => {
                TokenMovement::ReceiptTransfer { from: to, to: from, amount }
            }
            TokenMovement::ReceiptMint { to, amount } => TokenMovement::ReceiptBurn { from: to, amount },
            TokenMovement::ReceiptBurn { from, amount } => TokenMovement::ReceiptMint { to: from, amount },
            TokenMovement::BaseReceive { from, amount } => TokenMovement::BaseRelease { to: from, amount },
            TokenMovement::BaseRelease { to, amount } => TokenMovement::BaseReceive { from: to, amount },
        }
    }
}

/// Journal of movements completed by the running operation
#[derive(Debug, Default)]
pub struct Settlement {
    completed: Vec<TokenMovement>,
}

impl Settlement {
    pub fn completed(&self) -> &[TokenMovement] {
        &self.completed
    }
}

impl<R, S, B, O, F> VaultEngine<R, S, B, O, F>
where
    R: ReceiptToken,
    S: StableUnit,
    B: BaseAsset,
    O: PriceOracle,
    F: FeeSink,
{
    /// Run `operation`, reversing its journaled movements if it fails
    pub(crate) fn settle<T>(
        &mut self,
        operation: impl FnOnce(&mut Self, &mut Settlement) -> VaultResult<T>,
    ) -> VaultResult<T> {
        let mut settlement = Settlement::default();
        match operation(self, &mut settlement) {
            Ok(value) => Ok(value),
            Err(error) => {
                self.unwind(settlement);
                Err(error)
            }
        }
    }

    /// Perform `movement` and journal it
    pub(crate) fn execute(
        &mut self,
        settlement: &mut Settlement,
        movement: TokenMovement,
    ) -> VaultResult<()> {
        self.apply_movement(movement)?;
        settlement.completed.push(movement);
        Ok(())
    }

    fn unwind(&mut self, settlement: Settlement) {
        if settlement.completed.is_empty() {
            return;
        }
        msg!("Reversing {} token movements", settlement.completed.len());

        for movement in settlement.completed.into_iter().rev() {
            let reversal = movement.reversal(&self.custody);
            if let Err(error) = self.apply_movement(reversal) {
                msg!("Reversal of {:?} failed: {}", movement, error);
            }
        }
    }

    fn apply_movement(&mut self, movement: TokenMovement) -> VaultResult<()> {
        match movement {
            TokenMovement::StablePull { owner, amount } => {
                self.stable
                    .transfer_from(&self.custody, &owner, &self.custody, amount)
            }
            TokenMovement::StableTransfer { from, to, amount } => {
                self.stable.transfer(&from, &to, amount)
            }
            TokenMovement::StableMint { to, amount } => self.stable.mint(&to, amount),
            TokenMovement::StableBurn { from, amount } => self.stable.burn(&from, amount),
            TokenMovement::ReceiptPull { owner, amount } => {
                self.receipt
                    .transfer_from(&self.custody, &owner, &self.custody, amount)
            }
            TokenMovement::ReceiptTransfer { from, to, amount } => {
                self.receipt.transfer(&from, &to, amount)
            }
            TokenMovement::ReceiptMint { to, amount } => self.receipt.mint(&to, amount),
            TokenMovement::ReceiptBurn { from, amount } => self.receipt.burn(&from, amount),
            TokenMovement::BaseReceive { from, amount } => self.base.receive(&from, amount),
            TokenMovement::BaseRelease { to, amount } => self.base.release(&to, amount),
        }
    }
}
