use std::collections::BTreeMap;

use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::{clock::UnixTimestamp, pubkey::Pubkey};

use crate::error::{VaultError, VaultResult};

/// Collateral and debt record of one account
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct Position {
    /// Account discriminator
    pub discriminator: [u8; 8],

    /// Account that owns the position
    pub owner: Pubkey,

    /// Receipt units held in custody (WAD)
    pub collateral: u128,

    /// Outstanding stable units including unpaid interest (WAD)
    pub debt: u128,

    /// Borrowed stable units excluding interest (WAD)
    pub principal: u128,

    /// Last interest checkpoint
    pub last_accrual_time: UnixTimestamp,
}

/// Interest-first split of a payment against a position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RepaymentSplit {
    pub interest: u128,
    pub principal: u128,
}

impl RepaymentSplit {
    pub fn total(&self) -> u128 {
        self.interest + self.principal
    }
}

impl Position {
    pub const DISCRIMINATOR: [u8; 8] = [86, 76, 84, 95, 80, 79, 83, 78]; // "VLT_POSN"

    pub const LEN: usize = 8 + // discriminator
        32 + // owner
        16 + // collateral
        16 + // debt
        16 + // principal
        8; // last_accrual_time

    pub fn new(owner: Pubkey) -> Self {
        Self {
            discriminator: Self::DISCRIMINATOR,
            owner,
            collateral: 0,
            debt: 0,
            principal: 0,
            last_accrual_time: 0,
        }
    }

    /// Unpaid interest portion of the debt
    pub fn interest_owed(&self) -> u128 {
        self.debt.saturating_sub(self.principal)
    }

    pub fn is_empty(&self) -> bool {
        self.collateral == 0 && self.debt == 0 && self.principal == 0
    }

    /// debt >= principal, and zero debt implies zero principal
    pub fn is_consistent(&self) -> bool {
        self.debt >= self.principal && (self.debt != 0 || self.principal == 0)
    }

    /// Split `amount` into interest and principal, interest first.
    ///
    /// The principal share never exceeds the recorded principal; any excess
    /// beyond the total debt is left unassigned.
    pub fn split_repayment(&self, amount: u128) -> RepaymentSplit {
        let interest_owed = self.interest_owed();
        if amount <= interest_owed {
            RepaymentSplit {
                interest: amount,
                principal: 0,
            }
        } else {
            RepaymentSplit {
                interest: interest_owed,
                principal: (amount - interest_owed).min(self.principal),
            }
        }
    }

    pub fn apply_repayment(&mut self, split: &RepaymentSplit) -> VaultResult<()> {
        self.debt = self
            .debt
            .checked_sub(split.total())
            .ok_or(VaultError::ArithmeticOverflow)?;
        self.principal = self
            .principal
            .checked_sub(split.principal)
            .ok_or(VaultError::ArithmeticOverflow)?;
        Ok(())
    }

    pub fn add_debt(&mut self, amount: u128) -> VaultResult<()> {
        self.debt = self.debt.checked_add(amount).ok_or(VaultError::ArithmeticOverflow)?;
        self.principal = self
            .principal
            .checked_add(amount)
            .ok_or(VaultError::ArithmeticOverflow)?;
        Ok(())
    }

    pub fn credit_collateral(&mut self, amount: u128) -> VaultResult<()> {
        self.collateral = self
            .collateral
            .checked_add(amount)
            .ok_or(VaultError::ArithmeticOverflow)?;
        Ok(())
    }

    pub fn debit_collateral(&mut self, amount: u128) -> VaultResult<()> {
        self.collateral = self
            .collateral
            .checked_sub(amount)
            .ok_or(VaultError::InsufficientCollateral)?;
        Ok(())
    }
}

/// All positions, keyed by owner
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct PositionLedger {
    positions: BTreeMap<Pubkey, Position>,
}

impl PositionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, owner: &Pubkey) -> Option<&Position> {
        self.positions.get(owner)
    }

    /// Working copy of the owner's position, or a fresh one
    pub fn load(&self, owner: &Pubkey) -> Position {
        self.positions
            .get(owner)
            .cloned()
            .unwrap_or_else(|| Position::new(*owner))
    }

    pub fn store(&mut self, position: Position) {
        self.positions.insert(position.owner, position);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Position> {
        self.positions.values()
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::WAD;

    fn position_with(debt: u128, principal: u128) -> Position {
        let mut position = Position::new(Pubkey::new_unique());
        position.debt = debt;
        position.principal = principal;
        position
    }

    #[test]
    fn test_len_matches_serialized_size() {
        let position = Position::new(Pubkey::new_unique());
        let bytes = position.try_to_vec().unwrap();
        assert_eq!(bytes.len(), Position::LEN);
    }

    #[test]
    fn test_split_within_interest() {
        let position = position_with(1_100 * WAD, 1_000 * WAD);
        let split = position.split_repayment(40 * WAD);
        assert_eq!(split.interest, 40 * WAD);
        assert_eq!(split.principal, 0);
    }

    #[test]
    fn test_split_across_interest_and_principal() {
        let position = position_with(1_100 * WAD, 1_000 * WAD);
        let split = position.split_repayment(300 * WAD);
        assert_eq!(split.interest, 100 * WAD);
        assert_eq!(split.principal, 200 * WAD);
    }

    #[test]
    fn test_split_caps_principal() {
        let position = position_with(1_100 * WAD, 1_000 * WAD);
        let split = position.split_repayment(5_000 * WAD);
        assert_eq!(split.total(), 1_100 * WAD);
    }

    #[test]
    fn test_apply_repayment_keeps_invariant() {
        let mut position = position_with(1_100 * WAD, 1_000 * WAD);
        let split = position.split_repayment(1_100 * WAD);
        position.apply_repayment(&split).unwrap();
        assert_eq!(position.debt, 0);
        assert_eq!(position.principal, 0);
        assert!(position.is_consistent());
    }

    #[test]
    fn test_debit_collateral_underflow() {
        let mut position = Position::new(Pubkey::new_unique());
        position.credit_collateral(WAD).unwrap();
        assert_eq!(
            position.debit_collateral(2 * WAD),
            Err(VaultError::InsufficientCollateral)
        );
    }

    #[test]
    fn test_ledger_load_is_lazy() {
        let mut ledger = PositionLedger::new();
        let owner = Pubkey::new_unique();
        assert!(ledger.get(&owner).is_none());

        let mut position = ledger.load(&owner);
        assert!(ledger.is_empty());

        position.credit_collateral(WAD).unwrap();
        ledger.store(position);
        assert_eq!(ledger.get(&owner).unwrap().collateral, WAD);
        assert_eq!(ledger.len(), 1);
    }
}
