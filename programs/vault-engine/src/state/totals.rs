use borsh::{BorshDeserialize, BorshSerialize};

use crate::{
    collaborators::FeeToken,
    error::{VaultError, VaultResult},
    state::Position,
};

/// Vault-wide sums, kept equal to the ledger
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct VaultTotals {
    pub total_collateral: u128,
    pub total_debt: u128,
    pub total_principal: u128,

    /// Stats
    pub total_interest_distributed: u128,
    /// Stable units forwarded to the fee sink
    pub total_fees_to_sink: u128,
    /// Receipt units forwarded to the fee sink by liquidations
    pub total_collateral_fees: u128,
}

fn add(value: u128, delta: u128) -> VaultResult<u128> {
    value.checked_add(delta).ok_or(VaultError::ArithmeticOverflow)
}

fn sub(value: u128, delta: u128) -> VaultResult<u128> {
    value.checked_sub(delta).ok_or(VaultError::ArithmeticOverflow)
}

impl VaultTotals {
    pub const LEN: usize = 16 * 6;

    pub fn add_collateral(&mut self, amount: u128) -> VaultResult<()> {
        self.total_collateral = add(self.total_collateral, amount)?;
        Ok(())
    }

    pub fn remove_collateral(&mut self, amount: u128) -> VaultResult<()> {
        self.total_collateral = sub(self.total_collateral, amount)?;
        Ok(())
    }

    /// Accrued interest raises debt but not principal
    pub fn add_interest(&mut self, amount: u128) -> VaultResult<()> {
        self.total_debt = add(self.total_debt, amount)?;
        Ok(())
    }

    pub fn add_borrow(&mut self, amount: u128) -> VaultResult<()> {
        self.total_debt = add(self.total_debt, amount)?;
        self.total_principal = add(self.total_principal, amount)?;
        Ok(())
    }

    pub fn remove_debt(&mut self, interest: u128, principal: u128) -> VaultResult<()> {
        self.total_debt = sub(self.total_debt, add(interest, principal)?)?;
        self.total_principal = sub(self.total_principal, principal)?;
        Ok(())
    }

    pub fn record_distribution(&mut self, interest: u128) -> VaultResult<()> {
        self.total_interest_distributed = add(self.total_interest_distributed, interest)?;
        Ok(())
    }

    pub fn record_fee(&mut self, token: FeeToken, amount: u128) -> VaultResult<()> {
        match token {
            FeeToken::Stable => self.total_fees_to_sink = add(self.total_fees_to_sink, amount)?,
            FeeToken::Receipt => {
                self.total_collateral_fees = add(self.total_collateral_fees, amount)?
            }
        }
        Ok(())
    }

    /// Whether the ledger sums match the recorded totals
    pub fn matches<'a, I>(&self, positions: I) -> bool
    where
        I: IntoIterator<Item = &'a Position>,
    {
        let mut collateral = 0u128;
        let mut debt = 0u128;
        let mut principal = 0u128;
        for position in positions {
            collateral = collateral.saturating_add(position.collateral);
            debt = debt.saturating_add(position.debt);
            principal = principal.saturating_add(position.principal);
        }
        collateral == self.total_collateral
            && debt == self.total_debt
            && principal == self.total_principal
    }
}
