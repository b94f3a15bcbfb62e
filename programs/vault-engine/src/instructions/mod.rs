use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::pubkey::Pubkey;

use crate::{
    error::{VaultError, VaultResult},
    state::ParameterUpdate,
};

/// Operations the vault engine accepts from an outer transport.
/// The signer is supplied alongside the encoded instruction.
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub enum VaultInstruction {
    /// Swap base asset for receipt units
    /// Signer: depositor
    Deposit { amount: u128 },

    /// Lock receipt units as collateral
    /// Signer: position owner
    Collateralize { amount: u128 },

    /// Mint stable units against collateral
    /// Signer: position owner
    Borrow { amount: u128 },

    /// Pay down debt, interest first
    /// Signer: position owner
    Repay { amount: u128 },

    /// Repay part of an unhealthy position's debt for its collateral
    /// Signer: liquidator
    Liquidate { borrower: Pubkey, debt_to_repay: u128 },

    /// Return collateral as base asset
    /// Signer: position owner
    Withdraw { amount: u128 },

    /// Fold pending interest into the exchange rate
    /// Signer: anyone
    TriggerRebase,

    /// Change one risk parameter
    /// Signer: authority
    UpdateParameter { update: ParameterUpdate },
}

impl VaultInstruction {
    pub fn unpack(input: &[u8]) -> VaultResult<Self> {
        Self::try_from_slice(input).map_err(|_| VaultError::InvalidInstruction)
    }

    pub fn pack(&self) -> VaultResult<Vec<u8>> {
        self.try_to_vec().map_err(|_| VaultError::InvalidInstruction)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Deposit { .. } => "Deposit",
            Self::Collateralize { .. } => "Collateralize",
            Self::Borrow { .. } => "Borrow",
            Self::Repay { .. } => "Repay",
            Self::Liquidate { .. } => "Liquidate",
            Self::Withdraw { .. } => "Withdraw",
            Self::TriggerRebase => "TriggerRebase",
            Self::UpdateParameter { .. } => "UpdateParameter",
        }
    }
}
