use num_derive::FromPrimitive;
use solana_program::{
    decode_error::DecodeError,
    program_error::{PrintProgramError, ProgramError},
};
use thiserror::Error;

#[derive(Error, Debug, Copy, Clone, FromPrimitive, PartialEq, Eq)]
pub enum VaultError {
    #[error("Amount must be non-zero")]
    ZeroAmount = 0,

    #[error("Invalid account address")]
    InvalidAddress = 1,

    #[error("Repay amount exceeds outstanding debt")]
    RepayExceedsDebt = 2,

    #[error("Invalid risk parameter")]
    InvalidParameter = 3,

    #[error("Invalid instruction")]
    InvalidInstruction = 4,

    #[error("Borrow exceeds borrow limit")]
    ExceedsBorrowLimit = 5,

    #[error("Position is not liquidatable")]
    NotLiquidatable = 6,

    #[error("Insufficient collateral")]
    InsufficientCollateral = 7,

    #[error("Insufficient base asset reserve")]
    InsufficientReserve = 8,

    #[error("Insufficient token balance")]
    InsufficientBalance = 9,

    #[error("Insufficient token allowance")]
    InsufficientAllowance = 10,

    #[error("Re-entrant call rejected")]
    ReentrantCall = 11,

    #[error("Rebase interval has not elapsed")]
    RebaseNotDue = 12,

    #[error("Exchange rate may not decrease")]
    ExchangeRateDecrease = 13,

    #[error("Arithmetic overflow")]
    ArithmeticOverflow = 14,

    #[error("Division by zero")]
    DivisionByZero = 15,

    #[error("Price data stale")]
    PriceStale = 16,

    #[error("Price must be positive")]
    PriceInvalid = 17,

    #[error("Invalid exchange rate")]
    InvalidExchangeRate = 18,

    #[error("Unauthorized")]
    Unauthorized = 19,
}

/// Coarse failure classes callers can branch on.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ErrorCategory {
    InvalidInput,
    LimitExceeded,
    StateError,
    ArithmeticError,
    PriceError,
    AuthorizationError,
}

impl VaultError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            VaultError::ZeroAmount
            | VaultError::InvalidAddress
            | VaultError::RepayExceedsDebt
            | VaultError::InvalidParameter
            | VaultError::InvalidInstruction => ErrorCategory::InvalidInput,

            VaultError::ExceedsBorrowLimit => ErrorCategory::LimitExceeded,

            VaultError::NotLiquidatable
            | VaultError::InsufficientCollateral
            | VaultError::InsufficientReserve
            | VaultError::InsufficientBalance
            | VaultError::InsufficientAllowance
            | VaultError::ReentrantCall
            | VaultError::RebaseNotDue
            | VaultError::ExchangeRateDecrease => ErrorCategory::StateError,

            VaultError::ArithmeticOverflow | VaultError::DivisionByZero => {
                ErrorCategory::ArithmeticError
            }

            VaultError::PriceStale | VaultError::PriceInvalid | VaultError::InvalidExchangeRate => {
                ErrorCategory::PriceError
            }

            VaultError::Unauthorized => ErrorCategory::AuthorizationError,
        }
    }
}

pub type VaultResult<T> = Result<T, VaultError>;

impl PrintProgramError for VaultError {
    fn print<E>(&self) {
        use solana_program::msg;
        msg!("VaultError: {}", self);
    }
}

impl From<VaultError> for ProgramError {
    fn from(e: VaultError) -> Self {
        ProgramError::Custom(e as u32)
    }
}

impl<T> DecodeError<T> for VaultError {
    fn type_of() -> &'static str {
        "VaultError"
    }
}
