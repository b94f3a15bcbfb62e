// Rebasing collateral lending vault
// Native Solana types, engine driven through collaborator traits

pub mod collaborators;
pub mod constants;
pub mod engine;
pub mod error;
pub mod instructions;
pub mod math;
pub mod oracle;
pub mod processor;
pub mod state;

pub use collaborators::{BaseAsset, FeeSink, FeeToken, PriceOracle, ReceiptToken, StableUnit};
pub use engine::{Collaborators, ExecutionLock, LiquidationOutcome, RepayOutcome, VaultEngine};
pub use error::{ErrorCategory, VaultError, VaultResult};
pub use instructions::VaultInstruction;
pub use oracle::{PriceFeed, PriceQuote};
pub use state::{ParameterUpdate, Position, RebaseAccumulator, RebaseOutcome, RiskParameters, VaultTotals};
