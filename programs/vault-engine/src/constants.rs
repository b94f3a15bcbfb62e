/// 18-decimal fixed point scale used for amounts, rates and fractions
pub const WAD: u128 = 1_000_000_000_000_000_000;

/// Scale of oracle USD prices (8 decimals)
pub const PRICE_SCALE: u128 = 100_000_000;

pub const SECONDS_PER_YEAR: u128 = 31_536_000;

/// Health factor reported for positions without debt
pub const MAX_HEALTH_FACTOR: u128 = u128::MAX;

// Default risk parameters (WAD)
pub const DEFAULT_BORROW_LIMIT_FRACTION: u128 = 666_000_000_000_000_000; // 66.6%
pub const DEFAULT_LIQUIDATION_THRESHOLD: u128 = 1_100_000_000_000_000_000; // 110%
pub const DEFAULT_BORROW_FEE_FRACTION: u128 = 5_000_000_000_000_000; // 0.5%
pub const DEFAULT_BORROW_APR: u128 = 40_000_000_000_000_000; // 4%

pub const DEFAULT_LIQUIDATION_DISCOUNT: u128 = 50_000_000_000_000_000; // 5%
pub const DEFAULT_MAX_LIQUIDATION_FRACTION: u128 = 500_000_000_000_000_000; // 50%
pub const DEFAULT_LIQUIDATION_FEE_FRACTION: u128 = 100_000_000_000_000_000; // 10%
pub const DEFAULT_INTEREST_FEE_SINK_SHARE: u128 = 100_000_000_000_000_000; // 10%
pub const DEFAULT_REBASE_INTERVAL: i64 = 86_400;

/// Upper bound accepted for the borrow APR (1000%)
pub const MAX_BORROW_APR: u128 = 10 * WAD;

/// Default oracle validity window in seconds
pub const DEFAULT_MAX_PRICE_AGE: i64 = 3_600;
