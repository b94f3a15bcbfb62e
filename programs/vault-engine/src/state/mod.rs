pub mod position;
pub mod rebase;
pub mod risk_params;
pub mod totals;

pub use position::*;
pub use rebase::*;
pub use risk_params::*;
pub use totals::*;
