pub mod scanner;
pub mod types;

pub use scanner::{percentage_difference, scan};
pub use types::{ArbitrageConfig, ArbitrageOpportunity};
