pub mod error;
pub mod time_value;
pub mod types;

#[cfg(feature = "royalty")]
pub mod royalty;

#[cfg(feature = "investment")]
pub mod investment;

#[cfg(feature = "financing")]
pub mod financing;

#[cfg(feature = "projection")]
pub mod projection;

pub use error::FranchiseFinanceError;
pub use types::*;

/// Standard result type for all franchise-finance operations
pub type FranchiseFinanceResult<T> = Result<T, FranchiseFinanceError>;
