use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FranchiseFinanceError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Invalid tier at position {index}: {reason}")]
    InvalidTier { index: usize, reason: String },

    #[error("Overlapping tiers: tier starting at {min_revenue} begins below the previous tier's upper bound {previous_upper} (position {index})")]
    OverlappingTiers {
        index: usize,
        min_revenue: Decimal,
        previous_upper: String,
    },

    #[error("Invalid loan parameters: {field} — {reason}")]
    InvalidLoanParameters { field: String, reason: String },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Convergence failure: {function} did not converge after {iterations} iterations (delta: {last_delta})")]
    ConvergenceFailure {
        function: String,
        iterations: u32,
        last_delta: Decimal,
    },

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for FranchiseFinanceError {
    fn from(e: serde_json::Error) -> Self {
        FranchiseFinanceError::SerializationError(e.to_string())
    }
}
