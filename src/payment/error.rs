//! Error types for payment processing.

use thiserror::Error;

/// Failure of a single processing attempt.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaymentError {
    /// Transient gateway failure; worth another attempt.
    #[error("{0}")]
    Gateway(String),

    #[error("{0}")]
    Rejected(String),
}

impl PaymentError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, PaymentError::Gateway(_))
    }
}

/// Every attempt failed, or a non-retryable error stopped the retries.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("an attempt to process payment has failed after {count} attempt(s)")]
pub struct AttemptPaymentError {
    pub count: u32,
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("unsupported bank: {0}")]
    UnsupportedRegion(String),

    #[error("max attempts must be at least 1")]
    InvalidAttemptBudget,
}
