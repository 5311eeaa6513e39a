use tracing::{debug, warn};

use super::error::{AttemptPaymentError, RegistryError};
use super::{Payment, PaymentProcessor, PaymentTransaction};

/// Default attempt budget.
pub const MAX_ATTEMPTS: u32 = 3;

/// Retries a processor on retryable errors, up to a fixed number of attempts.
#[derive(Debug)]
pub struct RetryingProcessor<P> {
    inner: P,
    max_attempts: u32,
}

impl<P: PaymentProcessor> RetryingProcessor<P> {
    pub fn new(inner: P) -> Self {
        Self {
            inner,
            max_attempts: MAX_ATTEMPTS,
        }
    }

    pub fn with_max_attempts(inner: P, max_attempts: u32) -> Result<Self, RegistryError> {
        if max_attempts < 1 {
            return Err(RegistryError::InvalidAttemptBudget);
        }
        Ok(Self {
            inner,
            max_attempts,
        })
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Process `payment`, collecting one error message per failed attempt.
    ///
    /// On success, returns the transaction and the number of attempts it took.
    pub fn process(
        &mut self,
        payment: &Payment,
    ) -> Result<(PaymentTransaction, u32), AttemptPaymentError> {
        let mut errors = Vec::new();

        for attempt in 1..=self.max_attempts {
            match self.inner.process_payment(payment) {
                Ok(transaction) => {
                    debug!(attempt, id = %transaction.transaction_id, "payment processed");
                    return Ok((transaction, attempt));
                }
                Err(e) if e.is_retryable() => {
                    warn!(attempt, reason = %e, "payment attempt failed");
                    errors.push(e.to_string());
                }
                Err(e) => {
                    warn!(attempt, reason = %e, "payment rejected, not retrying");
                    errors.push(e.to_string());
                    errors.push("An unexpected error occurred. Stopping retries.".to_string());
                    return Err(AttemptPaymentError {
                        count: attempt,
                        errors,
                    });
                }
            }
        }

        errors.push(format!(
            "Max payment processing attempt limit reached: {}",
            self.max_attempts
        ));
        Err(AttemptPaymentError {
            count: self.max_attempts,
            errors,
        })
    }
}
