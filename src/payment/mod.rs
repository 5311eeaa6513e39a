//! Payment processing with bounded retry.
//!
//! Unrelated to application review. A [`ProcessorRegistry`] picks a processor by
//! region code and [`PaymentService`] runs it behind a [`RetryingProcessor`].

use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::info;

use crate::Amount;

mod error;
pub use error::{AttemptPaymentError, PaymentError, RegistryError};

mod retry;
pub use retry::{MAX_ATTEMPTS, RetryingProcessor};

/// Result of a successful payment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentTransaction {
    pub amount: Amount,
    pub transaction_id: String,
}

/// A payment and the history of attempts to process it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payment {
    pub amount: Amount,
    pub attempt_count: u32,
    pub errors: Vec<String>,
    pub transaction: Option<PaymentTransaction>,
}

impl Payment {
    pub fn new(amount: Amount) -> Self {
        Self {
            amount,
            attempt_count: 0,
            errors: Vec::new(),
            transaction: None,
        }
    }
}

/// A payment gateway.
pub trait PaymentProcessor {
    fn process_payment(&mut self, payment: &Payment) -> Result<PaymentTransaction, PaymentError>;
}

/// Simulated regional bank that succeeds on a coin flip.
#[derive(Debug)]
pub struct SimulatedBank {
    code: &'static str,
    rng: StdRng,
}

impl SimulatedBank {
    pub fn new(code: &'static str, rng: StdRng) -> Self {
        Self { code, rng }
    }
}

impl PaymentProcessor for SimulatedBank {
    fn process_payment(&mut self, payment: &Payment) -> Result<PaymentTransaction, PaymentError> {
        if self.rng.gen_bool(0.5) {
            Ok(PaymentTransaction {
                amount: payment.amount,
                transaction_id: format!("{}-12345", self.code),
            })
        } else {
            Err(PaymentError::Gateway(format!(
                "{}-001: Service Unavailable.",
                self.code
            )))
        }
    }
}

type Constructor = Box<dyn Fn(StdRng) -> Box<dyn PaymentProcessor>>;

/// Processors by region code.
#[derive(Default)]
pub struct ProcessorRegistry {
    processors: HashMap<String, Constructor>,
}

impl ProcessorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the `IL` and `VA` simulated banks.
    pub fn with_state_processors() -> Self {
        let mut registry = Self::new();
        registry.register("IL", |rng| Box::new(SimulatedBank::new("IL", rng)));
        registry.register("VA", |rng| Box::new(SimulatedBank::new("VA", rng)));
        registry
    }

    pub fn register<F>(&mut self, code: &str, constructor: F)
    where
        F: Fn(StdRng) -> Box<dyn PaymentProcessor> + 'static,
    {
        self.processors.insert(code.to_string(), Box::new(constructor));
    }

    pub fn codes(&self) -> Vec<&str> {
        let mut codes: Vec<&str> = self.processors.keys().map(String::as_str).collect();
        codes.sort_unstable();
        codes
    }

    /// Build the processor for `code`; `seed` makes its outcomes reproducible.
    pub fn processor(
        &self,
        code: &str,
        seed: Option<u64>,
    ) -> Result<Box<dyn PaymentProcessor>, RegistryError> {
        let constructor = self
            .processors
            .get(code)
            .ok_or_else(|| RegistryError::UnsupportedRegion(code.to_string()))?;
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(constructor(rng))
    }
}

impl PaymentProcessor for Box<dyn PaymentProcessor> {
    fn process_payment(&mut self, payment: &Payment) -> Result<PaymentTransaction, PaymentError> {
        (**self).process_payment(payment)
    }
}

/// Processes payments with retry and records the outcome on the payment.
pub struct PaymentService<P> {
    processor: RetryingProcessor<P>,
}

impl<P: PaymentProcessor> PaymentService<P> {
    pub fn new(processor: RetryingProcessor<P>) -> Self {
        Self { processor }
    }

    pub fn process(&mut self, mut payment: Payment) -> Payment {
        match self.processor.process(&payment) {
            Ok((transaction, attempts)) => {
                payment.attempt_count += attempts;
                info!(id = %transaction.transaction_id, amount = %transaction.amount, "payment applied");
                payment.transaction = Some(transaction);
            }
            Err(e) => {
                info!(attempts = e.count, reason = %e, "payment skipped");
                payment.attempt_count += e.count;
                payment.errors.extend(e.errors);
            }
        }
        payment
    }
}
