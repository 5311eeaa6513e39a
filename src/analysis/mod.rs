//! Fraud risk analysis.
//!
//! An [`Analysis`] scores one aspect of an application record. Analyses are grouped by
//! [`Category`] and the [`pipeline`] runs the categories in a fixed order with
//! per-stage short-circuit thresholds.

use std::fmt;
use std::net::IpAddr;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;
use tracing::debug;

use crate::model::ApplicationRecord;

mod analyzer;
pub use analyzer::Category;

pub mod pipeline;
pub use pipeline::{CategoryScores, run};

/// Malformed analysis input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisError {
    #[error("invalid IP address format: '{0}'")]
    InvalidIpAddress(String),

    #[error("email '{0}' has no domain")]
    MissingEmailDomain(String),

    #[error("record has no email address")]
    MissingEmail,

    #[error("record has no phone number")]
    MissingPhone,
}

/// Source of risk scores.
///
/// Analyses check their input and then defer the actual number to a scorer, so the
/// placeholder randomness can be swapped for fixed values or a real service.
pub trait RiskScorer {
    /// Score `subject` (the checked input of `analysis`) in `[0, 1]`.
    fn score(&mut self, analysis: Analysis, subject: &str) -> f64;
}

/// Uniformly random placeholder scores.
#[derive(Debug)]
pub struct RandomScorer {
    rng: StdRng,
}

impl RandomScorer {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Reproducible scores for a given seed.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomScorer {
    fn default() -> Self {
        Self::new()
    }
}

impl RiskScorer for RandomScorer {
    fn score(&mut self, _analysis: Analysis, _subject: &str) -> f64 {
        self.rng.gen_range(0.0..=1.0)
    }
}

/// A single risk check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Analysis {
    IpAddressRecord,
    GeoIpAddress,
    FreeEmailDomain,
    DarkWebEmailDomain,
    SpamRecordPhoneNumber,
}

impl Analysis {
    pub fn name(self) -> &'static str {
        match self {
            Analysis::IpAddressRecord => "IPAddressRecordFraudAnalysis",
            Analysis::GeoIpAddress => "GeoIPAddressFraudAnalysis",
            Analysis::FreeEmailDomain => "FreeEmailDomainFraudAnalysis",
            Analysis::DarkWebEmailDomain => "DarkWebEmailDomainFraudAnalysis",
            Analysis::SpamRecordPhoneNumber => "SpamRecordPhoneNumberFraudAnalysis",
        }
    }

    /// Check the input this analysis needs and score it, clamped to `[0, 1]`.
    pub fn assess(
        self,
        record: &ApplicationRecord,
        scorer: &mut dyn RiskScorer,
    ) -> Result<f64, AnalysisError> {
        let subject = match self {
            Analysis::IpAddressRecord | Analysis::GeoIpAddress => {
                parse_ip_address(&record.device_info.ip_address)?.to_string()
            }
            Analysis::FreeEmailDomain | Analysis::DarkWebEmailDomain => {
                let email = record
                    .personal_info
                    .email()
                    .ok_or(AnalysisError::MissingEmail)?;
                email_domain(email)?.to_string()
            }
            Analysis::SpamRecordPhoneNumber => record
                .personal_info
                .phone()
                .ok_or(AnalysisError::MissingPhone)?
                .to_string(),
        };

        let score = scorer.score(self, &subject).clamp(0.0, 1.0);
        debug!(analysis = self.name(), subject = %subject, score, "analysis scored");
        Ok(score)
    }
}

impl fmt::Display for Analysis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Parse an IPv4 or IPv6 address.
pub fn parse_ip_address(ip_address: &str) -> Result<IpAddr, AnalysisError> {
    ip_address
        .parse()
        .map_err(|_| AnalysisError::InvalidIpAddress(ip_address.to_string()))
}

/// Everything after the first `@`.
pub fn email_domain(email: &str) -> Result<&str, AnalysisError> {
    email
        .split_once('@')
        .map(|(_, domain)| domain)
        .ok_or_else(|| AnalysisError::MissingEmailDomain(email.to_string()))
}
