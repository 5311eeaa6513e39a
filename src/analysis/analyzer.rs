use std::fmt;

use super::{Analysis, AnalysisError, RiskScorer};
use crate::model::ApplicationRecord;

/// A named group of analyses reduced to one score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    IpAddress,
    EmailDomain,
    PhoneNumber,
}

impl Category {
    pub fn name(self) -> &'static str {
        match self {
            Category::IpAddress => "IPAddressFraudAnalyzer",
            Category::EmailDomain => "EmailDomainFraudAnalyzer",
            Category::PhoneNumber => "PhoneNumberFraudAnalyzer",
        }
    }

    pub fn analyses(self) -> &'static [Analysis] {
        match self {
            Category::IpAddress => &[Analysis::IpAddressRecord, Analysis::GeoIpAddress],
            Category::EmailDomain => &[Analysis::FreeEmailDomain, Analysis::DarkWebEmailDomain],
            Category::PhoneNumber => &[Analysis::SpamRecordPhoneNumber],
        }
    }

    /// Mean score of this category's analyses. The first failing analysis aborts.
    pub fn assess_risks(
        self,
        record: &ApplicationRecord,
        scorer: &mut dyn RiskScorer,
    ) -> Result<f64, AnalysisError> {
        let scores = self
            .analyses()
            .iter()
            .map(|analysis| analysis.assess(record, scorer))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(mean(&scores))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Arithmetic mean; 0.0 for no values.
pub(crate) fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}
