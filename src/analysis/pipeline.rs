//! Ordered analysis stages with early exit.
//!
//! Each stage wraps one [`Category`]. A stage runs only when the record carries the
//! data it needs, and stops the chain when its score exceeds the stage threshold.

use tracing::debug;

use super::analyzer::mean;
use super::{AnalysisError, Category, RiskScorer};
use crate::model::ApplicationRecord;

/// Email domain mean above this stops the chain.
pub const EMAIL_RISK_THRESHOLD: f64 = 0.7;
/// Phone number mean above this stops the chain.
pub const PHONE_RISK_THRESHOLD: f64 = 0.5;

/// One link of the chain.
#[derive(Debug, Clone, Copy)]
pub struct Stage {
    pub category: Category,
    /// Whether the record has the input this stage analyses.
    pub applies: fn(&ApplicationRecord) -> bool,
    /// `None` never short-circuits.
    pub threshold: Option<f64>,
}

pub const STAGES: [Stage; 3] = [
    Stage {
        category: Category::IpAddress,
        applies: always,
        threshold: None,
    },
    Stage {
        category: Category::EmailDomain,
        applies: has_email,
        threshold: Some(EMAIL_RISK_THRESHOLD),
    },
    Stage {
        category: Category::PhoneNumber,
        applies: has_phone,
        threshold: Some(PHONE_RISK_THRESHOLD),
    },
];

fn always(_: &ApplicationRecord) -> bool {
    true
}

fn has_email(record: &ApplicationRecord) -> bool {
    record.personal_info.email().is_some()
}

fn has_phone(record: &ApplicationRecord) -> bool {
    record.personal_info.phone().is_some()
}

/// Category scores in execution order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryScores(Vec<(Category, f64)>);

impl CategoryScores {
    pub fn get(&self, category: Category) -> Option<f64> {
        self.0
            .iter()
            .find(|(c, _)| *c == category)
            .map(|(_, score)| *score)
    }

    pub fn categories(&self) -> Vec<Category> {
        self.0.iter().map(|(category, _)| *category).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Category, f64)> + '_ {
        self.0.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Mean over categories, rounded half-to-even to 2 decimals; 0.0 when nothing ran.
    pub fn risk_score(&self) -> f64 {
        let scores: Vec<f64> = self.0.iter().map(|(_, score)| *score).collect();
        (mean(&scores) * 100.0).round_ties_even() / 100.0
    }
}

/// Run the stages over `record`.
pub fn run(
    record: &ApplicationRecord,
    scorer: &mut dyn RiskScorer,
) -> Result<CategoryScores, AnalysisError> {
    let mut scores = CategoryScores::default();

    for stage in &STAGES {
        if !(stage.applies)(record) {
            debug!(category = %stage.category, "stage skipped");
            continue;
        }

        let score = stage.category.assess_risks(record, scorer)?;
        scores.0.push((stage.category, score));

        if stage.threshold.is_some_and(|threshold| score > threshold) {
            debug!(category = %stage.category, score, "risk threshold exceeded, stopping");
            break;
        }
    }

    Ok(scores)
}
