//! Account lifecycle state machine.
//!
//! The legal transitions are a pure function of the account status (see [`state`]).
//! [`AccountMachine`] borrows one account for one operation, checks the requested
//! action against that table and applies its effect. Review is the only action with a
//! real effect: it validates the application record and, when validation passes, runs
//! the risk analysis pipeline.

use tracing::debug;

use crate::analysis::{self, AnalysisError, CategoryScores, RiskScorer};
use crate::model::{Account, AccountStatus, ApplicationRecord};
use crate::validation::{ValidationError, validate_record};

mod state;
pub use state::{Action, legal_actions, transition};

mod error;
pub use error::{IllegalTransition, ReviewError};

/// An action together with the data it needs.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    Review,
    Approve,
    Decline,
    /// Replace the application record and review it again.
    Reapply(ApplicationRecord),
}

impl Operation {
    pub fn action(&self) -> Action {
        match self {
            Operation::Review => Action::Review,
            Operation::Approve => Action::Approve,
            Operation::Decline => Action::Decline,
            Operation::Reapply(_) => Action::Reapply,
        }
    }
}

/// What a review pass produced, before it is written to the account.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReviewOutcome {
    pub scores: CategoryScores,
    pub validation_errors: Vec<ValidationError>,
}

impl ReviewOutcome {
    /// Validate `record` and, if it is clean, analyse it.
    pub fn assess(
        record: &ApplicationRecord,
        scorer: &mut dyn RiskScorer,
    ) -> Result<Self, AnalysisError> {
        let validation_errors = validate_record(record);
        if !validation_errors.is_empty() {
            debug!(errors = validation_errors.len(), "validation failed, analysis skipped");
            return Ok(Self {
                scores: CategoryScores::default(),
                validation_errors,
            });
        }

        let scores = analysis::run(record, scorer)?;
        Ok(Self {
            scores,
            validation_errors,
        })
    }
}

/// Drives one account through one action.
pub struct AccountMachine<'a> {
    account: &'a mut Account,
    scorer: &'a mut dyn RiskScorer,
}

impl<'a> AccountMachine<'a> {
    pub fn new(account: &'a mut Account, scorer: &'a mut dyn RiskScorer) -> Self {
        Self { account, scorer }
    }

    pub fn account(&self) -> &Account {
        self.account
    }

    pub fn legal_actions(&self) -> &'static [Action] {
        legal_actions(self.account.status)
    }

    /// Apply `operation`, whichever action it names.
    pub fn dispatch(&mut self, operation: Operation) -> Result<(), ReviewError> {
        match operation {
            Operation::Review => self.do_review(),
            Operation::Approve => self.do_approve(),
            Operation::Decline => self.do_decline(),
            Operation::Reapply(record) => self.do_reapply(record),
        }
    }

    /// Validate and analyse the current record; legal from pending or reapplied.
    ///
    /// With validation errors the pipeline does not run and the score is 0.0.
    /// Status, score and errors are only written once analysis succeeded.
    pub fn do_review(&mut self) -> Result<(), ReviewError> {
        let status = transition(self.account.status, Action::Review)?;
        let outcome = ReviewOutcome::assess(&self.account.record, self.scorer)?;
        self.commit_review(status, outcome);
        Ok(())
    }

    pub fn do_approve(&mut self) -> Result<(), ReviewError> {
        self.account.status = transition(self.account.status, Action::Approve)?;
        Ok(())
    }

    pub fn do_decline(&mut self) -> Result<(), ReviewError> {
        self.account.status = transition(self.account.status, Action::Decline)?;
        Ok(())
    }

    /// Replace the record and review it again, in one step.
    ///
    /// The account passes through the reapplied status on its way to reviewed. If the
    /// new record cannot be analysed, the account keeps its old record and status.
    pub fn do_reapply(&mut self, record: ApplicationRecord) -> Result<(), ReviewError> {
        let reapplied = transition(self.account.status, Action::Reapply)?;
        debug!(account = %self.account.id(), status = %reapplied, "record replaced");

        let status = transition(reapplied, Action::Review)?;
        let outcome = ReviewOutcome::assess(&record, self.scorer)?;
        self.account.record = record;
        self.commit_review(status, outcome);
        Ok(())
    }

    fn commit_review(&mut self, status: AccountStatus, outcome: ReviewOutcome) {
        for (category, score) in outcome.scores.iter() {
            debug!(account = %self.account.id(), %category, score, "category scored");
        }
        self.account.status = status;
        self.account.risk_score = outcome.scores.risk_score();
        self.account.validation_errors = outcome
            .validation_errors
            .iter()
            .map(ToString::to_string)
            .collect();
    }
}
