//! Error types for account actions.

use thiserror::Error;

use super::Action;
use crate::analysis::AnalysisError;
use crate::model::AccountStatus;

/// The requested action is not in the legal set of the current status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{requested} is not allowed for a {current} account")]
pub struct IllegalTransition {
    pub requested: Action,
    pub current: AccountStatus,
}

/// Top-level error returned by [`AccountMachine`](super::AccountMachine) actions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReviewError {
    #[error(transparent)]
    Illegal(#[from] IllegalTransition),

    #[error("risk analysis failed: {0}")]
    Analysis(#[from] AnalysisError),
}
