use thiserror::Error;

use crate::machine::ReviewError;
use crate::model::AccountId;

/// Error returned by [`ReviewService`](super::ReviewService) operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ServiceError {
    #[error("account {0} not found")]
    AccountNotFound(AccountId),

    #[error("account {0} already exists")]
    DuplicateAccount(AccountId),

    #[error(transparent)]
    Review(#[from] ReviewError),
}
