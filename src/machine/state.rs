use std::fmt;

use super::error::IllegalTransition;
use crate::model::AccountStatus;

/// An operator action on an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Review,
    Approve,
    Decline,
    Reapply,
}

impl Action {
    pub fn name(self) -> &'static str {
        match self {
            Action::Review => "review",
            Action::Approve => "approve",
            Action::Decline => "decline",
            Action::Reapply => "reapply",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "review" => Some(Action::Review),
            "approve" => Some(Action::Approve),
            "decline" => Some(Action::Decline),
            "reapply" => Some(Action::Reapply),
            _ => None,
        }
    }

    /// Status an account ends up in after this action.
    ///
    /// Reapply is immediately followed by a review, so its status is only observable
    /// inside [`AccountMachine::do_reapply`](super::AccountMachine::do_reapply).
    pub fn target(self) -> AccountStatus {
        match self {
            Action::Review => AccountStatus::Review,
            Action::Approve => AccountStatus::Approve,
            Action::Decline => AccountStatus::Decline,
            Action::Reapply => AccountStatus::Reapply,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Actions permitted from `status`.
pub fn legal_actions(status: AccountStatus) -> &'static [Action] {
    match status {
        AccountStatus::Pending => &[Action::Review],
        AccountStatus::Review => &[Action::Approve, Action::Decline, Action::Reapply],
        AccountStatus::Approve => &[],
        AccountStatus::Decline => &[Action::Reapply],
        AccountStatus::Reapply => &[Action::Review],
    }
}

/// Status after applying `action` to an account in `status`.
pub fn transition(status: AccountStatus, action: Action) -> Result<AccountStatus, IllegalTransition> {
    if legal_actions(status).contains(&action) {
        Ok(action.target())
    } else {
        Err(IllegalTransition {
            requested: action,
            current: status,
        })
    }
}
