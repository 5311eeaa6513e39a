//! Review service.
//!
//! Loads an account from the store, runs one state machine action on it and stores
//! the result. Commands can also be fed from an async stream; they are applied one at
//! a time, which keeps every get-then-put on the store exclusive.

use tokio_stream::{Stream, StreamExt};
use tracing::info;

use crate::analysis::{RandomScorer, RiskScorer};
use crate::machine::{AccountMachine, Action, Operation};
use crate::model::{Account, AccountId, ApplicationRecord, Command};

mod store;
pub use store::{AccountStore, MemoryStore};

mod error;
pub use error::ServiceError;

/// Applies operator commands to stored accounts.
pub struct ReviewService<S = MemoryStore, R = RandomScorer> {
    store: S,
    scorer: R,
}

/// Public API
impl ReviewService {
    pub fn new() -> Self {
        Self::with_parts(MemoryStore::new(), RandomScorer::new())
    }
}

impl<S: AccountStore, R: RiskScorer> ReviewService<S, R> {
    pub fn with_parts(store: S, scorer: R) -> Self {
        Self { store, scorer }
    }

    /// Run the service over a stream of commands. Rejected commands are logged and skipped.
    pub async fn run(&mut self, mut stream: impl Stream<Item = Command> + Unpin) {
        while let Some(command) = stream.next().await {
            let _ = self.apply(command);
        }
    }

    /// Apply one command.
    pub fn apply(&mut self, command: Command) -> Result<Account, ServiceError> {
        let name = command.name();
        let id = command.account().to_string();
        let result = match command {
            Command::Apply { account, record } => self.open(account, record),
            Command::Review { account } => self.review(&account),
            Command::Approve { account } => self.approve(&account),
            Command::Decline { account } => self.decline(&account),
            Command::Reapply { account, record } => self.reapply(&account, record),
        };
        Self::log_result(name, &id, &result);
        result
    }

    /// Open an account with a generated id and review it.
    pub fn submit(&mut self, record: ApplicationRecord) -> Result<Account, ServiceError> {
        let account = Account::new(record);
        let id = account.id().to_string();
        self.store.put(id.clone(), account);
        self.review(&id)
    }

    /// Open an account under `id` and review it.
    ///
    /// The pending account is stored even if the review fails, so it can be reviewed
    /// again later.
    pub fn open(&mut self, id: AccountId, record: ApplicationRecord) -> Result<Account, ServiceError> {
        if self.store.contains(&id) {
            return Err(ServiceError::DuplicateAccount(id));
        }
        self.store.put(id.clone(), Account::with_id(id.clone(), record));
        self.review(&id)
    }

    pub fn account(&self, id: &str) -> Option<Account> {
        self.store.get(id)
    }

    pub fn accounts(&self) -> impl Iterator<Item = &Account> + '_ {
        self.store.accounts()
    }

    pub fn legal_actions(&self, id: &str) -> Result<&'static [Action], ServiceError> {
        let account = self.load(id)?;
        Ok(crate::machine::legal_actions(account.status()))
    }

    pub fn review(&mut self, id: &str) -> Result<Account, ServiceError> {
        self.execute(id, Operation::Review)
    }

    pub fn approve(&mut self, id: &str) -> Result<Account, ServiceError> {
        self.execute(id, Operation::Approve)
    }

    pub fn decline(&mut self, id: &str) -> Result<Account, ServiceError> {
        self.execute(id, Operation::Decline)
    }

    pub fn reapply(&mut self, id: &str, record: ApplicationRecord) -> Result<Account, ServiceError> {
        self.execute(id, Operation::Reapply(record))
    }

    pub fn into_store(self) -> S {
        self.store
    }
}

/// Private API
impl<S: AccountStore, R: RiskScorer> ReviewService<S, R> {
    fn load(&self, id: &str) -> Result<Account, ServiceError> {
        self.store
            .get(id)
            .ok_or_else(|| ServiceError::AccountNotFound(id.to_string()))
    }

    /// Get, run one operation, put. Nothing is stored when the operation fails.
    fn execute(&mut self, id: &str, operation: Operation) -> Result<Account, ServiceError> {
        let mut account = self.load(id)?;
        AccountMachine::new(&mut account, &mut self.scorer).dispatch(operation)?;
        self.store.put(id.to_string(), account.clone());
        Ok(account)
    }

    /// Small helper to log `apply` results
    fn log_result(command: &str, id: &str, result: &Result<Account, ServiceError>) {
        match result {
            Ok(account) => {
                info!(
                    account = %id,
                    status = %account.status(),
                    score = account.risk_score(),
                    validation_errors = account.validation_errors().len(),
                    "{command} applied"
                );
            }
            Err(e) => {
                info!(
                    account = %id,
                    reason = %e,
                    "{command} skipped"
                );
            }
        }
    }
}

impl Default for ReviewService {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::testing::FixedScorer;
    use crate::analysis::{Analysis, AnalysisError};
    use crate::machine::{IllegalTransition, ReviewError};
    use crate::model::AccountStatus;
    use crate::model::fixtures::{ach_record, card_record};

    // test utils

    fn service(ip: f64, email: f64, phone: f64) -> ReviewService<MemoryStore, FixedScorer> {
        let scorer = FixedScorer::new()
            .with(Analysis::IpAddressRecord, ip)
            .with(Analysis::GeoIpAddress, ip)
            .with(Analysis::FreeEmailDomain, email)
            .with(Analysis::DarkWebEmailDomain, email)
            .with(Analysis::SpamRecordPhoneNumber, phone);
        ReviewService::with_parts(MemoryStore::new(), scorer)
    }

    fn apply(account: &str) -> Command {
        Command::Apply {
            account: account.to_string(),
            record: ach_record(),
        }
    }

    fn approve(account: &str) -> Command {
        Command::Approve {
            account: account.to_string(),
        }
    }

    fn decline(account: &str) -> Command {
        Command::Decline {
            account: account.to_string(),
        }
    }

    fn reapply(account: &str, record: ApplicationRecord) -> Command {
        Command::Reapply {
            account: account.to_string(),
            record,
        }
    }

    #[test]
    fn new_service_is_empty() {
        let service = ReviewService::new();
        assert_eq!(service.accounts().count(), 0);
    }

    // Intake

    #[test]
    fn submit_assigns_id_and_reviews() {
        let mut service = service(0.5, 0.5, 0.5);
        let account = service.submit(ach_record()).unwrap();

        assert_eq!(account.status(), AccountStatus::Review);
        assert_eq!(account.risk_score(), 0.5);
        assert_eq!(service.account(account.id()), Some(account));
    }

    #[test]
    fn apply_stores_reviewed_account() {
        let mut service = service(0.1, 0.1, 0.1);
        service.apply(apply("a")).unwrap();

        let stored = service.account("a").unwrap();
        assert_eq!(stored.status(), AccountStatus::Review);
        assert_eq!(
            service.legal_actions("a").unwrap(),
            &[Action::Approve, Action::Decline, Action::Reapply]
        );
    }

    #[test]
    fn duplicate_apply_fails() {
        let mut service = service(0.1, 0.1, 0.1);
        service.apply(apply("a")).unwrap();

        let result = service.apply(apply("a"));
        assert_eq!(result, Err(ServiceError::DuplicateAccount("a".to_string())));
    }

    #[test]
    fn failed_intake_review_keeps_pending_account() {
        let mut service = service(0.1, 0.1, 0.1);
        let mut record = ach_record();
        record.device_info.ip_address = "10.0.0".to_string();

        let result = service.open("a".to_string(), record);
        assert!(matches!(
            result,
            Err(ServiceError::Review(ReviewError::Analysis(
                AnalysisError::InvalidIpAddress(_)
            )))
        ));
        assert_eq!(service.account("a").unwrap().status(), AccountStatus::Pending);
        assert_eq!(service.legal_actions("a").unwrap(), &[Action::Review]);
    }

    // Dispositions

    #[test]
    fn approve_is_terminal() {
        let mut service = service(0.1, 0.1, 0.1);
        service.apply(apply("a")).unwrap();
        service.apply(approve("a")).unwrap();

        assert!(service.legal_actions("a").unwrap().is_empty());
        let result = service.apply(decline("a"));
        assert_eq!(
            result,
            Err(ServiceError::Review(ReviewError::Illegal(IllegalTransition {
                requested: Action::Decline,
                current: AccountStatus::Approve,
            })))
        );
        assert_eq!(service.account("a").unwrap().status(), AccountStatus::Approve);
    }

    #[test]
    fn decline_then_reapply_reviews_new_record() {
        let mut service = service(0.3, 0.3, 0.3);
        service.apply(apply("a")).unwrap();
        service.apply(decline("a")).unwrap();

        let account = service.apply(reapply("a", card_record())).unwrap();
        assert_eq!(account.status(), AccountStatus::Review);
        assert_eq!(account.record(), &card_record());
        assert_eq!(service.account("a"), Some(account));
    }

    #[test]
    fn unknown_account_fails() {
        let mut service = service(0.1, 0.1, 0.1);
        assert_eq!(
            service.apply(approve("ghost")),
            Err(ServiceError::AccountNotFound("ghost".to_string()))
        );
        assert!(service.legal_actions("ghost").is_err());
    }

    #[test]
    fn rejected_action_stores_nothing() {
        let mut service = service(0.1, 0.1, 0.1);
        service.apply(apply("a")).unwrap();
        let before = service.account("a");

        assert!(service.review("a").is_err());
        assert_eq!(service.account("a"), before);
    }

    // Async run()

    #[tokio::test]
    async fn run_processes_all_commands() {
        let mut service = service(0.2, 0.2, 0.2);
        let commands = vec![apply("a"), apply("b"), approve("a"), decline("b")];

        service.run(tokio_stream::iter(commands)).await;

        assert_eq!(service.account("a").unwrap().status(), AccountStatus::Approve);
        assert_eq!(service.account("b").unwrap().status(), AccountStatus::Decline);
    }

    #[tokio::test]
    async fn run_skips_rejected_commands_and_continues() {
        let mut service = service(0.2, 0.2, 0.2);
        let commands = vec![
            approve("a"), // not found
            apply("a"),
            reapply("a", card_record()),
            apply("a"), // duplicate
            approve("a"),
        ];

        service.run(tokio_stream::iter(commands)).await;

        let account = service.account("a").unwrap();
        assert_eq!(account.status(), AccountStatus::Approve);
        assert_eq!(account.record(), &card_record());
    }
}
