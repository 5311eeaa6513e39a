use std::collections::HashMap;

use crate::model::{Account, AccountId};

/// Account persistence, keyed by account id. Last write wins.
pub trait AccountStore {
    fn get(&self, id: &str) -> Option<Account>;
    fn put(&mut self, id: AccountId, account: Account);
    fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }
    fn accounts(&self) -> Box<dyn Iterator<Item = &Account> + '_>;
}

/// Accounts held in a `HashMap`; lost when dropped.
#[derive(Debug, Default)]
pub struct MemoryStore {
    accounts: HashMap<AccountId, Account>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AccountStore for MemoryStore {
    fn get(&self, id: &str) -> Option<Account> {
        self.accounts.get(id).cloned()
    }

    fn put(&mut self, id: AccountId, account: Account) {
        self.accounts.insert(id, account);
    }

    fn contains(&self, id: &str) -> bool {
        self.accounts.contains_key(id)
    }

    fn accounts(&self) -> Box<dyn Iterator<Item = &Account> + '_> {
        Box::new(self.accounts.values())
    }
}
