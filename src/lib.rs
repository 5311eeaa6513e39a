pub mod amount;
pub mod analysis;
pub mod csv;
pub mod machine;
pub mod model;
pub mod payment;
pub mod service;
pub mod validation;

pub use amount::Amount;
pub use machine::{AccountMachine, Action, Operation};
pub use model::{Account, AccountId, AccountStatus, ApplicationRecord, Command};
pub use service::ReviewService;
