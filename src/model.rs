//! Core domain types for application review.

use std::fmt;

use uuid::Uuid;

use crate::Amount;

/// Account identifier, used as the store key.
pub type AccountId = String;

/// Applicant identity fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonalInfo {
    pub name: String,
    /// `None` when the applicant did not provide an age.
    pub age: Option<i32>,
    /// National ID (SSN), expected as `ddd-dd-dddd`.
    pub ssn: String,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl PersonalInfo {
    /// Email if present and non-empty.
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref().filter(|email| !email.is_empty())
    }

    /// Phone number if present and non-empty.
    pub fn phone(&self) -> Option<&str> {
        self.phone.as_deref().filter(|phone| !phone.is_empty())
    }
}

/// Device the application was submitted from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    /// Raw address as submitted; analyses parse it.
    pub ip_address: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreditCard {
    pub card_number: String,
    /// `MM/YY`
    pub expiry_date: String,
    pub cvv: String,
    pub zip_code: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BankAccount {
    pub routing_number: String,
    pub account_number: String,
}

/// Declared payment method of an application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PaymentMethod {
    CreditCard,
    Ach,
}

impl PaymentMethod {
    pub fn label(self) -> &'static str {
        match self {
            PaymentMethod::CreditCard => "CC",
            PaymentMethod::Ach => "ACH",
        }
    }

    /// Parse the `CC` / `ACH` label, case-insensitively.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.to_ascii_uppercase().as_str() {
            "CC" => Some(PaymentMethod::CreditCard),
            "ACH" => Some(PaymentMethod::Ach),
            _ => None,
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Payment details; the variant determines the [`PaymentMethod`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentInstrument {
    CreditCard(CreditCard),
    BankAccount(BankAccount),
}

impl PaymentInstrument {
    pub fn method(&self) -> PaymentMethod {
        match self {
            PaymentInstrument::CreditCard(_) => PaymentMethod::CreditCard,
            PaymentInstrument::BankAccount(_) => PaymentMethod::Ach,
        }
    }
}

/// The data submitted for fraud review.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicationRecord {
    pub amount: Amount,
    pub personal_info: PersonalInfo,
    pub device_info: DeviceInfo,
    pub payment: PaymentInstrument,
}

impl ApplicationRecord {
    pub fn payment_method(&self) -> PaymentMethod {
        self.payment.method()
    }

    pub fn credit_card(&self) -> Option<&CreditCard> {
        match &self.payment {
            PaymentInstrument::CreditCard(card) => Some(card),
            PaymentInstrument::BankAccount(_) => None,
        }
    }

    pub fn bank_account(&self) -> Option<&BankAccount> {
        match &self.payment {
            PaymentInstrument::BankAccount(account) => Some(account),
            PaymentInstrument::CreditCard(_) => None,
        }
    }
}

/// Lifecycle status of an account.
///
/// Each status names the behaviour that produced it, so `Review` is the status of an
/// account whose application has been reviewed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AccountStatus {
    #[default]
    Pending,
    Review,
    Approve,
    Decline,
    Reapply,
}

impl AccountStatus {
    pub fn label(self) -> &'static str {
        match self {
            AccountStatus::Pending => "pending",
            AccountStatus::Review => "reviewed",
            AccountStatus::Approve => "approved",
            AccountStatus::Decline => "declined",
            AccountStatus::Reapply => "reapplied",
        }
    }
}

impl fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// An application under review.
#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    id: AccountId,
    pub(crate) record: ApplicationRecord,
    pub(crate) status: AccountStatus,
    pub(crate) risk_score: f64,
    pub(crate) validation_errors: Vec<String>,
}

impl Account {
    /// Open a pending account with a freshly generated id.
    pub fn new(record: ApplicationRecord) -> Self {
        Self::with_id(Uuid::new_v4().to_string(), record)
    }

    /// Open a pending account under a caller-chosen id.
    pub fn with_id(id: impl Into<AccountId>, record: ApplicationRecord) -> Self {
        Self {
            id: id.into(),
            record,
            status: AccountStatus::Pending,
            risk_score: 0.0,
            validation_errors: Vec::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn record(&self) -> &ApplicationRecord {
        &self.record
    }

    pub fn status(&self) -> AccountStatus {
        self.status
    }

    pub fn risk_score(&self) -> f64 {
        self.risk_score
    }

    pub fn validation_errors(&self) -> &[String] {
        &self.validation_errors
    }
}

/// An operator command, the input of the review service.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Open a new account for `record` and review it.
    Apply {
        account: AccountId,
        record: ApplicationRecord,
    },
    Review { account: AccountId },
    Approve { account: AccountId },
    Decline { account: AccountId },
    /// Replace the record of a declined or reviewed account and review it again.
    Reapply {
        account: AccountId,
        record: ApplicationRecord,
    },
}

impl Command {
    pub fn account(&self) -> &str {
        match self {
            Command::Apply { account, .. }
            | Command::Review { account }
            | Command::Approve { account }
            | Command::Decline { account }
            | Command::Reapply { account, .. } => account,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Command::Apply { .. } => "apply",
            Command::Review { .. } => "review",
            Command::Approve { .. } => "approve",
            Command::Decline { .. } => "decline",
            Command::Reapply { .. } => "reapply",
        }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    /// A record that passes every validation rule, paying by ACH.
    pub fn ach_record() -> ApplicationRecord {
        ApplicationRecord {
            amount: Amount::from_cents(10_000),
            personal_info: PersonalInfo {
                name: "John Doe".to_string(),
                age: Some(30),
                ssn: "123-45-6789".to_string(),
                email: Some("jdoe@example.com".to_string()),
                phone: Some("+12345678900".to_string()),
            },
            device_info: DeviceInfo {
                ip_address: "10.0.0.1".to_string(),
            },
            payment: PaymentInstrument::BankAccount(BankAccount {
                routing_number: "111000025".to_string(),
                account_number: "123456789".to_string(),
            }),
        }
    }

    /// Same applicant as [`ach_record`], paying by credit card.
    pub fn card_record() -> ApplicationRecord {
        ApplicationRecord {
            payment: PaymentInstrument::CreditCard(CreditCard {
                card_number: "4111111111111111".to_string(),
                expiry_date: "12/30".to_string(),
                cvv: "123".to_string(),
                zip_code: "62701".to_string(),
            }),
            ..ach_record()
        }
    }
}
