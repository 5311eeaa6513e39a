//! Field-level validation of application records.
//!
//! Validation never fails: every broken rule becomes a [`ValidationError`] value and
//! the caller decides what to do with a non-empty list.

use std::fmt;

use crate::model::{ApplicationRecord, BankAccount, CreditCard, PaymentMethod, PersonalInfo};

/// One failed field rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError(&'static str);

impl ValidationError {
    pub fn message(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// A rule set over one part of the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Validation {
    PersonalInfo,
    CreditCard,
    BankAccount,
}

impl Validation {
    pub fn validate(self, record: &ApplicationRecord) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        match self {
            Validation::PersonalInfo => personal_info(&record.personal_info, &mut errors),
            Validation::CreditCard => match record.credit_card() {
                Some(card) => credit_card(card, &mut errors),
                None => errors.push(ValidationError("Credit card details are missing")),
            },
            Validation::BankAccount => match record.bank_account() {
                Some(account) => bank_account(account, &mut errors),
                None => errors.push(ValidationError("Bank account details are missing")),
            },
        }
        errors
    }
}

/// Runs one [`Validation`] against a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Validator {
    validation: Validation,
}

impl Validator {
    pub fn new(validation: Validation) -> Self {
        Self { validation }
    }

    pub fn validation(&self) -> Validation {
        self.validation
    }

    pub fn validate(&self, record: &ApplicationRecord) -> Vec<ValidationError> {
        self.validation.validate(record)
    }
}

/// Assembles the ordered list of validators to run.
#[derive(Debug, Default)]
pub struct ValidatorBuilder {
    validators: Vec<Validator>,
}

impl ValidatorBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Personal info always, plus the validator matching the payment method.
    pub fn for_record(record: &ApplicationRecord) -> Self {
        let builder = Self::new().with_personal_info();
        match record.payment_method() {
            PaymentMethod::CreditCard => builder.with_credit_card(),
            PaymentMethod::Ach => builder.with_bank_account(),
        }
    }

    pub fn with_personal_info(mut self) -> Self {
        self.validators.push(Validator::new(Validation::PersonalInfo));
        self
    }

    pub fn with_credit_card(mut self) -> Self {
        self.validators.push(Validator::new(Validation::CreditCard));
        self
    }

    pub fn with_bank_account(mut self) -> Self {
        self.validators.push(Validator::new(Validation::BankAccount));
        self
    }

    pub fn build(self) -> Vec<Validator> {
        self.validators
    }
}

/// Run every validator that applies to `record`, in builder order.
pub fn validate_record(record: &ApplicationRecord) -> Vec<ValidationError> {
    ValidatorBuilder::for_record(record)
        .build()
        .iter()
        .flat_map(|validator| validator.validate(record))
        .collect()
}

fn personal_info(info: &PersonalInfo, errors: &mut Vec<ValidationError>) {
    if info.name.is_empty() {
        errors.push(ValidationError("Name is missing"));
    }

    // both age checks run so a negative age reports twice
    if info.age.is_none_or(|age| age < 0) {
        errors.push(ValidationError("Invalid age"));
    }
    if info.age.is_none_or(|age| age < 18) {
        errors.push(ValidationError("Age must be at least 18"));
    }

    if info.ssn.is_empty() {
        errors.push(ValidationError("SSN is missing"));
    }
    if !is_ssn(&info.ssn) {
        errors.push(ValidationError("Invalid SSN format"));
    }

    let phone = info.phone().unwrap_or_default();
    if phone.is_empty() {
        errors.push(ValidationError("Phone number is missing"));
    }
    if !is_phone_number(phone) {
        errors.push(ValidationError("Invalid phone number format"));
    }

    let email = info.email().unwrap_or_default();
    if email.is_empty() {
        errors.push(ValidationError("Email is missing"));
    }
    if !is_email(email) {
        errors.push(ValidationError("Invalid email format"));
    }
}

fn credit_card(card: &CreditCard, errors: &mut Vec<ValidationError>) {
    if card.card_number.is_empty() {
        errors.push(ValidationError("Card number is missing"));
    }
    if card.expiry_date.is_empty() {
        errors.push(ValidationError("Expiry date is missing"));
    }
    if card.cvv.is_empty() {
        errors.push(ValidationError("CVV is missing"));
    }
    if card.cvv.len() != 3 || !all_digits(&card.cvv) {
        errors.push(ValidationError("CVV must be 3 digits"));
    }
    if card.zip_code.is_empty() {
        errors.push(ValidationError("Zip code is missing"));
    }
}

fn bank_account(account: &BankAccount, errors: &mut Vec<ValidationError>) {
    if account.account_number.is_empty() {
        errors.push(ValidationError("Account number is missing"));
    }
    if account.routing_number.is_empty() {
        errors.push(ValidationError("Routing number is missing"));
    }
}

fn all_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// `ddd-dd-dddd`
fn is_ssn(ssn: &str) -> bool {
    let parts: Vec<&str> = ssn.split('-').collect();
    matches!(parts.as_slice(), [a, b, c]
        if a.len() == 3 && b.len() == 2 && c.len() == 4
            && all_digits(a) && all_digits(b) && all_digits(c))
}

/// Optional `+`, optional leading `1`, then 9 to 15 digits.
fn is_phone_number(phone: &str) -> bool {
    let digits = phone.strip_prefix('+').unwrap_or(phone);
    if !all_digits(digits) {
        return false;
    }
    match digits.len() {
        9..=15 => true,
        16 => digits.starts_with('1'),
        _ => false,
    }
}

/// `local@domain.tld` prefix shape: a non-empty local part, then a domain segment
/// with a dot that has at least one character on each side.
fn is_email(email: &str) -> bool {
    let Some((local, rest)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() {
        return false;
    }
    let domain = rest.split('@').next().unwrap_or_default();
    domain
        .char_indices()
        .any(|(idx, c)| c == '.' && idx > 0 && idx + 1 < domain.len())
}
