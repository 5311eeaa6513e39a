use serde::{Deserialize, Serialize};
use std::io;
use std::path::Path;
use thiserror::Error;

use crate::machine::{Action, legal_actions};
use crate::model::{
    Account, ApplicationRecord, BankAccount, Command, CreditCard, DeviceInfo, PaymentInstrument,
    PaymentMethod, PersonalInfo,
};
use crate::Amount;

/// Errors that can occur when parsing csv rows
#[derive(Debug, Error)]
pub enum CsvError {
    #[error("failed to open {path}: {source}")]
    Open { path: String, source: csv::Error },

    #[error("line {line}: failed to parse row: {source}")]
    Parse { line: usize, source: csv::Error },

    #[error("line {line}: unrecognized action '{action}'")]
    UnrecognizedAction { line: usize, action: String },

    #[error("line {line}: {action} missing {field}")]
    MissingField {
        line: usize,
        action: String,
        field: &'static str,
    },

    #[error("line {line}: invalid {field} '{value}'")]
    InvalidValue {
        line: usize,
        field: &'static str,
        value: String,
    },
}

impl CsvError {
    /// Whether processing the rest of the file still makes sense.
    pub fn is_fatal(&self) -> bool {
        matches!(self, CsvError::Open { .. } | CsvError::UnrecognizedAction { .. })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct InputRow {
    action: String,
    account: String,
    name: String,
    age: Option<String>,
    ssn: String,
    email: Option<String>,
    phone: Option<String>,
    ip: String,
    method: String,
    card_number: String,
    expiry: String,
    cvv: String,
    zip: String,
    routing_number: String,
    account_number: String,
    amount: Option<String>,
}

#[derive(Debug, Serialize)]
struct OutputRow<'a> {
    account: &'a str,
    status: &'static str,
    risk_score: String,
    validation_errors: String,
    next_actions: String,
}

/// Read operator commands from a csv file
pub fn read_commands(
    path: &Path,
) -> Result<impl Iterator<Item = Result<Command, CsvError>> + use<>, CsvError> {
    let reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|source| CsvError::Open {
            path: path.display().to_string(),
            source,
        })?;

    Ok(reader
        .into_deserialize::<InputRow>()
        .enumerate()
        .map(|(idx, result)| {
            let line = idx + 2; // 1-indexed, skip header
            let row = result.map_err(|source| CsvError::Parse { line, source })?;
            parse_command(line, row)
        }))
}

fn parse_command(line: usize, row: InputRow) -> Result<Command, CsvError> {
    let missing = |field| CsvError::MissingField {
        line,
        action: row.action.clone(),
        field,
    };
    if row.account.is_empty() {
        return Err(missing("account"));
    }

    if row.action == "apply" {
        return Ok(Command::Apply {
            record: parse_record(line, &row)?,
            account: row.account,
        });
    }

    let Some(action) = Action::from_name(&row.action) else {
        return Err(CsvError::UnrecognizedAction {
            line,
            action: row.action,
        });
    };
    Ok(match action {
        Action::Review => Command::Review {
            account: row.account,
        },
        Action::Approve => Command::Approve {
            account: row.account,
        },
        Action::Decline => Command::Decline {
            account: row.account,
        },
        Action::Reapply => Command::Reapply {
            record: parse_record(line, &row)?,
            account: row.account,
        },
    })
}

fn parse_record(line: usize, row: &InputRow) -> Result<ApplicationRecord, CsvError> {
    let missing = |field| CsvError::MissingField {
        line,
        action: row.action.clone(),
        field,
    };
    let invalid = |field, value: &str| CsvError::InvalidValue {
        line,
        field,
        value: value.to_string(),
    };

    let amount = row
        .amount
        .as_deref()
        .filter(|amount| !amount.is_empty())
        .ok_or_else(|| missing("amount"))?;
    let amount: Amount = amount.parse().map_err(|_| invalid("amount", amount))?;

    // an empty age is kept as absent and reported by validation
    let age = match row.age.as_deref().filter(|age| !age.is_empty()) {
        Some(age) => Some(age.parse::<i32>().map_err(|_| invalid("age", age))?),
        None => None,
    };

    if row.method.is_empty() {
        return Err(missing("method"));
    }
    let payment = match PaymentMethod::from_label(&row.method) {
        Some(PaymentMethod::CreditCard) => PaymentInstrument::CreditCard(CreditCard {
            card_number: row.card_number.clone(),
            expiry_date: row.expiry.clone(),
            cvv: row.cvv.clone(),
            zip_code: row.zip.clone(),
        }),
        Some(PaymentMethod::Ach) => PaymentInstrument::BankAccount(BankAccount {
            routing_number: row.routing_number.clone(),
            account_number: row.account_number.clone(),
        }),
        None => return Err(invalid("method", &row.method)),
    };

    Ok(ApplicationRecord {
        amount,
        personal_info: PersonalInfo {
            name: row.name.clone(),
            age,
            ssn: row.ssn.clone(),
            email: row.email.clone(),
            phone: row.phone.clone(),
        },
        device_info: DeviceInfo {
            ip_address: row.ip.clone(),
        },
        payment,
    })
}

/// write accounts to stdout in csv format
pub fn write_accounts<'a>(accounts: impl IntoIterator<Item = &'a Account>) -> Result<(), csv::Error> {
    write_accounts_to(io::stdout().lock(), accounts)
}

pub fn write_accounts_to<'a, W: io::Write>(
    writer: W,
    accounts: impl IntoIterator<Item = &'a Account>,
) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_writer(writer);

    for account in accounts {
        let next_actions: Vec<&str> = legal_actions(account.status())
            .iter()
            .map(|action| action.name())
            .collect();
        let row = OutputRow {
            account: account.id(),
            status: account.status().label(),
            risk_score: format!("{:.2}", account.risk_score()),
            validation_errors: account.validation_errors().join("; "),
            next_actions: next_actions.join(" "),
        };
        writer.serialize(&row)?;
    }

    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const HEADER: &str = "action,account,name,age,ssn,email,phone,ip,method,card_number,expiry,cvv,zip,routing_number,account_number,amount\n";

    fn write_csv(rows: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(HEADER.as_bytes()).unwrap();
        file.write_all(rows.as_bytes()).unwrap();
        file
    }

    fn read(rows: &str) -> Vec<Result<Command, CsvError>> {
        let file = write_csv(rows);
        read_commands(file.path()).unwrap().collect()
    }

    #[test]
    fn read_ach_application() {
        let results = read(
            "apply,a1,Jane Roe,34,123-45-6789,jane@example.com,+12345678900,10.0.0.1,ACH,,,,,111000025,123456789,250.5\n",
        );
        assert_eq!(results.len(), 1);

        match results.into_iter().next().unwrap().unwrap() {
            Command::Apply { account, record } => {
                assert_eq!(account, "a1");
                assert_eq!(record.amount, Amount::from_cents(25_050));
                assert_eq!(record.personal_info.age, Some(34));
                assert_eq!(record.payment_method(), PaymentMethod::Ach);
                assert_eq!(record.bank_account().unwrap().routing_number, "111000025");
            }
            other => panic!("expected apply, got {other:?}"),
        }
    }

    #[test]
    fn read_card_reapplication() {
        let results = read(
            "reapply,a1,Jane Roe,34,123-45-6789,,,10.0.0.1,CC,4111111111111111,12/30,123,62701,,,10\n",
        );
        match results.into_iter().next().unwrap().unwrap() {
            Command::Reapply { record, .. } => {
                assert_eq!(record.credit_card().unwrap().cvv, "123");
                assert_eq!(record.personal_info.email(), None);
                assert_eq!(record.personal_info.phone(), None);
            }
            other => panic!("expected reapply, got {other:?}"),
        }
    }

    #[test]
    fn read_disposition_without_record_columns() {
        let results = read("approve,a1,,,,,,,,,,,,,,\ndecline, a2 ,,,,,,,,,,,,,,\n");
        assert!(matches!(&results[0], Ok(Command::Approve { account }) if account == "a1"));
        assert!(matches!(&results[1], Ok(Command::Decline { account }) if account == "a2"));
    }

    #[test]
    fn empty_age_is_absent() {
        let results = read("apply,a1,Jane,,123-45-6789,,,10.0.0.1,ACH,,,,,1,2,1\n");
        match results.into_iter().next().unwrap().unwrap() {
            Command::Apply { record, .. } => assert_eq!(record.personal_info.age, None),
            other => panic!("expected apply, got {other:?}"),
        }
    }

    #[test]
    fn unknown_action_is_fatal() {
        let results = read("close,a1,,,,,,,,,,,,,,\n");
        let err = results[0].as_ref().unwrap_err();
        assert!(matches!(err, CsvError::UnrecognizedAction { line: 2, .. }));
        assert!(err.is_fatal());
    }

    #[test]
    fn missing_amount_is_reported() {
        let results = read("apply,a1,Jane,34,123-45-6789,,,10.0.0.1,ACH,,,,,1,2,\n");
        let err = results[0].as_ref().unwrap_err();
        assert!(matches!(
            err,
            CsvError::MissingField {
                line: 2,
                field: "amount",
                ..
            }
        ));
        assert!(!err.is_fatal());
    }

    #[test]
    fn invalid_method_and_age_are_reported() {
        let results = read(
            "apply,a1,Jane,34,123-45-6789,,,10.0.0.1,WIRE,,,,,1,2,1\napply,a2,Jane,old,123-45-6789,,,10.0.0.1,ACH,,,,,1,2,1\n",
        );
        assert!(matches!(
            &results[0],
            Err(CsvError::InvalidValue { field: "method", .. })
        ));
        assert!(matches!(
            &results[1],
            Err(CsvError::InvalidValue { line: 3, field: "age", .. })
        ));
    }

    #[test]
    fn missing_account_is_reported() {
        let results = read("approve,,,,,,,,,,,,,,,\n");
        assert!(matches!(
            &results[0],
            Err(CsvError::MissingField { field: "account", .. })
        ));
    }

    #[test]
    fn commands_outlive_the_path() {
        let file = write_csv("approve,a1,,,,,,,,,,,,,,\n");
        let commands = {
            let path = file.path().to_path_buf();
            read_commands(&path).unwrap()
        };

        let handle = std::thread::spawn(move || commands.count());
        assert_eq!(handle.join().unwrap(), 1);
    }

    #[test]
    fn missing_file_fails_to_open() {
        let result = read_commands(Path::new("/nonexistent/commands.csv"));
        assert!(matches!(result, Err(CsvError::Open { .. })));
    }

    #[test]
    fn write_account_rows() {
        let account = Account::with_id("a1", crate::model::fixtures::ach_record());

        let mut out = Vec::new();
        write_accounts_to(&mut out, [&account]).unwrap();
        let out = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(
            lines[0],
            "account,status,risk_score,validation_errors,next_actions"
        );
        assert_eq!(lines[1], "a1,pending,0.00,,review");
    }
}
