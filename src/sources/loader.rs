use std::collections::HashSet;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use csv::{ReaderBuilder, Trim};
use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;
use tracing::{error, warn};

use crate::models::{Employee, Transaction};
use crate::types::{EmployeeId, TransactionId};

#[derive(Debug, Error)]
pub enum LoaderError {
    #[error("Unable to open transactions file [{path}]: {source}")]
    Io {
        path: String,
        source: std::io::Error
    },
    #[error("Unable to read transactions: {0}")]
    Csv(#[from] csv::Error)
}

/// A single row of the transactions CSV file.
#[derive(Debug, Deserialize)]
struct TransactionRecord {
    id: TransactionId,
    merchant: String,
    amount: Decimal,
    employee_id: EmployeeId,
    employee_first_name: String,
    employee_last_name: String,
    date: String,
    approved: bool
}

impl From<TransactionRecord> for Transaction {
    fn from(record: TransactionRecord) -> Self {
        Transaction {
            id: record.id,
            merchant: record.merchant,
            amount: record.amount,
            employee: Employee {
                id: record.employee_id,
                first_name: record.employee_first_name,
                last_name: record.employee_last_name
            },
            date: record.date,
            approved: record.approved
        }
    }
}

pub fn load_transactions(path: impl AsRef<Path>) -> Result<Vec<Transaction>, LoaderError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| LoaderError::Io {
        path: path.display().to_string(),
        source
    })?;

    read_transactions(BufReader::new(file))
}

/// Reads transactions in file order. Malformed rows, rows without an employee and
/// repeated ids are logged and skipped.
pub fn read_transactions<R: Read>(input: R) -> Result<Vec<Transaction>, LoaderError> {
    let mut reader = ReaderBuilder::new()
        .trim(Trim::All)
        .from_reader(input);

    // Surface an unreadable header instead of silently loading nothing.
    reader.headers()?;

    let mut transactions: Vec<Transaction> = Vec::new();
    let mut seen: HashSet<TransactionId> = HashSet::new();

    for result in reader.deserialize::<TransactionRecord>() {
        match result {
            Ok(record) => {
                //NOTE: The empty employee id belongs to the "all employees" filter entry
                if record.employee_id.is_empty() {
                    warn!("Transaction [{}] has no employee id, skipped", record.id);
                    continue;
                }

                if !seen.insert(record.id.clone()) {
                    warn!("Duplicate transaction [{}] skipped", record.id);
                    continue;
                }

                transactions.push(record.into());
            }
            Err(error) => {
                error!("CSV deserialization error: {error}");
            }
        }
    }

    Ok(transactions)
}
