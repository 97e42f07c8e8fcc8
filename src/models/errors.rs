use crate::types::{EmployeeId, PageIndex, TransactionId};
use thiserror::Error;

/// Failure reported by one of the data sources.
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    #[error("Data source unavailable: {reason}")]
    Unavailable {
        reason: String
    },
    #[error("Employee [{employee_id}] was not found")]
    EmployeeNotFound {
        employee_id: EmployeeId
    },
    #[error("Page [{page}] is out of range, last page is [{last_page}]")]
    PageOutOfRange {
        page: PageIndex,
        last_page: PageIndex
    }
}

impl FetchError {
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable { reason: reason.into() }
    }

    pub fn employee_not_found(employee_id: &EmployeeId) -> Self {
        Self::EmployeeNotFound { employee_id: employee_id.clone() }
    }

    pub fn page_out_of_range(page: PageIndex, last_page: PageIndex) -> Self {
        Self::PageOutOfRange { page, last_page }
    }
}

/// Failure reported by the approval persistence collaborator.
#[derive(Debug, Clone, Error)]
pub enum PersistenceError {
    #[error("Transaction [{transaction_id}] was not found")]
    TransactionNotFound {
        transaction_id: TransactionId
    },
    #[error("Approval for transaction [{transaction_id}] could not be saved: {reason}")]
    Unavailable {
        transaction_id: TransactionId,
        reason: String
    }
}

impl PersistenceError {
    pub fn transaction_not_found(transaction_id: &TransactionId) -> Self {
        Self::TransactionNotFound { transaction_id: transaction_id.clone() }
    }

    pub fn unavailable(transaction_id: &TransactionId, reason: impl Into<String>) -> Self {
        Self::Unavailable {
            transaction_id: transaction_id.clone(),
            reason: reason.into()
        }
    }
}
