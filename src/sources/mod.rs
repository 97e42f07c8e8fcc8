mod cached;
mod loader;
mod memory;

use std::future::Future;
use std::sync::Arc;

use crate::models::{Employee, FetchError, Page, PersistenceError, Transaction};
use crate::types::{EmployeeId, PageIndex, TransactionId};

pub use cached::CachedSource;
pub use loader::load_transactions;
#[cfg(test)]
pub use loader::LoaderError;
pub use memory::InMemoryBackend;

pub trait EmployeeDirectory: Send + Sync + 'static {
    fn fetch_all(&self) -> impl Future<Output = Result<Vec<Employee>, FetchError>> + Send;
}

/// The paginated "all transactions" feed.
pub trait PaginatedSource: Send + Sync + 'static {
    fn fetch_page(&self, page: PageIndex) -> impl Future<Output = Result<Page, FetchError>> + Send;
    /// Discards any response the source is holding on to.
    fn invalidate(&self);
}

/// Transactions for a single employee, unpaginated.
pub trait EmployeeScopedSource: Send + Sync + 'static {
    fn fetch_by_employee(&self, employee_id: &EmployeeId) -> impl Future<Output = Result<Vec<Transaction>, FetchError>> + Send;
    /// Discards any response the source is holding on to.
    fn invalidate(&self);
}

/// Writes approval changes back to the server. Writes are expected to be idempotent.
pub trait ApprovalPersistence: Send + Sync + 'static {
    fn set_approval(&self, transaction_id: &TransactionId, value: bool) -> impl Future<Output = Result<(), PersistenceError>> + Send;
}

impl<T: EmployeeDirectory> EmployeeDirectory for Arc<T> {
    fn fetch_all(&self) -> impl Future<Output = Result<Vec<Employee>, FetchError>> + Send {
        T::fetch_all(self)
    }
}

impl<T: PaginatedSource> PaginatedSource for Arc<T> {
    fn fetch_page(&self, page: PageIndex) -> impl Future<Output = Result<Page, FetchError>> + Send {
        T::fetch_page(self, page)
    }

    fn invalidate(&self) {
        T::invalidate(self)
    }
}

impl<T: EmployeeScopedSource> EmployeeScopedSource for Arc<T> {
    fn fetch_by_employee(&self, employee_id: &EmployeeId) -> impl Future<Output = Result<Vec<Transaction>, FetchError>> + Send {
        T::fetch_by_employee(self, employee_id)
    }

    fn invalidate(&self) {
        T::invalidate(self)
    }
}

impl<T: ApprovalPersistence> ApprovalPersistence for Arc<T> {
    fn set_approval(&self, transaction_id: &TransactionId, value: bool) -> impl Future<Output = Result<(), PersistenceError>> + Send {
        T::set_approval(self, transaction_id, value)
    }
}
