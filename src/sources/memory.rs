use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};

use dashmap::DashMap;
use tracing::{debug, info, trace};

use crate::models::{Employee, FetchError, Page, PersistenceError, Transaction};
use crate::sources::{ApprovalPersistence, EmployeeDirectory, EmployeeScopedSource, PaginatedSource};
use crate::types::{EmployeeId, PageIndex, TransactionId};

const DEFAULT_PAGE_SIZE: usize = 5;
const OFFLINE: &str = "backend is offline";

/// Stands in for the server: holds the authoritative transaction records and
/// answers every collaborator request from memory.
pub struct InMemoryBackend {
    order: Vec<TransactionId>,
    records: DashMap<TransactionId, Transaction>,
    employees: Vec<Employee>,
    page_size: usize,
    available: AtomicBool
}

impl InMemoryBackend {
    pub fn new(transactions: Vec<Transaction>) -> Self {
        let mut order = Vec::with_capacity(transactions.len());
        let mut employees: Vec<Employee> = Vec::new();
        let mut known_employees: HashSet<EmployeeId> = HashSet::new();
        let records = DashMap::with_capacity(transactions.len());

        for transaction in transactions {
            if known_employees.insert(transaction.employee.id.clone()) {
                employees.push(transaction.employee.clone());
            }

            order.push(transaction.id.clone());
            records.insert(transaction.id.clone(), transaction);
        }

        Self {
            order,
            records,
            employees,
            page_size: DEFAULT_PAGE_SIZE,
            available: AtomicBool::new(true)
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Takes the backend offline or brings it back. While offline every request fails
    /// with an `Unavailable` error.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
        info!("In-memory backend available=[{available}]");
    }

    pub fn is_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }

    /// The server's current approval value for `transaction_id`.
    #[cfg(test)]
    pub fn approved(&self, transaction_id: &TransactionId) -> Option<bool> {
        self.records.get(transaction_id).map(|record| record.approved)
    }

    fn ensure_available(&self) -> Result<(), FetchError> {
        if self.is_available() {
            Ok(())
        } else {
            Err(FetchError::unavailable(OFFLINE))
        }
    }

    fn page_count(&self) -> usize {
        self.order.len().div_ceil(self.page_size).max(1)
    }

    fn collect(&self, ids: &[TransactionId]) -> Vec<Transaction> {
        ids.iter()
            .filter_map(|id| self.records.get(id).map(|record| record.clone()))
            .collect()
    }

    fn page(&self, page: PageIndex) -> Result<Page, FetchError> {
        let page_count = self.page_count();

        if page >= page_count {
            return Err(FetchError::page_out_of_range(page, page_count - 1));
        }

        let start = page * self.page_size;
        let end = (start + self.page_size).min(self.order.len());
        let next_page = (page + 1 < page_count).then_some(page + 1);

        Ok(Page {
            data: self.collect(&self.order[start..end]),
            next_page
        })
    }

    fn scoped(&self, employee_id: &EmployeeId) -> Result<Vec<Transaction>, FetchError> {
        if !self.employees.iter().any(|employee| &employee.id == employee_id) {
            return Err(FetchError::employee_not_found(employee_id));
        }

        let transactions: Vec<Transaction> = self.collect(&self.order)
            .into_iter()
            .filter(|transaction| &transaction.employee.id == employee_id)
            .collect();

        Ok(transactions)
    }
}

impl EmployeeDirectory for InMemoryBackend {
    async fn fetch_all(&self) -> Result<Vec<Employee>, FetchError> {
        self.ensure_available()?;
        Ok(self.employees.clone())
    }
}

impl PaginatedSource for InMemoryBackend {
    async fn fetch_page(&self, page: PageIndex) -> Result<Page, FetchError> {
        self.ensure_available()?;
        debug!("Serving transactions page [{page}]");
        self.page(page)
    }

    fn invalidate(&self) {
        trace!("In-memory backend keeps no responses to invalidate");
    }
}

impl EmployeeScopedSource for InMemoryBackend {
    async fn fetch_by_employee(&self, employee_id: &EmployeeId) -> Result<Vec<Transaction>, FetchError> {
        self.ensure_available()?;
        debug!("Serving transactions for employee [{employee_id}]");
        self.scoped(employee_id)
    }

    fn invalidate(&self) {
        trace!("In-memory backend keeps no responses to invalidate");
    }
}

impl ApprovalPersistence for InMemoryBackend {
    async fn set_approval(&self, transaction_id: &TransactionId, value: bool) -> Result<(), PersistenceError> {
        if !self.is_available() {
            return Err(PersistenceError::unavailable(transaction_id, OFFLINE));
        }

        let mut record = self.records.get_mut(transaction_id)
            .ok_or_else(|| PersistenceError::transaction_not_found(transaction_id))?;

        record.approved = value;
        debug!("Transaction [{transaction_id}] stored as approved=[{value}]");

        Ok(())
    }
}
