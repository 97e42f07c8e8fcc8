use tracing::trace;

use crate::cache::OverrideCache;
use crate::engine::pagination::PaginationCursor;
use crate::engine::reconcile::reconcile;
use crate::models::{Page, Transaction};
use crate::types::TransactionId;

/// New data handed to the accumulator, tagged by where it came from.
#[derive(Debug, Clone)]
pub enum Arrival {
    /// A page of the "all transactions" feed.
    AllPage(Page),
    /// The full result of an employee-scoped query.
    ByEmployee(Vec<Transaction>),
    /// Both sources are unset.
    Nothing
}

/// The list currently shown to the user, together with its pagination cursor.
#[derive(Debug, Default)]
pub struct ResultAccumulator {
    transactions: Vec<Transaction>,
    cursor: PaginationCursor
}

impl ResultAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reconciles the arrival against the current overrides and merges it in.
    ///
    /// Pages append and advance the cursor, employee results replace the list and
    /// end pagination, and an empty arrival clears everything.
    pub fn merge(&mut self, arrival: Arrival, overrides: &OverrideCache) {
        match arrival {
            Arrival::AllPage(page) => {
                trace!("Appending [{}] transactions, next page [{:?}]", page.data.len(), page.next_page);
                self.transactions.extend(reconcile(page.data, overrides));
                self.cursor.advance(page.next_page);
            }
            Arrival::ByEmployee(transactions) => {
                trace!("Replacing displayed list with [{}] transactions", transactions.len());
                self.transactions = reconcile(transactions, overrides);
                self.cursor.reset();
            }
            Arrival::Nothing => self.clear()
        }
    }

    pub fn clear(&mut self) {
        self.transactions.clear();
        self.cursor.reset();
    }

    /// Reflects a local edit in the displayed row, if the transaction is shown.
    pub fn set_approval(&mut self, transaction_id: &TransactionId, value: bool) -> bool {
        match self.transactions.iter_mut().find(|transaction| &transaction.id == transaction_id) {
            Some(transaction) => {
                transaction.approved = value;
                true
            }
            None => false
        }
    }

    pub fn snapshot(&self) -> Vec<Transaction> {
        self.transactions.clone()
    }

    pub fn cursor(&self) -> PaginationCursor {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }
}
