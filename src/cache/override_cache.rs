use dashmap::DashMap;
use tracing::{debug, trace};

use crate::types::TransactionId;

/// A local approval edit for one transaction.
///
/// `optimistic` is what the user chose and what gets displayed. `confirmed` is only
/// set once the persistence collaborator acknowledged a write of that same value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Override {
    pub optimistic: bool,
    pub confirmed: Option<bool>
}

impl Override {
    fn pending(optimistic: bool) -> Self {
        Self { optimistic, confirmed: None }
    }

    pub fn is_confirmed(&self) -> bool {
        self.confirmed == Some(self.optimistic)
    }
}

/// Approval edits made during this process, keyed by transaction.
///
/// One entry per transaction makes the two pending sets disjoint by construction:
/// an id is in `pending_approve` when its optimistic value is `true` and in
/// `pending_unapprove` when it is `false`. Entries are never evicted.
#[derive(Debug, Default)]
pub struct OverrideCache {
    entries: DashMap<TransactionId, Override>
}

impl OverrideCache {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new()
        }
    }

    pub fn mark_approved(&self, transaction_id: &TransactionId) {
        self.mark(transaction_id, true);
    }

    pub fn mark_unapproved(&self, transaction_id: &TransactionId) {
        self.mark(transaction_id, false);
    }

    /// Records that the server acknowledged `value` for `transaction_id`.
    ///
    /// Ignored when the user has since flipped the edit to the other value; the
    /// newer write will confirm itself.
    pub fn confirm(&self, transaction_id: &TransactionId, value: bool) {
        match self.entries.get_mut(transaction_id) {
            Some(mut entry) if entry.optimistic == value => {
                entry.confirmed = Some(value);
                trace!("Override for transaction [{transaction_id}] confirmed as [{value}]");
            }
            Some(_) => {
                debug!("Ignoring superseded confirmation [{value}] for transaction [{transaction_id}]");
            }
            None => {
                debug!("Ignoring confirmation for transaction [{transaction_id}] without an override");
            }
        }
    }

    /// The optimistic value recorded for `transaction_id`, if the user edited it.
    pub fn lookup(&self, transaction_id: &TransactionId) -> Option<bool> {
        self.entries.get(transaction_id).map(|entry| entry.optimistic)
    }

    #[cfg(test)]
    pub fn get(&self, transaction_id: &TransactionId) -> Option<Override> {
        self.entries.get(transaction_id).map(|entry| *entry)
    }

    pub fn is_pending_approve(&self, transaction_id: &TransactionId) -> bool {
        self.lookup(transaction_id) == Some(true)
    }

    pub fn is_pending_unapprove(&self, transaction_id: &TransactionId) -> bool {
        self.lookup(transaction_id) == Some(false)
    }

    pub fn pending_approve(&self) -> Vec<TransactionId> {
        self.collect_where(true)
    }

    pub fn pending_unapprove(&self) -> Vec<TransactionId> {
        self.collect_where(false)
    }

    /// Edits the server has not acknowledged yet, including ones whose write failed.
    pub fn unconfirmed(&self) -> Vec<TransactionId> {
        let mut ids: Vec<TransactionId> = self.entries.iter()
            .filter(|entry| !entry.is_confirmed())
            .map(|entry| entry.key().clone())
            .collect();

        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn mark(&self, transaction_id: &TransactionId, value: bool) {
        let mut entry = self.entries
            .entry(transaction_id.clone())
            .or_insert_with(|| Override::pending(value));

        if entry.optimistic != value {
            *entry = Override::pending(value);
        }

        debug!("Transaction [{transaction_id}] marked as approved=[{value}]");
    }

    fn collect_where(&self, value: bool) -> Vec<TransactionId> {
        let mut ids: Vec<TransactionId> = self.entries.iter()
            .filter(|entry| entry.optimistic == value)
            .map(|entry| entry.key().clone())
            .collect();

        ids.sort();
        ids
    }
}
