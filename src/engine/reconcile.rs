use crate::cache::OverrideCache;
use crate::models::Transaction;

/// Overlays the user's pending approval edits onto freshly fetched transactions.
///
/// Pending unapproves are checked before pending approves. Transactions without an
/// edit keep the server's value.
pub fn reconcile(mut transactions: Vec<Transaction>, overrides: &OverrideCache) -> Vec<Transaction> {
    for transaction in transactions.iter_mut() {
        if overrides.is_pending_unapprove(&transaction.id) {
            transaction.approved = false;
        } else if overrides.is_pending_approve(&transaction.id) {
            transaction.approved = true;
        }
    }

    transactions
}
