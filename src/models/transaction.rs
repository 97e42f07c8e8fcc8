use rust_decimal::Decimal;

use crate::models::Employee;
use crate::types::{PageIndex, TransactionId};

/// A transaction as reported by the server.
///
/// The client only ever holds copies of these. `approved` on a displayed copy may
/// differ from the server's record while a local approval edit is pending.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub id: TransactionId,
    pub merchant: String,
    pub amount: Decimal,
    pub employee: Employee,
    /// Kept as reported; formatting belongs to the presentation layer.
    pub date: String,
    pub approved: bool
}

/// One page of the paginated transaction feed.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub data: Vec<Transaction>,
    /// Index of the page after this one, `None` on the last page.
    pub next_page: Option<PageIndex>
}
