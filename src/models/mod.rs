mod employee;
mod errors;
mod transaction;

pub use employee::Employee;
pub use errors::{FetchError, PersistenceError};
pub use transaction::{Page, Transaction};
