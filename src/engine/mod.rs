mod accumulator;
mod errors;
mod fetch_controller;
mod pagination;
mod reconcile;

use std::fmt;
use std::fmt::{Display, Formatter};

use crate::types::EmployeeId;

pub use fetch_controller::FetchModeController;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchMode {
    All,
    ByEmployee
}

impl Display for FetchMode {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        match self {
            FetchMode::All => formatter.write_str("all"),
            FetchMode::ByEmployee => formatter.write_str("by employee")
        }
    }
}

/// What the employee filter currently points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    AllEmployees,
    Employee(EmployeeId)
}

impl Selection {
    pub fn mode(&self) -> FetchMode {
        match self {
            Selection::AllEmployees => FetchMode::All,
            Selection::Employee(_) => FetchMode::ByEmployee
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchPhase {
    Idle,
    LoadingAllFirstPage,
    LoadingAllNextPage,
    LoadingByEmployee
}

/// How a completed load affected the displayed list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The response was merged into the displayed list.
    Applied,
    /// A newer request was issued while this one was in flight; its response was dropped.
    Discarded,
    /// Nothing needed fetching.
    Unchanged
}
