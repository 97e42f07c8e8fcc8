use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::task::JoinError;
use tracing::{debug, info, warn};

use crate::actors::ApprovalWriter;
use crate::cache::OverrideCache;
use crate::engine::accumulator::{Arrival, ResultAccumulator};
use crate::engine::errors::SyncError;
use crate::engine::{FetchMode, FetchOutcome, FetchPhase, Selection};
use crate::models::Transaction;
use crate::sources::{ApprovalPersistence, EmployeeScopedSource, PaginatedSource};
use crate::types::{EmployeeId, PageIndex, TransactionId};

#[derive(Debug)]
enum FetchRequest {
    Page(PageIndex),
    Employee(EmployeeId)
}

/// A request stamped with the generation it was issued under.
#[derive(Debug)]
struct Ticket {
    generation: u64,
    request: FetchRequest
}

#[derive(Debug)]
struct ControllerState {
    phase: FetchPhase,
    selection: Option<Selection>,
    accumulator: ResultAccumulator,
    generation: u64
}

impl ControllerState {
    fn issue(&mut self, phase: FetchPhase, request: FetchRequest) -> Ticket {
        self.generation += 1;
        self.phase = phase;

        Ticket {
            generation: self.generation,
            request
        }
    }
}

/// Decides which source feeds the displayed list and merges what comes back.
///
/// Operations take `&self` so a new selection can be made while an older load is
/// still in flight. Every load is stamped with a generation number and only the
/// latest one is allowed to touch the displayed list. The state lock is never
/// held across a fetch.
pub struct FetchModeController<P, E> {
    paginated: P,
    by_employee: E,
    overrides: Arc<OverrideCache>,
    writer: ApprovalWriter,
    state: Mutex<ControllerState>
}

impl<P: PaginatedSource, E: EmployeeScopedSource> FetchModeController<P, E> {
    /// Creates an idle controller and spawns its approval writer.
    pub fn new<W: ApprovalPersistence>(paginated: P, by_employee: E, persistence: W, overrides: Arc<OverrideCache>) -> Self {
        let writer = ApprovalWriter::new(persistence, overrides.clone());

        Self {
            paginated,
            by_employee,
            overrides,
            writer,
            state: Mutex::new(ControllerState {
                phase: FetchPhase::Idle,
                selection: None,
                accumulator: ResultAccumulator::new(),
                generation: 0
            })
        }
    }

    /// Points the displayed list at `selection` and loads it.
    ///
    /// Switching to a different target clears the list before the fetch resolves.
    /// Selecting the current target again continues it: the next page for "all",
    /// a fresh replacement for an employee.
    pub async fn select(&self, selection: Selection) -> Result<FetchOutcome, SyncError> {
        let ticket = {
            let mut state = self.lock_state();

            if state.selection.as_ref() != Some(&selection) {
                info!("Switching displayed transactions to {selection:?}");
                state.accumulator.clear();
                state.selection = Some(selection.clone());
            }

            match selection {
                Selection::AllEmployees => {
                    self.by_employee.invalidate();

                    if state.accumulator.is_empty() {
                        state.issue(FetchPhase::LoadingAllFirstPage, FetchRequest::Page(0))
                    } else if let Some(next) = state.accumulator.cursor().next_page() {
                        state.issue(FetchPhase::LoadingAllNextPage, FetchRequest::Page(next))
                    } else {
                        debug!("All pages already loaded");
                        return Ok(FetchOutcome::Unchanged);
                    }
                }
                Selection::Employee(employee_id) => {
                    self.paginated.invalidate();
                    state.issue(FetchPhase::LoadingByEmployee, FetchRequest::Employee(employee_id))
                }
            }
        };

        self.execute(ticket).await
    }

    /// Appends the next page of the "all transactions" feed.
    pub async fn load_more(&self) -> Result<FetchOutcome, SyncError> {
        let ticket = {
            let mut state = self.lock_state();

            if state.selection != Some(Selection::AllEmployees) {
                return Err(SyncError::LoadMoreUnavailable);
            }

            let Some(next) = state.accumulator.cursor().next_page() else {
                return Err(SyncError::LoadMoreUnavailable);
            };

            state.issue(FetchPhase::LoadingAllNextPage, FetchRequest::Page(next))
        };

        self.execute(ticket).await
    }

    /// Drops both sources' responses and empties the displayed list.
    ///
    /// Loads still in flight are discarded when they complete.
    pub fn reset(&self) {
        self.paginated.invalidate();
        self.by_employee.invalidate();

        let mut state = self.lock_state();
        state.generation += 1;
        state.phase = FetchPhase::Idle;
        state.selection = None;
        state.accumulator.merge(Arrival::Nothing, &self.overrides);

        info!("Displayed transactions reset");
    }

    /// Records the user's approval choice and queues the server write.
    ///
    /// The override and the displayed row change immediately. A failed write does not
    /// roll either back.
    pub fn toggle_approval(&self, transaction_id: &TransactionId, value: bool) {
        if value {
            self.overrides.mark_approved(transaction_id);
        } else {
            self.overrides.mark_unapproved(transaction_id);
        }

        if !self.lock_state().accumulator.set_approval(transaction_id, value) {
            debug!("Transaction [{transaction_id}] is not displayed, only the override was recorded");
        }

        if !self.writer.accept(transaction_id, value) {
            warn!("Approval writer stopped, transaction [{transaction_id}] was not sent for persistence");
        }
    }

    pub fn snapshot(&self) -> Vec<Transaction> {
        self.lock_state().accumulator.snapshot()
    }

    pub fn phase(&self) -> FetchPhase {
        self.lock_state().phase
    }

    pub fn selection(&self) -> Option<Selection> {
        self.lock_state().selection.clone()
    }

    pub fn is_loading_all(&self) -> bool {
        matches!(self.phase(), FetchPhase::LoadingAllFirstPage | FetchPhase::LoadingAllNextPage)
    }

    pub fn is_loading_by_employee(&self) -> bool {
        self.phase() == FetchPhase::LoadingByEmployee
    }

    pub fn has_more(&self) -> bool {
        self.lock_state().accumulator.cursor().has_more()
    }

    /// Whether a "view more" action makes sense right now.
    pub fn can_load_more(&self) -> bool {
        let state = self.lock_state();

        state.selection == Some(Selection::AllEmployees)
            && state.accumulator.cursor().has_more()
            && !matches!(state.phase, FetchPhase::LoadingAllFirstPage | FetchPhase::LoadingAllNextPage)
    }

    pub fn overrides(&self) -> &Arc<OverrideCache> {
        &self.overrides
    }

    /// Waits for queued approval writes to finish.
    pub async fn shutdown(self) -> Result<(), JoinError> {
        self.writer.despawn().await
    }

    async fn execute(&self, ticket: Ticket) -> Result<FetchOutcome, SyncError> {
        let result = match &ticket.request {
            FetchRequest::Page(page) => self.paginated.fetch_page(*page).await
                .map(Arrival::AllPage)
                .map_err(|error| SyncError::fetch_failure(FetchMode::All, error)),
            FetchRequest::Employee(employee_id) => self.by_employee.fetch_by_employee(employee_id).await
                .map(Arrival::ByEmployee)
                .map_err(|error| SyncError::fetch_failure(FetchMode::ByEmployee, error))
        };

        let mut state = self.lock_state();

        if state.generation != ticket.generation {
            debug!("Discarding stale response for {:?} (generation {} < {})", ticket.request, ticket.generation, state.generation);
            return Ok(FetchOutcome::Discarded);
        }

        state.phase = FetchPhase::Idle;

        match result {
            Ok(arrival) => {
                //NOTE: Overrides are read here, at merge time, so toggles made during the fetch are honoured
                state.accumulator.merge(arrival, &self.overrides);
                debug!("Displayed list now holds [{}] transactions", state.accumulator.len());
                Ok(FetchOutcome::Applied)
            }
            Err(error) => {
                warn!("{error}");
                Err(error)
            }
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, ControllerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
