mod command;
#[cfg(test)]
mod tests;

use std::io::Write;
use std::sync::Arc;

use anyhow::{bail, Result};
use csv::WriterBuilder;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{info, warn};

use crate::engine::{FetchModeController, FetchOutcome, Selection};
use crate::models::{Employee, Transaction};
use crate::selector::{EmployeeFilter, Selector};
use crate::sources::{EmployeeScopedSource, InMemoryBackend, PaginatedSource};

pub use command::{parse_script, Command};
#[cfg(test)]
pub use command::CommandError;

const TRANSACTION_HEADER: [&str; 6] = ["id", "merchant", "amount", "employee", "date", "approved"];
const EMPLOYEE_HEADER: [&str; 2] = ["value", "label"];

/// One displayed transaction as written by `print`.
#[derive(Debug, Serialize)]
struct DisplayedRow<'a> {
    id: &'a str,
    merchant: &'a str,
    amount: Decimal,
    employee: String,
    date: &'a str,
    approved: bool
}

impl<'a> From<&'a Transaction> for DisplayedRow<'a> {
    fn from(transaction: &'a Transaction) -> Self {
        Self {
            id: transaction.id.as_str(),
            merchant: &transaction.merchant,
            amount: transaction.amount,
            employee: transaction.employee.full_name(),
            date: &transaction.date,
            approved: transaction.approved
        }
    }
}

/// Replays scripted user actions against a controller and writes what the user would see.
pub struct Session<P, E> {
    controller: FetchModeController<P, E>,
    filter: EmployeeFilter,
    backend: Arc<InMemoryBackend>
}

impl<P: PaginatedSource, E: EmployeeScopedSource> Session<P, E> {
    /// Loads the employee filter, then shows the first page of all transactions.
    pub async fn start(controller: FetchModeController<P, E>, backend: Arc<InMemoryBackend>) -> Self {
        let filter = match EmployeeFilter::load(&backend).await {
            Ok(filter) => filter,
            Err(error) => {
                warn!("Employee filter unavailable: {error}");
                Selector::loading(Employee::everyone())
            }
        };

        if let Err(error) = controller.select(Selection::AllEmployees).await {
            warn!("Initial load failed: {error}");
        }

        Self { controller, filter, backend }
    }

    #[cfg(test)]
    pub fn controller(&self) -> &FetchModeController<P, E> {
        &self.controller
    }

    /// Runs every command in `script`. Failing commands are logged and skipped.
    pub async fn run<W: Write>(&self, script: &str, output: &mut W) -> Result<()> {
        for (line, parsed) in parse_script(script) {
            match parsed {
                Ok(command) => {
                    if let Err(error) = self.execute(&command, output).await {
                        warn!("Line {line}: {command:?} failed: {error}");
                    }
                }
                Err(error) => {
                    warn!("Line {line}: {error}");
                }
            }
        }

        output.flush()?;

        Ok(())
    }

    pub async fn execute<W: Write>(&self, command: &Command, output: &mut W) -> Result<()> {
        match command {
            Command::Select(value) => {
                let selection = self.filter.selection(value)
                    .ok_or_else(|| anyhow::anyhow!("no filter option with value [{value}]"))?;
                let outcome = self.controller.select(selection).await?;
                self.log_outcome(outcome);
            }
            Command::More => {
                if !self.controller.can_load_more() {
                    bail!("no further page to load for {:?}", self.controller.selection());
                }

                let outcome = self.controller.load_more().await?;
                self.log_outcome(outcome);
            }
            Command::Approve(transaction_id) => self.controller.toggle_approval(transaction_id, true),
            Command::Unapprove(transaction_id) => self.controller.toggle_approval(transaction_id, false),
            Command::Reset => self.controller.reset(),
            Command::Outage => self.backend.set_available(false),
            Command::Restore => self.backend.set_available(true),
            Command::Print => {
                self.log_status();
                self.write_transactions(output)?;
            }
            Command::Employees => self.write_employees(output)?
        }

        Ok(())
    }

    /// Finishes outstanding approval writes and reports edits the server never acknowledged.
    pub async fn finish(self) -> Result<()> {
        let overrides = self.controller.overrides().clone();
        self.controller.shutdown().await?;

        if overrides.is_empty() {
            return Ok(());
        }

        let unconfirmed = overrides.unconfirmed();
        info!("[{}] approval edits made, [{}] unconfirmed", overrides.len(), unconfirmed.len());

        for transaction_id in unconfirmed {
            warn!("Approval edit for transaction [{transaction_id}] was not acknowledged by the server");
        }

        Ok(())
    }

    fn log_outcome(&self, outcome: FetchOutcome) {
        info!("{outcome:?}: [{}] transactions displayed, more pages: [{}]", self.controller.snapshot().len(), self.controller.has_more());
    }

    fn log_status(&self) {
        let overrides = self.controller.overrides();

        info!(
            "Mode [{:?}], phase [{:?}], loading all [{}], loading by employee [{}], view more [{}], pending approve [{}], pending unapprove [{}]",
            self.controller.selection().map(|selection| selection.mode()),
            self.controller.phase(),
            self.controller.is_loading_all(),
            self.controller.is_loading_by_employee(),
            self.controller.can_load_more(),
            overrides.pending_approve().len(),
            overrides.pending_unapprove().len()
        );
    }

    fn write_transactions<W: Write>(&self, output: &mut W) -> Result<()> {
        let mut writer = WriterBuilder::new().has_headers(false).from_writer(output);
        writer.write_record(TRANSACTION_HEADER)?;

        for transaction in &self.controller.snapshot() {
            writer.serialize(DisplayedRow::from(transaction))?;
        }

        writer.flush()?;

        Ok(())
    }

    fn write_employees<W: Write>(&self, output: &mut W) -> Result<()> {
        if self.filter.is_loading() {
            warn!("Employee filter has not loaded, only the header is written");
        }

        let mut writer = WriterBuilder::new().has_headers(false).from_writer(output);
        writer.write_record(EMPLOYEE_HEADER)?;

        for option in self.filter.options() {
            writer.write_record([&option.value, &option.label])?;
        }

        writer.flush()?;

        Ok(())
    }
}
