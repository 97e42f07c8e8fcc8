
use tracing::debug;

use crate::engine::Selection;
use crate::models::{Employee, FetchError};
use crate::sources::EmployeeDirectory;

/// An entry as the select widget shows it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    pub value: String,
    pub label: String
}

/// Anything that can be offered as a select option.
pub trait Selectable {
    fn to_option(&self) -> SelectOption;
}

impl Selectable for Employee {
    fn to_option(&self) -> SelectOption {
        SelectOption {
            value: self.id.to_string(),
            label: self.full_name()
        }
    }
}

/// Option list for a select widget, with a default entry always listed first.
#[derive(Debug, Clone)]
pub struct Selector<T> {
    default_item: T,
    /// `None` until the items have been fetched.
    items: Option<Vec<T>>
}

impl<T: Selectable> Selector<T> {
    /// A selector whose items are still being fetched. It offers no options yet.
    pub fn loading(default_item: T) -> Self {
        Self {
            default_item,
            items: None
        }
    }

    pub fn finish_loading(&mut self, items: Vec<T>) {
        self.items = Some(items);
    }

    pub fn is_loading(&self) -> bool {
        self.items.is_none()
    }

    pub fn options(&self) -> Vec<SelectOption> {
        self.entries().map(|item| item.to_option()).collect()
    }

    /// The item behind an option value.
    pub fn find(&self, value: &str) -> Option<&T> {
        self.entries().find(|item| item.to_option().value == value)
    }

    fn entries(&self) -> impl Iterator<Item = &T> {
        let loaded = self.items.as_deref();
        let default_item = loaded.map(|_| &self.default_item);

        default_item.into_iter().chain(loaded.unwrap_or_default().iter())
    }
}

pub type EmployeeFilter = Selector<Employee>;

impl EmployeeFilter {
    /// Fetches the employee directory into a filter headed by the "all employees" entry.
    pub async fn load<D: EmployeeDirectory>(directory: &D) -> Result<Self, FetchError> {
        let mut filter = Selector::loading(Employee::everyone());

        let employees = directory.fetch_all().await?;

        debug!("Loaded [{}] employees", employees.len());
        filter.finish_loading(employees);

        Ok(filter)
    }

    /// Maps a chosen option value to what the transaction list should show.
    pub fn selection(&self, value: &str) -> Option<Selection> {
        self.find(value).map(|employee| {
            if employee.id.is_empty() {
                Selection::AllEmployees
            } else {
                Selection::Employee(employee.id.clone())
            }
        })
    }
}
