use crate::types::EmployeeId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Employee {
    pub id: EmployeeId,
    pub first_name: String,
    pub last_name: String
}

impl Employee {
    /// The "all employees" filter entry. Its empty id never matches a real employee.
    pub fn everyone() -> Self {
        Self {
            id: EmployeeId::new(""),
            first_name: "All".to_string(),
            last_name: "Employees".to_string()
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}
