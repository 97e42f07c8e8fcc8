use std::str::FromStr;

use thiserror::Error;

use crate::types::TransactionId;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("Empty command")]
    Empty,
    #[error("Unknown command [{0}]")]
    Unknown(String),
    #[error("Command [{command}] requires a {argument}")]
    MissingArgument {
        command: String,
        argument: &'static str
    }
}

/// One line of a session script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Filter by option value; `select all` maps to the "all employees" entry.
    Select(String),
    More,
    Approve(TransactionId),
    Unapprove(TransactionId),
    Reset,
    /// Takes the backend offline; fetches and approval writes fail until `restore`.
    Outage,
    Restore,
    Print,
    Employees
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut parts = line.split_whitespace();
        let name = parts.next().ok_or(CommandError::Empty)?;
        let argument = parts.next();

        let required = |argument_name: &'static str| {
            argument.ok_or_else(|| CommandError::MissingArgument {
                command: name.to_string(),
                argument: argument_name
            })
        };

        match name.to_lowercase().as_str() {
            "select" => match required("employee id or 'all'")? {
                "all" => Ok(Command::Select(String::new())),
                value => Ok(Command::Select(value.to_string()))
            },
            "more" => Ok(Command::More),
            "approve" => Ok(Command::Approve(TransactionId::new(required("transaction id")?))),
            "unapprove" => Ok(Command::Unapprove(TransactionId::new(required("transaction id")?))),
            "reset" => Ok(Command::Reset),
            "outage" => Ok(Command::Outage),
            "restore" => Ok(Command::Restore),
            "print" => Ok(Command::Print),
            "employees" => Ok(Command::Employees),
            _ => Err(CommandError::Unknown(name.to_string()))
        }
    }
}

/// Parses a script, skipping blank lines and `#` comments. Each entry keeps its line number.
pub fn parse_script(script: &str) -> Vec<(usize, Result<Command, CommandError>)> {
    script.lines()
        .enumerate()
        .map(|(index, line)| (index + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
        .map(|(number, line)| (number, line.parse::<Command>()))
        .collect()
}
