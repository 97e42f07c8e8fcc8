use super::{parse_script, Command, CommandError, Session};

use std::sync::Arc;

use anyhow::Result;
use rust_decimal::Decimal;

use crate::cache::OverrideCache;
use crate::engine::FetchModeController;
use crate::models::{Employee, Transaction};
use crate::sources::{CachedSource, InMemoryBackend};
use crate::types::{EmployeeId, TransactionId};

fn transaction(id: &str, employee_id: &str, approved: bool) -> Transaction {
    Transaction {
        id: TransactionId::new(id),
        merchant: "Store".to_string(),
        amount: Decimal::new(2500, 2),
        employee: Employee {
            id: EmployeeId::new(employee_id),
            first_name: "Sam".to_string(),
            last_name: employee_id.to_string()
        },
        date: "2024-02-01".to_string(),
        approved
    }
}

async fn session(backend: &Arc<InMemoryBackend>) -> Session<Arc<CachedSource<Arc<InMemoryBackend>>>, Arc<CachedSource<Arc<InMemoryBackend>>>> {
    let source = Arc::new(CachedSource::new(backend.clone()));
    let controller = FetchModeController::new(source.clone(), source, backend.clone(), Arc::new(OverrideCache::new()));

    Session::start(controller, backend.clone()).await
}

fn last_block(output: &[u8]) -> Result<Vec<String>> {
    let text = String::from_utf8(output.to_vec())?;
    let block = text.rsplit("id,merchant,amount,employee,date,approved\n").next().unwrap_or_default();

    Ok(block.lines().map(str::to_string).collect())
}

#[test]
fn test_commands_parse_with_arguments() {
    assert_eq!("select all".parse::<Command>(), Ok(Command::Select(String::new())));
    assert_eq!("select emp-1".parse::<Command>(), Ok(Command::Select("emp-1".to_string())));
    assert_eq!("APPROVE tx-1".parse::<Command>(), Ok(Command::Approve(TransactionId::new("tx-1"))));
    assert_eq!("more".parse::<Command>(), Ok(Command::More));
    assert_eq!("outage".parse::<Command>(), Ok(Command::Outage));
    assert_eq!("Restore".parse::<Command>(), Ok(Command::Restore));
    assert_eq!("".parse::<Command>(), Err(CommandError::Empty));
    assert!(matches!("unapprove".parse::<Command>(), Err(CommandError::MissingArgument { .. })));
    assert!(matches!("delete tx-1".parse::<Command>(), Err(CommandError::Unknown(_))));
}

#[test]
fn test_script_skips_comments_and_blank_lines() {
    let parsed = parse_script("# warm up\n\nselect all\n  more  \nbogus\n");
    let lines: Vec<usize> = parsed.iter().map(|(line, _)| *line).collect();

    assert_eq!(lines, vec![3, 4, 5]);
    assert!(parsed[2].1.is_err());
}

#[tokio::test]
async fn test_session_starts_on_first_page_of_all_transactions() -> Result<()> {
    let backend = Arc::new(InMemoryBackend::new(vec![
        transaction("tx1", "emp-a", false),
        transaction("tx2", "emp-b", false),
        transaction("tx3", "emp-a", false)
    ]).with_page_size(2));
    let session = session(&backend).await;

    let mut output = Vec::new();
    session.run("print", &mut output).await?;

    assert_eq!(last_block(&output)?.len(), 2);
    assert!(session.controller().has_more());

    Ok(())
}

#[tokio::test]
async fn test_session_replays_toggles_and_mode_switches() -> Result<()> {
    let backend = Arc::new(InMemoryBackend::new(vec![
        transaction("tx1", "emp-a", false),
        transaction("tx2", "emp-b", false),
        transaction("tx3", "emp-a", false)
    ]).with_page_size(2));
    let session = session(&backend).await;
    let script = "approve tx1\nselect emp-a\nunapprove tx3\nselect missing\nselect all\nmore\nmore\nprint\n";

    let mut output = Vec::new();
    session.run(script, &mut output).await?;

    assert_eq!(last_block(&output)?, vec![
        "tx1,Store,25.00,Sam emp-a,2024-02-01,true",
        "tx2,Store,25.00,Sam emp-b,2024-02-01,false",
        "tx3,Store,25.00,Sam emp-a,2024-02-01,false"
    ]);

    session.finish().await?;

    assert_eq!(backend.approved(&TransactionId::new("tx1")), Some(true));

    Ok(())
}

#[tokio::test]
async fn test_session_lists_employee_options() -> Result<()> {
    let backend = Arc::new(InMemoryBackend::new(vec![transaction("tx1", "emp-a", false)]));
    let session = session(&backend).await;

    let mut output = Vec::new();
    session.run("employees", &mut output).await?;

    assert_eq!(String::from_utf8(output)?, "value,label\n,All Employees\nemp-a,Sam emp-a\n");

    Ok(())
}

#[tokio::test]
async fn test_print_quotes_fields_containing_commas() -> Result<()> {
    let mut quoted = transaction("tx1", "emp-a", false);
    quoted.merchant = "Acme, Inc".to_string();
    quoted.employee.last_name = "Lee, Jr".to_string();
    let backend = Arc::new(InMemoryBackend::new(vec![quoted]));
    let session = session(&backend).await;

    let mut output = Vec::new();
    session.run("print", &mut output).await?;

    let mut reader = csv::Reader::from_reader(output.as_slice());
    let records = reader.records().collect::<Result<Vec<_>, _>>()?;

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].len(), 6);
    assert_eq!(&records[0][1], "Acme, Inc");
    assert_eq!(&records[0][3], "Sam Lee, Jr");

    let mut output = Vec::new();
    session.run("employees", &mut output).await?;

    assert_eq!(String::from_utf8(output)?, "value,label\n,All Employees\nemp-a,\"Sam Lee, Jr\"\n");

    Ok(())
}

#[tokio::test]
async fn test_print_writes_header_for_empty_list() -> Result<()> {
    let backend = Arc::new(InMemoryBackend::new(vec![transaction("tx1", "emp-a", false)]));
    let session = session(&backend).await;

    let mut output = Vec::new();
    session.run("reset\nprint", &mut output).await?;

    assert_eq!(String::from_utf8(output)?, "id,merchant,amount,employee,date,approved\n");

    Ok(())
}

#[tokio::test]
async fn test_more_is_ignored_when_view_more_is_hidden() -> Result<()> {
    let backend = Arc::new(InMemoryBackend::new(vec![
        transaction("tx1", "emp-a", false),
        transaction("tx2", "emp-b", false),
        transaction("tx3", "emp-a", false)
    ]).with_page_size(2));
    let session = session(&backend).await;

    let mut output = Vec::new();
    session.run("select emp-b\nmore\nprint", &mut output).await?;

    assert_eq!(last_block(&output)?, vec!["tx2,Store,25.00,Sam emp-b,2024-02-01,false"]);
    assert!(!session.controller().can_load_more());

    Ok(())
}

#[tokio::test]
async fn test_outage_keeps_list_and_unconfirmed_override() -> Result<()> {
    let backend = Arc::new(InMemoryBackend::new(vec![
        transaction("tx1", "emp-a", false),
        transaction("tx2", "emp-b", false),
        transaction("tx3", "emp-a", false)
    ]).with_page_size(2));
    let session = session(&backend).await;
    let overrides = session.controller().overrides().clone();

    let mut output = Vec::new();
    session.run("outage\napprove tx1\nmore\nprint", &mut output).await?;

    assert_eq!(last_block(&output)?, vec![
        "tx1,Store,25.00,Sam emp-a,2024-02-01,true",
        "tx2,Store,25.00,Sam emp-b,2024-02-01,false"
    ]);
    assert!(session.controller().can_load_more());

    session.finish().await?;

    assert_eq!(backend.approved(&TransactionId::new("tx1")), Some(false));
    assert_eq!(overrides.lookup(&TransactionId::new("tx1")), Some(true));
    assert_eq!(overrides.unconfirmed(), vec![TransactionId::new("tx1")]);

    Ok(())
}

#[tokio::test]
async fn test_restore_lets_pagination_continue() -> Result<()> {
    let backend = Arc::new(InMemoryBackend::new(vec![
        transaction("tx1", "emp-a", false),
        transaction("tx2", "emp-b", false),
        transaction("tx3", "emp-a", false)
    ]).with_page_size(2));
    let session = session(&backend).await;

    let mut output = Vec::new();
    session.run("outage\nmore\nrestore\nmore\nprint", &mut output).await?;

    assert_eq!(last_block(&output)?.len(), 3);
    assert!(!session.controller().has_more());

    Ok(())
}
