mod actors;
mod cache;
mod engine;
mod models;
mod selector;
mod session;
mod sources;
mod types;

use std::fs;
use std::io::{stderr, stdout, BufWriter};
use std::process::exit;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use tracing::info;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, Layer};

use crate::cache::OverrideCache;
use crate::engine::FetchModeController;
use crate::session::Session;
use crate::sources::{load_transactions, CachedSource, InMemoryBackend};

const DEFAULT_PAGE_SIZE: usize = 5;
const RESPONSE_CACHE_CAPACITY: u64 = 128;
const RESPONSE_CACHE_TTL: Duration = Duration::from_secs(30);

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 3 {
        eprintln!("Usage: approval-sync [transactions].csv [session].txt [log_level:optional] [page_size:optional] > [displayed].csv");
        eprintln!("Available log levels: error, warn, info, debug, trace (default: error)");
        eprintln!("Page size defaults to {DEFAULT_PAGE_SIZE}");
        exit(1);
    }

    let transactions_path = &args[1];
    let script_path = &args[2];
    let log_level = args.get(3)
        .map(|s| parse_log_level(s)).unwrap_or_else(|| LevelFilter::ERROR);

    let page_size = match args.get(4) {
        Some(value) => value.parse::<usize>()
            .with_context(|| format!("Invalid page size '{value}'"))?,
        None => DEFAULT_PAGE_SIZE
    };

    setup_logging(log_level);

    let transactions = load_transactions(transactions_path)?;
    let script = fs::read_to_string(script_path)
        .with_context(|| format!("Unable to read session script [{script_path}]"))?;

    let backend = Arc::new(InMemoryBackend::new(transactions).with_page_size(page_size));
    let source = Arc::new(CachedSource::new(backend.clone())
        .with_cache_capacity(RESPONSE_CACHE_CAPACITY)
        .with_cache_timeout(RESPONSE_CACHE_TTL));
    let overrides = Arc::new(OverrideCache::new());
    let controller = FetchModeController::new(source.clone(), source, backend.clone(), overrides);

    let timer = Instant::now();
    let session = Session::start(controller, backend).await;
    let mut output = BufWriter::new(stdout().lock());

    session.run(&script, &mut output).await?;
    session.finish().await?;

    let duration = timer.elapsed();
    info!("Replayed session in: {duration:?}");

    Ok(())
}

fn parse_log_level(level: &str) -> LevelFilter {
    match level.to_lowercase().as_str() {
        "trace" => LevelFilter::TRACE,
        "debug" => LevelFilter::DEBUG,
        "info" => LevelFilter::INFO,
        "warn" => LevelFilter::WARN,
        "error" => LevelFilter::ERROR,
        _ => {
            eprintln!("Invalid log level '{}', defaulting to 'error'", level);
            LevelFilter::ERROR
        }
    }
}

fn setup_logging(level: LevelFilter) {
    //NOTE: stdout carries the displayed list, logging goes to stderr
    let terminal_log = fmt::layer()
        .with_target(false)
        .with_writer(stderr)
        .with_filter(level);

    tracing_subscriber::registry()
        .with(terminal_log)
        .init();
}
