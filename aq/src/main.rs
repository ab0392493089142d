//! aq - asyncqueue command-line demo
//!
//! Runs a simulated workload through the scheduler and prints every queue
//! transition as it happens.

use std::fs;
use std::path::PathBuf;

use clap::{CommandFactory, Parser};
use colored::Colorize;
use eyre::{Context, Result};
use tokio::sync::broadcast;
use tracing::{info, warn};

use asyncqueue::cli::{Cli, Command, OutputFormat, parse_log_level};
use asyncqueue::config::Config;
use asyncqueue::events::{EventBus, QueueEvent, spawn_event_logger};
use asyncqueue::scheduler::{ConcurrencyLimit, Scheduler, SchedulerMetrics};
use asyncqueue::{DemoWorkload, Outcome};

fn setup_logging(level: &str) -> Result<()> {
    // Create log directory
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("asyncqueue")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    // Write to log file, not stdout/stderr
    let level = match parse_log_level(level) {
        Some(level) => level,
        None => {
            eprintln!("Warning: Unknown log-level '{}', defaulting to INFO", level);
            tracing::Level::INFO
        }
    };
    let log_file = fs::File::create(log_dir.join("aq.log")).context("Failed to create log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (level: {})", level);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    let level = cli.log_level.clone().or_else(|| config.log_level.clone());
    setup_logging(level.as_deref().unwrap_or("info")).context("Failed to setup logging")?;

    info!(concurrency = %config.scheduler.concurrency, "aq loaded config");

    match cli.command {
        Some(Command::Run {
            tasks,
            concurrency,
            delay_ms,
            jitter_ms,
            fail_every,
            duplicates,
            event_log,
            format,
        }) => {
            let mut config = config;
            let workload = &mut config.demo;
            workload.tasks = tasks.unwrap_or(workload.tasks);
            workload.delay_ms = delay_ms.unwrap_or(workload.delay_ms);
            workload.jitter_ms = jitter_ms.unwrap_or(workload.jitter_ms);
            workload.fail_every = fail_every.unwrap_or(workload.fail_every);
            workload.duplicates |= duplicates;
            if let Some(concurrency) = concurrency {
                config.scheduler.concurrency = ConcurrencyLimit::from_configured(concurrency);
            }
            cmd_run(&config, event_log, format).await
        }
        Some(Command::Config) => cmd_config(&config),
        None => {
            Cli::command().print_help()?;
            println!();
            Ok(())
        }
    }
}

/// Run the configured workload until the queue drains
async fn cmd_run(config: &Config, event_log: Option<PathBuf>, format: OutputFormat) -> Result<()> {
    let workload: &DemoWorkload = &config.demo;
    if workload.tasks == 0 {
        println!("No tasks to run");
        return Ok(());
    }

    let bus = EventBus::new(config.scheduler.event_capacity);
    let mut rx = bus.subscribe();
    let logger = match &event_log {
        Some(path) => Some(spawn_event_logger(&bus, path).context("Failed to open event log")?),
        None => None,
    };

    let handle = Scheduler::new(config.scheduler.clone())
        .with_observer(bus.clone())
        .spawn();

    if format == OutputFormat::Text {
        println!(
            "Running {} tasks with concurrency {}",
            workload.tasks,
            config.scheduler.concurrency.to_string().cyan()
        );
    }

    for task in workload.tasks() {
        handle.submit(task)?;
    }

    // Every submission has been applied once this returns.
    let accepted = handle.metrics().await?.total_submitted;
    info!(accepted, "All tasks submitted");

    loop {
        match rx.recv().await {
            Ok(event) => {
                print_event(&event, format)?;
                if let QueueEvent::QueueDrained { stats } = &event
                    && stats.num_done as u64 >= accepted
                {
                    break;
                }
            }
            Err(broadcast::error::RecvError::Lagged(n)) => {
                warn!(missed = n, "Event printer lagged behind");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }

    let metrics = handle.metrics().await?;
    handle.shutdown()?;
    drop(bus);
    drop(rx);

    if let Some(logger) = logger {
        logger.await.context("Event logger task failed")?;
        if let Some(path) = &event_log {
            info!(?path, "Event log written");
        }
    }

    print_metrics(&metrics, format)
}

fn print_event(event: &QueueEvent, format: OutputFormat) -> Result<()> {
    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string(event)?);
        return Ok(());
    }

    let stats = event.stats();
    let counts = format!(
        "pending={} in-flight={} done={}",
        stats.num_pending, stats.num_in_flight, stats.num_done
    )
    .dimmed();

    match event {
        QueueEvent::TaskStarted { task_id, .. } => {
            println!("{} {} {}", "▶".cyan(), task_id, counts);
        }
        QueueEvent::TaskCompleted {
            task_id,
            outcome,
            elapsed_ms,
            ..
        } => match outcome {
            Outcome::Success(value) => {
                println!("{} {} ({}ms) {} {}", "✓".green(), task_id, elapsed_ms, value, counts);
            }
            Outcome::Failure(reason) => {
                println!("{} {} ({}ms) {} {}", "✗".red(), task_id, elapsed_ms, reason.red(), counts);
            }
        },
        QueueEvent::QueueDrained { .. } => {
            println!("{} {}", "Queue drained".bold(), counts);
        }
    }
    Ok(())
}

fn print_metrics(metrics: &SchedulerMetrics, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(metrics)?);
        }
        OutputFormat::Text => {
            println!();
            println!("Scheduler Metrics");
            println!("-----------------");
            println!("Submitted:      {}", metrics.total_submitted);
            println!("Duplicates:     {}", metrics.total_duplicates);
            println!("Succeeded:      {}", metrics.total_succeeded.to_string().green());
            println!("Failed:         {}", metrics.total_failed.to_string().red());
            println!("Drains:         {}", metrics.total_drains);
            println!("Peak in-flight: {}", metrics.peak_in_flight);
            println!("Peak pending:   {}", metrics.peak_pending);
        }
    }
    Ok(())
}

/// Print the effective configuration
fn cmd_config(config: &Config) -> Result<()> {
    print!("{}", config.to_yaml()?);
    Ok(())
}
