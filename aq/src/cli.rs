//! CLI command definitions

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Default log file location shown in help
pub fn get_log_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("asyncqueue")
        .join("logs")
        .join("aq.log")
}

/// Parse a log level name, case-insensitively; `None` if unknown
pub fn parse_log_level(level: &str) -> Option<tracing::Level> {
    match level.trim().to_uppercase().as_str() {
        "TRACE" => Some(tracing::Level::TRACE),
        "DEBUG" => Some(tracing::Level::DEBUG),
        "INFO" => Some(tracing::Level::INFO),
        "WARN" | "WARNING" => Some(tracing::Level::WARN),
        "ERROR" => Some(tracing::Level::ERROR),
        _ => None,
    }
}

/// asyncqueue - bounded-concurrency task queue
#[derive(Parser)]
#[command(
    name = "aq",
    about = "Run async tasks through a bounded-concurrency queue",
    version,
    after_help = "Logs are written to: ~/.local/share/asyncqueue/logs/aq.log"
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Log level override (trace, debug, info, warn, error)
    #[arg(short, long, global = true)]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// CLI subcommands
#[derive(Subcommand)]
pub enum Command {
    /// Run a simulated workload and print queue events
    Run {
        /// Number of tasks to submit
        #[arg(short, long)]
        tasks: Option<usize>,

        /// Max concurrent tasks (0 or negative = unbounded)
        #[arg(short = 'n', long, allow_negative_numbers = true)]
        concurrency: Option<i64>,

        /// Base run time of each task in milliseconds
        #[arg(short, long)]
        delay_ms: Option<u64>,

        /// Random extra run time in milliseconds
        #[arg(short, long)]
        jitter_ms: Option<u64>,

        /// Make every n-th task fail
        #[arg(long)]
        fail_every: Option<usize>,

        /// Submit every task twice
        #[arg(long)]
        duplicates: bool,

        /// Append events as JSON lines to this file
        #[arg(short, long)]
        event_log: Option<PathBuf>,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Print the effective configuration
    Config,
}

/// Output format for the run command
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "plain" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(format!("Unknown format: {}. Use: text or json", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Json => write!(f, "json"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_no_command() {
        let cli = Cli::parse_from(["aq"]);
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_cli_parse_run_defaults() {
        let cli = Cli::parse_from(["aq", "run"]);
        if let Some(Command::Run {
            tasks,
            concurrency,
            duplicates,
            format,
            ..
        }) = cli.command
        {
            assert!(tasks.is_none());
            assert!(concurrency.is_none());
            assert!(!duplicates);
            assert_eq!(format, OutputFormat::Text);
        } else {
            panic!("Expected Run command");
        }
    }

    #[test]
    fn test_cli_parse_run_negative_concurrency() {
        let cli = Cli::parse_from(["aq", "run", "-n", "-1", "--tasks", "3", "--fail-every", "2"]);
        if let Some(Command::Run {
            tasks,
            concurrency,
            fail_every,
            ..
        }) = cli.command
        {
            assert_eq!(tasks, Some(3));
            assert_eq!(concurrency, Some(-1));
            assert_eq!(fail_every, Some(2));
        } else {
            panic!("Expected Run command");
        }
    }

    #[test]
    fn test_cli_parse_config() {
        let cli = Cli::parse_from(["aq", "config"]);
        assert!(matches!(cli.command, Some(Command::Config)));
    }

    #[test]
    fn test_output_format_from_str() {
        assert!(matches!("text".parse::<OutputFormat>(), Ok(OutputFormat::Text)));
        assert!(matches!("JSON".parse::<OutputFormat>(), Ok(OutputFormat::Json)));
        assert!("table".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_cli_with_config_and_log_level() {
        let cli = Cli::parse_from(["aq", "-c", "/path/to/config.yml", "--log-level", "debug", "config"]);
        assert_eq!(cli.config, Some(PathBuf::from("/path/to/config.yml")));
        assert_eq!(cli.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn test_parse_log_level() {
        assert_eq!(parse_log_level("debug"), Some(tracing::Level::DEBUG));
        assert_eq!(parse_log_level("Warning"), Some(tracing::Level::WARN));
        assert_eq!(parse_log_level(" ERROR "), Some(tracing::Level::ERROR));
        assert_eq!(parse_log_level("loud"), None);
    }

    #[test]
    fn test_log_path() {
        assert!(get_log_path().ends_with("asyncqueue/logs/aq.log"));
    }
}
