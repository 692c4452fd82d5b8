use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::fmt::writer::MakeWriterExt;

use monasca_reconcile::module::{self, ApplyFile, ModuleResult};
use monasca_reconcile::params::{AlarmSpec, Connection, NotificationSpec};

/// Idempotent reconciliation of Monasca alarm definitions and notification methods
#[derive(Parser, Debug)]
#[command(name = "monasca-reconcile", version = monasca_reconcile::VERSION, about, long_about = None)]
struct Args {
    /// Report what would change without issuing any mutating call
    #[arg(long, global = true)]
    check: bool,

    /// Log level for debugging
    #[arg(long, global = true, value_enum, default_value = "off")]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Reconcile one alarm definition
    AlarmDefinition {
        #[command(flatten)]
        conn: Connection,
        #[command(flatten)]
        spec: AlarmSpec,
    },
    /// Reconcile one notification method
    NotificationMethod {
        #[command(flatten)]
        conn: Connection,
        #[command(flatten)]
        spec: NotificationSpec,
    },
    /// Apply a YAML file of notification methods and alarm definitions
    Apply {
        #[command(flatten)]
        conn: Connection,
        /// Path to the YAML apply file
        #[arg(long)]
        file: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_tracing_level(self) -> Option<Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(Level::ERROR),
            LogLevel::Warn => Some(Level::WARN),
            LogLevel::Info => Some(Level::INFO),
            LogLevel::Debug => Some(Level::DEBUG),
            LogLevel::Trace => Some(Level::TRACE),
        }
    }
}

fn setup_logging(level: LogLevel) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let tracing_level = level.to_tracing_level()?;

    let log_path = get_log_path();

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .ok()?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    tracing_subscriber::fmt()
        .with_max_level(tracing_level)
        .with_writer(non_blocking.with_max_level(tracing_level))
        .with_ansi(false)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("monasca-reconcile started with log level: {:?}", level);

    Some(guard)
}

fn get_log_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        return config_dir
            .join("monasca-reconcile")
            .join("monasca-reconcile.log");
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".monasca-reconcile").join("monasca-reconcile.log");
    }
    PathBuf::from("monasca-reconcile.log")
}

fn print_result(result: &ModuleResult) {
    println!("{}", result.to_json());
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let _log_guard = setup_logging(args.log_level);

    let failed = match args.command {
        Command::AlarmDefinition { conn, spec } => {
            let result = module::run_alarm_definition(&conn, &spec, args.check).await;
            print_result(&result);
            result.failed()
        }
        Command::NotificationMethod { conn, spec } => {
            let result = module::run_notification_method(&conn, &spec, args.check).await;
            print_result(&result);
            result.failed()
        }
        Command::Apply { conn, file } => {
            let content = std::fs::read_to_string(&file)?;
            let apply: ApplyFile = serde_yaml::from_str(&content)?;
            let results = module::run_apply(&conn, &apply, args.check).await;
            for result in &results {
                print_result(result);
            }
            results.iter().any(ModuleResult::failed)
        }
    };

    if failed {
        std::process::exit(1);
    }

    Ok(())
}
