//! Vigil CLI - Wait for a condition to hold
//! Coerces command-line parameters into a wait document, runs one
//! convergence pass and reports the outcome.

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use vigil_core::application::{validate, ConvergenceEngine};
use vigil_core::domain::wait_spec::{DEFAULT_MAX_RETRIES, DEFAULT_POLLING_FREQUENCY};
use vigil_core::domain::{Outcome, WaitParams};
use vigil_core::port::SystemClock;
use vigil_infra_system::{ShellRunner, SystemPathProbe};

#[derive(Parser)]
#[command(name = "vigil")]
#[command(about = "Waits for something to happen", long_about = None)]
#[command(version)]
struct Cli {
    /// Shell command whose output and exit status are observed
    #[arg(long)]
    query: Option<String>,

    /// Acceptable exit status; repeat the flag for a set
    #[arg(long = "exit-code")]
    exit_code: Vec<i32>,

    /// Pattern the query's combined output must contain
    #[arg(long)]
    regex: Option<String>,

    /// How long to just wait, in seconds
    #[arg(long)]
    seconds: Option<f64>,

    /// Filesystem entry to observe (together with --want)
    #[arg(long)]
    path: Option<String>,

    /// Wanted state of --path: absent, present, file or directory
    #[arg(long)]
    want: Option<String>,

    /// Environment overlay entry KEY=VALUE; repeatable
    #[arg(long = "env")]
    environment: Vec<String>,

    /// Per-execution timeout in seconds; 0 disables enforcement
    #[arg(long, default_value_t = 0.0)]
    timeout: f64,

    /// How often to retry the query before giving up
    #[arg(long, default_value_t = DEFAULT_MAX_RETRIES)]
    max_retries: u32,

    /// How long to sleep between retries, in seconds
    #[arg(long, default_value_t = DEFAULT_POLLING_FREQUENCY)]
    polling_frequency: f64,

    /// Only wait when this run is marked as a triggered refresh
    #[arg(long)]
    refresh_only: bool,

    /// Mark this run as a dependency-triggered refresh pass
    #[arg(long)]
    refreshed: bool,

    /// Legacy accounting: the budget counts retries after the first attempt
    #[arg(long)]
    retries_exclude_first: bool,

    /// Legacy pacing: sleep once more after the final failing attempt
    #[arg(long)]
    sleep_after_last: bool,
}

impl Cli {
    fn into_params(self) -> WaitParams {
        WaitParams {
            query: self.query,
            exit_code: (!self.exit_code.is_empty()).then_some(self.exit_code),
            regex: self.regex,
            seconds: self.seconds,
            path: self.path,
            want: self.want,
            environment: self.environment,
            timeout: self.timeout,
            max_retries: self.max_retries,
            polling_frequency: self.polling_frequency,
            refresh_only: self.refresh_only,
            retries_exclude_first: self.retries_exclude_first,
            sleep_after_last: self.sleep_after_last,
        }
    }
}

fn init_logging() {
    let log_format = std::env::var("VIGIL_LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string());

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("vigil=info"))
        .expect("Failed to create env filter");

    match log_format.as_str() {
        "json" => {
            // Automation: JSON structured logging
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json())
                .init();
        }
        _ => {
            // Interactive: pretty formatting with colors
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().pretty())
                .init();
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let refreshed = cli.refreshed;
    let spec = validate(cli.into_params())?;

    // DI wiring
    let clock = Arc::new(SystemClock);
    let engine = ConvergenceEngine::new(
        Arc::new(ShellRunner::new(clock.clone())),
        Arc::new(SystemPathProbe),
        clock,
    );

    info!(version = vigil_core::VERSION, "Starting convergence pass");

    let outcome = engine.converge(&spec, refreshed).await?;

    Ok(match outcome {
        Outcome::Satisfied(value) => {
            println!("{} {value}", "satisfied:".green().bold());
            ExitCode::SUCCESS
        }
        Outcome::AlreadySatisfied => {
            println!(
                "{}",
                "nothing to do: wait is refresh-only and this is not a refresh pass".dimmed()
            );
            ExitCode::SUCCESS
        }
        Outcome::Exhausted(report) => {
            eprintln!("{} {report}", "exhausted:".red().bold());
            ExitCode::from(1)
        }
    })
}

#[tokio::main]
async fn main() -> ExitCode {
    init_logging();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {e:#}", "error:".red().bold());
            ExitCode::from(2)
        }
    }
}
