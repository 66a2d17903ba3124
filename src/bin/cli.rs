use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use playwright_executor::prelude::*;
use playwright_executor::{map_junit_to_execution_result, report, validate};
use tracing_subscriber::EnvFilter;
#[cfg(feature = "otel")]
use tracing_subscriber::layer::SubscriberExt;
#[cfg(feature = "otel")]
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser)]
#[command(name = "playwright-executor")]
#[command(about = "Run Playwright executions and report normalized results", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the runner YAML config file
    #[arg(short, long, global = true, env = "RUNNER_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run an execution described by a JSON file
    Run {
        /// Path to the execution JSON file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Base data directory holding checked-out repositories (overrides config)
        #[arg(long, env = "RUNNER_DATADIR")]
        datadir: Option<PathBuf>,

        /// Scrape artifacts of failed runs (overrides config)
        #[arg(long, env = "RUNNER_SCRAPERENABLED")]
        scraper_enabled: Option<bool>,
    },

    /// Validate an execution file without running it
    Validate {
        /// Path to the execution JSON file
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Map a JUnit report to an execution result
    Report {
        /// Path to the JUnit XML report
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
}

#[cfg(feature = "otel")]
fn init_otel_tracing(verbose: bool) {
    use opentelemetry::trace::TracerProvider as _;
    use opentelemetry_otlp::WithExportConfig;
    use opentelemetry_sdk::runtime::Tokio;
    use opentelemetry_sdk::trace::TracerProvider;

    let filter = if verbose {
        "playwright_executor=debug"
    } else {
        "playwright_executor=info"
    };

    let otlp_endpoint = std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT")
        .unwrap_or_else(|_| "http://localhost:4317".to_string());

    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(&otlp_endpoint)
        .build()
        .expect("Failed to create OTLP exporter");

    let provider = TracerProvider::builder()
        .with_batch_exporter(exporter, Tokio)
        .build();

    let tracer = provider.tracer("playwright-executor");
    let otel_layer = tracing_opentelemetry::layer().with_tracer(tracer);

    tracing_subscriber::registry()
        .with(EnvFilter::new(filter))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(otel_layer)
        .init();

    opentelemetry::global::set_tracer_provider(provider);
}

#[cfg(not(feature = "otel"))]
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        "playwright_executor=debug"
    } else {
        "playwright_executor=info"
    };

    // stdout carries the JSON result
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    #[cfg(feature = "otel")]
    init_otel_tracing(cli.verbose);

    #[cfg(not(feature = "otel"))]
    init_tracing(cli.verbose);

    let result = run(cli).await;

    #[cfg(feature = "otel")]
    opentelemetry::global::shutdown_tracer_provider();

    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            tracing::error!(error = %e, "Execution failed");
            eprintln!("Error: {:#}", e);
            ExitCode::from(2)
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<bool> {
    match cli.command {
        Commands::Run {
            file,
            datadir,
            scraper_enabled,
        } => {
            let mut config = load_config(cli.config.as_deref())?;
            if let Some(datadir) = datadir {
                config.datadir = datadir;
            }
            if let Some(enabled) = scraper_enabled {
                config.scraper_enabled = enabled;
            }
            run_execution(&file, config).await
        }
        Commands::Validate { file } => validate_execution(&file),
        Commands::Report { file } => map_report(&file).await,
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<RunnerConfig> {
    match path {
        Some(path) => RunnerConfig::load(path)
            .with_context(|| format!("loading runner config {}", path.display())),
        None => Ok(RunnerConfig::default()),
    }
}

fn load_execution(path: &Path) -> anyhow::Result<ExecutionRequest> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading execution file {}", path.display()))?;
    let mut execution: ExecutionRequest = serde_json::from_str(&content)
        .with_context(|| format!("parsing execution file {}", path.display()))?;
    if execution.id.is_empty() {
        execution.id = uuid::Uuid::new_v4().to_string();
    }
    Ok(execution)
}

async fn run_execution(file: &Path, config: RunnerConfig) -> anyhow::Result<bool> {
    let execution = load_execution(file)?;
    tracing::info!(execution_id = %execution.id, "Starting execution");

    let runner = PlaywrightRunner::from_config(config).context("creating artifact scraper")?;
    let result = runner.run(&execution).await?;

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(result.is_passed())
}

fn validate_execution(file: &Path) -> anyhow::Result<bool> {
    let execution = load_execution(file)?;
    match validate(&execution) {
        Ok(()) => {
            println!("✓ {} is valid", file.display());
            Ok(true)
        }
        Err(e) => {
            println!("✗ {}: {}", file.display(), e);
            Ok(false)
        }
    }
}

async fn map_report(file: &Path) -> anyhow::Result<bool> {
    let report = report::ingest_file(file).await?;
    let result = map_junit_to_execution_result(b"", &report);
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(result.steps.iter().all(|s| s.status.is_passed()))
}
