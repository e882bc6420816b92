// In app/src/main.rs

use anyhow::Result;
use app_config::{ExecutorKind, Settings};
use clap::{Parser, Subcommand, ValueEnum};
use core_types::TradeSample;
use events::{RunStatus, TrainingEvent};
use risk::RiskModelEngine;
use std::io::Write;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tracing_subscriber::filter::{LevelFilter, Targets};
use tracing_subscriber::prelude::*;
use training::estimate::{estimate_duration, format_duration};
use training::{
    request_abort, AbortReport, BroadcastSink, CancellationToken, TrainingOutcome, TrainingPipeline,
    TrainingReport,
};

mod tracing_layer;
use self::tracing_layer::EventBroadcastLayer;

// --- Command-Line Interface Definition ---

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = "Trade risk scoring and threshold calibration.")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generates a fresh training dataset and recalibrates the risk thresholds.
    Train {
        /// Total number of simulated trades. Overrides the config.
        #[arg(short, long)]
        iterations: Option<u64>,

        /// Number of parallel workers. Overrides the config.
        #[arg(short, long)]
        workers: Option<usize>,

        /// Where the batches run. Overrides the config.
        #[arg(short, long, value_enum)]
        executor: Option<ExecutorArg>,
    },

    /// Scores a single trade and labels it with the current thresholds.
    Assess {
        /// Trade size in units.
        #[arg(long)]
        size: i64,

        /// Trade value.
        #[arg(long)]
        value: f64,
    },

    /// Asks a running training job to stop.
    Abort,

    /// Estimates how long a training run would take.
    Estimate {
        #[arg(short, long)]
        iterations: Option<u64>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ExecutorArg {
    Local,
    Cluster,
}

impl From<ExecutorArg> for ExecutorKind {
    fn from(arg: ExecutorArg) -> Self {
        match arg {
            ExecutorArg::Local => ExecutorKind::Local,
            ExecutorArg::Cluster => ExecutorKind::Cluster,
        }
    }
}

// --- Main Application Entry Point ---

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from a .env file, if it exists.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let settings = app_config::load_settings()?;

    // --- Event Channel and Tracing Setup ---
    let (events_tx, _) = broadcast::channel::<TrainingEvent>(1024);
    let level = settings.app.log_level.parse().unwrap_or(tracing::Level::INFO);
    let fmt_layer = tracing_subscriber::fmt::layer().with_filter(Targets::new().with_default(level));
    let events_layer = EventBroadcastLayer::new(events_tx.clone()).with_filter(LevelFilter::WARN);
    tracing_subscriber::registry().with(fmt_layer).with(events_layer).init();

    tracing::info!(environment = %settings.app.environment, "Application settings loaded successfully.");

    match cli.command {
        Commands::Train { iterations, workers, executor } => {
            handle_train(settings, iterations, workers, executor, events_tx).await?;
        }
        Commands::Assess { size, value } => {
            handle_assess(&settings, size, value)?;
        }
        Commands::Abort => {
            request_abort(&settings.storage.abort_marker_file)?;
            println!("Abort requested. A running training job will stop at its next checkpoint.");
        }
        Commands::Estimate { iterations } => {
            let iterations = iterations.unwrap_or(settings.training.total_iterations);
            let estimate = estimate_duration(iterations, &settings.training.benchmark);
            println!("Estimated time for {} iterations: {}", iterations, format_duration(estimate));
        }
    }

    Ok(())
}

// --- "Train" Subcommand Logic ---

async fn handle_train(
    mut settings: Settings,
    iterations: Option<u64>,
    workers: Option<usize>,
    executor: Option<ExecutorArg>,
    events_tx: broadcast::Sender<TrainingEvent>,
) -> Result<()> {
    if let Some(iterations) = iterations {
        settings.training.total_iterations = iterations;
    }
    if let Some(workers) = workers {
        settings.training.worker_count = Some(workers);
    }
    if let Some(executor) = executor {
        settings.executor.kind = executor.into();
    }
    settings.validate()?;

    let token = CancellationToken::with_marker(&settings.storage.abort_marker_file);

    let ctrl_c_token = token.clone();
    let ctrl_c = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received. Stopping workers...");
            ctrl_c_token.cancel();
        }
    });

    let printer = tokio::spawn(print_events(events_tx.subscribe()));

    let pipeline = TrainingPipeline::from_settings(&settings, Some(Handle::current()))?
        .with_sink(Arc::new(BroadcastSink::new(events_tx.clone())));
    let run_token = token.clone();
    let outcome = tokio::task::spawn_blocking(move || pipeline.run(&run_token)).await?;

    ctrl_c.abort();
    // A run that fails before calibration never publishes `Finished`.
    if outcome.is_ok() {
        let _ = printer.await;
    } else {
        printer.abort();
    }

    match outcome? {
        TrainingOutcome::Completed(report) => print_training_report(&report),
        TrainingOutcome::Aborted(report) => print_abort_report(&report),
    }
    Ok(())
}

async fn print_events(mut rx: broadcast::Receiver<TrainingEvent>) {
    loop {
        match rx.recv().await {
            Ok(TrainingEvent::Progress(update)) => {
                print!("\rProgress: {:.0}%", update.percentage());
                let _ = std::io::stdout().flush();
            }
            Ok(TrainingEvent::Log(log)) => {
                println!("\n[{}] {}", log.level, log.message);
            }
            Ok(TrainingEvent::Finished(_)) => {
                println!();
                break;
            }
            Err(RecvError::Lagged(_)) => continue,
            Err(RecvError::Closed) => break,
        }
    }
}

fn print_training_report(report: &TrainingReport) {
    println!("\n--- Training Complete ---");
    println!("-------------------------");
    println!("Samples: {} | Elapsed: {}", report.dataset.len(), format_duration(report.elapsed));
    println!(
        "Thresholds: Low {:.6} | Medium {:.6} | High {:.6}",
        report.thresholds.low, report.thresholds.medium, report.thresholds.high
    );
    if report.failed_batches > 0 {
        println!("Warning: {} batch(es) failed and were left out of the dataset.", report.failed_batches);
    }
    if !report.persisted.dataset_written {
        println!("Warning: the training data could not be saved.");
    }
    if !report.persisted.thresholds_written {
        println!("Warning: the thresholds could not be saved. Assessments keep using the previous ones.");
    }
    let status = if report.failed_batches > 0 { RunStatus::CompletedWithFailures } else { RunStatus::Completed };
    println!("Status: {:?}", status);
}

fn print_abort_report(report: &AbortReport) {
    println!("\n--- Training Aborted ---");
    println!("------------------------");
    println!(
        "Samples kept: {} | Failed batches: {} | Elapsed: {}",
        report.dataset.len(),
        report.failed_batches,
        format_duration(report.elapsed)
    );
    println!("Thresholds were not recalculated.");
}

// --- "Assess" Subcommand Logic ---

fn handle_assess(settings: &Settings, size: i64, value: f64) -> Result<()> {
    let engine = RiskModelEngine::new(&settings.risk_model)?;
    let thresholds = app_config::load_thresholds(&settings.storage.thresholds_file);

    let sample = TradeSample::new(size, value);
    let scores = engine.assess_now(&sample);
    let level = thresholds.classify(scores.final_risk);

    println!("Monte Carlo: {:.6}", scores.monte_carlo);
    println!("VaR:         {:.6}", scores.var);
    println!("CVaR:        {:.6}", scores.cvar);
    println!("Risk Parity: {:.6}", scores.risk_parity);
    println!("Final Risk:  {:.6} ({})", scores.final_risk, level);
    Ok(())
}
