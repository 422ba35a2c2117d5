//! Synthtraffic CLI
//!
//! Hosts the simulated endpoint service and drives synthetic traffic against it.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use synthtraffic::config::{DEFAULT_PORT, TargetConfig};
use synthtraffic::orchestrator::{RunSummary, TrafficOrchestrator};
use synthtraffic::plans::PLANS;
use synthtraffic::service::{ServiceState, start_service};

/// Synthtraffic - predictable traffic for monitoring pipelines
#[derive(Debug, Parser)]
#[command(name = "synthtraffic")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs (and plan listings) as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Host the simulated service and run the traffic campaign against it
    Serve {
        /// Port to listen on and to call back into
        #[arg(short, long, default_value_t = DEFAULT_PORT)]
        port: u16,

        /// Only host the service, without generating traffic
        #[arg(long)]
        no_traffic: bool,
    },

    /// Run the traffic campaign against an already running service
    Traffic {
        /// Port the service listens on
        #[arg(short, long, default_value_t = DEFAULT_PORT)]
        port: u16,
    },

    /// List the planned campaigns
    Plans,
}

fn setup_logging(verbose: bool, json: bool) {
    let env_filter = if verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    if json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose, cli.json);

    match cli.command {
        Commands::Serve { port, no_traffic } => serve(port, !no_traffic).await,
        Commands::Traffic { port } => traffic(port).await,
        Commands::Plans => list_plans(cli.json),
    }
}

/// Host the service, optionally probing it from the same process
async fn serve(port: u16, with_traffic: bool) -> Result<()> {
    let shutdown = CancellationToken::new();
    cancel_on_interrupt(shutdown.clone());

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    let server = tokio::spawn(start_service(
        listener,
        ServiceState::new(),
        shutdown.clone(),
    ));

    if with_traffic {
        let orchestrator = build_orchestrator(port)?.with_cancellation(shutdown.child_token());
        tokio::spawn(async move {
            let summary = orchestrator.run().await;
            log_summary(&summary);
        });
    } else {
        tracing::info!("Traffic generation disabled");
    }

    server
        .await
        .context("Service task panicked")?
        .context("Service failed")?;

    Ok(())
}

/// Probe a service hosted elsewhere, then exit
async fn traffic(port: u16) -> Result<()> {
    let shutdown = CancellationToken::new();
    cancel_on_interrupt(shutdown.clone());

    let orchestrator = build_orchestrator(port)?.with_cancellation(shutdown);
    let summary = orchestrator.run().await;
    log_summary(&summary);

    // A timed out run is still a clean exit
    Ok(())
}

fn build_orchestrator(port: u16) -> Result<TrafficOrchestrator> {
    let target = TargetConfig::from_env(port).context("Failed to resolve traffic target")?;
    TrafficOrchestrator::for_target(target).context("Failed to create probe client")
}

fn cancel_on_interrupt(token: CancellationToken) {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::info!("Interrupt received, shutting down");
                token.cancel();
            }
            Err(e) => tracing::warn!(error = %e, "Failed to listen for interrupt"),
        }
    });
}

fn log_summary(summary: &RunSummary) {
    for report in &summary.reports {
        tracing::info!(
            endpoint = %report.endpoint,
            attempted = report.attempted,
            succeeded = report.succeeded,
            error_responses = report.error_responses,
            transport_errors = report.transport_errors,
            cancelled = report.cancelled,
            "Worker summary"
        );
    }

    if summary.completed() {
        tracing::info!(
            elapsed_secs = summary.elapsed.as_secs(),
            "Traffic run completed"
        );
    } else {
        tracing::warn!(
            state = %summary.state,
            finished = summary.reports.len(),
            elapsed_secs = summary.elapsed.as_secs(),
            "Traffic run did not complete"
        );
    }
}

/// List the planned campaigns
fn list_plans(json: bool) -> Result<()> {
    if json {
        let plans: Vec<_> = PLANS.values().collect();
        let output = serde_json::to_string_pretty(&plans).context("Failed to serialize plans")?;
        println!("{output}");
        return Ok(());
    }

    println!("Planned campaigns:");
    println!();

    for (name, plan) in PLANS.iter() {
        println!(
            "  {name:14} {:18} {:>3} calls, {:?} apart",
            plan.endpoint().path(),
            plan.iterations(),
            plan.inter_call_delay()
        );
    }

    Ok(())
}
