// Copyright (c) 2026 Greenlight Contributors
// SPDX-License-Identifier: AGPL-3.0

//! # greenlight CLI
//!
//! Runs the release-approval pipeline against a named demo scenario or
//! serves the demo API.
//!
//! ## Commands
//!
//! - `greenlight run --scenario <id>` — run one pipeline pass
//! - `greenlight scenarios` — list the built-in fixtures
//! - `greenlight serve` — start the demo API server

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;

use greenlight_core::application::{Orchestrator, RunReport};
use greenlight_core::domain::release::ReleaseRequest;
use greenlight_core::infrastructure::{GeminiClient, JsonFileMemoryStore};

mod scenarios;
mod server;

use scenarios::{builtin_scenarios, resolve_scenario};

/// greenlight - staged release-approval pipeline
#[derive(Parser)]
#[command(name = "greenlight")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Gemini API key used by the decision oracles
    #[arg(long, global = true, env = "GEMINI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Oracle model name
    #[arg(long, global = true, env = "GREENLIGHT_MODEL")]
    model: Option<String>,

    /// Path to the episodic memory document
    #[arg(
        long,
        global = true,
        env = "GREENLIGHT_MEMORY_PATH",
        default_value = "memory.json"
    )]
    memory: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "GREENLIGHT_LOG_LEVEL", default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the pipeline against a demo scenario
    Run {
        /// Scenario id (see `greenlight scenarios`)
        #[arg(long)]
        scenario: Option<String>,

        /// Suppress the step-by-step report
        #[arg(long)]
        quiet: bool,
    },

    /// List the built-in demo scenarios
    Scenarios,

    /// Serve the demo API
    Serve {
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        #[arg(long, default_value = "8000")]
        port: u16,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env before clap reads env-backed arguments
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    init_logging(&cli.log_level)?;

    match &cli.command {
        Commands::Run { scenario, quiet } => {
            let orchestrator = build_orchestrator(&cli)?;
            let scenario = resolve_scenario(scenario.as_deref());
            let report = orchestrator
                .run(default_release(), &scenario.data)
                .await
                .with_context(|| format!("pipeline run failed for scenario {}", scenario.id))?;
            if !*quiet {
                print_report(&report);
            }
            Ok(())
        }
        Commands::Scenarios => {
            for scenario in builtin_scenarios() {
                println!("{:<20} {}", scenario.id.bold(), scenario.label);
            }
            Ok(())
        }
        Commands::Serve { host, port } => {
            let orchestrator = build_orchestrator(&cli)?;
            let state = Arc::new(server::AppState {
                orchestrator,
                release: default_release(),
            });
            server::serve(host, *port, state).await
        }
    }
}

/// The demo evaluates one fixed production release, like the original demo.
fn default_release() -> ReleaseRequest {
    ReleaseRequest {
        release_id: "ACCOUNT-OPENING-SERVICE-1.0.0".to_string(),
        application: "ACCOUNT-OPENING-SERVICE".to_string(),
        env: "prod".to_string(),
    }
}

fn build_orchestrator(cli: &Cli) -> Result<Orchestrator> {
    let api_key = cli
        .api_key
        .clone()
        .context("GEMINI_API_KEY is not set")?;
    let client = Arc::new(match &cli.model {
        Some(model) => GeminiClient::with_model(api_key, model.clone()),
        None => GeminiClient::new(api_key),
    });

    let memory = Arc::new(
        JsonFileMemoryStore::open(&cli.memory)
            .with_context(|| format!("failed to open memory document {}", cli.memory))?,
    );

    Ok(Orchestrator::new(
        memory,
        client.clone(),
        client.clone(),
        Some(client.clone()),
        client,
    ))
}

fn print_report(report: &RunReport) {
    for step in &report.steps {
        match &step.verdict {
            Some(verdict) => {
                println!(
                    "{} stage={} decision={} reason={}",
                    "DECIDE:".cyan().bold(),
                    step.stage,
                    verdict.decision,
                    verdict.reason
                );
                if !step.heuristics.is_empty() {
                    println!("  heuristics applied: {}", step.heuristics.len());
                }
                if let Some(critique) = &step.critique {
                    println!(
                        "  {} risk={:?} suggested={:?}",
                        "RED TEAM (advisory):".yellow(),
                        critique.risk_level,
                        critique.suggested_action
                    );
                    for concern in &critique.concerns {
                        println!("   - {}", concern);
                    }
                }
            }
            None => println!("{} stage={} action={}", "OBSERVE:".green(), step.stage, step.action),
        }
    }

    println!(
        "\n{} {}",
        "FINAL DECISION:".bold(),
        report.decision.to_string().bold()
    );
    println!("TRACE:");
    for entry in &report.history {
        println!("  {}", entry);
    }
    if report.reflection.ran {
        println!(
            "\nreflection admitted {} heuristic(s)",
            report.reflection.added
        );
    }
}

/// Initialize tracing subscriber for logging
fn init_logging(level: &str) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(level))
        .context("Failed to create log filter")?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();

    Ok(())
}
