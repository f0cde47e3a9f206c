// Copyright 2026 Wallcheb Contributors
// SPDX-License-Identifier: Apache-2.0

//! Wall-Chebyshev projection driver.
//!
//! # Usage
//!
//! ```bash
//! # Run the configured projection sweep
//! wallcheb run
//!
//! # Run with a custom config and order range
//! wallcheb run --config config.yaml --order-min 2 --order-max 6
//!
//! # Shot-sampled instead of exact projection
//! wallcheb run --sampled --shots 50000
//!
//! # Show effective configuration
//! wallcheb config
//! ```

use std::io::Write as _;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use wallcheb::backend::{BackendRegistry, StatevectorBackend};
use wallcheb::config::Config;
use wallcheb::projector::{run_sweep, ProjectionOutcome};
use wallcheb::{Result, VERSION};

/// Wall-Chebyshev ground-state projection
#[derive(Parser)]
#[command(name = "wallcheb")]
#[command(version = VERSION)]
#[command(about = "Ground-state projection via products of shifted block encodings")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "WALLCHEB_LOG_LEVEL")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the projection sweep
    Run {
        /// Smallest filter order
        #[arg(long)]
        order_min: Option<u32>,

        /// Largest filter order
        #[arg(long)]
        order_max: Option<u32>,

        /// Shots per order (sampled runs)
        #[arg(long, env = "WALLCHEB_SHOTS")]
        shots: Option<u32>,

        /// Sample shots through the backend instead of exact projection
        #[arg(long)]
        sampled: bool,

        /// Results output path (.json or .csv)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// List available backends
    Backends,

    /// Show effective configuration
    Config,

    /// Validate configuration file
    Validate,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(level) = &cli.log_level {
        config.logging.level = level.clone();
    }
    init_logging(&config.logging);

    match cli.command {
        Commands::Run {
            order_min,
            order_max,
            shots,
            sampled,
            output,
        } => {
            if let Some(m) = order_min {
                config.run.order_min = m;
            }
            if let Some(m) = order_max {
                config.run.order_max = m;
            }
            if let Some(s) = shots {
                config.run.shots = s;
            }
            if sampled {
                config.run.exact = false;
            }
            if let Some(path) = output {
                config.run.output = path;
            }

            config.validate()?;

            let registry = initialize_backends(&config);
            let backend = registry.get(&config.backend.name)?;

            info!(
                version = VERSION,
                model = ?config.run.model,
                order_min = config.run.order_min,
                order_max = config.run.order_max,
                exact = config.run.exact,
                backend = %backend.name(),
                "Starting projection sweep"
            );

            let records = run_sweep(&config, Some(backend.as_ref()))?;
            write_results(&records, &config.run.output)?;
            info!(output = %config.run.output, orders = records.len(), "Sweep finished");

            for r in &records {
                println!(
                    "m={:<3} energy={:+.10} acceptance={:.6e}",
                    r.order, r.energy, r.acceptance
                );
            }
        }

        Commands::Backends => {
            let registry = initialize_backends(&config);
            println!("Available backends:");
            for (name, backend_type) in registry.list_with_types() {
                let default_marker = if Some(&name) == registry.default_backend_name().as_ref() {
                    " (default)"
                } else {
                    ""
                };
                println!("  {} [{}]{}", name, backend_type, default_marker);
            }
        }

        Commands::Config => {
            println!("{}", serde_yaml::to_string(&config)?);
        }

        Commands::Validate => match config.validate() {
            Ok(()) => {
                println!("Configuration is valid");
            }
            Err(e) => {
                eprintln!("Configuration error: {}", e);
                std::process::exit(1);
            }
        },
    }

    Ok(())
}

/// Initialize logging with tracing.
fn init_logging(logging: &wallcheb::config::LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));

    if logging.format == "json" {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true).json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true))
            .init();
    }
}

/// Initialize backends based on configuration.
fn initialize_backends(config: &Config) -> BackendRegistry {
    let registry = BackendRegistry::with_limits(config.limits.clone());
    registry.register(Arc::new(StatevectorBackend::new(
        config.backend.seed,
        config.limits.clone(),
    )));
    registry
}

/// Write the sweep records as JSON or CSV, by output extension.
fn write_results(records: &[ProjectionOutcome], path: &str) -> Result<()> {
    if path.ends_with(".json") {
        let json = serde_json::to_string_pretty(records)?;
        std::fs::write(path, json)?;
    } else {
        let mut file = std::fs::File::create(path)?;
        writeln!(file, "order,energy,acceptance,accepted_shots,total_shots")?;
        for r in records {
            writeln!(
                file,
                "{},{},{},{},{}",
                r.order,
                r.energy,
                r.acceptance,
                r.accepted_shots.map_or(String::new(), |v| v.to_string()),
                r.total_shots.map_or(String::new(), |v| v.to_string()),
            )?;
        }
    }
    Ok(())
}
