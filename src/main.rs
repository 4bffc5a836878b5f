//! Monte Carlo CLI
//!
//! Command-line interface for running simulations and inspecting distributions

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use monte_carlo_core::loader::{load_points, load_request};
use monte_carlo_core::simulation::{EngineOptions, MonteCarloEngine};
use monte_carlo_core::DistributionKind;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::time::Instant;

/// Seeded Monte Carlo simulation of yearly value distributions.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a simulation request (JSON) and write the response (JSON).
    Run {
        /// Path to the request file.
        request: PathBuf,

        /// Write the response here instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Run distributions one after another instead of in parallel.
        #[arg(long)]
        sequential: bool,

        /// Pretty-print the JSON response.
        #[arg(long)]
        pretty: bool,
    },
    /// Fit a distribution's parameters to a CSV file with `year,value` columns.
    Fit {
        /// Distribution type (e.g., "gamma", "gbm").
        distribution: String,

        /// Path to the CSV data.
        data: PathBuf,
    },
    /// Show parameter documentation and examples.
    Metadata {
        /// Distribution type; all types when omitted.
        distribution: Option<String>,
    },
    /// List the registered distribution types.
    List,
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Run { request, output, sequential, pretty } => run(request, output, sequential, pretty),
        Commands::Fit { distribution, data } => fit(&distribution, data),
        Commands::Metadata { distribution } => metadata(distribution.as_deref()),
        Commands::List => {
            for name in DistributionKind::list() {
                println!("{}", name);
            }
            Ok(())
        }
    }
}

fn kind(name: &str) -> Result<DistributionKind> {
    DistributionKind::from_name(name).ok_or_else(|| {
        anyhow!(
            "unknown distribution type '{}' (known: {})",
            name,
            DistributionKind::list().join(", ")
        )
    })
}

fn run(request: PathBuf, output: Option<PathBuf>, sequential: bool, pretty: bool) -> Result<()> {
    let start = Instant::now();
    let request = load_request(&request)
        .map_err(|e| anyhow!(e))
        .with_context(|| format!("failed to load request {}", request.display()))?;

    let engine = MonteCarloEngine::new(EngineOptions {
        parallel: !sequential,
        ..Default::default()
    });
    let response = engine.run(&request);

    let writer: Box<dyn Write> = match &output {
        Some(path) => Box::new(
            File::create(path).with_context(|| format!("unable to create {}", path.display()))?,
        ),
        None => Box::new(io::stdout().lock()),
    };
    let mut writer = BufWriter::new(writer);
    if pretty {
        serde_json::to_writer_pretty(&mut writer, &response)?;
    } else {
        serde_json::to_writer(&mut writer, &response)?;
    }
    writeln!(writer)?;
    writer.flush()?;

    for info in &response.simulation_info {
        for error in &info.errors {
            eprintln!("{}: {}", info.id(), error);
        }
    }
    eprintln!(
        "{} distributions simulated in {:?}",
        response.simulation_info.len(),
        start.elapsed()
    );

    if !response.success {
        bail!("one or more distributions failed");
    }
    Ok(())
}

fn fit(distribution: &str, data: PathBuf) -> Result<()> {
    let kind = kind(distribution)?;
    let points = load_points(&data).with_context(|| format!("failed to read {}", data.display()))?;

    let parameters = kind.fit_curve(&points)?;
    let validation = kind.validate(&parameters);

    println!("{}", serde_json::to_string_pretty(&parameters)?);
    if !validation.is_valid {
        bail!("fitted parameters are invalid: {}", validation.errors.join("; "));
    }
    Ok(())
}

fn metadata(distribution: Option<&str>) -> Result<()> {
    let json = match distribution {
        Some(name) => serde_json::to_string_pretty(&kind(name)?.metadata())?,
        None => {
            let all: Vec<_> = DistributionKind::ALL.iter().map(|k| k.metadata()).collect();
            serde_json::to_string_pretty(&all)?
        }
    };
    println!("{}", json);
    Ok(())
}
