//! CLI entry point for baking courier aggregates.
//!
//! Reads a ping table from a file or URL and writes either the per-courier
//! distance table or the per-region activity table.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{Datelike, Utc};
use clap::{Args, Parser, Subcommand};
use courier_routes::aggregate::{AggregateOptions, aggregate_with};
use courier_routes::ingest::{IngestOptions, load_pings};
use courier_routes::output::{save_aggregates, save_region_metrics};
use courier_routes::ping::Ping;
use courier_routes::region_metrics::{DEFAULT_OVERLOAD_HOURS, region_delivery_hours, region_metrics};
use courier_routes::source::{FileSource, HttpSource, HttpSourceConfig};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "courier-routes")]
#[command(about = "Bake courier delivery pings into daily distance tables", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct BakeArgs {
    /// Path or http(s) URL of the ping table
    #[arg(short, long, value_name = "FILE_OR_URL")]
    input: String,

    /// CSV file to write (replaced if it exists)
    #[arg(short, long)]
    output: PathBuf,

    /// Calendar year to densify over [default: current year]
    #[arg(short, long)]
    year: Option<i32>,

    /// HTTP timeout in seconds
    #[arg(long, default_value_t = 30)]
    timeout_secs: u64,
}

#[derive(Subcommand)]
enum Commands {
    /// Per-courier, per-day driven and optimized distances
    BakeDistances {
        #[command(flatten)]
        args: BakeArgs,

        /// Process couriers on the calling thread only
        #[arg(long, default_value_t = false)]
        sequential: bool,
    },
    /// Per-region, per-day sets of active couriers
    BakeRegions {
        #[command(flatten)]
        args: BakeArgs,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::BakeDistances { args, sequential } => {
            let year = args.year.unwrap_or_else(|| Utc::now().year());
            let pings = load(&args, year)?;
            let options = AggregateOptions {
                calendar_year: year,
                parallel: !sequential,
            };
            let rows = aggregate_with(&pings, &options).context("aggregation aborted")?;
            save_aggregates(&args.output, &rows)
                .with_context(|| format!("writing {}", args.output.display()))?;
        }
        Commands::BakeRegions { args } => {
            let year = args.year.unwrap_or_else(|| Utc::now().year());
            let pings = load(&args, year)?;
            let rows = region_metrics(&pings, year).context("region aggregation aborted")?;
            save_region_metrics(&args.output, &rows)
                .with_context(|| format!("writing {}", args.output.display()))?;

            for region in region_delivery_hours(&pings) {
                if region.is_overloaded(DEFAULT_OVERLOAD_HOURS) {
                    warn!(
                        region_id = region.region_id,
                        mean_hours = region.mean_hours,
                        deliveries = region.deliveries,
                        "Overloaded region"
                    );
                }
            }
        }
    }

    info!("Done");
    Ok(())
}

fn load(args: &BakeArgs, year: i32) -> Result<Vec<Ping>> {
    let options = IngestOptions { calendar_year: year };
    let pings = if args.input.starts_with("http://") || args.input.starts_with("https://") {
        let source = HttpSource::new(HttpSourceConfig {
            url: args.input.clone(),
            timeout_secs: args.timeout_secs,
        })?;
        load_pings(&source, &options)
    } else {
        load_pings(&FileSource::new(&args.input), &options)
    };
    pings.with_context(|| format!("loading pings from {}", args.input))
}
