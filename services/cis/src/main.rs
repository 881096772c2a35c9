//! CIS command line tool.
//!
//! Aggregates gridded NetCDF data onto coarser grids:
//!
//! ```text
//! cis aggregate tas:tas_2008.nc 't=[2008-01,2009-01,P1M],x=[0,360,10]' -o monthly
//! ```

mod aggregate;
mod config;

use std::path::PathBuf;

use aggregation::KernelRegistry;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use netcdf_io::ProductRegistry;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use aggregate::AggregatePipeline;
use config::{AggregateRequest, CliOverrides, DataGroup, FileConfig};

#[derive(Parser, Debug)]
#[command(name = "cis")]
#[command(about = "Community Intercomparison Suite: aggregate gridded climate data")]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Log level
    #[arg(long, env = "CIS_LOG_LEVEL", default_value = "info", global = true)]
    log_level: String,

    /// Write logs as JSON
    #[arg(long, global = true)]
    log_json: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Aggregate a variable onto a new grid
    Aggregate(AggregateArgs),
}

#[derive(clap::Args, Debug)]
struct AggregateArgs {
    /// VARIABLE:FILES[:product=PRODUCT][:kernel=KERNEL], files comma separated
    datagroup: String,

    /// Grid such as x=[-180,180,10],t=[2008-01,2009-01,P1M],y
    grid: Option<String>,

    /// Output file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Aggregation kernel (default: mean)
    #[arg(short, long)]
    kernel: Option<String>,

    /// Product reader (default: NetCDF_Gridded)
    #[arg(short, long)]
    product: Option<String>,

    /// YAML file supplying the grid, kernel, product or output
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize tracing
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true);
    if args.log_json {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }

    netcdf_io::silence_hdf5_errors();

    match args.command {
        Command::Aggregate(aggregate) => run_aggregate(aggregate),
    }
}

fn run_aggregate(args: AggregateArgs) -> Result<()> {
    let datagroup: DataGroup = args.datagroup.parse()?;
    let file = match &args.config {
        Some(path) => FileConfig::from_yaml(path)?,
        None => FileConfig::default(),
    };
    let cli = CliOverrides {
        grid: args.grid,
        kernel: args.kernel,
        product: args.product,
        output: args.output,
    };
    let request = AggregateRequest::resolve(datagroup, cli, file)?;
    info!(
        variable = %request.variable,
        grid = %request.grid,
        output = %request.output.display(),
        "Starting aggregation"
    );

    let pipeline = AggregatePipeline::new(ProductRegistry::standard(), KernelRegistry::standard());
    pipeline
        .run(&request)
        .with_context(|| format!("Aggregation of '{}' failed", request.variable))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_parse_aggregate_command() {
        let args = Args::try_parse_from([
            "cis",
            "aggregate",
            "tas:a.nc,b.nc",
            "x=[0,360,10]",
            "-o",
            "out",
            "--kernel",
            "max",
            "--log-level",
            "debug",
        ])
        .unwrap();
        assert_eq!(args.log_level, "debug");
        let Command::Aggregate(aggregate) = args.command;
        assert_eq!(aggregate.datagroup, "tas:a.nc,b.nc");
        assert_eq!(aggregate.grid.as_deref(), Some("x=[0,360,10]"));
        assert_eq!(aggregate.output, Some(PathBuf::from("out")));
        assert_eq!(aggregate.kernel.as_deref(), Some("max"));
        assert!(aggregate.config.is_none());
    }
}
