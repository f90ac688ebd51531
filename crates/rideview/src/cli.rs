//! Command-line interface definition.

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};

use rideview_api::Region;

use crate::error::CliError;

#[derive(Parser)]
#[command(
    name = "rideview",
    version,
    about = "Live transit vehicle map, synchronized to your viewport",
    propagate_version = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Args)]
pub struct GlobalOpts {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Path to a config file (default: platform config dir)
    #[arg(short, long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value = "table")]
    pub output: OutputFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
    Plain,
}

#[derive(Subcommand)]
pub enum Command {
    /// Poll the live vehicle layer continuously until interrupted
    Watch {
        /// Viewport as minLon,minLat,maxLon,maxLat (default: config fallback)
        #[arg(long, value_name = "BBOX", allow_hyphen_values = true)]
        bbox: Option<String>,

        /// Poll period in seconds (default: config refresh interval)
        #[arg(long, value_name = "SECS")]
        interval: Option<u64>,
    },

    /// Fetch the vehicles currently inside a region, once
    Vehicles {
        /// Region as minLon,minLat,maxLon,maxLat (default: config fallback)
        #[arg(long, value_name = "BBOX", allow_hyphen_values = true)]
        bbox: Option<String>,
    },

    /// Print the base-map style URL the backend hands out
    Style,

    /// Probe backend liveness
    Ping,
}

/// Parse a `minLon,minLat,maxLon,maxLat` argument into a region.
pub fn parse_bbox(raw: &str) -> Result<Region, CliError> {
    let parts: Vec<&str> = raw.split(',').map(str::trim).collect();
    let &[min_lon, min_lat, max_lon, max_lat] = parts.as_slice() else {
        return Err(CliError::Validation {
            field: "bbox".into(),
            reason: "expected four comma-separated values: minLon,minLat,maxLon,maxLat".into(),
        });
    };

    let parse = |name: &str, value: &str| -> Result<f64, CliError> {
        value.parse().map_err(|_| CliError::Validation {
            field: "bbox".into(),
            reason: format!("{name} is not a number: {value}"),
        })
    };

    let region = Region::new(
        parse("minLon", min_lon)?,
        parse("minLat", min_lat)?,
        parse("maxLon", max_lon)?,
        parse("maxLat", max_lat)?,
    )
    .map_err(|e| CliError::Validation {
        field: "bbox".into(),
        reason: e.to_string(),
    })?;

    Ok(region)
}
