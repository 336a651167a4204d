//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `location_service` library that handles:
//! - Command-line argument parsing
//! - Configuration file loading
//! - Logger initialization
//! - User-facing output formatting
//!
//! All core functionality is implemented in the library crate.

use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use location_service::initialization::init_logger_with;
use location_service::{
    AssistanceProfile, AssistanceRequest, Config, LocationService, LogFormat, LogLevel, Place,
    Point,
};

/// GNSS assistance-data cache and geofence index.
#[derive(Debug, Parser)]
#[command(name = "location_service", version, about)]
struct Cli {
    /// JSON configuration file
    #[arg(long, short, default_value = "location_service.json")]
    config: PathBuf,

    /// Log level (overrides the configuration file)
    #[arg(long, value_enum)]
    log_level: Option<LogLevel>,

    /// Log format (overrides the configuration file)
    #[arg(long, value_enum)]
    log_format: Option<LogFormat>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Fetch assistance data near a point and write it to a file
    Assist {
        #[arg(long, allow_negative_numbers = true)]
        lon: f64,
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,
        /// Requested data types, comma separated
        #[arg(long, value_delimiter = ',')]
        datatype: Vec<String>,
        /// Output format tag
        #[arg(long, default_value = "")]
        format: String,
        /// Requested constellations, comma separated
        #[arg(long, value_delimiter = ',')]
        gnss: Vec<String>,
        /// Ask the origin to filter results to the position
        #[arg(long)]
        filter_on_pos: bool,
        /// File the payload is written to
        #[arg(long)]
        out: PathBuf,
    },
    /// Manage geofenced places
    Fence {
        #[command(subcommand)]
        action: FenceCommand,
    },
    /// Delete expired assistance cache entries now
    Purge,
}

#[derive(Debug, Subcommand)]
enum FenceCommand {
    /// Create or replace a place
    Save {
        #[arg(long)]
        group: String,
        /// Generated when omitted
        #[arg(long, default_value = "")]
        id: String,
        #[arg(long, default_value = "")]
        name: String,
        #[arg(long, allow_negative_numbers = true)]
        lon: f64,
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,
        /// Radius in meters
        #[arg(long)]
        radius: f64,
        #[arg(long)]
        address: Option<String>,
        #[arg(long)]
        comments: Option<String>,
    },
    /// Delete a place
    Delete {
        #[arg(long)]
        group: String,
        #[arg(long)]
        id: String,
    },
    /// Print every place of a group, one JSON object per line
    List {
        #[arg(long)]
        group: String,
    },
    /// Print the ids of the places of a group containing a point
    Find {
        #[arg(long)]
        group: String,
        #[arg(long, allow_negative_numbers = true)]
        lon: f64,
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match Config::load(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("location_service error: {:#}", anyhow::Error::from(e));
            process::exit(1);
        }
    };

    let log_level = cli.log_level.clone().unwrap_or(config.log_level.clone());
    let log_format = cli.log_format.clone().unwrap_or(config.log_format.clone());
    init_logger_with(log_level.into(), log_format).context("Failed to initialize logger")?;

    if let Err(e) = run(cli.command, &config).await {
        eprintln!("location_service error: {:#}", e);
        process::exit(1);
    }
    Ok(())
}

async fn run(command: Command, config: &Config) -> Result<()> {
    let service = LocationService::from_config(config)
        .await
        .context("Failed to initialize service")?;

    match command {
        Command::Assist {
            lon,
            lat,
            datatype,
            format,
            gnss,
            filter_on_pos,
            out,
        } => {
            let request = AssistanceRequest {
                point: Point::new(lon, lat)?,
                profile: AssistanceProfile {
                    datatype,
                    format,
                    gnss,
                    filter_on_pos,
                },
            };
            let payload = service.get_assistance_data(&request).await?;
            tokio::fs::write(&out, &payload)
                .await
                .with_context(|| format!("Failed to write {}", out.display()))?;
            println!("Wrote {} bytes to {}", payload.len(), out.display());
        }
        Command::Fence { action } => run_fence(&service, action).await?,
        Command::Purge => {
            let removed = service.purge_expired().await?;
            println!("Removed {removed} expired cache entr{}", if removed == 1 { "y" } else { "ies" });
        }
    }
    Ok(())
}

async fn run_fence(service: &LocationService, action: FenceCommand) -> Result<()> {
    match action {
        FenceCommand::Save {
            group,
            id,
            name,
            lon,
            lat,
            radius,
            address,
            comments,
        } => {
            let id = service
                .save_fence(Place {
                    group,
                    id,
                    name,
                    center: Point::new(lon, lat)?,
                    radius,
                    address,
                    comments,
                })
                .await?;
            println!("{id}");
        }
        FenceCommand::Delete { group, id } => {
            println!("{}", service.delete_fence(&group, &id).await?);
        }
        FenceCommand::List { group } => {
            for place in service.list_fences(&group).await? {
                println!("{}", serde_json::to_string(&place)?);
            }
        }
        FenceCommand::Find { group, lon, lat } => {
            for id in service.find_containing(&group, Point::new(lon, lat)?).await? {
                println!("{id}");
            }
        }
    }
    Ok(())
}
