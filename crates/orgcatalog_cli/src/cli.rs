use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use orgcatalog_core::GeoParams;

/// Organization catalog lookups over a SQLite store
#[derive(Parser, Debug)]
#[command(name = "orgcatalog")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// TOML configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Catalog database file (overrides config)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// API key presented by the caller
    #[arg(long, global = true, env = "ORGCATALOG_CLIENT_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Absolute directory for rolling logs (overrides config)
    #[arg(long, global = true)]
    pub log_dir: Option<PathBuf>,

    /// Log level: trace|debug|info|warn|error (overrides config)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pub pretty: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Load the demo catalog into the database
    Seed,

    /// Organizations located in one building
    Building {
        building_id: i64,
    },

    /// Organizations tagged exactly with the named activity
    Activity {
        name: String,
    },

    /// Organizations tagged with the named activity or any sub-activity
    ActivityTree {
        name: String,
    },

    /// Organizations whose name contains the given text
    Search {
        text: String,
    },

    /// Organizations within a radius or a rectangle
    Geo(GeoArgs),

    /// One organization by id
    Show {
        organization_id: i64,
    },

    /// Print core version
    Version,
}

#[derive(Args, Debug, Clone, Copy)]
pub struct GeoArgs {
    #[arg(long, allow_negative_numbers = true)]
    pub lat: Option<f64>,
    #[arg(long, allow_negative_numbers = true)]
    pub lon: Option<f64>,
    #[arg(long, allow_negative_numbers = true)]
    pub radius_km: Option<f64>,
    #[arg(long, allow_negative_numbers = true)]
    pub lat_min: Option<f64>,
    #[arg(long, allow_negative_numbers = true)]
    pub lat_max: Option<f64>,
    #[arg(long, allow_negative_numbers = true)]
    pub lon_min: Option<f64>,
    #[arg(long, allow_negative_numbers = true)]
    pub lon_max: Option<f64>,
}

impl From<GeoArgs> for GeoParams {
    fn from(value: GeoArgs) -> Self {
        Self {
            lat: value.lat,
            lon: value.lon,
            radius_km: value.radius_km,
            lat_min: value.lat_min,
            lat_max: value.lat_max,
            lon_min: value.lon_min,
            lon_max: value.lon_max,
        }
    }
}

impl Commands {
    /// Whether the command reads catalog data on behalf of a caller.
    pub fn requires_credential(&self) -> bool {
        !matches!(self, Self::Seed | Self::Version)
    }
}
