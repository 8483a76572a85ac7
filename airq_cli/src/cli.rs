//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::OnceLock;

pub static FILE_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();
/// Whether the user asked for JSON output (controls structured error output).
pub static JSON_MODE: OnceLock<bool> = OnceLock::new();

#[derive(Parser, Debug)]
#[command(name = "airq", version, about = "Air quality CLI")]
pub struct Cli {
    /// Path to config TOML
    #[arg(long, value_name = "FILE", default_value = "etc/airq.toml")]
    pub config: PathBuf,

    /// Log and print results as JSON instead of text
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace)
    #[arg(long = "log-level", value_name = "LEVEL", default_value = "info")]
    pub log_level: String,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch each configured sensor once and print the readings
    Read {
        /// Only this sensor (by configured name)
        #[arg(long, value_name = "NAME")]
        sensor: Option<String>,
        /// Override the configured averaging window (realtime|10m|30m|60m)
        #[arg(long, value_name = "WINDOW")]
        averages: Option<airq_core::AveragingWindow>,
        /// Override the configured correction model
        #[arg(long, value_name = "MODEL")]
        conversion: Option<airq_core::CorrectionModel>,
    },
    /// Poll all configured sensors until interrupted
    Watch {
        /// Override the poll interval in seconds
        #[arg(long, value_name = "SECS")]
        interval_secs: Option<u64>,
    },
    /// Compute an AQI offline from a PM2.5 concentration
    Aqi {
        /// PM2.5 concentration in ug/m3
        #[arg(long)]
        pm25: f64,
        /// CF=1 concentration (defaults to --pm25)
        #[arg(long, value_name = "UGM3")]
        cf1: Option<f64>,
        /// Relative humidity percent (used by the EPA model)
        #[arg(long, value_name = "PCT")]
        humidity: Option<f64>,
        /// Correction model (None|AQandU|LRAPA|EPA|WOODSMOKE|ALT-CF3)
        #[arg(long, default_value = "None")]
        conversion: airq_core::CorrectionModel,
        /// Degrade EPA to the uncorrected value when humidity is missing
        #[arg(long, action = ArgAction::SetTrue)]
        epa_fallback: bool,
    },
}
