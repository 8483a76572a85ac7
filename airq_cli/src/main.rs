mod cli;
mod error_fmt;
mod fetch;

use std::fs;
use std::path::Path;

use clap::Parser;
use eyre::{Result, WrapErr};
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands, FILE_GUARD, JSON_MODE};

fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Cli::parse();
    let _ = JSON_MODE.set(args.json);

    if let Err(err) = run(args) {
        if JSON_MODE.get().copied().unwrap_or(false) {
            println!("{}", error_fmt::json_error(&err));
        } else {
            eprintln!("{}", error_fmt::humanize(&err));
        }
        std::process::exit(1);
    }
    Ok(())
}

fn run(args: Cli) -> Result<()> {
    let Cli {
        config,
        json,
        log_level,
        cmd,
    } = args;

    match cmd {
        // Offline computation; no config file involved.
        Commands::Aqi {
            pm25,
            cf1,
            humidity,
            conversion,
            epa_fallback,
        } => {
            init_tracing(&log_level, json, &airq_config::Logging::default())?;
            run_aqi(pm25, cf1, humidity, conversion, epa_fallback, json)
        }
        cmd => {
            let text = fs::read_to_string(&config)
                .wrap_err_with(|| format!("reading config {}", config.display()))?;
            let cfg = airq_config::load_toml(&text).wrap_err("parsing config TOML")?;
            cfg.validate()?;
            init_tracing(&log_level, json, &cfg.logging)?;
            let clock = airq_traits::WallClock::new();
            match cmd {
                Commands::Read {
                    sensor,
                    averages,
                    conversion,
                } => fetch::run_read(
                    &cfg,
                    sensor.as_deref(),
                    averages.unwrap_or_else(|| cfg.display.averages.into()),
                    conversion.unwrap_or_else(|| cfg.display.conversion.into()),
                    json,
                    &clock,
                ),
                Commands::Watch { interval_secs } => {
                    fetch::run_watch(&cfg, interval_secs, json, &clock)
                }
                // Handled by the outer match.
                Commands::Aqi { .. } => Ok(()),
            }
        }
    }
}

fn run_aqi(
    pm25: f64,
    cf1: Option<f64>,
    humidity: Option<f64>,
    conversion: airq_core::CorrectionModel,
    epa_fallback: bool,
    json: bool,
) -> Result<()> {
    use airq_core::{HumidityPolicy, NormalizedFields, Reading, compute_aqi_with, to_category};

    // A synthetic reading; the engine only looks at the scalar fields.
    let fields = NormalizedFields {
        sensor_id: "cli".into(),
        pm25,
        pm25_cf1: cf1.unwrap_or(pm25),
        pm25_alt: pm25,
        humidity,
        temperature: None,
        voc: None,
    };
    let reading = Reading::new(fields, conversion, &airq_traits::WallClock::new());
    let policy = if epa_fallback {
        HumidityPolicy::FallbackToRaw
    } else {
        HumidityPolicy::Fail
    };
    let aqi = compute_aqi_with(&reading, policy)?;
    let category = to_category(Some(aqi));
    if json {
        println!(
            "{}",
            serde_json::json!({"aqi": aqi, "category": category, "pm25": pm25})
        );
    } else {
        println!("AQI {aqi:.0} (category {category})");
    }
    Ok(())
}

fn init_tracing(log_level: &str, json: bool, logging: &airq_config::Logging) -> Result<()> {
    // RUST_LOG wins; then an explicit --log-level; then the config value.
    let level = if log_level != "info" {
        log_level.to_string()
    } else {
        logging.level.clone().unwrap_or_else(|| "info".to_string())
    };
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    if let Some(file) = &logging.file {
        use tracing_appender::rolling::{RollingFileAppender, Rotation};
        use tracing_subscriber::layer::SubscriberExt;
        use tracing_subscriber::util::SubscriberInitExt;

        let rotation = match logging.rotation.as_deref() {
            Some("daily") => Rotation::DAILY,
            Some("hourly") => Rotation::HOURLY,
            _ => Rotation::NEVER,
        };
        let path = Path::new(file);
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        let name = path
            .file_name()
            .map_or_else(|| "airq.log".into(), |n| n.to_os_string());
        let (writer, guard) =
            tracing_appender::non_blocking(RollingFileAppender::new(rotation, dir, name));
        let _ = FILE_GUARD.set(guard);

        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_ansi(!json)
                    .with_writer(std::io::stderr),
            )
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(writer),
            )
            .init();
    } else if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
    Ok(())
}
