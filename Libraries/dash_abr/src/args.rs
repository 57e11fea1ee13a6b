// File: args.rs
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use tracing::level_filters::LevelFilter;

use crate::config::{AbrConfig, AbrStrategy};
use crate::error::ConfigurationError;

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, ValueEnum)]
pub enum LogLevel {
    Trace = 0, // Designates very fine-grained informational events, extremely verbose.
    Debug = 1, // Designates fine-grained informational events.
    Info = 2, // Designates informational messages.
    Warn = 3, // Designates hazardous situations.
    Error = 4, // Designates very serious errors.
}

#[derive(Parser, Debug)]
#[command(version, about, long_about="Replays a recorded DASH session through the ABR controller.")]
pub struct Args {
    /// JSON file with the adaptation sets and the recorded steps.
    #[arg(short = 'S', long)]
    pub session: PathBuf,
    /// JSON controller configuration. Overrides the individual ABR flags.
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    #[arg(short, long, value_enum, default_value = "hybrid")]
    pub strategy: AbrStrategy,
    #[arg(long, default_value = "5.0")]
    pub panic_buffer: f64,
    #[arg(long, default_value = "20.0")]
    pub safe_buffer: f64,
    #[arg(long, default_value = "30.0")]
    pub max_buffer: f64,
    /// Bandwidth estimate (bps) reported before the first download completes.
    #[arg(long, default_value = "1000000")]
    pub initial_bandwidth: f64,
    /// Weight of the newest download in the bandwidth average.
    #[arg(long, default_value = "0.25")]
    pub ewma_alpha: f64,
    #[arg(short, long, default_value = "info")]
    pub log_level: LogLevel,
}

impl Args {
    /// The controller configuration, from `--config` when given, otherwise from the flags.
    pub fn abr_config(&self) -> Result<AbrConfig, ConfigurationError> {
        if let Some(path) = &self.config {
            return AbrConfig::from_json_file(path);
        }
        let config = AbrConfig {
            strategy: self.strategy,
            panic_buffer_seconds: self.panic_buffer,
            safe_buffer_seconds: self.safe_buffer,
            max_buffer_duration_seconds: self.max_buffer,
        };
        config.validate()?;
        Ok(config)
    }
}

pub fn parse_args() -> Args {
    Args::parse()
}

pub fn get_log_level_filter(args: &Args) -> LevelFilter {
    // Map the LogLevel enum to the LevelFilter enum
    match args.log_level {
        LogLevel::Trace => LevelFilter::TRACE,
        LogLevel::Debug => LevelFilter::DEBUG,
        LogLevel::Info => LevelFilter::INFO,
        LogLevel::Warn => LevelFilter::WARN,
        LogLevel::Error => LevelFilter::ERROR,
    }
}
