//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser};
use std::path::PathBuf;
use std::sync::OnceLock;

pub static FILE_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();

#[derive(Parser, Debug)]
#[command(name = "pump_server", version, about = "Glucose pump controller")]
pub struct Cli {
    /// Path to config TOML (typed)
    #[arg(long, value_name = "FILE", default_value = "etc/pump_config.toml")]
    pub config: PathBuf,

    /// Override the listening port from the config
    #[arg(long, value_name = "PORT")]
    pub port: Option<u16>,

    /// Override the user-store path from the config
    #[arg(long, value_name = "FILE")]
    pub users_file: Option<PathBuf>,

    /// Initial raw level of the simulated potentiometer (ignored with
    /// real hardware)
    #[arg(long, value_name = "COUNTS", default_value_t = 2048)]
    pub sim_level: i32,

    /// Log as JSON lines instead of pretty
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace)
    #[arg(long = "log-level", value_name = "LEVEL", default_value = "info")]
    pub log_level: String,
}
