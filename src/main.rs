use std::env;
use std::error::Error;
use std::fs;
use std::io;
use std::process::ExitCode;

use log::{error, info, warn, LevelFilter};
use serde::Deserialize;
use reservation_table::logger::initialize_logger;
use reservation_table::{Loader, ParseErrorPolicy};
use crate::event_loop::terminal_event_loop::TerminalEventLoop;
use crate::event_loop::EventLoop;

mod event_loop;

const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[derive(Deserialize, Default)]
#[serde(default)]
struct Config {
    reservations: ReservationsConfig,
    logging: LoggingConfig,
}

#[derive(Deserialize)]
#[serde(default)]
struct ReservationsConfig {
    data_file: String,
    on_parse_error: ParseErrorPolicy,
}

impl Default for ReservationsConfig {
    fn default() -> Self {
        ReservationsConfig {
            data_file: "reservas.txt".to_string(),
            on_parse_error: ParseErrorPolicy::Abort,
        }
    }
}

#[derive(Deserialize)]
#[serde(default)]
struct LoggingConfig {
    level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig { level: "info".to_string() }
    }
}

/// Reads the config file. A missing file falls back to defaults unless the
/// path was given explicitly; returns whether the file was found.
fn init(config_path: &str, explicit: bool) -> Result<(Config, bool), Box<dyn Error>> {
    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound && !explicit => {
            return Ok((Config::default(), false));
        }
        Err(e) => return Err(format!("failed to read {}: {}", config_path, e).into()),
    };
    let config: Config = toml::from_str(&config_content)
        .map_err(|e| format!("failed to parse {}: {}", config_path, e))?;
    Ok((config, true))
}

/// Parses the configured level, `Err` carries the rejected text
fn log_level(logging: &LoggingConfig) -> Result<LevelFilter, &str> {
    logging.level.trim().parse().map_err(|_| logging.level.as_str())
}

fn main() -> ExitCode {
    let explicit_path = env::args().nth(1);
    let explicit = explicit_path.is_some();
    let config_path = explicit_path.unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());

    let (config, found) = match init(&config_path, explicit) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    match log_level(&config.logging) {
        Ok(level) => initialize_logger(level),
        Err(rejected) => {
            initialize_logger(LevelFilter::Info);
            warn!("unknown log level '{}' in {}, using info", rejected, config_path);
        }
    }
    if !found {
        info!("{} not found, using default settings", config_path);
    }

    let loader = Loader::new(config.reservations.on_parse_error);
    let mut table = match loader.load_file(&config.reservations.data_file) {
        Ok((table, _report)) => table,
        Err(e) => {
            error!("failed to load reservations from {}: {}", config.reservations.data_file, e);
            println!("Failed to load the reservation system.");
            return ExitCode::FAILURE;
        }
    };

    println!("=== Reservation Hash Table ===");
    print!("{}", table);
    println!("{} reservations in {} buckets", table.len(), table.num_buckets());
    println!("\nType 'help' for available commands.");

    let mut event_loop = TerminalEventLoop;
    if let Err(e) = event_loop.run(&mut table) {
        error!("console stopped: {}", e);
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
