//! Logging utilities for the application
//!
//! This module provides utilities for setting up and configuring logging for the application.
//! It uses the `tracing_subscriber` crate to configure the logging.
//!
//! The `setup_logging` function reads `LOG_MODE`, `LOG_LEVEL` and `LOG_DATA_DIR` and writes
//! either to stdout or to a daily rolling file.
//!
//! The `setup_logging_with_writer` function sets up the logging for the application with a custom
//! writer.
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

use crate::utils::constants::DEFAULT_LOG_DIR;

/// Prefix of rolled log files
const LOG_FILE_PREFIX: &str = "relay.log";

/// Setup logging for the application
///
/// Writes to stdout unless `LOG_MODE=file`, in which case logs go to a daily
/// rolling file under `LOG_DATA_DIR` (default `logs/`).
pub fn setup_logging() -> Result<(), Box<dyn std::error::Error + Send + Sync + 'static>> {
	let log_mode = std::env::var("LOG_MODE").unwrap_or_default();

	if log_mode.eq_ignore_ascii_case("file") {
		let log_dir = std::env::var("LOG_DATA_DIR").unwrap_or_else(|_| DEFAULT_LOG_DIR.to_string());
		std::fs::create_dir_all(&log_dir)?;
		let appender = tracing_appender::rolling::daily(log_dir, LOG_FILE_PREFIX);
		setup_logging_with_writer(appender)?;
	} else {
		setup_logging_with_writer(std::io::stdout)?;
	}
	Ok(())
}

/// Builds the level filter from `RUST_LOG`, then `LOG_LEVEL`, defaulting to INFO
fn build_filter() -> EnvFilter {
	EnvFilter::try_from_default_env().unwrap_or_else(|_| {
		let level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
		EnvFilter::try_new(&level).unwrap_or_else(|_| EnvFilter::new("info"))
	})
}

/// Setup logging for the application with a custom writer
///
/// This function sets up the logging for the application with a custom writer.
/// It uses the `tracing_subscriber` crate to configure the logging.
pub fn setup_logging_with_writer<W>(
	writer: W,
) -> Result<(), Box<dyn std::error::Error + Send + Sync + 'static>>
where
	W: for<'writer> tracing_subscriber::fmt::MakeWriter<'writer> + Send + Sync + 'static,
{
	let filter = build_filter();

	tracing_subscriber::registry()
		.with(filter)
		.with(
			fmt::layer()
				.with_writer(writer)
				.event_format(
					fmt::format()
						.with_level(true)
						.with_target(true)
						.with_thread_ids(false)
						.with_thread_names(false)
						.with_ansi(true)
						.compact(),
				)
				.fmt_fields(fmt::format::PrettyFields::new()),
		)
		.try_init()?;
	Ok(())
}
