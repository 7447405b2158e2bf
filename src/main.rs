//! Cross-chain relay service entry point.
//!
//! This binary loads the relay configuration, connects to the public and
//! private chains and relays matching events until interrupted.
//!
//! # Flow
//! 1. Loads the configuration file given by `--config` or `RELAY_CONFIG`
//! 2. Connects to both chains and validates the relay rules against the ABIs
//! 3. Optionally starts the metrics server
//! 4. Relays events until Ctrl+C, then waits for in-flight attempts

use cross_chain_relay::{
	bootstrap::initialize_engine,
	models::{ConfigLoader, RelayConfig},
	utils::{
		constants::{DEFAULT_CONFIG_PATH, DEFAULT_METRICS_ADDRESS},
		logging::setup_logging,
		metrics::server::create_metrics_server,
	},
};

use anyhow::Context;
use clap::{Arg, Command};
use dotenvy::dotenv;
use std::{
	env::{set_var, var},
	path::PathBuf,
	sync::Arc,
};
use tokio::sync::watch;
use tracing::{error, info};

/// Main entry point for the relay service.
///
/// # Errors
/// Returns an error if the configuration cannot be loaded, a chain cannot be
/// reached, or the source subscription is lost for good.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
	let matches = Command::new("cross-chain-relay")
		.version(env!("CARGO_PKG_VERSION"))
		.about(
			"Relays events emitted by a contract on a public chain to a contract on a private \
			 chain, and relays selected results back.",
		)
		.arg(
			Arg::new("config")
				.long("config")
				.help("Path to the relay configuration (default: config/relay.json)")
				.value_name("PATH"),
		)
		.arg(
			Arg::new("log-file")
				.long("log-file")
				.help("Write logs to file instead of stdout")
				.action(clap::ArgAction::SetTrue),
		)
		.arg(
			Arg::new("log-level")
				.long("log-level")
				.help("Set log level (trace, debug, info, warn, error)")
				.value_name("LEVEL"),
		)
		.arg(
			Arg::new("log-path")
				.long("log-path")
				.help("Path to store log files (default: logs/)")
				.value_name("PATH"),
		)
		.arg(
			Arg::new("metrics-address")
				.long("metrics-address")
				.help("Address to start the metrics server on (default: 127.0.0.1:8081)")
				.value_name("HOST:PORT"),
		)
		.arg(
			Arg::new("metrics")
				.long("metrics")
				.help("Enable metrics server")
				.action(clap::ArgAction::SetTrue),
		)
		.get_matches();

	// Load environment variables from .env file
	dotenv().ok();

	// Only apply CLI options if the corresponding environment variables are NOT already set
	if let Some(path) = matches.get_one::<String>("config") {
		if var("RELAY_CONFIG").is_err() {
			set_var("RELAY_CONFIG", path);
		}
	}

	if matches.get_flag("log-file") && var("LOG_MODE").is_err() {
		set_var("LOG_MODE", "file");
	}

	if let Some(level) = matches.get_one::<String>("log-level") {
		if var("LOG_LEVEL").is_err() {
			set_var("LOG_LEVEL", level);
		}
	}

	if let Some(path) = matches.get_one::<String>("log-path") {
		if var("LOG_DATA_DIR").is_err() {
			set_var("LOG_DATA_DIR", path);
		}
	}

	setup_logging().unwrap_or_else(|e| {
		error!("Failed to setup logging: {}", e);
	});

	let config_path =
		PathBuf::from(var("RELAY_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string()));
	let config = RelayConfig::load_from_path(&config_path).with_context(|| {
		format!(
			"failed to load relay configuration from {}",
			config_path.display()
		)
	})?;
	info!(path = %config_path.display(), rules = config.rules.len(), "configuration loaded");

	let engine = Arc::new(initialize_engine(&config).await?);

	let metrics_enabled =
		matches.get_flag("metrics") || var("METRICS_ENABLED").map(|v| v == "true").unwrap_or(false);

	let metrics_address = matches
		.get_one::<String>("metrics-address")
		.map(|s| s.to_string())
		.unwrap_or_else(|| DEFAULT_METRICS_ADDRESS.to_string());

	let metrics_server = if metrics_enabled {
		info!("Metrics server enabled, starting on {}", metrics_address);
		match create_metrics_server(metrics_address) {
			Ok(server) => Some(server),
			Err(e) => {
				error!("Failed to create metrics server: {}", e);
				None
			}
		}
	} else {
		info!("Metrics server disabled. Use --metrics flag or METRICS_ENABLED=true to enable");
		None
	};

	let (shutdown_tx, shutdown_rx) = watch::channel(false);
	let mut relay = tokio::spawn(Arc::clone(&engine).run(shutdown_rx));

	info!("Relay started. Press Ctrl+C to shutdown");

	let metrics_future = async {
		match metrics_server {
			Some(server) => server.await,
			None => std::future::pending::<std::io::Result<()>>().await,
		}
	};

	tokio::select! {
		result = tokio::signal::ctrl_c() => {
			if let Err(e) = result {
				error!("Error waiting for Ctrl+C: {}", e);
			}
			info!("Shutdown signal received, stopping relay...");
		}
		result = metrics_future => {
			if let Err(e) = result {
				error!("Metrics server error: {}", e);
			}
			info!("Metrics server stopped, stopping relay...");
		}
		result = &mut relay => {
			return match result {
				Ok(Ok(())) => Ok(()),
				Ok(Err(e)) => Err(e).context("relay stopped"),
				Err(e) => Err(e).context("relay task panicked"),
			};
		}
	}

	let _ = shutdown_tx.send(true);

	match relay.await {
		Ok(Ok(())) => {}
		Ok(Err(e)) => error!("Relay stopped with an error: {}", e),
		Err(e) => error!("Relay task failed: {}", e),
	}

	info!("Shutdown complete");
	Ok(())
}
