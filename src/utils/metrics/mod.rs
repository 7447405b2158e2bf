//! Metrics module for the application.
//!
//! - This module contains the global Prometheus registry.
//! - Defines the relay counters updated by the engine.

pub mod server;
use lazy_static::lazy_static;
use prometheus::{Encoder, IntCounter, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};

lazy_static! {
	// Global Prometheus registry.
	pub static ref REGISTRY: Registry = Registry::new();

	// Counter for source events that matched a relay rule.
	pub static ref EVENTS_MATCHED: IntCounter = {
		let counter = IntCounter::new("relay_events_matched_total", "Source events that matched a relay rule").unwrap();
		REGISTRY.register(Box::new(counter.clone())).unwrap();
		counter
	};

	// Counter for source events with no decoder or no rule.
	pub static ref EVENTS_IGNORED: IntCounter = {
		let counter = IntCounter::new("relay_events_ignored_total", "Source events without a matching rule").unwrap();
		REGISTRY.register(Box::new(counter.clone())).unwrap();
		counter
	};

	// Counter of finished attempts by terminal state.
	pub static ref ATTEMPTS_FINISHED: IntCounterVec = {
		let counter = IntCounterVec::new(
			Opts::new("relay_attempts_finished_total", "Relay attempts by terminal state"),
			&["outcome"]
		).unwrap();
		REGISTRY.register(Box::new(counter.clone())).unwrap();
		counter
	};

	// Gauge of attempts currently in flight.
	pub static ref ATTEMPTS_IN_FLIGHT: IntGauge = {
		let gauge = IntGauge::new("relay_attempts_in_flight", "Relay attempts not yet finished").unwrap();
		REGISTRY.register(Box::new(gauge.clone())).unwrap();
		gauge
	};

	// Counter of submitted transactions per chain.
	pub static ref TRANSACTIONS_SUBMITTED: IntCounterVec = {
		let counter = IntCounterVec::new(
			Opts::new("relay_transactions_submitted_total", "Transactions submitted per chain"),
			&["chain"]
		).unwrap();
		REGISTRY.register(Box::new(counter.clone())).unwrap();
		counter
	};

	// Counter of source subscription (re)establishments.
	pub static ref SUBSCRIPTIONS_OPENED: IntCounter = {
		let counter = IntCounter::new("relay_subscriptions_opened_total", "Source event subscriptions opened").unwrap();
		REGISTRY.register(Box::new(counter.clone())).unwrap();
		counter
	};
}

/// Gather all metrics and encode into the provided format.
pub fn gather_metrics() -> Result<Vec<u8>, Box<dyn std::error::Error>> {
	let encoder = TextEncoder::new();
	let metric_families = REGISTRY.gather();
	let mut buffer = Vec::new();
	encoder.encode(&metric_families, &mut buffer)?;
	Ok(buffer)
}

/// Records an attempt reaching a terminal state
pub fn record_attempt_finished(outcome: &str) {
	ATTEMPTS_FINISHED.with_label_values(&[outcome]).inc();
}

/// Records a transaction submitted to the given chain
pub fn record_transaction_submitted(chain: &str) {
	TRANSACTIONS_SUBMITTED.with_label_values(&[chain]).inc();
}
