//! Receipt polling error types.

use std::time::Duration;

use alloy::primitives::TxHash;
use log::{error, warn};
use thiserror::Error;

/// Reasons a receipt wait ends without a receipt
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PollerError {
	/// The transaction was not mined before the deadline
	#[error("Timeout error: no receipt for {hash} after {timeout:?}")]
	Timeout { hash: TxHash, timeout: Duration },

	/// The relay is shutting down
	#[error("Cancelled while waiting for the receipt of {0}")]
	Cancelled(TxHash),
}

impl PollerError {
	/// Creates a new timeout error with logging
	pub fn timeout(hash: TxHash, timeout: Duration) -> Self {
		let error = Self::Timeout { hash, timeout };
		error!("{}", error);
		error
	}

	/// Creates a new cancellation error with logging
	pub fn cancelled(hash: TxHash) -> Self {
		let error = Self::Cancelled(hash);
		warn!("{}", error);
		error
	}
}
