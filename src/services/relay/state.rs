//! Relay attempt states.
//!
//! An attempt starts when a source event matches a rule and moves forward one
//! transition at a time until it reaches a terminal state. Attempts that never
//! match leave no state behind. Once terminal, an attempt is logged, counted
//! and dropped.

use std::{fmt, sync::Arc};

use alloy::primitives::TxHash;

use crate::{
	models::{DecodedLog, PendingTransaction, RawEvent, Receipt, RelayRule},
	services::relay::error::RelayError,
};

/// The state of one relay attempt
#[derive(Debug)]
pub enum RelayState {
	/// A source event resolved to a rule and decoded
	EventMatched {
		event: RawEvent,
		decoded: DecodedLog,
		rule: Arc<RelayRule>,
	},
	/// The target transaction was accepted by the private chain
	TxSubmitted { pending: PendingTransaction },
	/// The target transaction executed successfully
	TxMined {
		pending: PendingTransaction,
		receipt: Receipt,
	},
	/// Every matching receipt log produced a mined callback transaction
	CallbackDispatched {
		tx_hash: TxHash,
		callbacks: Vec<PendingTransaction>,
	},
	/// The receipt carried nothing to call back
	NoCallback { tx_hash: TxHash },
	/// Projection, encoding, signing or submission of the target call failed
	SubmitFailed { error: RelayError },
	/// The target transaction reverted, timed out or was abandoned on shutdown
	ReceiptFailed {
		pending: PendingTransaction,
		error: RelayError,
	},
	/// A source or receipt log did not match its ABI signature
	DecodeFailed { error: RelayError },
	/// A callback could not be submitted or was not mined successfully
	CallbackFailed { tx_hash: TxHash, error: RelayError },
}

impl RelayState {
	pub fn is_terminal(&self) -> bool {
		!matches!(
			self,
			Self::EventMatched { .. } | Self::TxSubmitted { .. } | Self::TxMined { .. }
		)
	}

	pub fn is_failure(&self) -> bool {
		matches!(
			self,
			Self::SubmitFailed { .. }
				| Self::ReceiptFailed { .. }
				| Self::DecodeFailed { .. }
				| Self::CallbackFailed { .. }
		)
	}

	/// Metric label
	pub fn name(&self) -> &'static str {
		match self {
			Self::EventMatched { .. } => "event_matched",
			Self::TxSubmitted { .. } => "tx_submitted",
			Self::TxMined { .. } => "tx_mined",
			Self::CallbackDispatched { .. } => "callback_dispatched",
			Self::NoCallback { .. } => "no_callback",
			Self::SubmitFailed { .. } => "submit_failed",
			Self::ReceiptFailed { .. } => "receipt_failed",
			Self::DecodeFailed { .. } => "decode_failed",
			Self::CallbackFailed { .. } => "callback_failed",
		}
	}

	/// The error of a failed attempt
	pub fn error(&self) -> Option<&RelayError> {
		match self {
			Self::SubmitFailed { error }
			| Self::ReceiptFailed { error, .. }
			| Self::DecodeFailed { error }
			| Self::CallbackFailed { error, .. } => Some(error),
			_ => None,
		}
	}
}

impl fmt::Display for RelayState {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.name())
	}
}
