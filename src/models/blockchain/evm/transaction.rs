//! Submitted transaction tracking.

use alloy::primitives::TxHash;
use std::{fmt, sync::Arc};

use crate::models::{ContractTag, RelayRule};

/// Lifecycle of a submitted transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionStatus {
	/// Accepted by the node, not yet observed in a block
	Submitted,
	/// Included in a block and executed successfully
	Mined,
	/// Reverted, never observed before the deadline, or abandoned on shutdown
	Failed,
}

impl fmt::Display for TransactionStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Submitted => write!(f, "submitted"),
			Self::Mined => write!(f, "mined"),
			Self::Failed => write!(f, "failed"),
		}
	}
}

/// A transaction the relay submitted and is waiting on
#[derive(Debug, Clone)]
pub struct PendingTransaction {
	pub hash: TxHash,
	pub nonce: u64,
	/// Chain the transaction was sent to
	pub chain: ContractTag,
	/// Rule that produced the transaction
	pub rule: Arc<RelayRule>,
	pub status: TransactionStatus,
}

impl PendingTransaction {
	pub fn new(hash: TxHash, nonce: u64, chain: ContractTag, rule: Arc<RelayRule>) -> Self {
		Self {
			hash,
			nonce,
			chain,
			rule,
			status: TransactionStatus::Submitted,
		}
	}

	pub fn mark_mined(&mut self) {
		self.status = TransactionStatus::Mined;
	}

	pub fn mark_failed(&mut self) {
		self.status = TransactionStatus::Failed;
	}
}
