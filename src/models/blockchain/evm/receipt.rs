//! EVM transaction receipt data structures.

use alloy::primitives::B256;

use crate::models::RawEvent;

/// The record of a mined transaction
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Receipt {
	pub transaction_hash: B256,
	pub block_number: Option<u64>,
	/// `false` when execution reverted
	pub status: bool,
	/// Logs emitted during execution, in log index order
	pub logs: Vec<RawEvent>,
}

impl Receipt {
	/// Whether the transaction executed successfully
	pub fn succeeded(&self) -> bool {
		self.status
	}
}

impl From<alloy::rpc::types::TransactionReceipt> for Receipt {
	fn from(receipt: alloy::rpc::types::TransactionReceipt) -> Self {
		Self {
			transaction_hash: receipt.transaction_hash,
			block_number: receipt.block_number,
			status: receipt.status(),
			logs: receipt
				.inner
				.logs()
				.iter()
				.cloned()
				.map(RawEvent::from)
				.collect(),
		}
	}
}
