//! Core chain client interface.
//!
//! Defines the operations the relay needs from a node: a log subscription on
//! the source side, transaction submission and receipt lookup on either side,
//! and the account and fee queries needed to sign a transaction locally.

use alloy::{
	primitives::{Address, Bytes, TxHash, B256},
	rpc::types::Filter,
};
use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::{
	models::{RawEvent, Receipt},
	services::blockchain::BlockChainError,
};

/// Stream of logs in chain order
pub type EventStream = BoxStream<'static, RawEvent>;

/// Selects which logs a subscription delivers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventFilter {
	/// Contract whose logs are watched
	pub address: Address,
	/// Accepted event selectors; empty accepts every event of the contract
	pub topics: Vec<B256>,
	/// Replay logs starting at this block before following new ones
	pub from_block: Option<u64>,
}

impl EventFilter {
	pub fn new(address: Address) -> Self {
		Self {
			address,
			topics: Vec::new(),
			from_block: None,
		}
	}

	pub fn with_topics(mut self, topics: Vec<B256>) -> Self {
		self.topics = topics;
		self
	}

	pub fn with_from_block(mut self, from_block: Option<u64>) -> Self {
		self.from_block = from_block;
		self
	}

	/// Converts into the JSON-RPC log filter
	pub fn to_rpc_filter(&self) -> Filter {
		let mut filter = Filter::new().address(self.address);
		if !self.topics.is_empty() {
			filter = filter.event_signature(self.topics.clone());
		}
		if let Some(block) = self.from_block {
			filter = filter.from_block(block);
		}
		filter
	}
}

/// Defines the interface the relay uses to talk to a chain
///
/// Implementations own their connection. Every method performs network I/O only.
#[async_trait]
pub trait ChainClient: Send + Sync {
	/// Opens a log subscription
	///
	/// The stream ends when the underlying connection is lost; callers
	/// resubscribe to continue.
	async fn subscribe(&self, filter: &EventFilter) -> Result<EventStream, BlockChainError>;

	/// Broadcasts a signed, EIP-2718 encoded transaction
	///
	/// # Returns
	/// * `Result<TxHash, BlockChainError>` - The transaction hash. Acceptance does
	///   not imply inclusion.
	async fn submit(&self, raw_transaction: Bytes) -> Result<TxHash, BlockChainError>;

	/// Looks up a receipt once, without waiting
	async fn get_receipt(&self, hash: TxHash) -> Result<Option<Receipt>, BlockChainError>;

	/// Returns the pending nonce of an account
	async fn get_transaction_count(&self, address: Address) -> Result<u64, BlockChainError>;

	async fn get_chain_id(&self) -> Result<u64, BlockChainError>;

	/// Returns the number of the latest block
	async fn get_block_number(&self) -> Result<u64, BlockChainError>;

	/// Returns the node's suggested legacy gas price in wei
	async fn get_gas_price(&self) -> Result<u128, BlockChainError>;
}
