//! EVM log data structures.

use alloy::{
	dyn_abi::DynSolValue,
	primitives::{Address, Bytes, B256},
};

/// A chain-native log as delivered by a subscription or found in a receipt
///
/// Ordering follows the chain: block number first, then log index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawEvent {
	/// Emitting contract
	pub address: Address,
	/// Indexed topics, `topics[0]` being the event selector for non-anonymous events
	pub topics: Vec<B256>,
	/// ABI-encoded non-indexed fields
	pub data: Bytes,
	pub block_number: Option<u64>,
	pub log_index: Option<u64>,
	pub transaction_hash: Option<B256>,
}

impl RawEvent {
	/// The event selector topic, if any
	pub fn topic0(&self) -> Option<&B256> {
		self.topics.first()
	}
}

impl From<alloy::rpc::types::Log> for RawEvent {
	fn from(log: alloy::rpc::types::Log) -> Self {
		Self {
			address: log.inner.address,
			topics: log.inner.data.topics().to_vec(),
			data: log.inner.data.data.clone(),
			block_number: log.block_number,
			log_index: log.log_index,
			transaction_hash: log.transaction_hash,
		}
	}
}

/// One decoded event field
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedParam {
	pub name: String,
	/// Canonical Solidity type, e.g. `uint256`
	pub kind: String,
	pub indexed: bool,
	pub value: DynSolValue,
}

/// A log decoded against an event signature
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedLog {
	/// Event name, e.g. `BidMessagePassing`
	pub name: String,
	/// Canonical signature, e.g. `BidMessagePassing(address,uint256)`
	pub signature: String,
	/// Fields in declaration order
	pub params: Vec<DecodedParam>,
}

impl DecodedLog {
	/// Looks up a field value by name
	pub fn get(&self, name: &str) -> Option<&DynSolValue> {
		self.params
			.iter()
			.find(|param| param.name == name)
			.map(|param| &param.value)
	}

	/// Field names in declaration order
	pub fn field_names(&self) -> impl Iterator<Item = &str> {
		self.params.iter().map(|param| param.name.as_str())
	}
}
