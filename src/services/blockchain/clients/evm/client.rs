//! EVM-compatible chain client implementation.
//!
//! Wraps an alloy provider connected over HTTP or WebSocket. Log subscriptions
//! use `eth_subscribe` on WebSocket endpoints and a polled `eth_newFilter`
//! filter on HTTP endpoints; both are exposed as the same stream.

use std::time::Duration;

use alloy::{
	primitives::{Address, Bytes, TxHash},
	providers::{DynProvider, Provider, ProviderBuilder},
};
use async_trait::async_trait;
use futures::{stream, StreamExt};
use tracing::{debug, instrument};

use crate::{
	models::{ChainEndpoint, RawEvent, Receipt, TransportKind},
	services::blockchain::{
		client::{ChainClient, EventFilter, EventStream},
		BlockChainError,
	},
};

/// Client for an EVM-compatible node
#[derive(Clone)]
pub struct EvmChainClient {
	provider: DynProvider,
	endpoint: ChainEndpoint,
	/// Interval between `eth_getFilterChanges` calls on HTTP endpoints
	poll_interval: Duration,
}

impl EvmChainClient {
	/// Connects to the endpoint and checks it answers
	///
	/// # Arguments
	/// * `endpoint` - RPC URL and transport kind
	/// * `poll_interval` - Filter polling interval for HTTP subscriptions
	///
	/// # Returns
	/// * `Result<Self, BlockChainError>` - A connected client or connection error
	pub async fn connect(
		endpoint: &ChainEndpoint,
		poll_interval: Duration,
	) -> Result<Self, BlockChainError> {
		let provider = ProviderBuilder::new()
			.connect(&endpoint.url)
			.await
			.map_err(|e| {
				BlockChainError::connection_error(format!(
					"failed to connect to {}: {}",
					endpoint.url, e
				))
			})?
			.erased();

		let chain_id = provider.get_chain_id().await.map_err(|e| {
			BlockChainError::connection_error(format!("{} did not answer: {}", endpoint.url, e))
		})?;
		debug!(url = %endpoint.url, chain_id, "connected to node");

		Ok(Self::new_with_provider(provider, endpoint.clone(), poll_interval))
	}

	/// Creates a client around an existing provider
	pub fn new_with_provider(
		provider: DynProvider,
		endpoint: ChainEndpoint,
		poll_interval: Duration,
	) -> Self {
		Self {
			provider,
			endpoint,
			poll_interval,
		}
	}

	pub fn endpoint(&self) -> &ChainEndpoint {
		&self.endpoint
	}

	/// Logs already on chain from `filter.from_block` onwards
	async fn backfill(&self, filter: &EventFilter) -> Result<Vec<RawEvent>, BlockChainError> {
		if filter.from_block.is_none() {
			return Ok(Vec::new());
		}
		let logs = self.provider.get_logs(&filter.to_rpc_filter()).await?;
		debug!(count = logs.len(), from_block = ?filter.from_block, "backfilled logs");
		Ok(logs.into_iter().map(RawEvent::from).collect())
	}
}

#[async_trait]
impl ChainClient for EvmChainClient {
	#[instrument(skip(self), fields(url = %self.endpoint.url))]
	async fn subscribe(&self, filter: &EventFilter) -> Result<EventStream, BlockChainError> {
		// The live subscription only carries new logs, so history is fetched
		// separately. It is opened first so nothing falls between the two.
		let live_filter = EventFilter {
			from_block: None,
			..filter.clone()
		}
		.to_rpc_filter();

		let live: EventStream = match self.endpoint.transport {
			TransportKind::Ws => {
				let subscription = self.provider.subscribe_logs(&live_filter).await?;
				subscription.into_stream().map(RawEvent::from).boxed()
			}
			TransportKind::Http => {
				let poller = self.provider.watch_logs(&live_filter).await?;
				poller
					.with_poll_interval(self.poll_interval)
					.into_stream()
					.flat_map(stream::iter)
					.map(RawEvent::from)
					.boxed()
			}
		};

		let history = self.backfill(filter).await?;
		Ok(stream::iter(history).chain(live).boxed())
	}

	async fn submit(&self, raw_transaction: Bytes) -> Result<TxHash, BlockChainError> {
		let pending = self
			.provider
			.send_raw_transaction(&raw_transaction)
			.await
			.map_err(|e| BlockChainError::submission_error(e.to_string()))?;
		Ok(*pending.tx_hash())
	}

	async fn get_receipt(&self, hash: TxHash) -> Result<Option<Receipt>, BlockChainError> {
		let receipt = self.provider.get_transaction_receipt(hash).await?;
		Ok(receipt.map(Receipt::from))
	}

	async fn get_transaction_count(&self, address: Address) -> Result<u64, BlockChainError> {
		Ok(self.provider.get_transaction_count(address).pending().await?)
	}

	async fn get_chain_id(&self) -> Result<u64, BlockChainError> {
		Ok(self.provider.get_chain_id().await?)
	}

	async fn get_block_number(&self) -> Result<u64, BlockChainError> {
		Ok(self.provider.get_block_number().await?)
	}

	async fn get_gas_price(&self) -> Result<u128, BlockChainError> {
		Ok(self.provider.get_gas_price().await?)
	}
}
