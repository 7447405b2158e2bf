//! Bootstrap module for wiring the relay from its configuration.
//!
//! Turns a loaded [`RelayConfig`] into connected chain clients, a transaction
//! sender and receipt poller per chain, and the relay engine holding the
//! validated rule set.
//!
//! - `initialize_engine`: Connects to both RPC endpoints and builds the engine
//! - `create_engine`: Builds the engine around already constructed clients

use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use crate::{
	models::{ContractTag, RelayConfig},
	services::{
		blockchain::{ChainClient, EvmChainClient, GasSettings, TransactionSender},
		receipt::ReceiptPoller,
		relay::{ChainHandle, RelayEngine},
	},
};

/// Type alias for the engine used by the binary
pub type EvmRelayEngine = RelayEngine<EvmChainClient>;

/// Connects to both chains and builds the relay engine
///
/// # Errors
/// Returns an error if an endpoint cannot be reached, the signing key or an ABI
/// cannot be loaded, or a relay rule does not match the ABIs.
pub async fn initialize_engine(config: &RelayConfig) -> anyhow::Result<EvmRelayEngine> {
	let public = connect(config, ContractTag::Public).await?;
	let private = connect(config, ContractTag::Private).await?;
	create_engine(config, public, private).await
}

async fn connect(config: &RelayConfig, tag: ContractTag) -> anyhow::Result<Arc<EvmChainClient>> {
	let endpoint = config.chain(tag).endpoint()?;
	let client = EvmChainClient::connect(&endpoint, config.poll_interval())
		.await
		.with_context(|| format!("failed to connect to the {} chain", tag))?;
	info!(chain = %tag, url = %endpoint.url, transport = ?endpoint.transport, "chain client ready");
	Ok(Arc::new(client))
}

/// Builds the relay engine around the given chain clients
///
/// Each chain gets its own sender, seeded with the node's chain id, and a
/// receipt poller using the configured interval and timeout.
pub async fn create_engine<C: ChainClient + 'static>(
	config: &RelayConfig,
	public_client: Arc<C>,
	private_client: Arc<C>,
) -> anyhow::Result<RelayEngine<C>> {
	let public = create_chain_handle(config, ContractTag::Public, public_client).await?;
	let private = create_chain_handle(config, ContractTag::Private, private_client).await?;

	let engine = RelayEngine::new(public, private, &config.rules)
		.context("relay rules do not match the contract ABIs")?
		.with_from_block(config.from_block);

	info!(rules = engine.dispatch().len(), "relay engine initialized");
	Ok(engine)
}

async fn create_chain_handle<C: ChainClient + 'static>(
	config: &RelayConfig,
	tag: ContractTag,
	client: Arc<C>,
) -> anyhow::Result<ChainHandle<C>> {
	let chain = config.chain(tag);
	let binding = config.binding(tag)?;
	let signer = config.signing_key.to_signer()?;

	let gas = GasSettings {
		gas_limit: chain.gas_limit,
		gas_price: chain.gas_price_wei,
	};
	let sender = TransactionSender::connect(Arc::clone(&client), signer, tag, gas)
		.await
		.with_context(|| format!("failed to read the chain id of the {} chain", tag))?;
	info!(chain = %tag, account = %sender.address(), contract = %binding.address, "sender ready");

	let poller = ReceiptPoller::new(
		Arc::clone(&client),
		config.poll_interval(),
		config.receipt_timeout(),
	);

	Ok(ChainHandle::new(binding, client, sender, poller))
}
