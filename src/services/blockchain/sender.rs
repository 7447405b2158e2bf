//! Signed transaction submission with serialised nonce allocation.
//!
//! Every relayed and callback transaction on a chain is signed by the same
//! account, so concurrent attempts share one nonce sequence. A sender holds an
//! async lock across nonce allocation, signing and submission. The cached nonce
//! is seeded from the node's pending count and only advances when the node
//! accepts a transaction; a rejection clears it so the next send resynchronises.

use std::sync::Arc;

use alloy::{
	consensus::{SignableTransaction, TxEnvelope, TxLegacy},
	eips::eip2718::Encodable2718,
	network::TxSignerSync,
	primitives::{Address, Bytes, TxHash, TxKind, U256},
	signers::local::PrivateKeySigner,
};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::{
	models::ContractTag,
	services::blockchain::{client::ChainClient, BlockChainError},
	utils::metrics::record_transaction_submitted,
};

/// Fee and gas settings for transactions built by a [`TransactionSender`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GasSettings {
	pub gas_limit: u64,
	/// Fixed legacy gas price in wei; queried per transaction when `None`
	pub gas_price: Option<u128>,
}

/// A transaction accepted by the node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmittedTransaction {
	pub hash: TxHash,
	pub nonce: u64,
}

/// Signs and submits transactions for one account on one chain
pub struct TransactionSender<C> {
	client: Arc<C>,
	signer: PrivateKeySigner,
	chain: ContractTag,
	chain_id: u64,
	gas: GasSettings,
	next_nonce: Mutex<Option<u64>>,
}

impl<C: ChainClient> TransactionSender<C> {
	/// Creates a sender, asking the node for its chain id
	pub async fn connect(
		client: Arc<C>,
		signer: PrivateKeySigner,
		chain: ContractTag,
		gas: GasSettings,
	) -> Result<Self, BlockChainError> {
		let chain_id = client.get_chain_id().await?;
		Ok(Self::new(client, signer, chain, chain_id, gas))
	}

	pub fn new(
		client: Arc<C>,
		signer: PrivateKeySigner,
		chain: ContractTag,
		chain_id: u64,
		gas: GasSettings,
	) -> Self {
		Self {
			client,
			signer,
			chain,
			chain_id,
			gas,
			next_nonce: Mutex::new(None),
		}
	}

	/// Address transactions are sent from
	pub fn address(&self) -> Address {
		self.signer.address()
	}

	pub fn chain(&self) -> ContractTag {
		self.chain
	}

	/// Signs a call to `to` with the next nonce and submits it
	///
	/// # Arguments
	/// * `to` - Contract being called
	/// * `input` - ABI-encoded calldata, selector included
	///
	/// # Returns
	/// * `Result<SubmittedTransaction, BlockChainError>` - Hash and nonce of the
	///   accepted transaction
	pub async fn send(
		&self,
		to: Address,
		input: Bytes,
	) -> Result<SubmittedTransaction, BlockChainError> {
		let mut next_nonce = self.next_nonce.lock().await;

		let nonce = match *next_nonce {
			Some(nonce) => nonce,
			None => self.client.get_transaction_count(self.address()).await?,
		};
		let gas_price = match self.gas.gas_price {
			Some(price) => price,
			None => self.client.get_gas_price().await?,
		};

		let raw = self.sign(to, input, nonce, gas_price)?;

		match self.client.submit(raw).await {
			Ok(hash) => {
				*next_nonce = Some(nonce + 1);
				record_transaction_submitted(&self.chain.to_string());
				info!(chain = %self.chain, %hash, nonce, "transaction submitted");
				Ok(SubmittedTransaction { hash, nonce })
			}
			Err(e) => {
				*next_nonce = None;
				debug!(chain = %self.chain, nonce, "nonce cache cleared after rejected submission");
				Err(e)
			}
		}
	}

	/// Builds and signs an EIP-155 legacy transaction
	fn sign(
		&self,
		to: Address,
		input: Bytes,
		nonce: u64,
		gas_price: u128,
	) -> Result<Bytes, BlockChainError> {
		let mut tx = TxLegacy {
			chain_id: Some(self.chain_id),
			nonce,
			gas_price,
			gas_limit: self.gas.gas_limit,
			to: TxKind::Call(to),
			value: U256::ZERO,
			input,
		};

		let signature = self.signer.sign_transaction_sync(&mut tx).map_err(|e| {
			BlockChainError::internal_error(format!("failed to sign transaction: {}", e))
		})?;

		let envelope = TxEnvelope::from(tx.into_signed(signature));
		Ok(Bytes::from(envelope.encoded_2718()))
	}
}
