//! Relay error types and handling.

use alloy::primitives::TxHash;
use log::error;
use thiserror::Error;

use crate::services::{
	abi::AbiError, blockchain::BlockChainError, dispatch::DispatchError, receipt::PollerError,
};

/// Errors that end a relay attempt or the relay itself
#[derive(Debug, Error)]
pub enum RelayError {
	#[error(transparent)]
	Abi(#[from] AbiError),

	#[error(transparent)]
	Dispatch(#[from] DispatchError),

	#[error(transparent)]
	Chain(#[from] BlockChainError),

	#[error(transparent)]
	Receipt(#[from] PollerError),

	/// The transaction was mined but execution failed
	#[error("Transaction {0} reverted")]
	Reverted(TxHash),

	/// The source subscription could not be (re)established
	#[error("Subscription error: {0}")]
	SubscriptionError(String),
}

impl RelayError {
	/// Creates a new reverted error with logging
	pub fn reverted(hash: TxHash) -> Self {
		let error = Self::Reverted(hash);
		error!("{}", error);
		error
	}

	/// Creates a new subscription error with logging
	pub fn subscription_error(msg: impl Into<String>) -> Self {
		let error = Self::SubscriptionError(msg.into());
		error!("{}", error);
		error
	}
}
