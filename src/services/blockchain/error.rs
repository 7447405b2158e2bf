//! Blockchain error types and handling.
//!
//! This module provides the error type for chain client operations: connecting
//! to a node, making RPC requests and submitting transactions.

use log::error;
use thiserror::Error;

/// Represents possible errors that can occur during blockchain operations
#[derive(Debug, Error)]
#[allow(clippy::enum_variant_names)]
pub enum BlockChainError {
	/// Errors related to network connectivity issues
	#[error("Connection error: {0}")]
	ConnectionError(String),

	/// Errors related to malformed requests or invalid responses
	#[error("Request error: {0}")]
	RequestError(String),

	/// The node rejected a signed transaction
	#[error("Submission error: {0}")]
	SubmissionError(String),

	/// Internal errors within the blockchain client
	#[error("Internal error: {0}")]
	InternalError(String),
}

impl BlockChainError {
	/// Creates a new connection error with logging
	pub fn connection_error(msg: impl Into<String>) -> Self {
		let error = Self::ConnectionError(msg.into());
		error!("{}", error);
		error
	}

	/// Creates a new request error with logging
	pub fn request_error(msg: impl Into<String>) -> Self {
		let error = Self::RequestError(msg.into());
		error!("{}", error);
		error
	}

	/// Creates a new submission error with logging
	pub fn submission_error(msg: impl Into<String>) -> Self {
		let error = Self::SubmissionError(msg.into());
		error!("{}", error);
		error
	}

	/// Creates a new internal error with logging
	pub fn internal_error(msg: impl Into<String>) -> Self {
		let error = Self::InternalError(msg.into());
		error!("{}", error);
		error
	}
}

/// Conversion from alloy RPC errors to BlockChainError
impl From<alloy::transports::TransportError> for BlockChainError {
	fn from(err: alloy::transports::TransportError) -> Self {
		Self::request_error(err.to_string())
	}
}
