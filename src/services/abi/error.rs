//! ABI error types and handling.

use log::error;
use thiserror::Error;

/// Errors raised while decoding logs or encoding calls
#[derive(Debug, Error)]
#[allow(clippy::enum_variant_names)]
pub enum AbiError {
	/// A log did not match the event it was decoded against
	#[error("Decode error: {0}")]
	DecodeError(String),

	/// A call could not be encoded for the requested method
	#[error("Encode error: {0}")]
	EncodeError(String),

	/// The ABI itself contains a type the relay cannot handle
	#[error("Invalid ABI: {0}")]
	InvalidAbi(String),
}

impl AbiError {
	/// Creates a new decode error with logging
	pub fn decode_error(msg: impl Into<String>) -> Self {
		let error = Self::DecodeError(msg.into());
		error!("{}", error);
		error
	}

	/// Creates a new encode error with logging
	pub fn encode_error(msg: impl Into<String>) -> Self {
		let error = Self::EncodeError(msg.into());
		error!("{}", error);
		error
	}

	/// Creates a new invalid ABI error with logging
	pub fn invalid_abi(msg: impl Into<String>) -> Self {
		let error = Self::InvalidAbi(msg.into());
		error!("{}", error);
		error
	}
}
