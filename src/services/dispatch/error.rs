//! Dispatch error types and handling.

use log::error;
use thiserror::Error;

/// Errors raised while validating relay rules or projecting parameters
#[derive(Debug, Error)]
pub enum DispatchError {
	/// A rule named a field the decoded event does not carry
	#[error("Missing field: {0}")]
	MissingField(String),

	/// A rule does not agree with the contract ABIs
	#[error("Invalid rule: {0}")]
	InvalidRule(String),
}

impl DispatchError {
	/// Creates a new missing field error with logging
	pub fn missing_field(msg: impl Into<String>) -> Self {
		let error = Self::MissingField(msg.into());
		error!("{}", error);
		error
	}

	/// Creates a new invalid rule error with logging
	pub fn invalid_rule(msg: impl Into<String>) -> Self {
		let error = Self::InvalidRule(msg.into());
		error!("{}", error);
		error
	}
}
