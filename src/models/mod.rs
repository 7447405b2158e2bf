//! Domain models and data structures for the relay.
//!
//! This module contains all the core data structures used throughout the application:
//!
//! - `blockchain`: EVM events, receipts and in-flight transactions
//! - `config`: Configuration loading and validation
//! - `core`: Core domain models (contract bindings, chain endpoints, relay rules)

mod blockchain;
mod config;
mod core;

// Re-export blockchain types
pub use blockchain::evm::{
	DecodedLog, DecodedParam, PendingTransaction, RawEvent, Receipt, TransactionStatus,
};

// Re-export core types
pub use core::{
	CallbackRule, ChainEndpoint, ContractBinding, ContractTag, RelayRule, TargetInvocation,
	TransportKind,
};

// Re-export config types
pub use config::{ChainConfig, ConfigError, ConfigLoader, RelayConfig, SecretValue};
