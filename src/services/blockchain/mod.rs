//! Blockchain client interfaces and implementations.
//!
//! Provides the abstractions the relay uses to reach both chains:
//!
//! - Chain client trait and the EVM implementation
//! - Transaction signing and nonce management
//! - Error handling for blockchain operations

mod client;
mod clients;
mod error;
mod sender;

pub use client::{ChainClient, EventFilter, EventStream};
pub use clients::EvmChainClient;
pub use error::BlockChainError;
pub use sender::{GasSettings, SubmittedTransaction, TransactionSender};
