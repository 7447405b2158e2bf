//! Chain client implementations.
//!
//! Contains the EVM client used for both sides of the relay.

mod evm;

pub use evm::EvmChainClient;
