//! Blockchain-specific model implementations.
//!
//! Both sides of the relay are EVM chains, so this module only carries the EVM
//! submodule for logs, receipts and submitted transactions.

pub mod evm;
