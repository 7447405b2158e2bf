//! Core domain models for the relay.
//!
//! This module contains the fundamental data structures that represent:
//! - Chains: RPC endpoints and the contracts bound on each side of the relay
//! - Rules: How a source event is turned into a target call and its callback

mod chain;
mod rule;

pub use chain::{ChainEndpoint, ContractBinding, ContractTag, TransportKind};
pub use rule::{CallbackRule, RelayRule, TargetInvocation};
