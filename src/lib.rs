//! Cross-chain event relay.
//!
//! Watches a contract on a public EVM chain for events, and for every event that
//! matches a relay rule submits a corresponding transaction to a contract on a
//! private chain. Once that transaction is mined, selected events it emitted are
//! relayed back as callback transactions.
//!
//! # Architecture
//!
//! - `bootstrap`: Wires clients, registries and the engine from configuration
//! - `models`: Data structures for configuration, rules and chain data
//! - `services`: Chain clients, ABI registries, dispatch, receipt polling and the relay engine
//! - `utils`: Logging, metrics and shared constants

pub mod bootstrap;
pub mod models;
pub mod services;
pub mod utils;
