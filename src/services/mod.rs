//! Core services implementing the relay.
//!
//! - `abi`: Event and function lookups, log decoding and call encoding
//! - `blockchain`: Chain clients and transaction submission
//! - `dispatch`: Relay rules and parameter projection
//! - `receipt`: Receipt polling
//! - `relay`: The relay engine and its attempt states

pub mod abi;
pub mod blockchain;
pub mod dispatch;
pub mod receipt;
pub mod relay;
