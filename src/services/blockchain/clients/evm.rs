//! EVM chain client.

mod client;

pub use client::EvmChainClient;
