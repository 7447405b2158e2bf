//! Ethereum Virtual Machine (EVM) blockchain specific implementations.
//!
//! This module contains the data structures the relay exchanges with EVM chains:
//! raw and decoded logs, receipts, and the transactions it has submitted.

mod log;
mod receipt;
mod transaction;

pub use log::{DecodedLog, DecodedParam, RawEvent};
pub use receipt::Receipt;
pub use transaction::{PendingTransaction, TransactionStatus};
