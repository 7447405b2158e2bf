//! Relay engine service.
//!
//! Contains the attempt state machine and the engine that runs it for every
//! matching source event.

mod engine;
mod error;
mod state;

pub use engine::{ChainHandle, RelayEngine};
pub use error::RelayError;
pub use state::RelayState;
