//! Dispatch table service.
//!
//! Maps source event names to relay rules and extracts call arguments from
//! decoded logs.

mod error;
mod table;

pub use error::DispatchError;
pub use table::DispatchTable;
