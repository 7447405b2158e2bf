//! ABI registry service.
//!
//! Resolves log topics to typed event signatures, decodes logs and encodes
//! contract calls for the two relay contracts.

mod error;
mod helpers;
mod registry;

pub use error::AbiError;
pub use helpers::{coerce_value, format_value};
pub use registry::{AbiRegistry, ContractRegistries, EventParam, EventSignature};
