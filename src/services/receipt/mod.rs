//! Receipt poller service.

mod error;
mod poller;

pub use error::PollerError;
pub use poller::ReceiptPoller;
