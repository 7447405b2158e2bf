//! Bounded, cancellable receipt polling.

use std::{pin::Pin, sync::Arc, time::Duration};

use alloy::primitives::TxHash;
use tokio::{
	sync::watch,
	time::{interval, sleep, MissedTickBehavior, Sleep},
};
use tracing::{instrument, trace, warn};

use crate::{
	models::Receipt,
	services::{blockchain::ChainClient, receipt::error::PollerError},
};

/// Turns a transaction hash into a mined receipt
pub struct ReceiptPoller<C> {
	client: Arc<C>,
	poll_interval: Duration,
	timeout: Duration,
}

impl<C: ChainClient> ReceiptPoller<C> {
	/// Creates a poller
	///
	/// # Arguments
	/// * `client` - Client of the chain the transactions were sent to
	/// * `poll_interval` - Delay between receipt lookups
	/// * `timeout` - Deadline measured from the start of each wait
	pub fn new(client: Arc<C>, poll_interval: Duration, timeout: Duration) -> Self {
		Self {
			client,
			poll_interval,
			timeout,
		}
	}

	pub fn poll_interval(&self) -> Duration {
		self.poll_interval
	}

	pub fn timeout(&self) -> Duration {
		self.timeout
	}

	/// Polls until the receipt of `hash` is available
	///
	/// The first lookup happens immediately. Lookup errors are logged and
	/// polling continues until the deadline. A `true` on `shutdown`, or the
	/// shutdown sender being dropped, ends the wait. Both the deadline and
	/// shutdown also interrupt a lookup that is still in progress.
	///
	/// # Errors
	/// * `PollerError::Timeout` - no receipt before the deadline
	/// * `PollerError::Cancelled` - shutdown was requested
	#[instrument(skip(self, shutdown))]
	pub async fn await_receipt(
		&self,
		hash: TxHash,
		shutdown: &mut watch::Receiver<bool>,
	) -> Result<Receipt, PollerError> {
		if *shutdown.borrow() {
			return Err(PollerError::cancelled(hash));
		}

		let deadline = sleep(self.timeout);
		tokio::pin!(deadline);

		let mut ticker = interval(self.poll_interval);
		ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

		loop {
			let lookup = async {
				ticker.tick().await;
				self.client.get_receipt(hash).await
			};

			tokio::select! {
				biased;
				error = interrupted(hash, self.timeout, deadline.as_mut(), shutdown) => {
					return Err(error);
				}
				lookup = lookup => match lookup {
					Ok(Some(receipt)) => return Ok(receipt),
					Ok(None) => trace!(%hash, "receipt not available yet"),
					Err(e) => warn!(%hash, error = %e, "receipt lookup failed, retrying"),
				},
			}
		}
	}
}

/// Resolves with the error that ends a wait: the deadline or a shutdown
async fn interrupted(
	hash: TxHash,
	timeout: Duration,
	deadline: Pin<&mut Sleep>,
	shutdown: &mut watch::Receiver<bool>,
) -> PollerError {
	tokio::select! {
		biased;
		_ = deadline => PollerError::timeout(hash, timeout),
		_ = shutdown.wait_for(|stop| *stop) => PollerError::cancelled(hash),
	}
}
