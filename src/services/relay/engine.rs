//! The relay engine.
//!
//! Follows the public contract's events and drives one attempt per matching
//! event through the relay states: submit the target call on the private chain,
//! wait for its receipt, then send a callback for every receipt log the rule
//! selects. Attempts run concurrently and may finish out of order. A failed
//! attempt is logged and dropped without affecting the subscription.

use std::{sync::Arc, time::Duration};

use backon::{ExponentialBuilder, Retryable};
use futures::StreamExt;
use tokio::{sync::watch, task::JoinSet};
use tracing::{debug, error, info, info_span, instrument, warn, Instrument};
use uuid::Uuid;

use crate::{
	models::{
		ContractBinding, ContractTag, DecodedLog, PendingTransaction, RawEvent, Receipt,
		RelayRule, TargetInvocation,
	},
	services::{
		abi::{AbiRegistry, ContractRegistries},
		blockchain::{ChainClient, EventFilter, EventStream, TransactionSender},
		dispatch::{DispatchError, DispatchTable},
		receipt::ReceiptPoller,
		relay::{error::RelayError, state::RelayState},
	},
	utils::{
		constants::{MAX_RESUBSCRIBE_ATTEMPTS, MAX_RESUBSCRIBE_DELAY_MS},
		metrics::{
			record_attempt_finished, ATTEMPTS_IN_FLIGHT, EVENTS_IGNORED, EVENTS_MATCHED,
			SUBSCRIPTIONS_OPENED,
		},
	},
};

/// Everything the engine needs to act on one chain
pub struct ChainHandle<C> {
	pub binding: ContractBinding,
	pub client: Arc<C>,
	pub sender: TransactionSender<C>,
	pub poller: ReceiptPoller<C>,
}

impl<C: ChainClient> ChainHandle<C> {
	pub fn new(
		binding: ContractBinding,
		client: Arc<C>,
		sender: TransactionSender<C>,
		poller: ReceiptPoller<C>,
	) -> Self {
		Self {
			binding,
			client,
			sender,
			poller,
		}
	}
}

/// Drives relay attempts from source events to callbacks
pub struct RelayEngine<C> {
	public: ChainHandle<C>,
	private: ChainHandle<C>,
	registries: ContractRegistries,
	dispatch: DispatchTable,
	/// First source block to replay on the initial subscription
	from_block: Option<u64>,
}

impl<C: ChainClient + 'static> RelayEngine<C> {
	/// Builds the engine and validates the rules against both ABIs
	///
	/// # Errors
	/// Returns `DispatchError::InvalidRule` for the first rule that does not
	/// agree with the contract ABIs.
	pub fn new(
		public: ChainHandle<C>,
		private: ChainHandle<C>,
		rules: &[RelayRule],
	) -> Result<Self, DispatchError> {
		let registries = ContractRegistries::new(
			AbiRegistry::new(&public.binding.abi),
			AbiRegistry::new(&private.binding.abi),
		);
		let dispatch = DispatchTable::new(rules, &registries)?;

		Ok(Self {
			public,
			private,
			registries,
			dispatch,
			from_block: None,
		})
	}

	pub fn with_from_block(mut self, from_block: Option<u64>) -> Self {
		self.from_block = from_block;
		self
	}

	pub fn registries(&self) -> &ContractRegistries {
		&self.registries
	}

	pub fn dispatch(&self) -> &DispatchTable {
		&self.dispatch
	}

	fn side(&self, tag: ContractTag) -> &ChainHandle<C> {
		match tag {
			ContractTag::Public => &self.public,
			ContractTag::Private => &self.private,
		}
	}

	/// Filter for the source events that have a rule
	pub fn event_filter(&self, from_block: Option<u64>) -> EventFilter {
		let mut topics: Vec<_> = self
			.dispatch
			.event_names()
			.filter_map(|name| self.registries.public.event_by_name(name))
			.map(|signature| signature.topic)
			.collect();
		topics.sort();

		EventFilter::new(self.public.binding.address)
			.with_topics(topics)
			.with_from_block(from_block)
	}

	/// Starts an attempt if `raw` is a source event with a rule
	///
	/// Returns `None` for logs of other contracts, unknown topics and events
	/// without a rule. A known event whose log fails to decode yields
	/// `DecodeFailed`.
	pub fn match_event(&self, raw: &RawEvent) -> Option<RelayState> {
		if raw.address != self.public.binding.address {
			return None;
		}

		let signature = match raw
			.topic0()
			.and_then(|topic| self.registries.public.resolve_event(topic))
		{
			Some(signature) => signature,
			None => {
				debug!(topic = ?raw.topic0(), "ignoring log with unknown topic");
				return None;
			}
		};

		let rule = match self.dispatch.rule_for(&signature.name) {
			Some(rule) => rule,
			None => {
				debug!(event = %signature.name, "ignoring event without a relay rule");
				return None;
			}
		};

		Some(match self.registries.public.decode_log(signature, raw) {
			Ok(decoded) => RelayState::EventMatched {
				event: raw.clone(),
				decoded,
				rule,
			},
			Err(e) => RelayState::DecodeFailed { error: e.into() },
		})
	}

	/// Performs one transition
	///
	/// Terminal states are returned unchanged.
	pub async fn step(
		&self,
		state: RelayState,
		shutdown: &mut watch::Receiver<bool>,
	) -> RelayState {
		match state {
			RelayState::EventMatched { decoded, rule, .. } => {
				match self
					.invoke(ContractTag::Private, &rule.target_method, &decoded, &rule)
					.await
				{
					Ok(pending) => RelayState::TxSubmitted { pending },
					Err(error) => RelayState::SubmitFailed { error },
				}
			}
			RelayState::TxSubmitted { mut pending } => {
				match self.await_mined(&pending, shutdown).await {
					Ok(receipt) => {
						pending.mark_mined();
						RelayState::TxMined { pending, receipt }
					}
					Err(error) => {
						pending.mark_failed();
						RelayState::ReceiptFailed { pending, error }
					}
				}
			}
			RelayState::TxMined { pending, receipt } => {
				self.dispatch_callbacks(pending, receipt, shutdown).await
			}
			terminal => terminal,
		}
	}

	/// Runs one source event through to a terminal state
	///
	/// # Returns
	/// * `Some(RelayState)` - The terminal state of the attempt
	/// * `None` - The event did not start an attempt
	pub async fn process(
		&self,
		raw: RawEvent,
		mut shutdown: watch::Receiver<bool>,
	) -> Option<RelayState> {
		let mut state = match self.match_event(&raw) {
			Some(state) => state,
			None => {
				EVENTS_IGNORED.inc();
				return None;
			}
		};
		EVENTS_MATCHED.inc();

		let attempt = Uuid::new_v4();
		let span = info_span!(
			"attempt",
			id = %attempt,
			source_tx = ?raw.transaction_hash,
			block = ?raw.block_number,
			log_index = ?raw.log_index,
		);

		async {
			let _in_flight = InFlightGuard::enter();
			while !state.is_terminal() {
				debug!(state = %state, "advancing attempt");
				state = self.step(state, &mut shutdown).await;
			}
			report(&state);
			Some(state)
		}
		.instrument(span)
		.await
	}

	/// Follows the source contract until shutdown
	///
	/// When the subscription ends it is reopened from the last observed block;
	/// logs at or before the last processed position are skipped. A subscription
	/// that ends before delivering a positioned log is reopened from the head
	/// block read when it was opened. On shutdown
	/// the engine stops taking events and waits for in-flight attempts, whose
	/// receipt waits are cancelled.
	///
	/// # Errors
	/// Returns `RelayError::SubscriptionError` when the subscription cannot be
	/// reopened after repeated attempts.
	#[instrument(skip_all, fields(contract = %self.public.binding.address))]
	pub async fn run(self: Arc<Self>, mut shutdown: watch::Receiver<bool>) -> Result<(), RelayError> {
		let mut attempts = JoinSet::new();
		let mut last_position: Option<(u64, u64)> = None;
		let mut from_block = self.from_block;
		let mut result = Ok(());

		'subscription: loop {
			if *shutdown.borrow() {
				break;
			}

			if let Some((block, _)) = last_position {
				from_block = Some(block);
			}
			let filter = self.event_filter(from_block);

			let mut events = tokio::select! {
				opened = self.open(&filter) => match opened {
					Ok((events, head)) => {
						from_block = from_block.or(head);
						events
					}
					Err(e) => {
						result = Err(e);
						break;
					}
				},
				_ = shutdown_requested(&mut shutdown) => break,
			};
			info!(from_block = ?filter.from_block, "listening for source events");

			loop {
				tokio::select! {
					biased;
					_ = shutdown_requested(&mut shutdown) => break 'subscription,
					Some(finished) = attempts.join_next(), if !attempts.is_empty() => {
						if let Err(e) = finished {
							error!(error = %e, "relay attempt task failed");
						}
					}
					next = events.next() => match next {
						Some(raw) => {
							if let Some(position) = position_of(&raw) {
								if last_position.is_some_and(|last| position <= last) {
									debug!(?position, "skipping replayed log");
									continue;
								}
								last_position = Some(position);
							}
							let engine = Arc::clone(&self);
							let shutdown = shutdown.clone();
							attempts.spawn(async move {
								engine.process(raw, shutdown).await;
							});
						}
						None => {
							warn!("source subscription ended, resubscribing");
							continue 'subscription;
						}
					}
				}
			}
		}

		if !attempts.is_empty() {
			info!(in_flight = attempts.len(), "waiting for in-flight attempts");
		}
		while let Some(finished) = attempts.join_next().await {
			if let Err(e) = finished {
				error!(error = %e, "relay attempt task failed");
			}
		}
		info!("relay stopped");
		result
	}

	/// Opens the source subscription
	///
	/// A subscription starting at the latest block also returns the head block
	/// read just before it opened.
	async fn open(&self, filter: &EventFilter) -> Result<(EventStream, Option<u64>), RelayError> {
		let head = match filter.from_block {
			Some(_) => None,
			None => match self.public.client.get_block_number().await {
				Ok(head) => Some(head),
				Err(e) => {
					warn!(error = %e, "failed to read the source head block");
					None
				}
			},
		};
		Ok((self.subscribe(filter).await?, head))
	}

	/// Opens the source subscription, retrying with exponential backoff
	async fn subscribe(&self, filter: &EventFilter) -> Result<EventStream, RelayError> {
		let backoff = ExponentialBuilder::default()
			.with_min_delay(Duration::from_millis(500))
			.with_max_delay(Duration::from_millis(MAX_RESUBSCRIBE_DELAY_MS))
			.with_max_times(MAX_RESUBSCRIBE_ATTEMPTS);

		let client = &self.public.client;
		let events = (|| async { client.subscribe(filter).await })
			.retry(backoff)
			.notify(|e, delay| {
				warn!(error = %e, ?delay, "source subscription failed, retrying");
			})
			.await
			.map_err(|e| RelayError::subscription_error(e.to_string()))?;

		SUBSCRIPTIONS_OPENED.inc();
		Ok(events)
	}

	/// Projects, encodes, signs and submits a call to the contract on `tag`
	async fn invoke(
		&self,
		tag: ContractTag,
		invocation: &TargetInvocation,
		decoded: &DecodedLog,
		rule: &Arc<RelayRule>,
	) -> Result<PendingTransaction, RelayError> {
		let args = DispatchTable::project_params(decoded, &invocation.params)?;
		let input = self
			.registries
			.for_tag(tag)
			.encode_call(&invocation.name, &args)?;

		let side = self.side(tag);
		let submitted = side.sender.send(side.binding.address, input).await?;
		info!(
			chain = %tag,
			method = %invocation.name,
			hash = %submitted.hash,
			nonce = submitted.nonce,
			"call submitted"
		);

		Ok(PendingTransaction::new(
			submitted.hash,
			submitted.nonce,
			tag,
			Arc::clone(rule),
		))
	}

	/// Waits for a successful receipt of `pending`
	async fn await_mined(
		&self,
		pending: &PendingTransaction,
		shutdown: &mut watch::Receiver<bool>,
	) -> Result<Receipt, RelayError> {
		let receipt = self
			.side(pending.chain)
			.poller
			.await_receipt(pending.hash, shutdown)
			.await?;

		if !receipt.succeeded() {
			return Err(RelayError::reverted(pending.hash));
		}
		debug!(hash = %pending.hash, block = ?receipt.block_number, "transaction mined");
		Ok(receipt)
	}

	/// Sends a callback for each receipt log selected by the rule
	///
	/// Only logs emitted by the private contract are considered. Callbacks are
	/// sent in log order and each is awaited before the next; the first failure
	/// ends the attempt.
	async fn dispatch_callbacks(
		&self,
		pending: PendingTransaction,
		receipt: Receipt,
		shutdown: &mut watch::Receiver<bool>,
	) -> RelayState {
		let tx_hash = pending.hash;
		let rule = pending.rule;
		if rule.callback.is_none() {
			return RelayState::NoCallback { tx_hash };
		}

		let private = &self.registries.private;
		let mut callbacks = Vec::new();

		for log in receipt
			.logs
			.iter()
			.filter(|log| log.address == self.private.binding.address)
		{
			let Some(signature) = log.topic0().and_then(|topic| private.resolve_event(topic))
			else {
				continue;
			};
			let Some(callback) = DispatchTable::callback_for(&rule, &signature.name) else {
				continue;
			};

			let decoded = match private.decode_log(signature, log) {
				Ok(decoded) => decoded,
				Err(e) => return RelayState::DecodeFailed { error: e.into() },
			};

			let mut callback_tx = match self
				.invoke(callback.target, &callback.invocation(), &decoded, &rule)
				.await
			{
				Ok(callback_tx) => callback_tx,
				Err(error) => return RelayState::CallbackFailed { tx_hash, error },
			};

			match self.await_mined(&callback_tx, shutdown).await {
				Ok(_) => {
					callback_tx.mark_mined();
					callbacks.push(callback_tx);
				}
				Err(error) => return RelayState::CallbackFailed { tx_hash, error },
			}
		}

		if callbacks.is_empty() {
			RelayState::NoCallback { tx_hash }
		} else {
			RelayState::CallbackDispatched { tx_hash, callbacks }
		}
	}
}

/// Resolves once shutdown is requested or the sender is gone
async fn shutdown_requested(shutdown: &mut watch::Receiver<bool>) {
	let _ = shutdown.wait_for(|stop| *stop).await;
}

/// Counts an attempt as in flight until dropped
struct InFlightGuard;

impl InFlightGuard {
	fn enter() -> Self {
		ATTEMPTS_IN_FLIGHT.inc();
		Self
	}
}

impl Drop for InFlightGuard {
	fn drop(&mut self) {
		ATTEMPTS_IN_FLIGHT.dec();
	}
}

/// Position of a log in chain order
fn position_of(raw: &RawEvent) -> Option<(u64, u64)> {
	Some((raw.block_number?, raw.log_index?))
}

/// Logs and counts a terminal state
fn report(state: &RelayState) {
	record_attempt_finished(state.name());
	match state {
		RelayState::CallbackDispatched { tx_hash, callbacks } => {
			let hashes: Vec<String> = callbacks.iter().map(|cb| cb.hash.to_string()).collect();
			info!(outcome = %state, tx = %tx_hash, callbacks = ?hashes, "relay attempt finished");
		}
		RelayState::NoCallback { tx_hash } => {
			info!(outcome = %state, tx = %tx_hash, "relay attempt finished");
		}
		RelayState::ReceiptFailed { pending, error } => {
			error!(outcome = %state, tx = %pending.hash, nonce = pending.nonce, error = %error, "relay attempt failed");
		}
		RelayState::CallbackFailed { tx_hash, error } => {
			error!(outcome = %state, tx = %tx_hash, error = %error, "relay attempt failed");
		}
		RelayState::SubmitFailed { error } | RelayState::DecodeFailed { error } => {
			error!(outcome = %state, error = %error, "relay attempt failed");
		}
		other => warn!(outcome = %other, "attempt reported before reaching a terminal state"),
	}
}
