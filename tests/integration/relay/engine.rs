//! Integration tests for single relay attempts.
//!
//! Each test feeds one source log through `RelayEngine::process` against
//! mocked public and private nodes and checks the terminal state and the
//! transactions that reached each node.

use std::{
	sync::{Arc, Mutex},
	time::Duration,
};

use alloy::{
	consensus::Transaction,
	dyn_abi::DynSolValue,
	primitives::{keccak256, Address, Bytes, U256},
};
use cross_chain_relay::{
	models::{ContractTag, RawEvent, TransactionStatus},
	services::{
		blockchain::BlockChainError,
		receipt::PollerError,
		relay::{RelayError, RelayState},
	},
	utils::tests::builders::event::{RawEventBuilder, ReceiptBuilder},
};
use tokio::sync::watch;

use crate::integration::{
	common::{
		bid_event, bid_rule, build_engine, capture_submissions, decode_transaction,
		expected_bid_calldata, expected_callback_calldata, increment_log, BIDDER,
		PUBLIC_CONTRACT,
	},
	mocks::{MockChainClient, SlowChainClient},
};

const POLL: Duration = Duration::from_millis(50);
const TIMEOUT: Duration = Duration::from_secs(1);

/// A node that accepts transactions and mines them with the given logs
fn mining_node(logs: Vec<RawEvent>) -> (MockChainClient, Arc<Mutex<Vec<Bytes>>>) {
	let mut client = MockChainClient::new();
	client.expect_get_transaction_count().returning(|_| Ok(0));
	let submitted = capture_submissions(&mut client);
	client.expect_get_receipt().returning(move |hash| {
		let mut receipt = ReceiptBuilder::new().transaction_hash(hash).block_number(7);
		for log in &logs {
			receipt = receipt.log(log.clone());
		}
		Ok(Some(receipt.build()))
	});
	(client, submitted)
}

/// A node that must never be asked to send anything
fn idle_node() -> MockChainClient {
	let mut client = MockChainClient::new();
	client.expect_submit().never();
	client.expect_get_receipt().never();
	client
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_attempts_use_distinct_nonces() {
	let latency = Duration::from_millis(30);
	let public = SlowChainClient::new(latency, 0);
	let private = SlowChainClient::new(latency, 4);
	let private_txs = private.submissions();
	let engine = build_engine(public, private, &[bid_rule(false)], POLL, TIMEOUT);

	let (_tx, rx) = watch::channel(false);
	let (first, second) = tokio::join!(
		engine.process(bid_event(BIDDER, 1000, 10, 0), rx.clone()),
		engine.process(bid_event(BIDDER, 2000, 10, 1), rx.clone()),
	);
	assert!(matches!(first, Some(RelayState::NoCallback { .. })));
	assert!(matches!(second, Some(RelayState::NoCallback { .. })));

	let mut nonces: Vec<u64> = private_txs
		.lock()
		.unwrap()
		.iter()
		.map(|raw| decode_transaction(raw).nonce())
		.collect();
	nonces.sort();
	assert_eq!(nonces, vec![4, 5]);
}

#[tokio::test]
async fn test_bid_relayed_and_called_back() {
	let (private, private_txs) = mining_node(vec![increment_log(5)]);
	let (public, public_txs) = mining_node(vec![]);
	let engine = build_engine(public, private, &[bid_rule(true)], POLL, TIMEOUT);

	let (_tx, rx) = watch::channel(false);
	let state = engine
		.process(bid_event(BIDDER, 1000, 10, 0), rx)
		.await
		.unwrap();

	let RelayState::CallbackDispatched { tx_hash, callbacks } = state else {
		panic!("expected callback_dispatched, got {}", state);
	};

	let private_txs = private_txs.lock().unwrap();
	assert_eq!(private_txs.len(), 1);
	assert_eq!(tx_hash, keccak256(&private_txs[0]));
	assert_eq!(
		decode_transaction(&private_txs[0]).input(),
		&expected_bid_calldata(BIDDER, 1000)
	);

	let public_txs = public_txs.lock().unwrap();
	assert_eq!(public_txs.len(), 1);
	assert_eq!(
		decode_transaction(&public_txs[0]).input(),
		&expected_callback_calldata(5)
	);

	assert_eq!(callbacks.len(), 1);
	assert_eq!(callbacks[0].chain, ContractTag::Public);
	assert_eq!(callbacks[0].status, TransactionStatus::Mined);
	assert_eq!(callbacks[0].hash, keccak256(&public_txs[0]));
}

#[tokio::test]
async fn test_every_matching_receipt_log_gets_a_callback() {
	let (private, _) = mining_node(vec![increment_log(1), increment_log(2)]);
	let (public, public_txs) = mining_node(vec![]);
	let engine = build_engine(public, private, &[bid_rule(true)], POLL, TIMEOUT);

	let (_tx, rx) = watch::channel(false);
	let state = engine
		.process(bid_event(BIDDER, 1, 1, 0), rx)
		.await
		.unwrap();

	let RelayState::CallbackDispatched { callbacks, .. } = state else {
		panic!("expected callback_dispatched, got {}", state);
	};
	assert_eq!(callbacks.len(), 2);
	assert_eq!(callbacks[0].nonce, 0);
	assert_eq!(callbacks[1].nonce, 1);

	let inputs: Vec<Bytes> = public_txs
		.lock()
		.unwrap()
		.iter()
		.map(|raw| decode_transaction(raw).input().clone())
		.collect();
	assert_eq!(
		inputs,
		vec![expected_callback_calldata(1), expected_callback_calldata(2)]
	);
}

#[tokio::test]
async fn test_rule_without_callback_ends_after_mining() {
	let (private, private_txs) = mining_node(vec![increment_log(5)]);
	let engine = build_engine(idle_node(), private, &[bid_rule(false)], POLL, TIMEOUT);

	let (_tx, rx) = watch::channel(false);
	let state = engine
		.process(bid_event(BIDDER, 1000, 10, 0), rx)
		.await
		.unwrap();

	assert!(matches!(state, RelayState::NoCallback { .. }));
	assert_eq!(private_txs.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_receipt_without_callback_event() {
	let foreign_increment = RawEventBuilder::new()
		.address(Address::repeat_byte(0x77))
		.signature("Increment(uint256)")
		.data(vec![DynSolValue::Uint(U256::from(9), 256)])
		.build();
	let (private, _) = mining_node(vec![foreign_increment]);
	let engine = build_engine(idle_node(), private, &[bid_rule(true)], POLL, TIMEOUT);

	let (_tx, rx) = watch::channel(false);
	let state = engine
		.process(bid_event(BIDDER, 1000, 10, 0), rx)
		.await
		.unwrap();

	assert!(matches!(state, RelayState::NoCallback { .. }));
	assert!(!state.is_failure());
}

#[tokio::test(start_paused = true)]
async fn test_receipt_timeout_skips_callback() {
	let mut private = MockChainClient::new();
	private.expect_get_transaction_count().returning(|_| Ok(0));
	let _ = capture_submissions(&mut private);
	private.expect_get_receipt().returning(|_| Ok(None));
	let engine = build_engine(idle_node(), private, &[bid_rule(true)], POLL, TIMEOUT);

	let (_tx, rx) = watch::channel(false);
	let state = engine
		.process(bid_event(BIDDER, 1000, 10, 0), rx)
		.await
		.unwrap();

	let RelayState::ReceiptFailed { pending, error } = state else {
		panic!("expected receipt_failed, got {}", state);
	};
	assert_eq!(pending.status, TransactionStatus::Failed);
	assert!(matches!(
		error,
		RelayError::Receipt(PollerError::Timeout { .. })
	));
}

#[tokio::test]
async fn test_reverted_target_transaction() {
	let mut private = MockChainClient::new();
	private.expect_get_transaction_count().returning(|_| Ok(0));
	let _ = capture_submissions(&mut private);
	private.expect_get_receipt().returning(|hash| {
		Ok(Some(
			ReceiptBuilder::new()
				.transaction_hash(hash)
				.reverted()
				.log(increment_log(5))
				.build(),
		))
	});
	let engine = build_engine(idle_node(), private, &[bid_rule(true)], POLL, TIMEOUT);

	let (_tx, rx) = watch::channel(false);
	let state = engine
		.process(bid_event(BIDDER, 1000, 10, 0), rx)
		.await
		.unwrap();

	let RelayState::ReceiptFailed { pending, error } = state else {
		panic!("expected receipt_failed, got {}", state);
	};
	assert!(matches!(error, RelayError::Reverted(hash) if hash == pending.hash));
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_abandons_receipt_wait() {
	let mut private = MockChainClient::new();
	private.expect_get_transaction_count().returning(|_| Ok(0));
	let _ = capture_submissions(&mut private);
	private.expect_get_receipt().returning(|_| Ok(None));
	let engine = build_engine(idle_node(), private, &[bid_rule(true)], POLL, TIMEOUT);

	let (tx, rx) = watch::channel(false);
	tokio::spawn(async move {
		tokio::time::sleep(Duration::from_millis(120)).await;
		tx.send(true).unwrap();
	});

	let state = engine
		.process(bid_event(BIDDER, 1000, 10, 0), rx)
		.await
		.unwrap();
	assert!(matches!(
		state,
		RelayState::ReceiptFailed {
			error: RelayError::Receipt(PollerError::Cancelled(_)),
			..
		}
	));
}

#[tokio::test]
async fn test_rejected_submission() {
	let mut private = MockChainClient::new();
	private.expect_get_transaction_count().returning(|_| Ok(0));
	private
		.expect_submit()
		.returning(|_| Err(BlockChainError::submission_error("insufficient funds")));
	private.expect_get_receipt().never();
	let engine = build_engine(idle_node(), private, &[bid_rule(true)], POLL, TIMEOUT);

	let (_tx, rx) = watch::channel(false);
	let state = engine
		.process(bid_event(BIDDER, 1000, 10, 0), rx)
		.await
		.unwrap();

	assert!(matches!(
		state,
		RelayState::SubmitFailed {
			error: RelayError::Chain(BlockChainError::SubmissionError(_))
		}
	));
}

#[tokio::test]
async fn test_failed_callback_submission() {
	let (private, _) = mining_node(vec![increment_log(5)]);
	let mut public = MockChainClient::new();
	public.expect_get_transaction_count().returning(|_| Ok(0));
	public
		.expect_submit()
		.returning(|_| Err(BlockChainError::submission_error("replacement underpriced")));
	let engine = build_engine(public, private, &[bid_rule(true)], POLL, TIMEOUT);

	let (_tx, rx) = watch::channel(false);
	let state = engine
		.process(bid_event(BIDDER, 1000, 10, 0), rx)
		.await
		.unwrap();

	assert!(matches!(state, RelayState::CallbackFailed { .. }));
	assert_eq!(state.name(), "callback_failed");
}

#[tokio::test]
async fn test_malformed_source_log() {
	let engine = build_engine(
		idle_node(),
		idle_node(),
		&[bid_rule(true)],
		POLL,
		TIMEOUT,
	);
	let truncated = RawEventBuilder::new()
		.address(PUBLIC_CONTRACT)
		.signature("BidMessagePassing(address,uint256)")
		.raw_data(Bytes::from_static(&[0x01, 0x02, 0x03]))
		.position(3, 0)
		.build();

	let (_tx, rx) = watch::channel(false);
	let state = engine.process(truncated, rx).await.unwrap();
	assert!(matches!(
		state,
		RelayState::DecodeFailed {
			error: RelayError::Abi(_)
		}
	));
}

#[tokio::test]
async fn test_logs_without_a_rule_are_ignored() {
	let engine = build_engine(
		idle_node(),
		idle_node(),
		&[bid_rule(true)],
		POLL,
		TIMEOUT,
	);
	let (_tx, rx) = watch::channel(false);

	let foreign_contract = RawEventBuilder::new()
		.address(Address::repeat_byte(0x99))
		.signature("BidMessagePassing(address,uint256)")
		.data(vec![
			DynSolValue::Address(BIDDER),
			DynSolValue::Uint(U256::from(1), 256),
		])
		.build();
	assert!(engine.process(foreign_contract, rx.clone()).await.is_none());

	let unknown_topic = RawEventBuilder::new()
		.address(PUBLIC_CONTRACT)
		.signature("Transfer(address,address,uint256)")
		.build();
	assert!(engine.process(unknown_topic, rx.clone()).await.is_none());

	let without_rule = RawEventBuilder::new()
		.address(PUBLIC_CONTRACT)
		.signature("Unrelated(uint256)")
		.data(vec![DynSolValue::Uint(U256::from(1), 256)])
		.build();
	assert!(engine.process(without_rule, rx.clone()).await.is_none());

	let no_topics = RawEventBuilder::new().address(PUBLIC_CONTRACT).build();
	assert!(engine.process(no_topics, rx).await.is_none());
}

#[test]
fn test_event_filter_selects_ruled_events() {
	let engine = build_engine(
		idle_node(),
		idle_node(),
		&[bid_rule(true)],
		POLL,
		TIMEOUT,
	);

	let filter = engine.event_filter(Some(12));
	assert_eq!(filter.address, PUBLIC_CONTRACT);
	assert_eq!(
		filter.topics,
		vec![keccak256("BidMessagePassing(address,uint256)")]
	);
	assert_eq!(filter.from_block, Some(12));
	assert_eq!(engine.dispatch().len(), 1);
}

#[test]
fn test_match_event_does_not_touch_the_chain() {
	let engine = build_engine(
		idle_node(),
		idle_node(),
		&[bid_rule(true)],
		POLL,
		TIMEOUT,
	);

	let state = engine
		.match_event(&bid_event(BIDDER, 1000, 4, 1))
		.unwrap();
	let RelayState::EventMatched { decoded, rule, .. } = state else {
		panic!("expected event_matched");
	};
	assert_eq!(rule.target_method.name, "bid");
	assert_eq!(decoded.get("to"), Some(&DynSolValue::Address(BIDDER)));
	assert_eq!(
		decoded.get("value"),
		Some(&DynSolValue::Uint(U256::from(1000), 256))
	);
}
