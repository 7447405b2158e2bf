//! Integration tests for the transaction sender.
//!
//! Covers nonce allocation under concurrency, resynchronisation after a
//! rejected submission and the shape of the signed transaction.

use std::{sync::Arc, time::Duration};

use alloy::{
	consensus::Transaction,
	primitives::{Bytes, TxKind},
};
use cross_chain_relay::{
	models::ContractTag,
	services::blockchain::{BlockChainError, GasSettings, TransactionSender},
};

use crate::integration::{
	common::{
		capture_submissions, decode_transaction, expected_bid_calldata, signer, BIDDER, GAS_PRICE,
		PRIVATE_CHAIN_ID, PRIVATE_CONTRACT,
	},
	mocks::{MockChainClient, SlowChainClient},
};

fn fixed_gas() -> GasSettings {
	GasSettings {
		gas_limit: 200_000,
		gas_price: Some(GAS_PRICE),
	}
}

fn sender(client: MockChainClient, gas: GasSettings) -> Arc<TransactionSender<MockChainClient>> {
	Arc::new(TransactionSender::new(
		Arc::new(client),
		signer(),
		ContractTag::Private,
		PRIVATE_CHAIN_ID,
		gas,
	))
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_sends_get_distinct_nonces() {
	let client = Arc::new(SlowChainClient::new(Duration::from_millis(50), 5));
	let submitted = client.submissions();
	let sender = TransactionSender::new(
		Arc::clone(&client),
		signer(),
		ContractTag::Private,
		PRIVATE_CHAIN_ID,
		fixed_gas(),
	);
	let input = expected_bid_calldata(BIDDER, 1000);

	let (first, second) = tokio::join!(
		sender.send(PRIVATE_CONTRACT, input.clone()),
		sender.send(PRIVATE_CONTRACT, input.clone()),
	);
	let mut nonces = vec![first.unwrap().nonce, second.unwrap().nonce];
	nonces.sort();
	assert_eq!(nonces, vec![5, 6]);

	let third = sender.send(PRIVATE_CONTRACT, input).await.unwrap();
	assert_eq!(third.nonce, 7);
	assert_eq!(client.nonce_lookups(), 1);

	let mut signed: Vec<u64> = submitted
		.lock()
		.unwrap()
		.iter()
		.map(|raw| decode_transaction(raw).nonce())
		.collect();
	signed.sort();
	assert_eq!(signed, vec![5, 6, 7]);
}

#[tokio::test]
async fn test_rejected_submission_resyncs_nonce() {
	let mut client = MockChainClient::new();
	let mut counts = vec![Ok(3), Ok(3)].into_iter();
	client
		.expect_get_transaction_count()
		.times(2)
		.returning(move |_| counts.next().unwrap());

	let mut calls = 0;
	client.expect_submit().times(2).returning(move |raw: Bytes| {
		calls += 1;
		if calls == 1 {
			Err(BlockChainError::submission_error("nonce too low"))
		} else {
			Ok(alloy::primitives::keccak256(&raw))
		}
	});

	let sender = sender(client, fixed_gas());
	let input = expected_bid_calldata(BIDDER, 1);

	let err = sender.send(PRIVATE_CONTRACT, input.clone()).await.unwrap_err();
	assert!(matches!(err, BlockChainError::SubmissionError(_)));

	let accepted = sender.send(PRIVATE_CONTRACT, input).await.unwrap();
	assert_eq!(accepted.nonce, 3);
}

#[tokio::test]
async fn test_gas_price_queried_when_not_fixed() {
	let mut client = MockChainClient::new();
	client
		.expect_get_transaction_count()
		.returning(|_| Ok(0));
	client
		.expect_get_gas_price()
		.times(1)
		.returning(|| Ok(7_000_000_000));
	let submitted = capture_submissions(&mut client);

	let sender = sender(
		client,
		GasSettings {
			gas_limit: 90_000,
			gas_price: None,
		},
	);
	sender
		.send(PRIVATE_CONTRACT, expected_bid_calldata(BIDDER, 1))
		.await
		.unwrap();

	let raw = submitted.lock().unwrap()[0].clone();
	let tx = decode_transaction(&raw);
	assert_eq!(tx.gas_price(), Some(7_000_000_000));
	assert_eq!(tx.gas_limit(), 90_000);
}

#[tokio::test]
async fn test_signed_transaction_fields() {
	let mut client = MockChainClient::new();
	client
		.expect_get_transaction_count()
		.returning(|_| Ok(42));
	client.expect_get_gas_price().never();
	let submitted = capture_submissions(&mut client);

	let sender = sender(client, fixed_gas());
	let input = expected_bid_calldata(BIDDER, 1000);
	let result = sender.send(PRIVATE_CONTRACT, input.clone()).await.unwrap();

	let raw = submitted.lock().unwrap()[0].clone();
	assert_eq!(result.hash, alloy::primitives::keccak256(&raw));

	let tx = decode_transaction(&raw);
	assert_eq!(tx.nonce(), 42);
	assert_eq!(tx.chain_id(), Some(PRIVATE_CHAIN_ID));
	assert_eq!(tx.kind(), TxKind::Call(PRIVATE_CONTRACT));
	assert_eq!(tx.input(), &input);
	assert_eq!(tx.gas_price(), Some(GAS_PRICE));
	assert!(tx.value().is_zero());
}

#[tokio::test]
async fn test_nonce_lookup_failure_is_propagated() {
	let mut client = MockChainClient::new();
	client
		.expect_get_transaction_count()
		.returning(|_| Err(BlockChainError::request_error("connection refused")));
	client.expect_submit().never();

	let sender = sender(client, fixed_gas());
	let err = sender
		.send(PRIVATE_CONTRACT, expected_bid_calldata(BIDDER, 1))
		.await
		.unwrap_err();
	assert!(matches!(err, BlockChainError::RequestError(_)));
}
