use crate::properties::strategies::{event_spec_strategy, event_with_values_strategy};

use alloy::{
	dyn_abi::DynSolValue,
	primitives::{keccak256, Address, B256},
};
use cross_chain_relay::{
	services::abi::AbiRegistry, utils::tests::builders::event::RawEventBuilder,
};
use proptest::{prelude::*, test_runner::Config};

proptest! {
	#![proptest_config(Config {
		failure_persistence: None,
		..Config::default()
	})]

	// Every declared event is reachable through its selector
	#[test]
	fn test_resolve_event_by_selector(spec in event_spec_strategy()) {
		let registry = AbiRegistry::new(&spec.abi());
		let topic = keccak256(spec.signature());

		let resolved = registry.resolve_event(&topic);
		prop_assert!(resolved.is_some());
		let resolved = resolved.unwrap();

		prop_assert_eq!(&resolved.name, &spec.name);
		prop_assert_eq!(&resolved.signature, &spec.signature());
		prop_assert_eq!(resolved.topic, topic);
		prop_assert_eq!(registry.topics(), vec![topic]);

		let names: Vec<&str> = resolved.field_names().collect();
		let expected: Vec<&str> = spec.fields.iter().map(|(name, _, _)| name.as_str()).collect();
		prop_assert_eq!(names, expected);

		prop_assert!(registry.event_by_name(&spec.name).is_some());
	}

	// Unknown selectors never resolve
	#[test]
	fn test_unknown_selector_not_resolved(
		spec in event_spec_strategy(),
		selector in any::<[u8; 32]>()
	) {
		let registry = AbiRegistry::new(&spec.abi());
		let selector = B256::from(selector);
		prop_assume!(selector != keccak256(spec.signature()));
		prop_assert!(registry.resolve_event(&selector).is_none());
	}

	// Indexed and body fields come back in declaration order
	#[test]
	fn test_decoded_fields_follow_declaration_order(
		(spec, values) in event_with_values_strategy()
	) {
		let registry = AbiRegistry::new(&spec.abi());
		let signature = registry.event_by_name(&spec.name).unwrap();

		let mut builder = RawEventBuilder::new()
			.address(Address::repeat_byte(0x42))
			.signature(&spec.signature());
		let mut body = Vec::new();
		for ((_, _, indexed), value) in spec.fields.iter().zip(&values) {
			if *indexed {
				builder = builder.topic(B256::from_slice(&value.abi_encode()));
			} else {
				body.push(value.clone());
			}
		}
		let raw = builder.data(body).build();

		let decoded = registry.decode_log(signature, &raw).unwrap();
		prop_assert_eq!(decoded.params.len(), spec.fields.len());
		for (param, ((name, kind, indexed), value)) in decoded.params.iter().zip(spec.fields.iter().zip(&values)) {
			prop_assert_eq!(&param.name, name);
			prop_assert_eq!(&param.kind, kind);
			prop_assert_eq!(param.indexed, *indexed);
			prop_assert_eq!(&param.value, value);
		}
	}

	// A log with a foreign selector is rejected rather than misdecoded
	#[test]
	fn test_decode_rejects_other_selector(
		(spec, values) in event_with_values_strategy()
	) {
		let registry = AbiRegistry::new(&spec.abi());
		let signature = registry.event_by_name(&spec.name).unwrap();

		let raw = RawEventBuilder::new()
			.signature(&format!("Other{}", spec.signature()))
			.data(values.into_iter().collect::<Vec<DynSolValue>>())
			.build();
		prop_assert!(registry.decode_log(signature, &raw).is_err());
	}
}
