//! Relay rule lookup and parameter projection.
//!
//! The table is built once at startup. Construction checks every rule against
//! both contract ABIs, so a rule that references an unknown event, field or
//! method is rejected before any event is processed.

use std::{collections::HashMap, sync::Arc};

use alloy::dyn_abi::DynSolValue;
use tracing::debug;

use crate::{
	models::{CallbackRule, DecodedLog, RelayRule},
	services::{
		abi::{ContractRegistries, EventSignature},
		dispatch::error::DispatchError,
	},
};

/// Relay rules keyed by source event name
#[derive(Debug, Clone, Default)]
pub struct DispatchTable {
	rules: HashMap<String, Arc<RelayRule>>,
}

impl DispatchTable {
	/// Validates the rules against the contract ABIs and indexes them
	///
	/// # Errors
	/// Returns `DispatchError::InvalidRule` when:
	/// - the source event is not in the public ABI, or a target parameter is not one of its fields
	/// - the target method with that many arguments is not in the private ABI
	/// - the callback event is not in the private ABI, or a callback parameter is not one of its fields
	/// - the callback method with that many arguments is not in the ABI of its target chain
	/// - two rules share a source event
	pub fn new(rules: &[RelayRule], registries: &ContractRegistries) -> Result<Self, DispatchError> {
		let mut table = HashMap::with_capacity(rules.len());

		for rule in rules {
			let source = registries
				.public
				.event_by_name(&rule.event_name)
				.ok_or_else(|| {
					DispatchError::invalid_rule(format!(
						"source event '{}' is not in the public contract ABI",
						rule.event_name
					))
				})?;
			check_fields(source, &rule.target_method.params)?;

			let target = &rule.target_method;
			if !registries.private.has_method(&target.name, target.params.len()) {
				return Err(DispatchError::invalid_rule(format!(
					"method '{}' taking {} arguments is not in the private contract ABI",
					target.name,
					target.params.len()
				)));
			}

			if let Some(callback) = &rule.callback {
				check_callback(&rule.event_name, callback, registries)?;
			}

			if table
				.insert(rule.event_name.clone(), Arc::new(rule.clone()))
				.is_some()
			{
				return Err(DispatchError::invalid_rule(format!(
					"more than one rule for event '{}'",
					rule.event_name
				)));
			}

			debug!(event = %rule.event_name, method = %target.name, "relay rule loaded");
		}

		Ok(Self { rules: table })
	}

	/// The rule for a source event, if any
	pub fn rule_for(&self, event_name: &str) -> Option<Arc<RelayRule>> {
		self.rules.get(event_name).cloned()
	}

	/// Names of the source events that have a rule
	pub fn event_names(&self) -> impl Iterator<Item = &str> {
		self.rules.keys().map(String::as_str)
	}

	pub fn len(&self) -> usize {
		self.rules.len()
	}

	pub fn is_empty(&self) -> bool {
		self.rules.is_empty()
	}

	/// Picks the named fields of a decoded log, in the order given
	///
	/// # Errors
	/// Returns `DispatchError::MissingField` for the first name the log does not carry.
	pub fn project_params(
		decoded: &DecodedLog,
		names: &[String],
	) -> Result<Vec<DynSolValue>, DispatchError> {
		names
			.iter()
			.map(|name| {
				decoded.get(name).cloned().ok_or_else(|| {
					DispatchError::missing_field(format!(
						"'{}' is not a field of {}",
						name, decoded.signature
					))
				})
			})
			.collect()
	}

	/// The callback a receipt log named `receipt_event_name` triggers under `rule`
	///
	/// A callback without its own event name fires on receipt logs named like
	/// the rule's source event.
	pub fn callback_for<'a>(
		rule: &'a RelayRule,
		receipt_event_name: &str,
	) -> Option<&'a CallbackRule> {
		rule.callback
			.as_ref()
			.filter(|callback| callback.trigger_event(&rule.event_name) == receipt_event_name)
	}
}

fn check_fields(event: &EventSignature, names: &[String]) -> Result<(), DispatchError> {
	match names.iter().find(|name| !event.has_field(name)) {
		Some(name) => Err(DispatchError::invalid_rule(format!(
			"'{}' is not a field of {}",
			name, event.signature
		))),
		None => Ok(()),
	}
}

fn check_callback(
	rule_event_name: &str,
	callback: &CallbackRule,
	registries: &ContractRegistries,
) -> Result<(), DispatchError> {
	let trigger_name = callback.trigger_event(rule_event_name);
	let trigger = registries
		.private
		.event_by_name(trigger_name)
		.ok_or_else(|| {
			DispatchError::invalid_rule(format!(
				"callback event '{}' is not in the private contract ABI",
				trigger_name
			))
		})?;
	check_fields(trigger, &callback.params)?;

	if !registries
		.for_tag(callback.target)
		.has_method(&callback.method, callback.params.len())
	{
		return Err(DispatchError::invalid_rule(format!(
			"callback method '{}' taking {} arguments is not in the {} contract ABI",
			callback.method,
			callback.params.len(),
			callback.target
		)));
	}

	Ok(())
}
