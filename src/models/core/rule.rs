//! Relay rule models.
//!
//! A rule maps an event observed on the public contract to a method call on the
//! private contract, optionally followed by a callback fired by an event found
//! in the private transaction's receipt.

use serde::{Deserialize, Serialize};

use crate::models::ContractTag;

/// A method call whose arguments are projected from a decoded event
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct TargetInvocation {
	/// Method name on the target contract
	pub name: String,
	/// Event field names, in the order the method expects them
	#[serde(default)]
	pub params: Vec<String>,
}

/// Second relay hop, triggered by an event in the target transaction's receipt
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CallbackRule {
	/// Receipt event that fires the callback; the rule's own event name when absent
	#[serde(default, alias = "eventName")]
	pub event_name: Option<String>,
	/// Contract the callback is sent to
	#[serde(alias = "targetTag", alias = "contract")]
	pub target: ContractTag,
	/// Method name on the callback contract
	pub method: String,
	/// Receipt event field names, in the order the method expects them
	#[serde(default)]
	pub params: Vec<String>,
}

impl CallbackRule {
	/// Name of the receipt event that fires this callback
	pub fn trigger_event<'a>(&'a self, rule_event_name: &'a str) -> &'a str {
		self.event_name.as_deref().unwrap_or(rule_event_name)
	}

	/// The callback as a plain method invocation
	pub fn invocation(&self) -> TargetInvocation {
		TargetInvocation {
			name: self.method.clone(),
			params: self.params.clone(),
		}
	}
}

/// Declares how one source event is relayed
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RelayRule {
	/// Event name emitted by the public contract
	#[serde(alias = "eventName")]
	pub event_name: String,
	/// Call submitted to the private contract
	#[serde(alias = "targetMethod", alias = "privateMethod")]
	pub target_method: TargetInvocation,
	/// Optional callback closing the loop
	#[serde(default)]
	pub callback: Option<CallbackRule>,
}
