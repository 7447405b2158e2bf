//! Typed views of a contract ABI.
//!
//! An [`AbiRegistry`] is built once per contract binding. Events are indexed by
//! topic hash so incoming logs resolve in constant time; functions are kept by
//! name with their overloads so calls can be encoded by name and arity.

use std::collections::{BTreeMap, HashMap};

use alloy::{
	dyn_abi::{DynSolValue, EventExt, JsonAbiExt, Specifier},
	json_abi::{Event, Function, JsonAbi},
	primitives::{Bytes, B256},
};

use crate::{
	models::{ContractTag, DecodedLog, DecodedParam, RawEvent},
	services::abi::{error::AbiError, helpers::coerce_value},
};

/// One event field as declared in the ABI
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventParam {
	pub name: String,
	/// Canonical Solidity type
	pub kind: String,
	pub indexed: bool,
}

/// A typed event signature derived from an ABI entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventSignature {
	pub name: String,
	/// Canonical signature, e.g. `Transfer(address,address,uint256)`
	pub signature: String,
	/// keccak256 of `signature`
	pub topic: B256,
	pub params: Vec<EventParam>,
	event: Event,
}

impl EventSignature {
	pub fn from_event(event: &Event) -> Self {
		let params = event
			.inputs
			.iter()
			.enumerate()
			.map(|(position, input)| EventParam {
				name: param_name(&input.name, position),
				kind: input.selector_type().into_owned(),
				indexed: input.indexed,
			})
			.collect();

		Self {
			name: event.name.clone(),
			signature: event.signature(),
			topic: event.selector(),
			params,
			event: event.clone(),
		}
	}

	/// Whether the event declares a field with this name
	pub fn has_field(&self, name: &str) -> bool {
		self.params.iter().any(|param| param.name == name)
	}

	pub fn field_names(&self) -> impl Iterator<Item = &str> {
		self.params.iter().map(|param| param.name.as_str())
	}
}

/// Unnamed ABI parameters are addressed by their position
fn param_name(name: &str, position: usize) -> String {
	if name.is_empty() {
		position.to_string()
	} else {
		name.to_string()
	}
}

/// Event and function lookups for one contract
#[derive(Debug, Clone, Default)]
pub struct AbiRegistry {
	events: HashMap<B256, EventSignature>,
	/// First declared signature for each event name
	events_by_name: HashMap<String, B256>,
	functions: BTreeMap<String, Vec<Function>>,
}

impl AbiRegistry {
	/// Indexes the events and functions of an ABI
	///
	/// Anonymous events carry no selector topic and are not indexed.
	pub fn new(abi: &JsonAbi) -> Self {
		let mut events = HashMap::new();
		let mut events_by_name = HashMap::new();

		for event in abi.events().filter(|event| !event.anonymous) {
			let signature = EventSignature::from_event(event);
			events_by_name
				.entry(signature.name.clone())
				.or_insert(signature.topic);
			events.insert(signature.topic, signature);
		}

		Self {
			events,
			events_by_name,
			functions: abi.functions.clone(),
		}
	}

	/// Finds the event whose selector is `topic`
	pub fn resolve_event(&self, topic: &B256) -> Option<&EventSignature> {
		self.events.get(topic)
	}

	/// Finds an event by name; the first declared overload wins
	pub fn event_by_name(&self, name: &str) -> Option<&EventSignature> {
		self.events_by_name
			.get(name)
			.and_then(|topic| self.events.get(topic))
	}

	/// Selectors of every indexed event
	pub fn topics(&self) -> Vec<B256> {
		let mut topics: Vec<B256> = self.events.keys().copied().collect();
		topics.sort();
		topics
	}

	pub fn events(&self) -> impl Iterator<Item = &EventSignature> {
		self.events.values()
	}

	/// Whether a function `name` taking `arity` arguments exists
	pub fn has_method(&self, name: &str, arity: usize) -> bool {
		self.function(name, arity).is_some()
	}

	fn function(&self, name: &str, arity: usize) -> Option<&Function> {
		self.functions
			.get(name)
			.and_then(|overloads| overloads.iter().find(|f| f.inputs.len() == arity))
	}

	/// Decodes a raw log against an event signature
	///
	/// # Errors
	/// Returns `AbiError::DecodeError` when the selector, topic count or data
	/// does not match the signature.
	pub fn decode_log(
		&self,
		signature: &EventSignature,
		raw: &RawEvent,
	) -> Result<DecodedLog, AbiError> {
		if raw.topic0() != Some(&signature.topic) {
			return Err(AbiError::decode_error(format!(
				"log topic does not match {}",
				signature.signature
			)));
		}

		let decoded = signature
			.event
			.decode_log_parts(raw.topics.iter().copied(), &raw.data)
			.map_err(|e| {
				AbiError::decode_error(format!(
					"failed to decode {}: {}",
					signature.signature, e
				))
			})?;

		let mut indexed = decoded.indexed.into_iter();
		let mut body = decoded.body.into_iter();
		let mut params = Vec::with_capacity(signature.params.len());

		for param in &signature.params {
			let value = if param.indexed {
				indexed.next()
			} else {
				body.next()
			}
			.ok_or_else(|| {
				AbiError::decode_error(format!(
					"{} is missing a value for field '{}'",
					signature.signature, param.name
				))
			})?;

			params.push(DecodedParam {
				name: param.name.clone(),
				kind: param.kind.clone(),
				indexed: param.indexed,
				value,
			});
		}

		Ok(DecodedLog {
			name: signature.name.clone(),
			signature: signature.signature.clone(),
			params,
		})
	}

	/// Encodes a call to `method`, selector included
	///
	/// The overload is chosen by argument count. Arguments whose type differs
	/// from the parameter type are converted through their textual form.
	///
	/// # Errors
	/// Returns `AbiError::EncodeError` when the method is unknown, no overload
	/// takes `args.len()` arguments or an argument cannot be converted.
	pub fn encode_call(&self, method: &str, args: &[DynSolValue]) -> Result<Bytes, AbiError> {
		if !self.functions.contains_key(method) {
			return Err(AbiError::encode_error(format!(
				"method '{}' is not in the ABI",
				method
			)));
		}

		let function = self.function(method, args.len()).ok_or_else(|| {
			AbiError::encode_error(format!(
				"method '{}' has no overload taking {} arguments",
				method,
				args.len()
			))
		})?;

		let coerced = function
			.inputs
			.iter()
			.zip(args)
			.map(|(param, value)| {
				let ty = param.resolve().map_err(|e| {
					AbiError::invalid_abi(format!(
						"parameter '{}' of '{}': {}",
						param.name, method, e
					))
				})?;
				coerce_value(&ty, value).map_err(|e| {
					AbiError::encode_error(format!(
						"argument '{}' of '{}': {}",
						param.name, method, e
					))
				})
			})
			.collect::<Result<Vec<_>, _>>()?;

		let data = function.abi_encode_input(&coerced).map_err(|e| {
			AbiError::encode_error(format!("failed to encode '{}': {}", method, e))
		})?;

		Ok(Bytes::from(data))
	}
}

/// The registries of both relay contracts
#[derive(Debug, Clone)]
pub struct ContractRegistries {
	pub public: AbiRegistry,
	pub private: AbiRegistry,
}

impl ContractRegistries {
	pub fn new(public: AbiRegistry, private: AbiRegistry) -> Self {
		Self { public, private }
	}

	pub fn for_tag(&self, tag: ContractTag) -> &AbiRegistry {
		match tag {
			ContractTag::Public => &self.public,
			ContractTag::Private => &self.private,
		}
	}
}
