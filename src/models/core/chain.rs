//! Chain connection and contract binding models.

use alloy::{json_abi::JsonAbi, primitives::Address};
use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

/// Identifies which side of the relay a contract (and its chain) sits on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContractTag {
	/// The public chain, where source events are observed and callbacks land
	Public,
	/// The private chain, where relayed calls are executed
	Private,
}

impl ContractTag {
	/// The opposite side of the relay
	pub fn other(&self) -> Self {
		match self {
			Self::Public => Self::Private,
			Self::Private => Self::Public,
		}
	}
}

impl fmt::Display for ContractTag {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Public => write!(f, "public"),
			Self::Private => write!(f, "private"),
		}
	}
}

/// Transport used to reach an RPC endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
	/// Plain JSON-RPC over HTTP(S); event delivery falls back to filter polling
	Http,
	/// JSON-RPC over WebSocket with push subscriptions
	Ws,
}

impl TransportKind {
	/// Infers the transport from a URL scheme
	///
	/// # Returns
	/// * `Some(TransportKind)` for well-formed `http`, `https`, `ws` and `wss` URLs
	/// * `None` for malformed URLs and any other scheme
	pub fn from_url(url: &str) -> Option<Self> {
		let parsed = Url::parse(url).ok()?;
		match parsed.scheme() {
			"http" | "https" => Some(Self::Http),
			"ws" | "wss" => Some(Self::Ws),
			_ => None,
		}
	}
}

/// An RPC connection target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainEndpoint {
	pub url: String,
	pub transport: TransportKind,
}

impl ChainEndpoint {
	pub fn new(url: impl Into<String>, transport: TransportKind) -> Self {
		Self {
			url: url.into(),
			transport,
		}
	}

	/// Builds an endpoint, inferring the transport from the URL scheme
	pub fn from_url(url: impl Into<String>) -> Result<Self, String> {
		let url = url.into();
		match TransportKind::from_url(&url) {
			Some(transport) => Ok(Self { url, transport }),
			None => Err(format!(
				"unsupported RPC URL '{}', expected an http(s):// or ws(s):// URL",
				url
			)),
		}
	}
}

/// A deployed contract together with the ABI used to talk to it
#[derive(Debug, Clone)]
pub struct ContractBinding {
	pub tag: ContractTag,
	pub address: Address,
	pub abi: JsonAbi,
}

impl ContractBinding {
	pub fn new(tag: ContractTag, address: Address, abi: JsonAbi) -> Self {
		Self { tag, address, abi }
	}
}
