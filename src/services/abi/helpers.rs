//! Helpers for working with dynamically typed ABI values.

use alloy::dyn_abi::{DynSolType, DynSolValue};

/// Formats a decoded value as text that [`DynSolType::coerce_str`] accepts
///
/// Addresses are checksummed, byte strings are `0x`-prefixed hex, integers are
/// decimal, arrays use `[a,b]` and tuples `(a,b)`.
pub fn format_value(value: &DynSolValue) -> String {
	match value {
		DynSolValue::Address(addr) => addr.to_string(),
		DynSolValue::Bool(b) => b.to_string(),
		DynSolValue::Int(num, _) => num.to_string(),
		DynSolValue::Uint(num, _) => num.to_string(),
		DynSolValue::FixedBytes(word, size) => format!("0x{}", hex::encode(&word[..*size])),
		DynSolValue::Bytes(bytes) => format!("0x{}", hex::encode(bytes)),
		DynSolValue::Function(function) => format!("0x{}", hex::encode(function.as_slice())),
		DynSolValue::String(s) => s.clone(),
		DynSolValue::Array(values) | DynSolValue::FixedArray(values) => {
			format!("[{}]", join_values(values))
		}
		DynSolValue::Tuple(values) => format!("({})", join_values(values)),
		#[allow(unreachable_patterns)]
		other => format!("{:?}", other),
	}
}

fn join_values(values: &[DynSolValue]) -> String {
	values
		.iter()
		.map(format_value)
		.collect::<Vec<String>>()
		.join(",")
}

/// Converts a value to the given parameter type
///
/// Values that already have the type are returned unchanged. Anything else is
/// re-parsed from its textual form, so a `uint256` of 1000 becomes a `uint64`
/// of 1000 while an out-of-range value fails.
pub fn coerce_value(ty: &DynSolType, value: &DynSolValue) -> Result<DynSolValue, String> {
	if ty.matches(value) {
		return Ok(value.clone());
	}
	ty.coerce_str(&format_value(value))
		.map_err(|e| format!("cannot convert {} to {}: {}", format_value(value), ty, e))
}
