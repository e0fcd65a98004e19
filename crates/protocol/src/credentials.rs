//! Opaque authentication material.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Authentication state produced and consumed by the session library.
///
/// The connection manager never interprets the key material; it only looks
/// for the paired identity (`me.id`) to decide whether persisted state can
/// be trusted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Credentials(Value);

impl Default for Credentials {
	fn default() -> Self {
		Self(Value::Object(serde_json::Map::new()))
	}
}

impl Credentials {
	/// Field path holding the paired account identity.
	pub const IDENTITY_FIELD: &'static str = "me";

	pub fn new(value: Value) -> Self {
		Self(value)
	}

	/// Empty credentials for a session that has never paired.
	pub fn fresh() -> Self {
		Self::default()
	}

	pub fn as_value(&self) -> &Value {
		&self.0
	}

	pub fn into_value(self) -> Value {
		self.0
	}

	/// The paired account identity, if the credentials carry one.
	pub fn identity(&self) -> Option<&str> {
		self.0.get(Self::IDENTITY_FIELD)?.get("id")?.as_str().filter(|id| !id.is_empty())
	}

	pub fn is_paired(&self) -> bool {
		self.identity().is_some()
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	#[test]
	fn identity_requires_non_empty_me_id() {
		assert_eq!(Credentials::new(json!({"me": {"id": "551199:3@s.whatsapp.net"}})).identity(), Some("551199:3@s.whatsapp.net"));
		assert!(!Credentials::new(json!({"me": {"id": ""}})).is_paired());
		assert!(!Credentials::new(json!({"noiseKey": {}})).is_paired());
		assert!(!Credentials::fresh().is_paired());
	}
}
