//! Network addressing (JID) shapes.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Server suffix for individual user addresses.
pub const USER_SERVER: &str = "s.whatsapp.net";
/// Server suffix for group addresses.
pub const GROUP_SERVER: &str = "g.us";
/// Server suffix shared by broadcast lists and the status feed.
pub const BROADCAST_SERVER: &str = "broadcast";
/// Address of the status (stories) feed.
pub const STATUS_BROADCAST: &str = "status@broadcast";

/// A fully-qualified network address in `user@server` form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Jid(String);

impl Jid {
	/// Wraps an already-qualified address without validation.
	pub fn from_raw(raw: impl Into<String>) -> Self {
		Self(raw.into())
	}

	/// Builds an individual user address from its numeric user part.
	pub fn user(number: &str) -> Self {
		Self(format!("{number}@{USER_SERVER}"))
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}

	/// Part before the `@`, or the whole address when there is none.
	pub fn user_part(&self) -> &str {
		self.0.split_once('@').map_or(self.0.as_str(), |(user, _)| user)
	}

	/// Part after the `@`, if present.
	pub fn server(&self) -> Option<&str> {
		self.0.split_once('@').map(|(_, server)| server)
	}

	/// Returns `true` for broadcast lists and the status feed.
	pub fn is_broadcast(&self) -> bool {
		self.server() == Some(BROADCAST_SERVER)
	}

	pub fn is_group(&self) -> bool {
		self.server() == Some(GROUP_SERVER)
	}
}

impl fmt::Display for Jid {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl AsRef<str> for Jid {
	fn as_ref(&self) -> &str {
		&self.0
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn status_feed_counts_as_broadcast() {
		assert!(Jid::from_raw(STATUS_BROADCAST).is_broadcast());
		assert!(Jid::from_raw("1234@broadcast").is_broadcast());
		assert!(!Jid::user("5511999").is_broadcast());
	}

	#[test]
	fn user_part_splits_on_at() {
		let jid = Jid::user("5511999");
		assert_eq!(jid.user_part(), "5511999");
		assert_eq!(jid.server(), Some(USER_SERVER));
		assert_eq!(Jid::from_raw("bare").server(), None);
	}
}
