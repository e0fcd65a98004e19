//! Read-only status published after every committed transition.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::disconnect::DisconnectReason;
use crate::machine::ConnectionState;
use crate::pairing::PairingChallenge;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LastDisconnect {
	#[serde(flatten)]
	pub reason: DisconnectReason,
	pub at: DateTime<Utc>,
}

/// Snapshot of the manager, as seen by status observers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailedStatus {
	pub state: ConnectionState,
	pub session_id: String,
	pub session_path: Option<PathBuf>,
	pub reconnect_attempts: u32,
	pub max_reconnect_attempts: u32,
	pub reconnect_pending: bool,
	pub pairing_expiry_pending: bool,
	pub unknown_disconnect_streak: u32,
	pub challenge: Option<PairingChallenge>,
	pub last_connected_at: Option<DateTime<Utc>>,
	pub last_disconnect: Option<LastDisconnect>,
}

impl DetailedStatus {
	pub(crate) fn initial(session_id: &str, max_reconnect_attempts: u32) -> Self {
		Self {
			state: ConnectionState::Disconnected,
			session_id: session_id.to_string(),
			session_path: None,
			reconnect_attempts: 0,
			max_reconnect_attempts,
			reconnect_pending: false,
			pairing_expiry_pending: false,
			unknown_disconnect_streak: 0,
			challenge: None,
			last_connected_at: None,
			last_disconnect: None,
		}
	}

	pub fn is_connected(&self) -> bool {
		self.state == ConnectionState::Connected
	}

	pub fn has_challenge(&self) -> bool {
		self.challenge.is_some()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn serializes_for_status_consumers() {
		let mut status = DetailedStatus::initial("agent", 5);
		status.last_disconnect = Some(LastDisconnect {
			reason: DisconnectReason::RestartRequired,
			at: DateTime::<Utc>::UNIX_EPOCH,
		});

		let value = serde_json::to_value(&status).unwrap();
		assert_eq!(value["state"], "disconnected");
		assert_eq!(value["maxReconnectAttempts"], 5);
		assert_eq!(value["lastDisconnect"]["reason"], "restartRequired");
		assert!(value["challenge"].is_null());
		assert!(!status.is_connected());
	}
}
