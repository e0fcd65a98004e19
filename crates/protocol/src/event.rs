//! Events emitted by the remote session socket.
//!
//! The socket library reports everything it observes on a single ordered
//! stream. Connection updates are sparse: a single update may carry only a
//! pairing challenge, only a phase change, or both.
//!
//! ```json
//! { "kind": "connectionUpdate", "connection": "close",
//!   "lastDisconnect": { "statusCode": 515, "message": "Stream Errored (restart required)" } }
//! ```

use serde::{Deserialize, Serialize};

use crate::credentials::Credentials;
use crate::message::{InboundMessage, MessageUpdate, PresenceUpdate, UpsertKind};

/// Phase reported by a connection update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionPhase {
	Connecting,
	Open,
	Close,
}

/// Close payload attached to a `close` connection update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloseInfo {
	/// Numeric status code from the remote network, when one was sent.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub status_code: Option<u16>,
	/// Human-readable error detail.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub message: Option<String>,
}

impl CloseInfo {
	pub fn code(status_code: u16) -> Self {
		Self {
			status_code: Some(status_code),
			message: None,
		}
	}

	pub fn with_message(mut self, message: impl Into<String>) -> Self {
		self.message = Some(message.into());
		self
	}
}

/// Sparse connection state update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionUpdate {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub connection: Option<ConnectionPhase>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub last_disconnect: Option<CloseInfo>,
	/// Raw pairing challenge token.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub qr: Option<String>,
}

impl ConnectionUpdate {
	pub fn open() -> Self {
		Self {
			connection: Some(ConnectionPhase::Open),
			..Default::default()
		}
	}

	pub fn close(info: CloseInfo) -> Self {
		Self {
			connection: Some(ConnectionPhase::Close),
			last_disconnect: Some(info),
			qr: None,
		}
	}

	pub fn qr(token: impl Into<String>) -> Self {
		Self {
			qr: Some(token.into()),
			..Default::default()
		}
	}
}

/// Discriminated union of everything the socket reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum SocketEvent {
	ConnectionUpdate(ConnectionUpdate),
	CredsUpdate {
		credentials: Credentials,
	},
	MessagesUpsert {
		messages: Vec<InboundMessage>,
		#[serde(rename = "type")]
		kind: UpsertKind,
	},
	MessagesUpdate {
		updates: Vec<MessageUpdate>,
	},
	PresenceUpdate(PresenceUpdate),
}

impl SocketEvent {
	/// Short name used in logs.
	pub fn name(&self) -> &'static str {
		match self {
			Self::ConnectionUpdate(_) => "connection.update",
			Self::CredsUpdate { .. } => "creds.update",
			Self::MessagesUpsert { .. } => "messages.upsert",
			Self::MessagesUpdate { .. } => "messages.update",
			Self::PresenceUpdate(_) => "presence.update",
		}
	}
}
