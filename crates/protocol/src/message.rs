//! Inbound message shapes.

use serde::{Deserialize, Serialize};

use crate::address::Jid;

/// Identity of a message within a chat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageKey {
	pub remote_jid: Jid,
	#[serde(default)]
	pub from_me: bool,
	pub id: String,
	/// Sender inside a group chat.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub participant: Option<Jid>,
}

/// Content payload of a message, reduced to what the ingress layer forwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum MessageContent {
	Text { text: String },
	Image { caption: Option<String> },
	Document { file_name: Option<String> },
	Other { kind: String },
}

impl MessageContent {
	/// Best-effort text view of the content.
	pub fn text(&self) -> Option<&str> {
		match self {
			Self::Text { text } => Some(text),
			Self::Image { caption } => caption.as_deref(),
			Self::Document { file_name } => file_name.as_deref(),
			Self::Other { .. } => None,
		}
	}
}

/// A message delivered by a `messagesUpsert` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InboundMessage {
	pub key: MessageKey,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub push_name: Option<String>,
	/// Seconds since the Unix epoch, as sent by the network.
	#[serde(default)]
	pub timestamp: u64,
	/// Absent for protocol stubs (receipts, revocations, key distribution).
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub content: Option<MessageContent>,
}

impl InboundMessage {
	pub fn text(&self) -> Option<&str> {
		self.content.as_ref().and_then(MessageContent::text)
	}
}

/// Why a batch of messages was upserted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpsertKind {
	/// New messages arriving live.
	Notify,
	/// History backfill.
	Append,
}

/// Status change of a previously seen message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageUpdate {
	pub key: MessageKey,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub status: Option<u8>,
}

/// Presence change for a chat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresenceUpdate {
	pub id: Jid,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub presence: Option<String>,
}

/// Outbound payload handed to the socket's send method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutboundPayload {
	pub text: String,
}

impl OutboundPayload {
	pub fn text(text: impl Into<String>) -> Self {
		Self { text: text.into() }
	}
}

/// Acknowledgement returned by the socket for a sent message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SentMessage {
	pub id: String,
	pub to: Jid,
}
