//! Capability boundary to the external session library.
//!
//! The connection manager never speaks the messaging network's wire protocol.
//! It asks a [`SocketFactory`] for a socket, keeps the [`SessionSocket`]
//! handle for outbound calls, and consumes the ordered [`SocketEvents`]
//! stream for everything the socket observes.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use pairlink_protocol::{Credentials, Jid, OutboundPayload, SentMessage, SocketEvent};
use tokio::sync::mpsc;

use crate::error::SocketError;

/// Receiver for events emitted by one socket instance.
pub type SocketEvents = mpsc::UnboundedReceiver<SocketEvent>;

/// Everything the session library needs to open a socket.
#[derive(Debug, Clone)]
pub struct SocketConfig {
	/// Session directory the credentials belong to.
	pub session_path: PathBuf,
	pub credentials: Credentials,
	pub keep_alive_interval: Duration,
	pub connect_timeout: Duration,
	pub default_query_timeout: Duration,
	/// Validity window the library should assume for each pairing challenge.
	pub qr_timeout: Duration,
	/// Request full history sync on pairing.
	pub sync_full_history: bool,
	/// Drop broadcast/status traffic inside the library.
	pub ignore_broadcast: bool,
}

impl SocketConfig {
	/// Returns `true` when the library should not surface traffic for `jid`.
	pub fn should_ignore(&self, jid: &Jid) -> bool {
		self.ignore_broadcast && jid.is_broadcast()
	}
}

/// Outbound half of an open socket.
#[async_trait]
pub trait SessionSocket: Send + Sync {
	/// Sends `payload` to an already-normalized address.
	async fn send_message(&self, to: &Jid, payload: OutboundPayload) -> Result<SentMessage, SocketError>;

	/// Logs the session out on the remote network and closes the socket.
	async fn logout(&self) -> Result<(), SocketError>;
}

/// A freshly opened socket: its handle plus its event stream.
pub struct SocketParts {
	pub socket: Box<dyn SessionSocket>,
	pub events: SocketEvents,
}

/// Creates sockets. One call per connection attempt.
#[async_trait]
pub trait SocketFactory: Send + Sync {
	async fn create(&self, config: SocketConfig) -> Result<SocketParts, SocketError>;
}
