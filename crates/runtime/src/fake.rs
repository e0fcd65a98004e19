//! In-memory socket for exercising the connection manager without a network.
//!
//! # Example
//!
//! ```ignore
//! let (factory, controller) = FakeSocketFactory::new();
//! let manager = ConnectionManager::builder(config).socket_factory(factory).build()?;
//!
//! manager.initialize().await?;
//! controller.qr("2@abc,def");
//! controller.open();
//! manager.send_message("5511999", "hi").await?;
//! assert_eq!(controller.take_sent().len(), 1);
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use async_trait::async_trait;
use pairlink_protocol::{CloseInfo, ConnectionUpdate, Credentials, InboundMessage, Jid, OutboundPayload, SentMessage, SocketEvent, UpsertKind};
use parking_lot::Mutex;
use tokio::sync::mpsc;

use crate::error::SocketError;
use crate::socket::{SessionSocket, SocketConfig, SocketFactory, SocketParts};

#[derive(Default)]
struct FakeState {
	live: Mutex<Option<mpsc::UnboundedSender<SocketEvent>>>,
	configs: Mutex<Vec<SocketConfig>>,
	sent: Mutex<Vec<(Jid, OutboundPayload)>>,
	failing_creates: AtomicU32,
	fail_sends: AtomicBool,
	fail_logout: AtomicBool,
	logouts: AtomicU32,
	next_message_id: AtomicU32,
}

/// Factory handing out in-memory sockets.
#[derive(Clone)]
pub struct FakeSocketFactory {
	state: Arc<FakeState>,
}

impl FakeSocketFactory {
	/// Builds a factory and the controller that drives its sockets.
	pub fn new() -> (Self, FakeSocketController) {
		let state = Arc::new(FakeState::default());
		(
			Self { state: Arc::clone(&state) },
			FakeSocketController { state },
		)
	}
}

#[async_trait]
impl SocketFactory for FakeSocketFactory {
	async fn create(&self, config: SocketConfig) -> Result<SocketParts, SocketError> {
		self.state.configs.lock().push(config);

		let failing = self.state.failing_creates.load(Ordering::SeqCst);
		if failing > 0 {
			self.state.failing_creates.store(failing - 1, Ordering::SeqCst);
			return Err(SocketError::Connect("injected connect failure".to_string()));
		}

		let (tx, rx) = mpsc::unbounded_channel();
		// Replacing the sender ends the previous socket's stream.
		*self.state.live.lock() = Some(tx);

		Ok(SocketParts {
			socket: Box::new(FakeSocket {
				state: Arc::clone(&self.state),
			}),
			events: rx,
		})
	}
}

struct FakeSocket {
	state: Arc<FakeState>,
}

#[async_trait]
impl SessionSocket for FakeSocket {
	async fn send_message(&self, to: &Jid, payload: OutboundPayload) -> Result<SentMessage, SocketError> {
		if self.state.fail_sends.load(Ordering::SeqCst) {
			return Err(SocketError::Send("injected send failure".to_string()));
		}
		let id = self.state.next_message_id.fetch_add(1, Ordering::SeqCst);
		self.state.sent.lock().push((to.clone(), payload));
		Ok(SentMessage {
			id: format!("FAKE{id:04}"),
			to: to.clone(),
		})
	}

	async fn logout(&self) -> Result<(), SocketError> {
		self.state.logouts.fetch_add(1, Ordering::SeqCst);
		if self.state.fail_logout.load(Ordering::SeqCst) {
			return Err(SocketError::Logout("injected logout failure".to_string()));
		}
		Ok(())
	}
}

/// Controller for injecting socket events and inspecting socket usage.
pub struct FakeSocketController {
	state: Arc<FakeState>,
}

impl FakeSocketController {
	/// Delivers an event on the most recently created socket's stream.
	///
	/// Returns `false` when no socket is live or its stream was dropped.
	pub fn inject(&self, event: SocketEvent) -> bool {
		match self.state.live.lock().as_ref() {
			Some(tx) => tx.send(event).is_ok(),
			None => false,
		}
	}

	pub fn qr(&self, token: &str) -> bool {
		self.inject(SocketEvent::ConnectionUpdate(ConnectionUpdate::qr(token)))
	}

	pub fn open(&self) -> bool {
		self.inject(SocketEvent::ConnectionUpdate(ConnectionUpdate::open()))
	}

	pub fn close(&self, info: CloseInfo) -> bool {
		self.inject(SocketEvent::ConnectionUpdate(ConnectionUpdate::close(info)))
	}

	pub fn creds(&self, credentials: Credentials) -> bool {
		self.inject(SocketEvent::CredsUpdate { credentials })
	}

	pub fn upsert(&self, messages: Vec<InboundMessage>, kind: UpsertKind) -> bool {
		self.inject(SocketEvent::MessagesUpsert { messages, kind })
	}

	/// Drops the live socket's sender so its event stream ends.
	pub fn end_stream(&self) {
		self.state.live.lock().take();
	}

	/// Number of `create` calls seen, failed ones included.
	pub fn created(&self) -> usize {
		self.state.configs.lock().len()
	}

	pub fn last_config(&self) -> Option<SocketConfig> {
		self.state.configs.lock().last().cloned()
	}

	/// Takes all sent messages, clearing the buffer.
	pub fn take_sent(&self) -> Vec<(Jid, OutboundPayload)> {
		std::mem::take(&mut *self.state.sent.lock())
	}

	/// Makes the next `count` creates fail.
	pub fn fail_next_creates(&self, count: u32) {
		self.state.failing_creates.store(count, Ordering::SeqCst);
	}

	pub fn fail_sends(&self, fail: bool) {
		self.state.fail_sends.store(fail, Ordering::SeqCst);
	}

	pub fn fail_logout(&self, fail: bool) {
		self.state.fail_logout.store(fail, Ordering::SeqCst);
	}

	pub fn logouts(&self) -> u32 {
		self.state.logouts.load(Ordering::SeqCst)
	}
}
