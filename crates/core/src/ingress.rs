//! Inbound message dispatch to the registered handler.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::Serialize;
use tracing::{debug, error, trace, warn};

use pairlink_protocol::{InboundMessage, UpsertKind};

/// Receives qualifying inbound messages.
///
/// Calls run one at a time per socket, in arrival order, off the task that
/// processes connection updates.
///
/// Implemented for any `Fn(InboundMessage) -> impl Future<Output = anyhow::Result<()>>`.
#[async_trait]
pub trait MessageHandler: Send + Sync + 'static {
	async fn handle(&self, message: InboundMessage) -> anyhow::Result<()>;
}

#[async_trait]
impl<F, Fut> MessageHandler for F
where
	F: Fn(InboundMessage) -> Fut + Send + Sync + 'static,
	Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
	async fn handle(&self, message: InboundMessage) -> anyhow::Result<()> {
		(self)(message).await
	}
}

/// Why a message was not forwarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
	FromSelf,
	Broadcast,
	NoContent,
}

/// Decides whether a single message reaches the handler.
pub fn qualify(message: &InboundMessage) -> Result<(), SkipReason> {
	if message.key.from_me {
		return Err(SkipReason::FromSelf);
	}
	if message.key.remote_jid.is_broadcast() {
		return Err(SkipReason::Broadcast);
	}
	if message.content.is_none() {
		return Err(SkipReason::NoContent);
	}
	Ok(())
}

/// Per-batch delivery counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DispatchSummary {
	pub delivered: usize,
	pub skipped: usize,
	pub failed: usize,
}

/// Forwards upserted messages to at most one handler.
#[derive(Default)]
pub struct MessageDispatcher {
	handler: RwLock<Option<Arc<dyn MessageHandler>>>,
}

impl MessageDispatcher {
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers `handler`, discarding any previous one. Returns `true` if one was replaced.
	pub fn set_handler(&self, handler: Arc<dyn MessageHandler>) -> bool {
		let replaced = self.handler.write().replace(handler).is_some();
		debug!(target = "pairlink.ingress", replaced, "message handler registered");
		replaced
	}

	pub fn clear_handler(&self) -> bool {
		self.handler.write().take().is_some()
	}

	pub fn has_handler(&self) -> bool {
		self.handler.read().is_some()
	}

	/// Delivers a batch in order. Each message runs on its own task so a
	/// handler error or panic affects only that message.
	pub async fn dispatch(&self, messages: Vec<InboundMessage>, kind: UpsertKind) -> DispatchSummary {
		let mut summary = DispatchSummary::default();
		if kind != UpsertKind::Notify {
			trace!(target = "pairlink.ingress", count = messages.len(), ?kind, "ignoring non-notify batch");
			summary.skipped = messages.len();
			return summary;
		}

		let handler = self.handler.read().clone();
		let Some(handler) = handler else {
			debug!(target = "pairlink.ingress", count = messages.len(), "no message handler registered; dropping batch");
			summary.skipped = messages.len();
			return summary;
		};

		for message in messages {
			if let Err(reason) = qualify(&message) {
				trace!(target = "pairlink.ingress", id = %message.key.id, ?reason, "message skipped");
				summary.skipped += 1;
				continue;
			}

			let id = message.key.id.clone();
			let from = message.key.remote_jid.clone();
			let handler = Arc::clone(&handler);
			match tokio::spawn(async move { handler.handle(message).await }).await {
				Ok(Ok(())) => {
					trace!(target = "pairlink.ingress", %id, %from, "message delivered");
					summary.delivered += 1;
				}
				Ok(Err(err)) => {
					warn!(target = "pairlink.ingress", %id, %from, error = %err, "message handler failed; continuing with batch");
					summary.failed += 1;
				}
				Err(join) => {
					error!(target = "pairlink.ingress", %id, %from, panicked = join.is_panic(), "message handler aborted; continuing with batch");
					summary.failed += 1;
				}
			}
		}
		summary
	}
}

impl std::fmt::Debug for MessageDispatcher {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("MessageDispatcher").field("has_handler", &self.has_handler()).finish()
	}
}
