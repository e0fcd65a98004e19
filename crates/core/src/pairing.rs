//! Pairing challenge rendering, retention, and expiry.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use pairlink_runtime::TimerSlot;

use crate::error::Result;

/// A pairing challenge ready to be shown to an operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PairingChallenge {
	/// Token exactly as issued by the network.
	pub raw: String,
	/// Displayable encoding of `raw`.
	pub rendered: String,
	/// Increments with every challenge issued during this process.
	pub sequence: u64,
	pub issued_at: DateTime<Utc>,
	pub expires_at: DateTime<Utc>,
}

impl PairingChallenge {
	pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
		now >= self.expires_at
	}
}

/// Turns a raw challenge token into something displayable.
pub trait ChallengeRenderer: Send + Sync {
	fn render(&self, raw: &str) -> Result<String>;
}

/// Renders challenges as `data:text/plain;base64,...` URIs.
#[derive(Debug, Clone, Copy, Default)]
pub struct Base64Renderer;

impl ChallengeRenderer for Base64Renderer {
	fn render(&self, raw: &str) -> Result<String> {
		Ok(format!("data:text/plain;base64,{}", STANDARD.encode(raw.as_bytes())))
	}
}

/// Holds at most one challenge and its expiry timer.
pub struct PairingController {
	renderer: Arc<dyn ChallengeRenderer>,
	timeout: Duration,
	current: Option<PairingChallenge>,
	issued: u64,
	timer: TimerSlot,
}

impl PairingController {
	pub fn new(renderer: Arc<dyn ChallengeRenderer>, timeout: Duration) -> Self {
		Self {
			renderer,
			timeout,
			current: None,
			issued: 0,
			timer: TimerSlot::new("pairing-expiry"),
		}
	}

	pub fn timeout(&self) -> Duration {
		self.timeout
	}

	pub fn current(&self) -> Option<&PairingChallenge> {
		self.current.as_ref()
	}

	/// Renders and stores `raw`, replacing any previous challenge. The expiry
	/// timer is left alone; re-arm it with [`arm_expiry`](Self::arm_expiry).
	///
	/// A challenge is always stored: if the renderer fails, `rendered` carries
	/// the raw token, which any QR encoder can still display.
	pub fn accept(&mut self, raw: &str, now: DateTime<Utc>) -> &PairingChallenge {
		let rendered = self.renderer.render(raw).unwrap_or_else(|err| {
			warn!(target = "pairlink.pairing", error = %err, "cannot render pairing challenge; exposing raw token");
			raw.to_string()
		});
		let expires_at = chrono::Duration::from_std(self.timeout)
			.ok()
			.and_then(|timeout| now.checked_add_signed(timeout))
			.unwrap_or(DateTime::<Utc>::MAX_UTC);
		self.issued += 1;
		let replaced = self.current.is_some();
		info!(
			target = "pairlink.pairing",
			sequence = self.issued,
			replaced,
			expires_at = %expires_at,
			"pairing challenge issued; scan it with the primary device"
		);
		self.current.insert(PairingChallenge {
			raw: raw.to_string(),
			rendered,
			sequence: self.issued,
			issued_at: now,
			expires_at,
		})
	}

	/// (Re)arms the expiry timer. `task` must [`claim_expiry`](Self::claim_expiry) first.
	pub fn arm_expiry<F, Fut>(&mut self, task: F) -> u64
	where
		F: FnOnce(u64) -> Fut,
		Fut: Future<Output = ()> + Send + 'static,
	{
		self.timer.arm(self.timeout, task)
	}

	pub fn claim_expiry(&mut self, generation: u64) -> bool {
		self.timer.claim(generation)
	}

	pub fn expiry_pending(&self) -> bool {
		self.timer.is_armed()
	}

	pub fn cancel_expiry(&mut self) -> bool {
		self.timer.cancel()
	}

	/// Drops the challenge and cancels its timer.
	pub fn clear(&mut self) {
		self.timer.cancel();
		if let Some(challenge) = self.current.take() {
			debug!(target = "pairlink.pairing", sequence = challenge.sequence, "pairing challenge cleared");
		}
	}
}

impl std::fmt::Debug for PairingController {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("PairingController")
			.field("timeout", &self.timeout)
			.field("current", &self.current)
			.field("issued", &self.issued)
			.field("timer", &self.timer)
			.finish_non_exhaustive()
	}
}
