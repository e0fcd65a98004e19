#![allow(dead_code)]

use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use pairlink::{ConnectionManager, DetailedStatus, ManagerConfig};
use pairlink_protocol::{Credentials, InboundMessage, Jid, MessageContent, MessageKey};
use pairlink_runtime::fake::{FakeSocketController, FakeSocketFactory};
use pairlink_runtime::{SocketConfig, SocketError, SocketFactory, SocketParts};
use serde_json::json;
use tempfile::TempDir;

pub const WAIT: Duration = Duration::from_secs(2);

pub struct Harness {
	pub root: TempDir,
	pub manager: ConnectionManager,
	pub controller: FakeSocketController,
}

impl Harness {
	pub fn session_path(&self) -> PathBuf {
		self.manager.session_path().expect("session path resolved")
	}
}

/// Config with millisecond-scale delays rooted at `root`.
pub fn fast_config(root: &Path) -> ManagerConfig {
	ManagerConfig {
		storage_root: root.to_path_buf(),
		max_reconnect_attempts: 3,
		reconnect_min_delay_ms: 20,
		reconnect_max_delay_ms: 80,
		restart_delay_ms: 30,
		qr_timeout_ms: 5_000,
		..ManagerConfig::default()
	}
}

pub fn harness() -> Harness {
	harness_with(|_| {})
}

pub fn harness_with(tweak: impl FnOnce(&mut ManagerConfig)) -> Harness {
	let root = TempDir::new().unwrap();
	let mut config = fast_config(root.path());
	tweak(&mut config);
	let (factory, controller) = FakeSocketFactory::new();
	let manager = ConnectionManager::builder(config).socket_factory(factory).build().unwrap();
	Harness { root, manager, controller }
}

/// Waits until a published status satisfies `pred`.
pub async fn wait_status(manager: &ConnectionManager, mut pred: impl FnMut(&DetailedStatus) -> bool) -> DetailedStatus {
	let mut rx = manager.subscribe();
	let status = tokio::time::timeout(WAIT, rx.wait_for(|status| pred(status)))
		.await
		.expect("status condition not reached in time")
		.expect("status channel closed")
		.clone();
	status
}

/// Polls `cond` until it holds.
pub async fn eventually(mut cond: impl FnMut() -> bool) {
	tokio::time::timeout(WAIT, async {
		while !cond() {
			tokio::time::sleep(Duration::from_millis(5)).await;
		}
	})
	.await
	.expect("condition not reached in time");
}

/// Retries an injection until the current socket accepts it.
pub async fn deliver(inject: impl FnMut() -> bool) {
	eventually(inject).await;
}

pub fn paired_credentials() -> Credentials {
	Credentials::new(json!({
		"me": { "id": "15550001:7@s.whatsapp.net", "name": "Agent" },
		"registrationId": 4242
	}))
}

pub fn text_message(id: &str, from_me: bool, jid: Jid, text: &str) -> InboundMessage {
	InboundMessage {
		key: MessageKey {
			remote_jid: jid,
			from_me,
			id: id.to_string(),
			participant: None,
		},
		push_name: Some("Sender".to_string()),
		timestamp: 1_700_000_000,
		content: Some(MessageContent::Text { text: text.to_string() }),
	}
}

/// Factory that waits before delegating, to widen in-flight windows.
pub struct SlowFactory<F> {
	pub inner: F,
	pub delay: Duration,
}

#[async_trait]
impl<F: SocketFactory> SocketFactory for SlowFactory<F> {
	async fn create(&self, config: SocketConfig) -> Result<SocketParts, SocketError> {
		tokio::time::sleep(self.delay).await;
		self.inner.create(config).await
	}
}

pub fn slow_harness(delay: Duration) -> Harness {
	let root = TempDir::new().unwrap();
	let (factory, controller) = FakeSocketFactory::new();
	let manager = ConnectionManager::builder(fast_config(root.path()))
		.socket_factory(SlowFactory { inner: factory, delay })
		.build()
		.unwrap();
	Harness { root, manager, controller }
}

pub async fn spawn_and_settle<T: Send + 'static>(fut: impl Future<Output = T> + Send + 'static) -> tokio::task::JoinHandle<T> {
	let handle = tokio::spawn(fut);
	tokio::time::sleep(Duration::from_millis(20)).await;
	handle
}
