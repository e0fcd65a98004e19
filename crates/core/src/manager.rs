//! The connection manager.
//!
//! [`ConnectionManager`] is a cheap, cloneable handle over one session. Every
//! transition (socket events, timer callbacks, `initialize()`, `disconnect()`)
//! runs under a single async mutex, feeds an [`Input`] to the [`Machine`], and
//! carries out the returned [`Effect`]s before the lock is released. After each
//! transition a [`DetailedStatus`] is published on a watch channel, so the
//! observers never contend with the event path.
//!
//! Timers and the per-socket event loop hold only a [`Weak`] reference;
//! dropping the last handle stops them.

use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use chrono::Utc;
use tokio::sync::{Mutex, mpsc, watch};
use tracing::{debug, error, info, trace, warn};

use pairlink_protocol::{
	ConnectionPhase, ConnectionUpdate, Credentials, InboundMessage, OutboundPayload, SentMessage, SocketEvent, UpsertKind,
};
use pairlink_runtime::{SessionLease, SessionSocket, SocketConfig, SocketEvents, SocketFactory};

use crate::address::normalize_destination;
use crate::config::ManagerConfig;
use crate::disconnect::{DisconnectReason, RecoveryPlan};
use crate::error::{Error, Result};
use crate::ingress::{MessageDispatcher, MessageHandler};
use crate::machine::{ConnectionState, Effect, Input, Machine, ReconnectDelay};
use crate::pairing::{Base64Renderer, ChallengeRenderer, PairingChallenge, PairingController};
use crate::reconnect::ReconnectScheduler;
use crate::session::{SessionPathResolver, SessionValidator};
use crate::status::{DetailedStatus, LastDisconnect};
use crate::store::{CredentialStore, FileCredentialStore};

type BoxFuture = Pin<Box<dyn Future<Output = ()> + Send>>;
type Batch = (Vec<InboundMessage>, UpsertKind);

/// Handle to a managed session. Clones share the same session.
#[derive(Clone)]
pub struct ConnectionManager {
	inner: Arc<Inner>,
}

struct Inner {
	config: ManagerConfig,
	store: Arc<dyn CredentialStore>,
	factory: Arc<dyn SocketFactory>,
	resolver: SessionPathResolver,
	validator: SessionValidator,
	dispatcher: MessageDispatcher,
	/// Lifecycle of the in-flight `initialize()` plus one; zero when idle.
	initializing: AtomicU64,
	shared: Mutex<Shared>,
	status: watch::Sender<DetailedStatus>,
}

struct ActiveSocket {
	socket: Arc<dyn SessionSocket>,
	epoch: u64,
}

/// State guarded by the serialization lock.
struct Shared {
	machine: Machine,
	scheduler: ReconnectScheduler,
	pairing: PairingController,
	socket: Option<ActiveSocket>,
	/// Bumped for every installed socket; events carry the epoch of their socket.
	socket_epoch: u64,
	/// Bumped by `disconnect()`; in-flight work from an older lifecycle must not act.
	lifecycle: u64,
	session_path: Option<PathBuf>,
	lease: Option<SessionLease>,
	last_connected_at: Option<chrono::DateTime<Utc>>,
	last_disconnect: Option<LastDisconnect>,
}

impl Shared {
	fn owns(&self, epoch: u64) -> bool {
		self.socket.as_ref().is_some_and(|active| active.epoch == epoch)
	}

	fn snapshot(&self, config: &ManagerConfig) -> DetailedStatus {
		DetailedStatus {
			state: self.machine.state(),
			session_id: config.session_id.clone(),
			session_path: self.session_path.clone(),
			reconnect_attempts: self.scheduler.attempts(),
			max_reconnect_attempts: self.scheduler.policy().max_attempts,
			reconnect_pending: self.scheduler.is_pending(),
			pairing_expiry_pending: self.pairing.expiry_pending(),
			unknown_disconnect_streak: self.machine.unknown_streak(),
			challenge: self.pairing.current().cloned(),
			last_connected_at: self.last_connected_at,
			last_disconnect: self.last_disconnect.clone(),
		}
	}
}

/// Clears the in-flight marker when `initialize()` returns, unless an attempt
/// from a newer lifecycle has taken it over.
struct InFlight<'a> {
	marker: &'a AtomicU64,
	token: u64,
}

impl Drop for InFlight<'_> {
	fn drop(&mut self) {
		let _ = self.marker.compare_exchange(self.token, 0, Ordering::AcqRel, Ordering::Acquire);
	}
}

/// Builder for [`ConnectionManager`].
pub struct ConnectionManagerBuilder {
	config: ManagerConfig,
	store: Option<Arc<dyn CredentialStore>>,
	factory: Option<Arc<dyn SocketFactory>>,
	renderer: Option<Arc<dyn ChallengeRenderer>>,
}

impl ConnectionManagerBuilder {
	/// Credential store; defaults to [`FileCredentialStore`].
	pub fn store(mut self, store: impl CredentialStore + 'static) -> Self {
		self.store = Some(Arc::new(store));
		self
	}

	/// Source of session sockets. Required.
	pub fn socket_factory(mut self, factory: impl SocketFactory + 'static) -> Self {
		self.factory = Some(Arc::new(factory));
		self
	}

	/// Challenge renderer; defaults to [`Base64Renderer`].
	pub fn renderer(mut self, renderer: impl ChallengeRenderer + 'static) -> Self {
		self.renderer = Some(Arc::new(renderer));
		self
	}

	pub fn build(self) -> Result<ConnectionManager> {
		self.config.validate()?;
		let factory = self.factory.ok_or_else(|| Error::Config("a socket factory is required".into()))?;
		let store = self.store.unwrap_or_else(|| Arc::new(FileCredentialStore::new()));
		let renderer = self.renderer.unwrap_or_else(|| Arc::new(Base64Renderer));
		let config = self.config;

		let shared = Shared {
			machine: Machine::new(config.unknown_disconnect_clear_threshold, config.restart_delay()),
			scheduler: ReconnectScheduler::new(config.backoff_policy()),
			pairing: PairingController::new(renderer, config.qr_timeout()),
			socket: None,
			socket_epoch: 0,
			lifecycle: 0,
			session_path: None,
			lease: None,
			last_connected_at: None,
			last_disconnect: None,
		};
		let (status, _) = watch::channel(shared.snapshot(&config));

		Ok(ConnectionManager {
			inner: Arc::new(Inner {
				resolver: SessionPathResolver::new(config.storage_root.clone(), config.session_id.clone()),
				validator: SessionValidator::new(config.stale_after()),
				config,
				store,
				factory,
				dispatcher: MessageDispatcher::new(),
				initializing: AtomicU64::new(0),
				shared: Mutex::new(shared),
				status,
			}),
		})
	}
}

impl ConnectionManager {
	pub fn builder(config: ManagerConfig) -> ConnectionManagerBuilder {
		ConnectionManagerBuilder {
			config,
			store: None,
			factory: None,
			renderer: None,
		}
	}

	pub fn config(&self) -> &ManagerConfig {
		&self.inner.config
	}

	/// Opens a socket for the session.
	///
	/// Overlapping calls are no-ops while one is in flight. An attempt that a
	/// later `disconnect()` overtook does not count as in flight. On failure the
	/// state returns to `disconnected` and the error is returned; no retry is
	/// scheduled by this call.
	pub async fn initialize(&self) -> Result<()> {
		self.initialize_within(None).await
	}

	/// `expected` pins the attempt to the lifecycle a reconnect was scheduled in.
	async fn initialize_within(&self, expected: Option<u64>) -> Result<()> {
		let (lifecycle, _in_flight) = {
			let mut shared = self.inner.shared.lock().await;
			if expected.is_some_and(|expected| expected != shared.lifecycle) {
				debug!(target = "pairlink.connection", "reconnect overtaken by disconnect(); not initializing");
				return Err(Error::Aborted);
			}
			// An attempt left over from before a disconnect() does not block this one;
			// it aborts on its own once its socket is created.
			let token = shared.lifecycle.wrapping_add(1);
			let previous = self.inner.initializing.swap(token, Ordering::AcqRel);
			if previous == token {
				debug!(target = "pairlink.connection", "initialize already in flight; ignoring");
				return Ok(());
			}
			if previous != 0 {
				debug!(target = "pairlink.connection", "superseding initialize from an earlier lifecycle");
			}
			let in_flight = InFlight {
				marker: &self.inner.initializing,
				token,
			};
			info!(target = "pairlink.connection", session_id = %self.inner.config.session_id, "initializing connection");
			self.apply(&mut shared, Input::InitializeStarted).await;
			(shared.lifecycle, in_flight)
		};

		match self.open_socket(lifecycle).await {
			Ok(()) => Ok(()),
			Err(err) => {
				let mut shared = self.inner.shared.lock().await;
				if shared.lifecycle == lifecycle {
					error!(target = "pairlink.connection", error = %err, "initialize failed");
					self.apply(&mut shared, Input::InitializeFailed).await;
				}
				Err(err)
			}
		}
	}

	async fn open_socket(&self, lifecycle: u64) -> Result<()> {
		let session_path = {
			let mut shared = self.inner.shared.lock().await;
			let path = shared.session_path.get_or_insert_with(|| self.inner.resolver.resolve()).clone();
			if shared.lease.is_none() {
				shared.lease = Some(SessionLease::acquire(&path)?);
			}
			path
		};

		let store = self.inner.store.as_ref();
		let report = self.inner.validator.validate(store, &session_path);
		if report.should_clear() {
			warn!(target = "pairlink.session", path = %session_path.display(), verdict = ?report.verdict, "persisted credentials rejected; clearing for fresh pairing");
			self.clear_session_at(&session_path);
		}
		let credentials = if report.has_session() {
			match store.load(&session_path) {
				Ok(Some(credentials)) => credentials,
				Ok(None) => Credentials::fresh(),
				Err(err) => {
					warn!(target = "pairlink.session", error = %err, "credentials became unreadable; pairing fresh");
					Credentials::fresh()
				}
			}
		} else {
			Credentials::fresh()
		};
		info!(
			target = "pairlink.connection",
			path = %session_path.display(),
			resumed = credentials.is_paired(),
			"creating session socket"
		);

		let parts = self.inner.factory.create(self.socket_config(session_path, credentials)).await?;

		let mut shared = self.inner.shared.lock().await;
		if shared.lifecycle != lifecycle {
			debug!(target = "pairlink.connection", "disconnect() ran during initialize; dropping new socket");
			return Err(Error::Aborted);
		}
		shared.socket_epoch += 1;
		let epoch = shared.socket_epoch;
		shared.socket = Some(ActiveSocket {
			socket: Arc::from(parts.socket),
			epoch,
		});
		tokio::spawn(run_events(Arc::downgrade(&self.inner), parts.events, epoch));
		debug!(target = "pairlink.connection", epoch, "socket installed; awaiting connection updates");
		self.commit(&shared);
		Ok(())
	}

	fn socket_config(&self, session_path: PathBuf, credentials: Credentials) -> SocketConfig {
		let config = &self.inner.config;
		SocketConfig {
			session_path,
			credentials,
			keep_alive_interval: config.keep_alive_interval(),
			connect_timeout: config.connect_timeout(),
			default_query_timeout: config.default_query_timeout(),
			qr_timeout: config.qr_timeout(),
			sync_full_history: config.sync_full_history,
			ignore_broadcast: config.ignore_broadcast,
		}
	}

	/// Sends a text message. Fails with [`Error::NotConnected`] unless connected.
	///
	/// The state check and the send happen under the same lock, so the
	/// connection cannot change between them. Transport errors are returned
	/// as-is without retry.
	pub async fn send_message(&self, destination: &str, text: &str) -> Result<SentMessage> {
		let shared = self.inner.shared.lock().await;
		let state = shared.machine.state();
		let socket = match (&shared.socket, state) {
			(Some(active), ConnectionState::Connected) => Arc::clone(&active.socket),
			_ => return Err(Error::NotConnected { state }),
		};
		let to = normalize_destination(destination)?;

		let sent = socket.send_message(&to, OutboundPayload::text(text)).await?;
		debug!(target = "pairlink.connection", id = %sent.id, to = %sent.to, "message sent");
		drop(shared);
		Ok(sent)
	}

	/// Cancels timers, logs the socket out, and settles in `disconnected`.
	///
	/// Logout failures are logged and swallowed. Persisted credentials are
	/// kept. Calling it again is a no-op.
	pub async fn disconnect(&self) {
		let mut shared = self.inner.shared.lock().await;
		shared.lifecycle += 1;
		let idle = shared.socket.is_none()
			&& shared.machine.state() == ConnectionState::Disconnected
			&& !shared.scheduler.is_pending()
			&& !shared.pairing.expiry_pending()
			&& shared.scheduler.attempts() == 0;

		self.apply(&mut shared, Input::Disconnect).await;
		if shared.lease.take().is_some() {
			debug!(target = "pairlink.session", "session lease released");
		}

		if idle {
			debug!(target = "pairlink.connection", "disconnect: already disconnected");
		} else {
			info!(target = "pairlink.connection", "disconnected");
		}
	}

	/// Registers the inbound message handler, replacing any previous one.
	pub fn set_message_handler(&self, handler: impl MessageHandler) {
		self.inner.dispatcher.set_handler(Arc::new(handler));
	}

	/// Removes persisted credentials for the resolved session path. Best-effort.
	pub async fn clear_session(&self) {
		let shared = self.inner.shared.lock().await;
		self.clear_session_locked(&shared);
	}

	/// Cancels pending reconnect and pairing-expiry timers without changing state.
	pub async fn cancel_pending(&self) {
		let mut shared = self.inner.shared.lock().await;
		let reconnect = shared.scheduler.cancel();
		let expiry = shared.pairing.cancel_expiry();
		debug!(target = "pairlink.connection", reconnect, expiry, "pending timers cancelled");
		self.commit(&shared);
	}

	pub fn connection_state(&self) -> ConnectionState {
		self.inner.status.borrow().state
	}

	pub fn is_connected(&self) -> bool {
		self.inner.status.borrow().is_connected()
	}

	pub fn reconnect_attempts(&self) -> u32 {
		self.inner.status.borrow().reconnect_attempts
	}

	pub fn current_challenge(&self) -> Option<PairingChallenge> {
		self.inner.status.borrow().challenge.clone()
	}

	pub fn session_path(&self) -> Option<PathBuf> {
		self.inner.status.borrow().session_path.clone()
	}

	pub fn detailed_status(&self) -> DetailedStatus {
		self.inner.status.borrow().clone()
	}

	/// Receiver that observes every committed status.
	pub fn subscribe(&self) -> watch::Receiver<DetailedStatus> {
		self.inner.status.subscribe()
	}

	async fn apply(&self, shared: &mut Shared, input: Input) {
		let before = shared.machine.state();
		let effects = shared.machine.apply(input);
		let after = shared.machine.state();
		if before != after {
			info!(target = "pairlink.connection", from = %before, to = %after, "state transition");
		}
		for effect in effects {
			self.execute(shared, effect).await;
		}
		self.commit(shared);
	}

	async fn execute(&self, shared: &mut Shared, effect: Effect) {
		trace!(target = "pairlink.connection", ?effect, "effect");
		match effect {
			Effect::StoreChallenge(raw) => {
				shared.pairing.accept(&raw, Utc::now());
			}
			Effect::ArmPairingExpiry => {
				let inner = Arc::downgrade(&self.inner);
				shared.pairing.arm_expiry(move |generation| pairing_expiry_task(inner, generation));
			}
			Effect::ClearChallenge => shared.pairing.clear(),
			Effect::ReleaseSocket => {
				if let Some(active) = shared.socket.take() {
					debug!(target = "pairlink.connection", epoch = active.epoch, "socket released");
				}
			}
			Effect::LogoutSocket => {
				if let Some(active) = shared.socket.take() {
					match active.socket.logout().await {
						Ok(()) => debug!(target = "pairlink.connection", epoch = active.epoch, "socket logged out"),
						Err(err) => warn!(target = "pairlink.connection", error = %err, "logout failed; continuing disconnect"),
					}
				}
			}
			Effect::ClearSession => self.clear_session_locked(shared),
			Effect::ResetReconnect => shared.scheduler.reset(),
			Effect::CancelReconnect => {
				shared.scheduler.cancel();
			}
			Effect::ScheduleReconnect(delay) => {
				let fixed = match delay {
					ReconnectDelay::Backoff => None,
					ReconnectDelay::Fixed(delay) => Some(delay),
				};
				let inner = Arc::downgrade(&self.inner);
				let lifecycle = shared.lifecycle;
				shared
					.scheduler
					.schedule(fixed, move |generation| reconnect_task(inner, generation, lifecycle));
			}
		}
	}

	fn commit(&self, shared: &Shared) {
		self.inner.status.send_replace(shared.snapshot(&self.inner.config));
	}

	fn clear_session_locked(&self, shared: &Shared) {
		match &shared.session_path {
			Some(path) => self.clear_session_at(path),
			None => debug!(target = "pairlink.session", "no session path resolved; nothing to clear"),
		}
	}

	fn clear_session_at(&self, path: &std::path::Path) {
		let outcome = self.inner.store.clear(path);
		if outcome.failed > 0 {
			warn!(target = "pairlink.session", path = %path.display(), removed = outcome.removed, failed = outcome.failed, "session partially cleared");
		} else {
			info!(target = "pairlink.session", path = %path.display(), removed = outcome.removed, "session cleared");
		}
	}

	async fn on_pairing_expired(&self, generation: u64) {
		let mut shared = self.inner.shared.lock().await;
		if !shared.pairing.claim_expiry(generation) {
			trace!(target = "pairlink.pairing", generation, "stale pairing expiry ignored");
			return;
		}
		if shared.machine.state() == ConnectionState::QrRequired {
			warn!(
				target = "pairlink.pairing",
				timeout_ms = shared.pairing.timeout().as_millis() as u64,
				"pairing challenge expired unanswered; reconnecting"
			);
		}
		self.apply(&mut shared, Input::PairingExpired).await;
	}

	async fn on_reconnect_due(&self, generation: u64, lifecycle: u64) {
		let attempt = {
			let mut shared = self.inner.shared.lock().await;
			if !shared.scheduler.claim(generation) || shared.lifecycle != lifecycle {
				trace!(target = "pairlink.reconnect", generation, "stale reconnect ignored");
				return;
			}
			self.commit(&shared);
			shared.scheduler.attempts()
		};

		info!(target = "pairlink.reconnect", attempt, "reconnecting");
		let Err(err) = self.initialize_within(Some(lifecycle)).await else {
			return;
		};

		let mut shared = self.inner.shared.lock().await;
		if shared.lifecycle != lifecycle || matches!(err, Error::Aborted) {
			debug!(target = "pairlink.reconnect", "reconnect abandoned after disconnect()");
			return;
		}
		warn!(target = "pairlink.reconnect", attempt, error = %err, "reconnect attempt failed");
		self.execute(&mut shared, Effect::ScheduleReconnect(ReconnectDelay::Backoff)).await;
		self.commit(&shared);
	}

	/// Handles one socket event. Returns `false` once the socket is no longer active.
	///
	/// Upserted batches are queued to the socket's ingress task, so a slow
	/// handler never holds up connection updates.
	async fn handle_event(&self, epoch: u64, event: SocketEvent, ingress: &mpsc::UnboundedSender<Batch>) -> bool {
		trace!(target = "pairlink.connection", event = event.name(), epoch, "socket event");
		match event {
			SocketEvent::ConnectionUpdate(update) => self.on_connection_update(epoch, update).await,
			SocketEvent::CredsUpdate { credentials } => self.on_creds_update(epoch, credentials).await,
			SocketEvent::MessagesUpsert { messages, kind } => {
				if !self.inner.shared.lock().await.owns(epoch) {
					return false;
				}
				trace!(target = "pairlink.ingress", count = messages.len(), ?kind, "inbound batch queued");
				ingress.send((messages, kind)).is_ok()
			}
			SocketEvent::MessagesUpdate { updates } => {
				trace!(target = "pairlink.ingress", count = updates.len(), "message status updates");
				true
			}
			SocketEvent::PresenceUpdate(update) => {
				trace!(target = "pairlink.ingress", id = %update.id, presence = ?update.presence, "presence update");
				true
			}
		}
	}

	async fn on_connection_update(&self, epoch: u64, update: ConnectionUpdate) -> bool {
		let mut shared = self.inner.shared.lock().await;
		if !shared.owns(epoch) {
			debug!(target = "pairlink.connection", epoch, "update from superseded socket ignored");
			return false;
		}

		if let Some(raw) = update.qr {
			self.apply(&mut shared, Input::PairingChallenge(raw)).await;
		}

		match update.connection {
			Some(ConnectionPhase::Open) => {
				shared.last_connected_at = Some(Utc::now());
				info!(target = "pairlink.connection", "connection open");
				self.apply(&mut shared, Input::Opened).await;
				true
			}
			Some(ConnectionPhase::Close) => {
				let reason = DisconnectReason::from_close(update.last_disconnect.as_ref());
				let code = update.last_disconnect.as_ref().and_then(|info| info.status_code);
				match reason.plan() {
					RecoveryPlan::ClearAndHalt => {
						error!(target = "pairlink.connection", %reason, ?code, "logged out by the network; clearing session, not reconnecting")
					}
					plan => warn!(target = "pairlink.connection", %reason, ?code, ?plan, "connection closed"),
				}
				shared.last_disconnect = Some(LastDisconnect {
					reason: reason.clone(),
					at: Utc::now(),
				});
				self.apply(&mut shared, Input::Closed(reason)).await;
				false
			}
			Some(ConnectionPhase::Connecting) => {
				debug!(target = "pairlink.connection", "socket connecting");
				true
			}
			None => true,
		}
	}

	async fn on_creds_update(&self, epoch: u64, credentials: Credentials) -> bool {
		let shared = self.inner.shared.lock().await;
		if !shared.owns(epoch) {
			return false;
		}
		let Some(path) = shared.session_path.as_deref() else {
			return true;
		};
		match self.inner.store.save(path, &credentials) {
			Ok(()) => debug!(target = "pairlink.session", identity = ?credentials.identity(), "credentials updated"),
			Err(err) => warn!(target = "pairlink.session", path = %path.display(), error = %err, "failed to persist credentials"),
		}
		true
	}

	async fn on_stream_end(&self, epoch: u64) {
		let mut shared = self.inner.shared.lock().await;
		if !shared.owns(epoch) {
			return;
		}
		warn!(target = "pairlink.connection", epoch, "socket event stream ended without close; treating as lost");
		shared.last_disconnect = Some(LastDisconnect {
			reason: DisconnectReason::Lost,
			at: Utc::now(),
		});
		self.apply(&mut shared, Input::Closed(DisconnectReason::Lost)).await;
	}
}

impl std::fmt::Debug for ConnectionManager {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ConnectionManager")
			.field("session_id", &self.inner.config.session_id)
			.field("state", &self.connection_state())
			.finish_non_exhaustive()
	}
}

fn upgrade(inner: &Weak<Inner>) -> Option<ConnectionManager> {
	inner.upgrade().map(|inner| ConnectionManager { inner })
}

fn pairing_expiry_task(inner: Weak<Inner>, generation: u64) -> BoxFuture {
	Box::pin(async move {
		if let Some(manager) = upgrade(&inner) {
			manager.on_pairing_expired(generation).await;
		}
	})
}

fn reconnect_task(inner: Weak<Inner>, generation: u64, lifecycle: u64) -> BoxFuture {
	Box::pin(async move {
		if let Some(manager) = upgrade(&inner) {
			manager.on_reconnect_due(generation, lifecycle).await;
		}
	})
}

/// Drains one socket's events in order until it stops being the active socket.
async fn run_events(inner: Weak<Inner>, mut events: SocketEvents, epoch: u64) {
	let (ingress, batches) = mpsc::unbounded_channel();
	tokio::spawn(run_ingress(inner.clone(), batches, epoch));
	while let Some(event) = events.recv().await {
		let Some(manager) = upgrade(&inner) else {
			return;
		};
		if !manager.handle_event(epoch, event, &ingress).await {
			trace!(target = "pairlink.connection", epoch, "event loop finished");
			return;
		}
	}
	if let Some(manager) = upgrade(&inner) {
		manager.on_stream_end(epoch).await;
	}
}

/// Delivers one socket's batches in arrival order. Batches queued before the
/// socket closed are still delivered.
async fn run_ingress(inner: Weak<Inner>, mut batches: mpsc::UnboundedReceiver<Batch>, epoch: u64) {
	while let Some((messages, kind)) = batches.recv().await {
		let Some(manager) = upgrade(&inner) else {
			return;
		};
		let summary = manager.inner.dispatcher.dispatch(messages, kind).await;
		debug!(
			target = "pairlink.ingress",
			epoch,
			delivered = summary.delivered,
			skipped = summary.skipped,
			failed = summary.failed,
			"inbound batch processed"
		);
	}
}
