//! Connection state machine.
//!
//! [`Machine`] is the transition table in pure form: it consumes an [`Input`]
//! and returns the [`Effect`]s the caller must carry out, in order. It owns the
//! connection state and the unrecognized-disconnect streak; timers, sockets, and
//! storage belong to the caller.
//!
//! | state          | input             | next           | effects |
//! |----------------|-------------------|----------------|---------|
//! | any            | InitializeStarted | connecting     | cancel reconnect, release socket, clear challenge, arm pairing expiry |
//! | any            | InitializeFailed  | disconnected   | release socket, clear challenge |
//! | any            | PairingChallenge  | qr_required    | store challenge, arm pairing expiry |
//! | qr_required    | PairingExpired    | disconnected   | clear challenge, release socket, reconnect (backoff) |
//! | other          | PairingExpired    | unchanged      | none |
//! | any            | Opened            | connected      | clear challenge, reset reconnect |
//! | any            | Closed(reason)    | disconnected   | clear challenge, release socket, then per [`RecoveryPlan`] |
//! | any            | Disconnect        | disconnected   | reset reconnect, clear challenge, logout socket |

use std::fmt;
use std::time::Duration;

use serde::Serialize;

use crate::disconnect::{DisconnectReason, RecoveryPlan};

/// The single authoritative connection state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
	#[default]
	Disconnected,
	Connecting,
	QrRequired,
	Connected,
}

impl ConnectionState {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Disconnected => "disconnected",
			Self::Connecting => "connecting",
			Self::QrRequired => "qr_required",
			Self::Connected => "connected",
		}
	}
}

impl fmt::Display for ConnectionState {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
	InitializeStarted,
	InitializeFailed,
	/// Raw challenge token from the socket.
	PairingChallenge(String),
	/// The pairing expiry timer fired.
	PairingExpired,
	Opened,
	Closed(DisconnectReason),
	/// Explicit `disconnect()` by the owner.
	Disconnect,
}

/// Delay for a scheduled reconnect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconnectDelay {
	Backoff,
	Fixed(Duration),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
	StoreChallenge(String),
	ArmPairingExpiry,
	/// Drop the stored challenge and cancel its expiry timer.
	ClearChallenge,
	/// Forget the active socket so its remaining events are ignored.
	ReleaseSocket,
	/// Take the active socket and log it out; failures are swallowed.
	LogoutSocket,
	ClearSession,
	/// Zero the reconnect counter and cancel a pending reconnect.
	ResetReconnect,
	/// Cancel a pending reconnect, keeping the counter.
	CancelReconnect,
	ScheduleReconnect(ReconnectDelay),
}

#[derive(Debug, Clone)]
pub struct Machine {
	state: ConnectionState,
	unknown_streak: u32,
	unknown_threshold: u32,
	restart_delay: Duration,
}

impl Machine {
	/// `unknown_threshold` is how many consecutive unrecognized disconnects are
	/// tolerated; the next one clears the session.
	pub fn new(unknown_threshold: u32, restart_delay: Duration) -> Self {
		Self {
			state: ConnectionState::Disconnected,
			unknown_streak: 0,
			unknown_threshold,
			restart_delay,
		}
	}

	pub fn state(&self) -> ConnectionState {
		self.state
	}

	pub fn unknown_streak(&self) -> u32 {
		self.unknown_streak
	}

	pub fn apply(&mut self, input: Input) -> Vec<Effect> {
		match input {
			Input::InitializeStarted => {
				self.state = ConnectionState::Connecting;
				vec![
					Effect::CancelReconnect,
					Effect::ReleaseSocket,
					Effect::ClearChallenge,
					Effect::ArmPairingExpiry,
				]
			}
			Input::InitializeFailed => {
				self.state = ConnectionState::Disconnected;
				vec![Effect::ReleaseSocket, Effect::ClearChallenge]
			}
			Input::PairingChallenge(raw) => {
				self.state = ConnectionState::QrRequired;
				vec![Effect::StoreChallenge(raw), Effect::ArmPairingExpiry]
			}
			Input::PairingExpired if self.state == ConnectionState::QrRequired => {
				self.state = ConnectionState::Disconnected;
				vec![
					Effect::ClearChallenge,
					Effect::ReleaseSocket,
					Effect::ScheduleReconnect(ReconnectDelay::Backoff),
				]
			}
			Input::PairingExpired => Vec::new(),
			Input::Opened => {
				self.state = ConnectionState::Connected;
				self.unknown_streak = 0;
				vec![Effect::ClearChallenge, Effect::ResetReconnect]
			}
			Input::Closed(reason) => {
				self.state = ConnectionState::Disconnected;
				let mut effects = vec![Effect::ClearChallenge, Effect::ReleaseSocket];
				effects.extend(self.recover(&reason));
				effects
			}
			Input::Disconnect => {
				self.state = ConnectionState::Disconnected;
				self.unknown_streak = 0;
				vec![Effect::ResetReconnect, Effect::ClearChallenge, Effect::LogoutSocket]
			}
		}
	}

	fn recover(&mut self, reason: &DisconnectReason) -> Vec<Effect> {
		let plan = reason.plan();
		if plan != RecoveryPlan::Unrecognized {
			self.unknown_streak = 0;
		}
		match plan {
			RecoveryPlan::ClearAndHalt => vec![Effect::ClearSession, Effect::ResetReconnect],
			RecoveryPlan::ClearThenRetry => vec![Effect::ClearSession, Effect::ScheduleReconnect(ReconnectDelay::Backoff)],
			RecoveryPlan::RetryFixedDelay => vec![Effect::ScheduleReconnect(ReconnectDelay::Fixed(self.restart_delay))],
			RecoveryPlan::RetryWithBackoff => vec![Effect::ScheduleReconnect(ReconnectDelay::Backoff)],
			RecoveryPlan::Unrecognized => {
				self.unknown_streak += 1;
				if self.unknown_streak > self.unknown_threshold {
					self.unknown_streak = 0;
					vec![Effect::ClearSession, Effect::ScheduleReconnect(ReconnectDelay::Backoff)]
				} else {
					vec![Effect::ScheduleReconnect(ReconnectDelay::Backoff)]
				}
			}
		}
	}
}
