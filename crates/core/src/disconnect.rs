//! Disconnect reason decoding and recovery classification.

use std::fmt;

use pairlink_protocol::CloseInfo;
use serde::Serialize;

/// Close status codes sent by the remote network.
pub mod codes {
	pub const LOGGED_OUT: u16 = 401;
	pub const FORBIDDEN: u16 = 403;
	pub const TIMED_OUT: u16 = 408;
	pub const MULTIDEVICE_MISMATCH: u16 = 411;
	pub const CONNECTION_CLOSED: u16 = 428;
	pub const BAD_SESSION: u16 = 500;
	pub const UNAVAILABLE: u16 = 503;
	pub const RESTART_REQUIRED: u16 = 515;
}

/// Why the socket closed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "camelCase")]
pub enum DisconnectReason {
	LoggedOut,
	BadSession,
	Unauthorized,
	RestartRequired,
	StreamErrorAfterPairing,
	Closed,
	Lost,
	TimedOut,
	#[serde(rename_all = "camelCase")]
	Unknown {
		status_code: Option<u16>,
		message: Option<String>,
	},
}

/// What to do after a disconnect. Every reason maps to exactly one plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RecoveryPlan {
	/// Keep the session and retry with exponential backoff.
	RetryWithBackoff,
	/// Keep the session and retry after the short fixed restart delay.
	RetryFixedDelay,
	/// Clear the session, then retry with backoff as a fresh pairing.
	ClearThenRetry,
	/// Clear the session and stop retrying.
	ClearAndHalt,
	/// Retry with backoff; clear only after repeated unrecognized failures.
	Unrecognized,
}

impl DisconnectReason {
	/// Decodes the close payload of a `connection=close` update.
	pub fn from_close(info: Option<&CloseInfo>) -> Self {
		let Some(info) = info else {
			return Self::Unknown {
				status_code: None,
				message: None,
			};
		};
		let message = info.message.as_deref().map(str::to_ascii_lowercase).unwrap_or_default();

		match info.status_code {
			Some(codes::LOGGED_OUT) => Self::LoggedOut,
			Some(codes::FORBIDDEN) => Self::Unauthorized,
			Some(codes::BAD_SESSION | codes::MULTIDEVICE_MISMATCH) => Self::BadSession,
			Some(codes::RESTART_REQUIRED) => Self::RestartRequired,
			Some(codes::CONNECTION_CLOSED) => Self::Closed,
			Some(codes::TIMED_OUT) if message.contains("timed out") => Self::TimedOut,
			Some(codes::TIMED_OUT | codes::UNAVAILABLE) => Self::Lost,
			None if message.contains("stream errored") => Self::StreamErrorAfterPairing,
			_ => Self::Unknown {
				status_code: info.status_code,
				message: info.message.clone(),
			},
		}
	}

	pub fn plan(&self) -> RecoveryPlan {
		classify(self)
	}

	pub fn is_unknown(&self) -> bool {
		matches!(self, Self::Unknown { .. })
	}
}

impl fmt::Display for DisconnectReason {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::LoggedOut => f.write_str("loggedOut"),
			Self::BadSession => f.write_str("badSession"),
			Self::Unauthorized => f.write_str("unauthorized"),
			Self::RestartRequired => f.write_str("restartRequired"),
			Self::StreamErrorAfterPairing => f.write_str("streamErrorAfterPairing"),
			Self::Closed => f.write_str("closed"),
			Self::Lost => f.write_str("lost"),
			Self::TimedOut => f.write_str("timedOut"),
			Self::Unknown { status_code: Some(code), .. } => write!(f, "unknown({code})"),
			Self::Unknown { status_code: None, .. } => f.write_str("unknown"),
		}
	}
}

/// Maps a reason onto its recovery bucket.
pub fn classify(reason: &DisconnectReason) -> RecoveryPlan {
	match reason {
		DisconnectReason::LoggedOut => RecoveryPlan::ClearAndHalt,
		DisconnectReason::BadSession | DisconnectReason::Unauthorized => RecoveryPlan::ClearThenRetry,
		DisconnectReason::RestartRequired | DisconnectReason::StreamErrorAfterPairing => RecoveryPlan::RetryFixedDelay,
		DisconnectReason::Closed | DisconnectReason::Lost | DisconnectReason::TimedOut => RecoveryPlan::RetryWithBackoff,
		DisconnectReason::Unknown { .. } => RecoveryPlan::Unrecognized,
	}
}
