//! Manager configuration.
//!
//! Every field has a default, so a config file only needs the keys it changes:
//!
//! ```json
//! { "sessionId": "support-bot", "maxReconnectAttempts": 8 }
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::reconnect::BackoffPolicy;

/// Tunables for one managed session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ManagerConfig {
	/// Logical session name; also the prefix of the session directory.
	pub session_id: String,
	/// Directory holding one subdirectory per session.
	pub storage_root: PathBuf,
	pub max_reconnect_attempts: u32,
	pub reconnect_min_delay_ms: u64,
	pub reconnect_max_delay_ms: u64,
	/// Upper bound of the random jitter, as a fraction of the base delay.
	pub reconnect_jitter_ratio: f64,
	/// Fixed delay used after restart-required and post-pairing stream errors.
	pub restart_delay_ms: u64,
	pub qr_timeout_ms: u64,
	pub keep_alive_interval_ms: u64,
	pub connect_timeout_ms: u64,
	pub default_query_timeout_ms: u64,
	/// Credentials older than this are logged as stale but still used.
	pub stale_credentials_after_secs: u64,
	/// Consecutive unrecognized disconnects tolerated before the session is cleared.
	pub unknown_disconnect_clear_threshold: u32,
	pub sync_full_history: bool,
	pub ignore_broadcast: bool,
}

impl Default for ManagerConfig {
	fn default() -> Self {
		Self {
			session_id: "agent".to_string(),
			storage_root: PathBuf::from("sessions"),
			max_reconnect_attempts: 5,
			reconnect_min_delay_ms: 2_000,
			reconnect_max_delay_ms: 60_000,
			reconnect_jitter_ratio: 0.1,
			restart_delay_ms: 2_000,
			qr_timeout_ms: 60_000,
			keep_alive_interval_ms: 30_000,
			connect_timeout_ms: 60_000,
			default_query_timeout_ms: 60_000,
			stale_credentials_after_secs: 7 * 24 * 60 * 60,
			unknown_disconnect_clear_threshold: 2,
			sync_full_history: false,
			ignore_broadcast: true,
		}
	}
}

impl ManagerConfig {
	/// Loads a JSON config file. Missing keys take their defaults.
	pub fn from_file(path: &Path) -> Result<Self> {
		let raw = std::fs::read_to_string(path)?;
		let config: Self = serde_json::from_str(&raw)?;
		Ok(config)
	}

	pub fn validate(&self) -> Result<()> {
		if self.session_id.trim().is_empty() {
			return Err(Error::Config("sessionId must not be empty".into()));
		}
		if self.session_id.contains(['/', '\\']) {
			return Err(Error::Config(format!("sessionId {:?} must not contain path separators", self.session_id)));
		}
		if self.max_reconnect_attempts == 0 {
			return Err(Error::Config("maxReconnectAttempts must be at least 1".into()));
		}
		if self.reconnect_min_delay_ms == 0 {
			return Err(Error::Config("reconnectMinDelayMs must be positive".into()));
		}
		if self.reconnect_min_delay_ms > self.reconnect_max_delay_ms {
			return Err(Error::Config(format!(
				"reconnectMinDelayMs ({}) exceeds reconnectMaxDelayMs ({})",
				self.reconnect_min_delay_ms, self.reconnect_max_delay_ms
			)));
		}
		if !(0.0..=1.0).contains(&self.reconnect_jitter_ratio) {
			return Err(Error::Config(format!(
				"reconnectJitterRatio must be within [0, 1], got {}",
				self.reconnect_jitter_ratio
			)));
		}
		for (name, value) in [
			("qrTimeoutMs", self.qr_timeout_ms),
			("keepAliveIntervalMs", self.keep_alive_interval_ms),
			("connectTimeoutMs", self.connect_timeout_ms),
			("defaultQueryTimeoutMs", self.default_query_timeout_ms),
		] {
			if value == 0 {
				return Err(Error::Config(format!("{name} must be positive")));
			}
		}
		Ok(())
	}

	pub fn backoff_policy(&self) -> BackoffPolicy {
		BackoffPolicy {
			min_delay: Duration::from_millis(self.reconnect_min_delay_ms),
			max_delay: Duration::from_millis(self.reconnect_max_delay_ms),
			jitter_ratio: self.reconnect_jitter_ratio,
			max_attempts: self.max_reconnect_attempts,
		}
	}

	pub fn restart_delay(&self) -> Duration {
		Duration::from_millis(self.restart_delay_ms)
	}

	pub fn qr_timeout(&self) -> Duration {
		Duration::from_millis(self.qr_timeout_ms)
	}

	pub fn keep_alive_interval(&self) -> Duration {
		Duration::from_millis(self.keep_alive_interval_ms)
	}

	pub fn connect_timeout(&self) -> Duration {
		Duration::from_millis(self.connect_timeout_ms)
	}

	pub fn default_query_timeout(&self) -> Duration {
		Duration::from_millis(self.default_query_timeout_ms)
	}

	pub fn stale_after(&self) -> Duration {
		Duration::from_secs(self.stale_credentials_after_secs)
	}
}
