//! Persisted credential storage.
//!
//! [`CredentialStore`] is the seam to whatever keeps authentication material
//! for a session path. [`FileCredentialStore`] is the on-disk implementation:
//! the primary credentials live in `creds.json` and every other `*.json` file in
//! the session directory (pre-keys, sessions, app-state keys) counts as a
//! credential artifact for [`clear`](CredentialStore::clear).

use std::fs;
use std::io;
use std::path::Path;
use std::time::{Duration, SystemTime};

use pairlink_protocol::Credentials;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

/// File name of the primary credentials inside a session directory.
pub const CREDS_FILE: &str = "creds.json";

#[derive(Debug, Error)]
pub enum StoreError {
	#[error("credential store I/O failed: {0}")]
	Io(#[from] io::Error),

	#[error("credentials are not valid JSON: {0}")]
	Json(#[from] serde_json::Error),
}

/// Result of a best-effort clear.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ClearOutcome {
	pub removed: usize,
	pub failed: usize,
}

/// Storage for a session's authentication material.
pub trait CredentialStore: Send + Sync {
	/// Loads the credentials, or `None` when nothing is persisted.
	fn load(&self, session: &Path) -> Result<Option<Credentials>, StoreError>;

	fn save(&self, session: &Path, credentials: &Credentials) -> Result<(), StoreError>;

	/// Removes every credential artifact. Per-file failures are logged and
	/// counted, never returned.
	fn clear(&self, session: &Path) -> ClearOutcome;

	/// Age of the persisted credentials, or `None` when nothing is persisted.
	fn stat_age(&self, session: &Path) -> Option<Duration>;
}

/// JSON files in a session directory.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileCredentialStore;

impl FileCredentialStore {
	pub fn new() -> Self {
		Self
	}
}

impl CredentialStore for FileCredentialStore {
	fn load(&self, session: &Path) -> Result<Option<Credentials>, StoreError> {
		let raw = match fs::read_to_string(session.join(CREDS_FILE)) {
			Ok(raw) => raw,
			Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
			Err(err) => return Err(err.into()),
		};
		Ok(Some(serde_json::from_str(&raw)?))
	}

	fn save(&self, session: &Path, credentials: &Credentials) -> Result<(), StoreError> {
		fs::create_dir_all(session)?;
		let target = session.join(CREDS_FILE);
		let staging = session.join(format!(".{CREDS_FILE}.tmp"));
		fs::write(&staging, serde_json::to_vec_pretty(credentials)?)?;
		fs::rename(&staging, &target)?;
		debug!(target = "pairlink.session", path = %target.display(), "credentials saved");
		Ok(())
	}

	fn clear(&self, session: &Path) -> ClearOutcome {
		let mut outcome = ClearOutcome::default();
		let entries = match fs::read_dir(session) {
			Ok(entries) => entries,
			Err(err) if err.kind() == io::ErrorKind::NotFound => return outcome,
			Err(err) => {
				warn!(target = "pairlink.session", path = %session.display(), error = %err, "cannot list session directory for clearing");
				outcome.failed += 1;
				return outcome;
			}
		};

		for entry in entries {
			let path = match entry {
				Ok(entry) => entry.path(),
				Err(err) => {
					warn!(target = "pairlink.session", error = %err, "skipping unreadable directory entry");
					outcome.failed += 1;
					continue;
				}
			};
			if !is_credential_artifact(&path) {
				continue;
			}
			match fs::remove_file(&path) {
				Ok(()) => outcome.removed += 1,
				Err(err) => {
					warn!(target = "pairlink.session", path = %path.display(), error = %err, "failed to remove credential file");
					outcome.failed += 1;
				}
			}
		}
		outcome
	}

	fn stat_age(&self, session: &Path) -> Option<Duration> {
		let modified = fs::metadata(session.join(CREDS_FILE)).and_then(|meta| meta.modified()).ok()?;
		Some(SystemTime::now().duration_since(modified).unwrap_or_default())
	}
}

fn is_credential_artifact(path: &Path) -> bool {
	path.is_file() && path.extension().is_some_and(|ext| ext == "json")
}

#[cfg(test)]
mod tests {
	use serde_json::json;
	use tempfile::TempDir;

	use super::*;

	#[test]
	fn load_missing_is_none() {
		let dir = TempDir::new().unwrap();
		let store = FileCredentialStore::new();
		assert!(store.load(dir.path()).unwrap().is_none());
		assert!(store.stat_age(dir.path()).is_none());
	}

	#[test]
	fn save_then_load() {
		let dir = TempDir::new().unwrap();
		let session = dir.path().join("agent_1");
		let store = FileCredentialStore::new();
		let creds = Credentials::new(json!({ "me": { "id": "15550001@s.whatsapp.net" } }));

		store.save(&session, &creds).unwrap();

		assert_eq!(store.load(&session).unwrap(), Some(creds));
		assert!(store.stat_age(&session).unwrap() < Duration::from_secs(60));
		assert!(!session.join(".creds.json.tmp").exists());
	}

	#[test]
	fn load_garbage_is_json_error() {
		let dir = TempDir::new().unwrap();
		fs::write(dir.path().join(CREDS_FILE), "{not json").unwrap();
		let err = FileCredentialStore::new().load(dir.path()).unwrap_err();
		assert!(matches!(err, StoreError::Json(_)));
	}

	#[test]
	fn clear_removes_json_artifacts_only() {
		let dir = TempDir::new().unwrap();
		fs::write(dir.path().join(CREDS_FILE), "{}").unwrap();
		fs::write(dir.path().join("pre-key-1.json"), "{}").unwrap();
		fs::write(dir.path().join("session-123.json"), "{}").unwrap();
		fs::write(dir.path().join(".pairlink.lock"), "42").unwrap();
		fs::create_dir(dir.path().join("media")).unwrap();

		let outcome = FileCredentialStore::new().clear(dir.path());

		assert_eq!(outcome, ClearOutcome { removed: 3, failed: 0 });
		assert!(dir.path().join(".pairlink.lock").exists());
		assert!(dir.path().join("media").is_dir());
		assert!(!dir.path().join(CREDS_FILE).exists());
	}

	#[test]
	fn clear_missing_directory_is_noop() {
		let dir = TempDir::new().unwrap();
		let outcome = FileCredentialStore::new().clear(&dir.path().join("absent"));
		assert_eq!(outcome, ClearOutcome::default());
	}
}
