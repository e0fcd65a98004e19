use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, warn};

use crate::store::CredentialStore;

/// Outcome of checking persisted credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "verdict", rename_all = "camelCase")]
pub enum SessionVerdict {
	/// Nothing persisted; pairing starts fresh.
	Missing,
	/// Credentials parse and carry an identity.
	Trusted,
	/// Credentials parse but are structurally unusable.
	Untrusted { reason: String },
	/// Credentials exist but cannot be read or parsed.
	Unreadable { reason: String },
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
	pub path: PathBuf,
	pub exists: bool,
	pub age_secs: Option<u64>,
	pub stale: bool,
	pub identity: Option<String>,
	#[serde(flatten)]
	pub verdict: SessionVerdict,
}

impl ValidationReport {
	/// Whether an existing session can be resumed.
	pub fn has_session(&self) -> bool {
		self.verdict == SessionVerdict::Trusted
	}

	/// Whether persisted artifacts must be cleared before pairing.
	pub fn should_clear(&self) -> bool {
		matches!(self.verdict, SessionVerdict::Untrusted { .. } | SessionVerdict::Unreadable { .. })
	}
}

/// Decides whether persisted credentials may be trusted.
#[derive(Debug, Clone, Copy)]
pub struct SessionValidator {
	stale_after: Duration,
}

impl SessionValidator {
	pub fn new(stale_after: Duration) -> Self {
		Self { stale_after }
	}

	/// Inspects `session`. Read and parse failures become a verdict, never an error.
	pub fn validate(&self, store: &dyn CredentialStore, session: &Path) -> ValidationReport {
		let mut report = ValidationReport {
			path: session.to_path_buf(),
			exists: false,
			age_secs: None,
			stale: false,
			identity: None,
			verdict: SessionVerdict::Missing,
		};

		let Some(age) = store.stat_age(session) else {
			debug!(target = "pairlink.session", path = %session.display(), "no persisted credentials");
			return report;
		};
		report.exists = true;
		report.age_secs = Some(age.as_secs());
		if age > self.stale_after {
			report.stale = true;
			warn!(
				target = "pairlink.session",
				path = %session.display(),
				age_days = age.as_secs() / 86_400,
				"credentials are old; the network may still accept them"
			);
		}

		report.verdict = match store.load(session) {
			Ok(None) => SessionVerdict::Missing,
			Ok(Some(credentials)) => match credentials.identity() {
				Some(identity) => {
					report.identity = Some(identity.to_string());
					SessionVerdict::Trusted
				}
				None => SessionVerdict::Untrusted {
					reason: "credentials carry no identity (`me.id`)".to_string(),
				},
			},
			Err(err) => {
				warn!(target = "pairlink.session", path = %session.display(), error = %err, "credentials unreadable; treating as no session");
				SessionVerdict::Unreadable { reason: err.to_string() }
			}
		};
		report
	}
}

#[cfg(test)]
mod tests {
	use std::fs;

	use pairlink_protocol::Credentials;
	use serde_json::json;
	use tempfile::TempDir;

	use super::*;
	use crate::store::{CREDS_FILE, FileCredentialStore};

	const WEEK: Duration = Duration::from_secs(604_800);

	#[test]
	fn missing_credentials() {
		let dir = TempDir::new().unwrap();
		let report = SessionValidator::new(WEEK).validate(&FileCredentialStore, dir.path());
		assert_eq!(report.verdict, SessionVerdict::Missing);
		assert!(!report.exists);
		assert!(!report.should_clear());
		assert!(!report.has_session());
	}

	#[test]
	fn trusted_credentials_report_identity() {
		let dir = TempDir::new().unwrap();
		FileCredentialStore
			.save(dir.path(), &Credentials::new(json!({ "me": { "id": "1555@s.whatsapp.net" } })))
			.unwrap();

		let report = SessionValidator::new(WEEK).validate(&FileCredentialStore, dir.path());
		assert!(report.has_session());
		assert_eq!(report.identity.as_deref(), Some("1555@s.whatsapp.net"));
		assert!(!report.stale);
	}

	#[test]
	fn missing_identity_is_untrusted() {
		let dir = TempDir::new().unwrap();
		FileCredentialStore.save(dir.path(), &Credentials::new(json!({ "noiseKey": {} }))).unwrap();

		let report = SessionValidator::new(WEEK).validate(&FileCredentialStore, dir.path());
		assert!(matches!(report.verdict, SessionVerdict::Untrusted { .. }));
		assert!(report.should_clear());
	}

	#[test]
	fn garbage_is_unreadable() {
		let dir = TempDir::new().unwrap();
		fs::write(dir.path().join(CREDS_FILE), "\u{0}\u{1}garbage").unwrap();

		let report = SessionValidator::new(WEEK).validate(&FileCredentialStore, dir.path());
		assert!(matches!(report.verdict, SessionVerdict::Unreadable { .. }));
		assert!(report.should_clear());
		assert!(report.exists);
	}

	#[test]
	fn staleness_only_warns() {
		let dir = TempDir::new().unwrap();
		FileCredentialStore
			.save(dir.path(), &Credentials::new(json!({ "me": { "id": "1555@s.whatsapp.net" } })))
			.unwrap();
		std::thread::sleep(Duration::from_millis(5));

		let report = SessionValidator::new(Duration::ZERO).validate(&FileCredentialStore, dir.path());
		assert!(report.stale);
		assert!(report.has_session());
	}

	#[test]
	fn report_serializes_flat() {
		let dir = TempDir::new().unwrap();
		let report = SessionValidator::new(WEEK).validate(&FileCredentialStore, dir.path());
		let value = serde_json::to_value(&report).unwrap();
		assert_eq!(value["verdict"], "missing");
		assert_eq!(value["exists"], false);
	}
}
