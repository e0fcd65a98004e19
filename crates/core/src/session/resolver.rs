use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

/// `strftime` layout of the suffix on synthesized session directories.
pub const TIMESTAMP_FORMAT: &str = "%Y%m%dT%H%M%SZ";

/// Picks the directory holding this run's credentials.
///
/// Existing directories are reused so a restart never orphans a paired
/// session: `{id}_{suffix}` directories win over a bare `{id}` directory, and
/// among several the most recently modified one is chosen.
#[derive(Debug, Clone)]
pub struct SessionPathResolver {
	root: PathBuf,
	session_id: String,
}

impl SessionPathResolver {
	pub fn new(root: impl Into<PathBuf>, session_id: impl Into<String>) -> Self {
		Self {
			root: root.into(),
			session_id: session_id.into(),
		}
	}

	pub fn root(&self) -> &Path {
		&self.root
	}

	pub fn resolve(&self) -> PathBuf {
		self.resolve_at(Utc::now())
	}

	/// Resolves using `now` for any synthesized name. Never fails: listing
	/// errors fall back to `{root}/{id}`.
	pub fn resolve_at(&self, now: DateTime<Utc>) -> PathBuf {
		match self.find_existing() {
			Ok(Some(path)) => {
				debug!(target = "pairlink.session", path = %path.display(), "reusing existing session directory");
				path
			}
			Ok(None) => {
				let path = self.root.join(format!("{}_{}", self.session_id, now.format(TIMESTAMP_FORMAT)));
				debug!(target = "pairlink.session", path = %path.display(), "no existing session; using new directory");
				path
			}
			Err(err) => {
				let path = self.root.join(&self.session_id);
				warn!(target = "pairlink.session", root = %self.root.display(), error = %err, fallback = %path.display(), "cannot scan storage root");
				path
			}
		}
	}

	fn find_existing(&self) -> io::Result<Option<PathBuf>> {
		let prefix = format!("{}_", self.session_id);
		let mut named: Vec<(SystemTime, String, PathBuf)> = Vec::new();
		let mut generic = None;

		for entry in fs::read_dir(&self.root)? {
			let entry = entry?;
			if !entry.file_type()?.is_dir() {
				continue;
			}
			let name = entry.file_name().to_string_lossy().into_owned();
			if name == self.session_id {
				generic = Some(entry.path());
			} else if name.len() > prefix.len() && name.starts_with(&prefix) {
				let modified = entry.metadata().and_then(|meta| meta.modified()).unwrap_or(SystemTime::UNIX_EPOCH);
				named.push((modified, name, entry.path()));
			}
		}

		let newest = named.into_iter().max_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)));
		Ok(newest.map(|(_, _, path)| path).or(generic))
	}
}
