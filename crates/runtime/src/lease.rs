//! Single-owner lease over a session directory.
//!
//! Two processes driving the same credentials make the remote network kick
//! one of them off, which the other then sees as a disconnect and the pair
//! ends up in a reconnect storm. The lease is a pid file in the session
//! directory; a lease whose pid is no longer alive is taken over. Within one
//! process, a registry of held directories refuses a second lease on the same
//! session.

use std::collections::HashSet;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use parking_lot::Mutex;
use thiserror::Error;
use tracing::{debug, warn};

/// File name of the lease inside a session directory.
pub const LEASE_FILE: &str = ".pairlink.lock";

/// Canonical session directories leased by this process.
static HELD: LazyLock<Mutex<HashSet<PathBuf>>> = LazyLock::new(Default::default);

#[derive(Debug, Error)]
pub enum LeaseError {
	#[error("session {} is owned by live process {pid}", path.display())]
	Held { path: PathBuf, pid: u32 },

	#[error(transparent)]
	Io(#[from] io::Error),
}

/// Held lease. Released on drop.
#[derive(Debug)]
pub struct SessionLease {
	path: PathBuf,
	key: PathBuf,
	pid: u32,
}

impl SessionLease {
	/// Takes the lease for `session_dir`, creating the directory if needed.
	///
	/// Fails with [`LeaseError::Held`] when another live process holds it, or
	/// when another lease in this process already covers the directory.
	pub fn acquire(session_dir: &Path) -> Result<Self, LeaseError> {
		fs::create_dir_all(session_dir)?;
		let key = fs::canonicalize(session_dir)?;
		let path = session_dir.join(LEASE_FILE);
		let pid = std::process::id();

		if !HELD.lock().insert(key.clone()) {
			debug!(target = "pairlink.session", path = %path.display(), "session already leased within this process");
			return Err(LeaseError::Held { path, pid });
		}
		if let Err(err) = claim_file(&path, pid) {
			HELD.lock().remove(&key);
			return Err(err);
		}

		Ok(Self { path, key, pid })
	}

	/// Pid recorded in the lease of `session_dir`, if any.
	pub fn holder(session_dir: &Path) -> Option<u32> {
		read_holder(&session_dir.join(LEASE_FILE))
	}

	pub fn path(&self) -> &Path {
		&self.path
	}
}

impl Drop for SessionLease {
	fn drop(&mut self) {
		HELD.lock().remove(&self.key);
		if read_holder(&self.path) != Some(self.pid) {
			return;
		}
		if let Err(err) = fs::remove_file(&self.path) {
			if err.kind() != io::ErrorKind::NotFound {
				warn!(target = "pairlink.session", path = %self.path.display(), error = %err, "failed to release session lease");
			}
		}
	}
}

fn claim_file(path: &Path, pid: u32) -> Result<(), LeaseError> {
	match OpenOptions::new().write(true).create_new(true).open(path) {
		Ok(mut file) => {
			write!(file, "{pid}")?;
		}
		Err(err) if err.kind() == io::ErrorKind::AlreadyExists => match read_holder(path) {
			Some(holder) if holder != pid && pid_is_alive(holder) => {
				return Err(LeaseError::Held {
					path: path.to_path_buf(),
					pid: holder,
				});
			}
			holder => {
				debug!(target = "pairlink.session", path = %path.display(), ?holder, "taking over stale session lease");
				fs::write(path, pid.to_string())?;
			}
		},
		Err(err) => return Err(err.into()),
	}
	Ok(())
}

fn read_holder(path: &Path) -> Option<u32> {
	fs::read_to_string(path).ok()?.trim().parse().ok()
}

/// Returns `true` when a process with `pid` appears alive.
pub fn pid_is_alive(pid: u32) -> bool {
	if pid == 0 {
		return false;
	}
	if pid == std::process::id() {
		return true;
	}
	probe_pid(pid)
}

#[cfg(target_os = "linux")]
fn probe_pid(pid: u32) -> bool {
	Path::new("/proc").join(pid.to_string()).exists()
}

#[cfg(all(unix, not(target_os = "linux")))]
fn probe_pid(pid: u32) -> bool {
	std::process::Command::new("kill")
		.args(["-0", &pid.to_string()])
		.stderr(std::process::Stdio::null())
		.status()
		.is_ok_and(|status| status.success())
}

// No cheap probe here; stale leases are taken over rather than blocking forever.
#[cfg(not(unix))]
fn probe_pid(_pid: u32) -> bool {
	false
}

#[cfg(test)]
mod tests {
	use tempfile::TempDir;

	use super::*;

	#[test]
	fn acquire_writes_own_pid_and_drop_releases() {
		let tmp = TempDir::new().unwrap();
		let dir = tmp.path().join("agent_20260101T000000Z");

		let lease = SessionLease::acquire(&dir).unwrap();
		assert_eq!(SessionLease::holder(&dir), Some(std::process::id()));
		assert!(lease.path().ends_with(LEASE_FILE));

		drop(lease);
		assert_eq!(SessionLease::holder(&dir), None);
	}

	#[test]
	fn second_lease_in_same_process_is_refused() {
		let tmp = TempDir::new().unwrap();
		let first = SessionLease::acquire(tmp.path()).unwrap();

		let err = SessionLease::acquire(tmp.path()).unwrap_err();
		assert!(matches!(err, LeaseError::Held { pid, .. } if pid == std::process::id()));
		// The refused attempt must not release the lease it never held.
		assert_eq!(SessionLease::holder(tmp.path()), Some(std::process::id()));

		drop(first);
		assert_eq!(SessionLease::holder(tmp.path()), None);
		let _again = SessionLease::acquire(tmp.path()).unwrap();
	}

	#[test]
	fn leftover_own_pid_file_is_taken_over() {
		let tmp = TempDir::new().unwrap();
		fs::write(tmp.path().join(LEASE_FILE), std::process::id().to_string()).unwrap();
		assert!(SessionLease::acquire(tmp.path()).is_ok());
	}

	#[test]
	fn dead_holder_is_taken_over() {
		let tmp = TempDir::new().unwrap();
		// pid 0 is never a live process
		fs::write(tmp.path().join(LEASE_FILE), "0").unwrap();

		let _lease = SessionLease::acquire(tmp.path()).unwrap();
		assert_eq!(SessionLease::holder(tmp.path()), Some(std::process::id()));
	}

	#[test]
	fn garbage_lease_is_taken_over() {
		let tmp = TempDir::new().unwrap();
		fs::write(tmp.path().join(LEASE_FILE), "not-a-pid").unwrap();
		assert!(SessionLease::acquire(tmp.path()).is_ok());
	}

	#[test]
	fn pid_zero_is_never_alive() {
		assert!(!pid_is_alive(0));
		assert!(pid_is_alive(std::process::id()));
	}
}
