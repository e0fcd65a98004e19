use std::path::PathBuf;

use pairlink_runtime::{LeaseError, SocketError};
use thiserror::Error;

use crate::machine::ConnectionState;
use crate::store::StoreError;

/// Errors returned by the connection manager.
#[derive(Debug, Error)]
pub enum Error {
	/// Outbound send attempted while the session is not `connected`.
	#[error("not connected (state: {state})")]
	NotConnected { state: ConnectionState },

	#[error("invalid destination {0:?}: expected a phone number or a full address")]
	InvalidDestination(String),

	/// Another live process owns the session directory.
	#[error("session {} is in use by process {pid}", path.display())]
	SessionBusy { path: PathBuf, pid: u32 },

	/// `disconnect()` ran while `initialize()` was still in flight.
	#[error("initialization aborted by disconnect")]
	Aborted,

	#[error("invalid configuration: {0}")]
	Config(String),

	#[error("failed to render pairing challenge: {0}")]
	Render(String),

	#[error(transparent)]
	Socket(#[from] SocketError),

	#[error(transparent)]
	Store(#[from] StoreError),

	#[error(transparent)]
	Io(#[from] std::io::Error),

	#[error(transparent)]
	Json(#[from] serde_json::Error),
}

impl From<LeaseError> for Error {
	fn from(err: LeaseError) -> Self {
		match err {
			LeaseError::Held { path, pid } => Error::SessionBusy { path, pid },
			LeaseError::Io(err) => Error::Io(err),
		}
	}
}

pub type Result<T> = std::result::Result<T, Error>;
