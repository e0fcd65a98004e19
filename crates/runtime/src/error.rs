use thiserror::Error;

/// Errors surfaced by the remote session socket.
#[derive(Debug, Error)]
pub enum SocketError {
	#[error("socket connect failed: {0}")]
	Connect(String),

	#[error("socket send failed: {0}")]
	Send(String),

	#[error("socket logout failed: {0}")]
	Logout(String),

	#[error("socket closed")]
	Closed,

	#[error(transparent)]
	Io(#[from] std::io::Error),
}
