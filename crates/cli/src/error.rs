use std::path::PathBuf;

use thiserror::Error;

use crate::output::ErrorCode;

#[derive(Debug, Error)]
pub enum CliError {
	#[error("invalid configuration: {0}")]
	Config(String),

	#[error("cannot read config file {}: {source}", path.display())]
	ConfigFile {
		path: PathBuf,
		#[source]
		source: pairlink::Error,
	},

	#[error("session {} is in use by process {pid}; stop it first", path.display())]
	SessionBusy { path: PathBuf, pid: u32 },

	#[error(transparent)]
	Io(#[from] std::io::Error),

	#[error(transparent)]
	Json(#[from] serde_json::Error),

	#[error(transparent)]
	Anyhow(#[from] anyhow::Error),
}

impl CliError {
	pub fn code(&self) -> ErrorCode {
		match self {
			CliError::Config(_) | CliError::ConfigFile { .. } => ErrorCode::InvalidInput,
			CliError::SessionBusy { .. } => ErrorCode::SessionBusy,
			CliError::Io(_) => ErrorCode::IoError,
			CliError::Json(_) | CliError::Anyhow(_) => ErrorCode::InternalError,
		}
	}
}

impl From<pairlink::Error> for CliError {
	fn from(err: pairlink::Error) -> Self {
		match err {
			pairlink::Error::Config(message) => CliError::Config(message),
			pairlink::Error::SessionBusy { path, pid } => CliError::SessionBusy { path, pid },
			pairlink::Error::Io(err) => CliError::Io(err),
			other => CliError::Anyhow(other.into()),
		}
	}
}

pub type Result<T> = std::result::Result<T, CliError>;
