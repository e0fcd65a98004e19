//! Structured output envelope.

use std::io::{self, Write};

use serde::Serialize;

use crate::error::CliError;

/// Envelope printed by every command.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandResult<T: Serialize> {
	pub ok: bool,
	pub command: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub data: Option<T>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub error: Option<CommandError>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandError {
	pub code: ErrorCode,
	pub message: String,
}

/// Error codes for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
	InvalidInput,
	SessionBusy,
	IoError,
	InternalError,
}

impl std::fmt::Display for ErrorCode {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			ErrorCode::InvalidInput => write!(f, "INVALID_INPUT"),
			ErrorCode::SessionBusy => write!(f, "SESSION_BUSY"),
			ErrorCode::IoError => write!(f, "IO_ERROR"),
			ErrorCode::InternalError => write!(f, "INTERNAL_ERROR"),
		}
	}
}

impl<T: Serialize> CommandResult<T> {
	pub fn success(command: &str, data: T) -> Self {
		Self {
			ok: true,
			command: command.to_string(),
			data: Some(data),
			error: None,
		}
	}
}

impl CommandResult<()> {
	pub fn failure(command: &str, err: &CliError) -> Self {
		Self {
			ok: false,
			command: command.to_string(),
			data: None,
			error: Some(CommandError {
				code: err.code(),
				message: err.to_string(),
			}),
		}
	}
}

/// Prints a successful result as pretty JSON on stdout.
pub fn print_result<T: Serialize>(command: &str, data: T) -> crate::error::Result<()> {
	let mut stdout = io::stdout().lock();
	serde_json::to_writer_pretty(&mut stdout, &CommandResult::success(command, data))?;
	writeln!(stdout)?;
	Ok(())
}

/// Prints a failure envelope. Output errors are ignored; the process is exiting anyway.
pub fn print_failure(command: &str, err: &CliError) {
	let mut stdout = io::stdout().lock();
	let _ = serde_json::to_writer_pretty(&mut stdout, &CommandResult::failure(command, err));
	let _ = writeln!(stdout);
}
