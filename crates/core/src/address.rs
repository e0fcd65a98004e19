//! Destination normalization for outbound sends.

use pairlink_protocol::Jid;

use crate::error::{Error, Result};

/// Normalizes a caller-supplied destination into a network address.
///
/// Anything containing `@` is taken as a full address and must have both a
/// user and a server part. Otherwise every non-digit is dropped (`+1 (555) 010-9999`
/// becomes `15550109999`) and the user server suffix is appended.
pub fn normalize_destination(destination: &str) -> Result<Jid> {
	let trimmed = destination.trim();
	if let Some((user, server)) = trimmed.split_once('@') {
		if user.is_empty() || server.is_empty() || server.contains('@') {
			return Err(Error::InvalidDestination(destination.to_string()));
		}
		return Ok(Jid::from_raw(trimmed));
	}

	let digits: String = trimmed.chars().filter(char::is_ascii_digit).collect();
	if digits.is_empty() {
		return Err(Error::InvalidDestination(destination.to_string()));
	}
	Ok(Jid::user(&digits))
}
