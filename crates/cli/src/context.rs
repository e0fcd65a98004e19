use std::path::PathBuf;

use pairlink::{ManagerConfig, SessionPathResolver};
use tracing::debug;

use crate::cli::Cli;
use crate::error::{CliError, Result};

/// Effective configuration for one invocation.
#[derive(Debug, Clone)]
pub struct CommandContext {
	pub config: ManagerConfig,
}

impl CommandContext {
	/// Layers defaults, then `--config`, then flags and their environment variables.
	pub fn from_cli(cli: &Cli) -> Result<Self> {
		let mut config = match &cli.config {
			Some(path) => ManagerConfig::from_file(path).map_err(|source| CliError::ConfigFile {
				path: path.clone(),
				source,
			})?,
			None => ManagerConfig {
				storage_root: default_storage_root(),
				..ManagerConfig::default()
			},
		};
		if let Some(root) = &cli.storage_root {
			config.storage_root = root.clone();
		}
		if let Some(session_id) = &cli.session_id {
			config.session_id = session_id.clone();
		}
		config.validate()?;
		debug!(target = "pairlink.cli", root = %config.storage_root.display(), session_id = %config.session_id, "configuration resolved");
		Ok(Self { config })
	}

	pub fn resolver(&self) -> SessionPathResolver {
		SessionPathResolver::new(self.config.storage_root.clone(), self.config.session_id.clone())
	}
}

/// `<data dir>/pairlink/sessions`, or `./sessions` when the platform has no data dir.
pub fn default_storage_root() -> PathBuf {
	dirs::data_dir()
		.map(|dir| dir.join("pairlink").join("sessions"))
		.unwrap_or_else(|| PathBuf::from("sessions"))
}
