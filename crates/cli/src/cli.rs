use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "pairlink")]
#[command(about = "Inspect and maintain messaging session directories")]
#[command(version)]
pub struct Cli {
	/// Increase verbosity (-v info, -vv debug, -vvv trace)
	#[arg(short, long, global = true, action = clap::ArgAction::Count)]
	pub verbose: u8,

	/// JSON manager config; flags override its values
	#[arg(long, global = true, value_name = "FILE")]
	pub config: Option<PathBuf>,

	/// Directory holding session directories
	#[arg(long, global = true, value_name = "DIR", env = "PAIRLINK_STORAGE_ROOT")]
	pub storage_root: Option<PathBuf>,

	/// Session name (prefix of the session directory)
	#[arg(long, global = true, value_name = "ID", env = "PAIRLINK_SESSION_ID")]
	pub session_id: Option<String>,

	#[command(subcommand)]
	pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
	/// Session directory operations
	#[command(subcommand)]
	Session(SessionAction),

	/// Configuration operations
	#[command(subcommand)]
	Config(ConfigAction),
}

#[derive(Subcommand, Debug, Clone, Copy)]
pub enum SessionAction {
	/// Print the session directory the manager would use
	Path,
	/// Validate persisted credentials and report on them
	Inspect,
	/// Remove persisted credential files (best-effort)
	#[command(alias = "rm")]
	Clear,
}

#[derive(Subcommand, Debug, Clone, Copy)]
pub enum ConfigAction {
	/// Print the effective configuration
	Show,
}

impl Commands {
	/// Name used in the output envelope.
	pub fn name(&self) -> &'static str {
		match self {
			Commands::Session(SessionAction::Path) => "session path",
			Commands::Session(SessionAction::Inspect) => "session inspect",
			Commands::Session(SessionAction::Clear) => "session clear",
			Commands::Config(ConfigAction::Show) => "config show",
		}
	}
}
