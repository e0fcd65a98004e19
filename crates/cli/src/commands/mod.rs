mod config;
mod session;

use crate::cli::{Cli, Commands, ConfigAction};
use crate::context::CommandContext;
use crate::error::Result;

pub fn dispatch(cli: Cli) -> Result<()> {
	let ctx = CommandContext::from_cli(&cli)?;
	let name = cli.command.name();
	match cli.command {
		Commands::Session(action) => session::execute(action, &ctx, name),
		Commands::Config(ConfigAction::Show) => config::show(&ctx, name),
	}
}
