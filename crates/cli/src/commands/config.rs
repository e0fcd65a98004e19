use tracing::info;

use crate::context::CommandContext;
use crate::error::Result;
use crate::output::print_result;

pub fn show(ctx: &CommandContext, name: &str) -> Result<()> {
	info!(target = "pairlink.cli", session_id = %ctx.config.session_id, "config show");
	print_result(name, &ctx.config)
}
