use clap::Parser;
use pairlink_cli::cli::Cli;
use pairlink_cli::{commands, logging, output};
use tracing::error;

fn main() {
	let cli = Cli::parse();
	logging::init_logging(cli.verbose);

	let name = cli.command.name();
	if let Err(err) = commands::dispatch(cli) {
		error!(target = "pairlink.cli", error = %err, "command failed");
		output::print_failure(name, &err);
		std::process::exit(1);
	}
}
