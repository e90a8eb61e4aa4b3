#![allow(clippy::needless_return)]
#![warn(clippy::implicit_return)]

#[macro_use]
extern crate log;

use flexi_logger::LogSpecification;

mod clap_conf;
mod commands;
mod logger;
mod utils;

use clap_conf::{
	CliDerive,
	SubCommands,
};

/// Main
fn main() -> Result<(), streamlib::Error> {
	let mut logger_handle = logger::setup_logger()?;

	let cli_matches = CliDerive::custom_parse();

	if let Some(user_agent) = cli_matches.user_agent.clone() {
		streamlib::config::set_user_agent(user_agent);
	}

	// dont do anything if "-v" is not specified (use env / default instead)
	if cli_matches.verbosity > 0 {
		// apply cli "verbosity" argument to the log level
		logger_handle.set_new_spec(
			match cli_matches.verbosity {
				0 => unreachable!("Unreachable because it should be tested before that it is higher than 0"),
				1 => LogSpecification::parse("info"),
				2 => LogSpecification::parse("debug"),
				_ => LogSpecification::parse("trace"),
			}
			.expect("Expected LogSpecification to parse correctly"),
		);
	}

	match &cli_matches.subcommands {
		None => commands::download::command_download(&cli_matches),
		Some(SubCommands::Version(sub_args)) => commands::maintenance::command_version(&cli_matches, sub_args),
		Some(SubCommands::Update(sub_args)) => commands::maintenance::command_update(&cli_matches, sub_args),
		Some(SubCommands::PurgeCache(sub_args)) => commands::maintenance::command_purge_cache(&cli_matches, sub_args),
		Some(SubCommands::Extractors(sub_args)) => commands::maintenance::command_extractors(&cli_matches, sub_args),
		Some(SubCommands::Completions(sub_args)) => commands::completions::command_completions(&cli_matches, sub_args),
	}?;

	return Ok(());
}
