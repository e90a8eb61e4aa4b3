//! Module for Clap related structs (derived)

#![deny(missing_docs)] // comments are used for "--help" generation, so it should always be defined

use std::path::PathBuf;

use clap::{
	Parser,
	Subcommand,
	ValueHint,
};
use clap_complete::Shell;
use is_terminal::IsTerminal;

#[derive(Debug, Parser)]
#[command(author, version = env!("STREAMCLI_VERSION"), about, long_about = None)]
#[command(bin_name("streamcli"))]
#[command(args_conflicts_with_subcommands = true)]
pub struct CliDerive {
	/// The URL to probe and download; ignored when a subcommand is given
	#[arg(value_hint = ValueHint::Url)]
	pub url: Option<String>,

	/// Directory downloaded files are written to (defaults to the current directory)
	#[arg(short, long, env = "STREAMCLI_OUT")]
	pub output: Option<PathBuf>,

	/// Don't prompt for a format, always pick the default composite format
	#[arg(short = 'y', long)]
	pub yes: bool,

	/// Increase log verbosity; can be repeated (-v, -vv, -vvv)
	#[arg(short, long, action = clap::ArgAction::Count)]
	pub verbosity: u8,

	/// Override the User-Agent sent by the extractor to the remote host
	#[arg(long, env = "STREAMCLI_USER_AGENT")]
	pub user_agent: Option<String>,

	#[command(subcommand)]
	pub subcommands: Option<SubCommands>,
}

impl CliDerive {
	/// Execute [`clap::Parser::parse`] and apply custom validation and transformation logic
	pub fn custom_parse() -> Self {
		return Self::parse();
	}

	/// Whether this process is attached to an interactive terminal, ie. whether stdout is a tty.
	/// `--yes` forces non-interactive behavior even on a tty.
	pub fn is_interactive(&self) -> bool {
		if self.yes {
			return false;
		}

		return std::io::stdout().is_terminal();
	}
}

#[derive(Debug, Subcommand)]
pub enum SubCommands {
	/// Print the extractor's version
	Version(CommandVersion),
	/// Trigger the extractor's self-upgrade and wait for it to finish
	Update(CommandUpdate),
	/// Purge the extractor's cache directory
	PurgeCache(CommandPurgeCache),
	/// List every extractor known to the underlying tool, with descriptions
	Extractors(CommandExtractors),
	/// Generate shell completions for this binary
	Completions(CommandCompletions),
}

#[derive(Debug, Parser)]
pub struct CommandVersion {}

#[derive(Debug, Parser)]
pub struct CommandUpdate {}

#[derive(Debug, Parser)]
pub struct CommandPurgeCache {}

#[derive(Debug, Parser)]
pub struct CommandExtractors {}

#[derive(Debug, Parser)]
pub struct CommandCompletions {
	/// Shell to generate completions for
	#[arg(value_enum)]
	pub shell: Shell,
	/// Write completions to this file instead of stdout
	#[arg(long, value_hint = ValueHint::FilePath)]
	pub output_file_path: Option<PathBuf>,
}
