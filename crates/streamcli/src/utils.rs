//! Utils for the `streamcli` binary

use std::io::Write;

use indicatif::{
	ProgressBar,
	ProgressDrawTarget,
};

use crate::clap_conf::CliDerive;

/// Helper function to set the progressbar to a draw target if mode is interactive
pub fn set_progressbar(bar: &ProgressBar, main_args: &CliDerive) {
	if main_args.is_interactive() {
		bar.set_draw_target(ProgressDrawTarget::stderr());
	} else {
		bar.set_draw_target(ProgressDrawTarget::hidden());
	}
}

/// Prompt for a 1-based index into `options`, returning the chosen index (0-based).
/// Falls back to index `0` without prompting when not interactive.
pub fn select_index(main_args: &CliDerive, prompt: &str, options: &[String]) -> Result<usize, streamlib::Error> {
	if options.is_empty() {
		return Err(streamlib::Error::other("No options to select from"));
	}

	if !main_args.is_interactive() {
		return Ok(0);
	}

	for (idx, option) in options.iter().enumerate() {
		println!("  [{}] {}", idx + 1, option);
	}

	loop {
		print!("{prompt} [1-{}, default 1]: ", options.len());
		std::io::stdout().flush()?;
		let mut input = String::new();
		std::io::stdin().read_line(&mut input)?;
		let trimmed = input.trim();

		if trimmed.is_empty() {
			return Ok(0);
		}

		match trimmed.parse::<usize>() {
			Ok(n) if n >= 1 && n <= options.len() => return Ok(n - 1),
			_ => println!("... Invalid Input: \"{trimmed}\""),
		}
	}
}
