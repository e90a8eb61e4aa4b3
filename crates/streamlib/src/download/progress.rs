//! Parsing of the extractor's stdout/stderr progress lines (`SPEC_FULL.md` §4.5)

use once_cell::sync::Lazy;
use regex::Regex;

/// Strip ANSI SGR escape sequences (eg. `\x1b[0;31m`), so `ERROR:`/`WARNING:` prefix detection
/// works the same whether or not the extractor was run with color output
static ANSI_ESCAPE_REGEX: Lazy<Regex> = Lazy::new(|| {
	return Regex::new(r"\x1b\[[0-9;]*m").unwrap();
});

/// The merge-warning's exact diagnostic text (`SPEC_FULL.md` §4.5)
const MERGE_WARNING_TEXT: &str = "Requested formats are incompatible for merge and will be merged into mkv.";

/// The result of classifying a single stdout line
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressLine {
	/// `[download] Destination: <path>` - a new download section has begun
	SectionStart { path: String },
	/// `[download] NN.N% of SIZE` - a progress update within the current section
	Progress { percent: f64, section_total_bytes: u64 },
	/// Any other line, including non-`[download]`-prefixed ones
	Ignored,
}

/// The result of classifying a single stderr line
#[derive(Debug, Clone, PartialEq)]
pub enum StderrLine {
	/// An `ERROR:`-prefixed line, reported verbatim (without the ANSI codes)
	Error(String),
	/// The specific "will be merged into mkv" warning
	MergeWarning,
	/// Any other `WARNING:`-prefixed line
	OtherWarning,
	/// Neither an error nor a warning
	Ignored,
}

/// Classify one stdout line per `SPEC_FULL.md` §4.5's progress grammar
pub fn classify_stdout_line(line: &str) -> ProgressLine {
	let tokens: Vec<&str> = line.split_whitespace().collect();

	let Some(first) = tokens.first() else {
		return ProgressLine::Ignored;
	};

	if first.to_lowercase() != "[download]" {
		return ProgressLine::Ignored;
	}

	if tokens.len() >= 3 && tokens[1] == "Destination:" {
		return ProgressLine::SectionStart {
			path: tokens[2..].join(" "),
		};
	}

	if tokens.len() >= 4 && tokens[1].contains('%') && tokens[2] == "of" {
		let Some(percent) = parse_tolerant_percent(tokens[1]) else {
			return ProgressLine::Ignored;
		};
		let Some(size) = parse_suffixed_size(tokens[3]) else {
			return ProgressLine::Ignored;
		};

		return ProgressLine::Progress {
			percent,
			section_total_bytes: size,
		};
	}

	return ProgressLine::Ignored;
}

/// Classify one stderr line per `SPEC_FULL.md` §4.5's error/warning grammar
pub fn classify_stderr_line(line: &str) -> StderrLine {
	let plain = ANSI_ESCAPE_REGEX.replace_all(line, "");
	let plain = plain.trim();

	if plain.to_uppercase().starts_with("ERROR:") {
		return StderrLine::Error(plain.to_owned());
	}

	if plain.to_uppercase().starts_with("WARNING:") {
		if plain.contains(MERGE_WARNING_TEXT) {
			return StderrLine::MergeWarning;
		}
		return StderrLine::OtherWarning;
	}

	return StderrLine::Ignored;
}

/// Parse a percentage token like `"12.3%"` or the comma-grouped `"1,234.5%"`, stripping any
/// non-digit characters before the decimal point
fn parse_tolerant_percent(token: &str) -> Option<f64> {
	let cleaned: String = token.chars().filter(|c| return c.is_ascii_digit() || *c == '.').collect();

	if cleaned.is_empty() {
		return None;
	}

	return cleaned.parse::<f64>().ok();
}

/// Parse a size token like `"4.12MiB"` into a byte count
fn parse_suffixed_size(token: &str) -> Option<u64> {
	static SIZE_REGEX: Lazy<Regex> = Lazy::new(|| {
		return Regex::new(r"(?i)^([\d.,]+)\s*([KMGT]?i?B)$").unwrap();
	});

	let cap = SIZE_REGEX.captures(token)?;
	let number: f64 = cap[1].replace(',', "").parse().ok()?;
	let unit = cap[2].to_uppercase();

	let multiplier: f64 = match unit.as_str() {
		"B" => 1.0,
		"KB" => 1_000.0,
		"KIB" => 1024.0,
		"MB" => 1_000_000.0,
		"MIB" => 1024.0 * 1024.0,
		"GB" => 1_000_000_000.0,
		"GIB" => 1024.0 * 1024.0 * 1024.0,
		"TB" => 1_000_000_000_000.0,
		"TIB" => 1024.0 * 1024.0 * 1024.0 * 1024.0,
		_ => return None,
	};

	return Some((number * multiplier).round() as u64);
}
