use std::ffi::OsString;
use std::path::Path;

use crate::data::FormatId;

/// Internal Struct for easily adding various types that resolve to [`OsString`] and output a [`Vec<OsString>`]
/// exists because [std::process::Command] is too overkill to use for a argument collection for having to use it later
#[derive(Debug, Default)]
struct ArgsHelper(Vec<OsString>);
impl ArgsHelper {
	/// Create a new instance of ArgsHelper
	pub fn new() -> Self {
		return Self(Vec::default());
	}

	/// Add a new Argument to the list, added at the end and converted to a [`OsString`]
	/// Returns the input reference to "self" for chaining
	pub fn arg<U>(&mut self, arg: U) -> &mut Self
	where
		U: Into<OsString>,
	{
		self.0.push(arg.into());

		return self;
	}

	/// Add an argument only if `cond` holds
	pub fn arg_if<U>(&mut self, cond: bool, arg: U) -> &mut Self
	where
		U: Into<OsString>,
	{
		if cond {
			self.arg(arg);
		}

		return self;
	}

	/// Convert Self to the inner value
	/// Consumes self
	pub fn into_inner(self) -> Vec<OsString> {
		return self.0;
	}
}

impl From<ArgsHelper> for Vec<OsString> {
	fn from(v: ArgsHelper) -> Self {
		return v.into_inner();
	}
}

/// Containers the extractor can target when merging separate audio/video atoms
/// (`SPEC_FULL.md` §4.5)
const MERGE_FORMATS: &[&str] = &["mkv", "mp4", "ogg", "webm", "flv"];

/// Assemble the argument vector for a `--dump-json` probe (`SPEC_FULL.md` §4.4)
pub fn assemble_dump_args<U: Into<OsString>>(url: U, user_agent: &str) -> Vec<OsString> {
	let mut args = ArgsHelper::new();

	args.arg("--dump-json")
		.arg("--yes-playlist")
		.arg("--no-color")
		.arg("--no-check-certificate")
		.arg("--ignore-config")
		.arg("--ignore-errors");
	args.arg_if(!user_agent.is_empty(), "--user-agent");
	args.arg_if(!user_agent.is_empty(), user_agent);
	args.arg(url);

	return args.into();
}

/// Assemble the argument vector for the companion `--flat-playlist` probe (`SPEC_FULL.md` §4.4)
pub fn assemble_flat_args<U: Into<OsString>>(url: U, user_agent: &str) -> Vec<OsString> {
	let mut args = ArgsHelper::new();

	args.arg("--dump-json")
		.arg("--yes-playlist")
		.arg("--no-color")
		.arg("--no-check-certificate")
		.arg("--ignore-config")
		.arg("--ignore-errors")
		.arg("--flat-playlist");
	args.arg_if(!user_agent.is_empty(), "--user-agent");
	args.arg_if(!user_agent.is_empty(), user_agent);
	args.arg(url);

	return args.into();
}

/// All inputs [`assemble_download_args`] needs to build the `start()` argv (`SPEC_FULL.md` §4.5)
#[derive(Debug, Clone)]
pub struct DownloadArgsInput<'a> {
	pub output_path: &'a Path,
	pub selected_format_id: &'a FormatId,
	pub url: &'a str,
	pub user_agent: &'a str,
	pub referring_page: &'a str,
	pub merge_output_format: &'a str,
}

/// Assemble the exact argument vector for a download start, in the order `SPEC_FULL.md` §4.5
/// fixes
pub fn assemble_download_args(input: &DownloadArgsInput<'_>) -> Vec<OsString> {
	let mut args = ArgsHelper::new();

	args.arg("--output").arg(input.output_path);
	args.arg("--no-playlist")
		.arg("--no-color")
		.arg("--no-check-certificate");
	args.arg("--no-overwrites")
		.arg("--no-continue")
		.arg("--no-part")
		.arg("--no-mtime")
		.arg("--no-cache-dir");
	args.arg("--restrict-filenames").arg("--ignore-config");
	args.arg("--format").arg(input.selected_format_id.to_string());
	args.arg(input.url);

	args.arg_if(!input.user_agent.is_empty(), "--user-agent");
	args.arg_if(!input.user_agent.is_empty(), input.user_agent);

	args.arg_if(!input.referring_page.is_empty(), "--referer");
	args.arg_if(!input.referring_page.is_empty(), input.referring_page);

	let merge_format_allowed = MERGE_FORMATS.contains(&input.merge_output_format);
	args.arg_if(merge_format_allowed, "--merge-output-format");
	args.arg_if(merge_format_allowed, input.merge_output_format);

	return args.into();
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn test_assemble_dump_args_without_user_agent() {
		let args = assemble_dump_args("https://example.com/abc", "");

		assert_eq!(args, vec![
			OsString::from("--dump-json"),
			OsString::from("--yes-playlist"),
			OsString::from("--no-color"),
			OsString::from("--no-check-certificate"),
			OsString::from("--ignore-config"),
			OsString::from("--ignore-errors"),
			OsString::from("https://example.com/abc"),
		]);
	}

	#[test]
	fn test_assemble_dump_args_with_user_agent() {
		let args = assemble_dump_args("https://example.com/abc", "UA/1.0");

		assert_eq!(args, vec![
			OsString::from("--dump-json"),
			OsString::from("--yes-playlist"),
			OsString::from("--no-color"),
			OsString::from("--no-check-certificate"),
			OsString::from("--ignore-config"),
			OsString::from("--ignore-errors"),
			OsString::from("--user-agent"),
			OsString::from("UA/1.0"),
			OsString::from("https://example.com/abc"),
		]);
	}

	#[test]
	fn test_assemble_flat_args_includes_flat_playlist_flag() {
		let args = assemble_flat_args("https://example.com/abc", "");

		assert!(args.contains(&OsString::from("--flat-playlist")));
		assert_eq!(args.last(), Some(&OsString::from("https://example.com/abc")));
	}

	#[test]
	fn test_assemble_download_args_minimal() {
		let format_id = FormatId::single("22");
		let input = DownloadArgsInput {
			output_path:         Path::new("/tmp/out.mp4"),
			selected_format_id:  &format_id,
			url:                 "https://example.com/abc",
			user_agent:          "",
			referring_page:      "",
			merge_output_format: "",
		};

		let args = assemble_download_args(&input);

		assert_eq!(args, vec![
			OsString::from("--output"),
			OsString::from("/tmp/out.mp4"),
			OsString::from("--no-playlist"),
			OsString::from("--no-color"),
			OsString::from("--no-check-certificate"),
			OsString::from("--no-overwrites"),
			OsString::from("--no-continue"),
			OsString::from("--no-part"),
			OsString::from("--no-mtime"),
			OsString::from("--no-cache-dir"),
			OsString::from("--restrict-filenames"),
			OsString::from("--ignore-config"),
			OsString::from("--format"),
			OsString::from("22"),
			OsString::from("https://example.com/abc"),
		]);
	}

	#[test]
	fn test_assemble_download_args_full() {
		let format_id = FormatId::parse("137+251");
		let input = DownloadArgsInput {
			output_path:         Path::new("/tmp/out.%(ext)s"),
			selected_format_id:  &format_id,
			url:                 "https://example.com/abc",
			user_agent:          "UA/1.0",
			referring_page:      "https://example.com/",
			merge_output_format: "mkv",
		};

		let args = assemble_download_args(&input);

		assert!(args.contains(&OsString::from("--user-agent")));
		assert!(args.contains(&OsString::from("UA/1.0")));
		assert!(args.contains(&OsString::from("--referer")));
		assert!(args.contains(&OsString::from("https://example.com/")));
		assert!(args.contains(&OsString::from("--merge-output-format")));
		assert!(args.contains(&OsString::from("mkv")));
	}

	#[test]
	fn test_assemble_download_args_rejects_unknown_merge_format() {
		let format_id = FormatId::single("22");
		let input = DownloadArgsInput {
			output_path:         Path::new("/tmp/out.mp4"),
			selected_format_id:  &format_id,
			url:                 "https://example.com/abc",
			user_agent:          "",
			referring_page:      "",
			merge_output_format: "avi",
		};

		let args = assemble_download_args(&input);

		assert!(!args.contains(&OsString::from("--merge-output-format")));
	}
}
