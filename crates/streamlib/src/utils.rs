//! Module for utility functions, that may be used in various other modules

use std::path::{
	Path,
	PathBuf,
};

use path_absolutize::Absolutize;

/// Simple helper to resolve "~" to the Home directory
/// System agnostic as long as [`dirs::home_dir`] support's it
pub fn expand_tidle<I: AsRef<Path>>(input: I) -> Option<PathBuf> {
	let path = input.as_ref();

	if !path.starts_with("~") {
		return Some(path.to_owned());
	}
	if path == Path::new("~") {
		return dirs::home_dir();
	}
	// dont support "~user" syntax
	if !path.starts_with("~/") {
		unreachable!("This should never occur, because \"path.starts_with\" should have already returned");
	}

	return dirs::home_dir().map(|mut v| {
		// handle case where "home_dir" might be set to the root POSIX directory
		return if v == Path::new("/") {
			// "unwrap" can be used, because it is already checked that the variable starts with value
			path.strip_prefix("~").unwrap().to_owned() // return the input path, just without "~"
		} else {
			// "unwrap" can be used, because it is already checked that the variable starts with value
			v.push(path.strip_prefix("~/").unwrap());
			v
		};
	});
}

/// Convert input path to a absolute path, without hitting the filesystem.
/// This function handles `~`(home)
///
/// If the start is not absolute, CWD will be used.
///
/// This functions behavior:
/// - `/path/to/inner/../somewhere` -> `/path/to/somewhere`
/// - `relative/to/somewhere` -> `CWD/relative/to/somewhere`
/// - `./somewhere/./path` -> `CWD/somewhere/path`
/// - `~/somewhere/in/home` -> `HOME/somewhere/in/home`
pub fn to_absolute<P: AsRef<Path>>(input: P) -> std::io::Result<PathBuf> {
	let Some(converted) = expand_tidle(input) else {
		return Err(std::io::Error::new(
			std::io::ErrorKind::InvalidInput,
			"Could not resolve \"~\"",
		));
	};

	return converted.absolutize().map(|v| return v.to_path_buf());
}
