//! Module for cross-platform resolution of the extractor binary

use std::ffi::OsStr;
use std::process::Command;

// This file still exists and is seperated for future quick changes

/// Name (or relative path) of the extractor binary for the current platform.
///
/// On POSIX this is deliberately `./youtube-dl` (current-working-directory relative, not
/// PATH-resolved) to preserve the original tool's behavior; see `SPEC_FULL.md` §9 Open Question (a).
#[cfg(not(target_os = "windows"))]
pub const EXTRACTOR_BIN_NAME: &str = "./youtube-dl";

/// Name of the extractor binary for the current platform (Windows version).
#[cfg(target_os = "windows")]
pub const EXTRACTOR_BIN_NAME: &str = "youtube-dl.exe";

/// Spawn a binary cross-system (not-windows version)
#[cfg(not(target_os = "windows"))]
#[inline]
pub fn spawn_command<P: AsRef<OsStr>>(binary_name: &P) -> Command {
	return Command::new(binary_name);
}

/// Spawn a binary cross-system (windows version)
/// Apparently, rust automatically adds a extensions (".exe") if none is specified
/// Also, rust automatically searches all the paths, including the extractor binary path
#[cfg(target_os = "windows")]
#[inline]
pub fn spawn_command<P: AsRef<OsStr>>(binary_name: &P) -> Command {
	return Command::new(binary_name);
}

/// Build a [`Command`] for the extractor binary, ready to have arguments attached.
#[inline]
pub fn base_extractor_command() -> Command {
	return spawn_command(&EXTRACTOR_BIN_NAME);
}
