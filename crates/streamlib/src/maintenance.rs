//! Extractor maintenance operations: version probing, self-upgrade, cache purging and extractor
//! listing (`SPEC_FULL.md` §4.6)

use std::path::PathBuf;
use std::sync::mpsc::{
	self,
	Receiver,
};
use std::thread;

use crate::spawn::multiplatform::EXTRACTOR_BIN_NAME;
use crate::spawn::{
	ProcessEvent,
	ProcessRunner,
	StreamKind,
};

/// Value returned by [`version_probe`] when the extractor could not be queried
pub const UNKNOWN_VERSION: &str = "unknown";

/// Terminal event for the fire-and-forget maintenance operations (self-upgrade, cache purge)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaintenanceEvent {
	Done,
}

/// The result of a successful extractor listing
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExtractorListing {
	pub extractors: Vec<String>,
	pub descriptions: Vec<String>,
}

/// Terminal event for [`list_extractors_async`]
#[derive(Debug, Clone, PartialEq)]
pub enum ExtractorsEvent {
	Collected(ExtractorListing),
	Error(String),
	Finished,
}

/// Run every [`ProcessEvent`] for one child to completion, blocking the calling thread.
/// Returns the collected stdout lines, the collected stderr lines, and whether the child
/// finished normally with exit code `0`.
fn run_to_completion(rx: &Receiver<ProcessEvent>) -> (Vec<String>, Vec<String>, bool) {
	let mut stdout = Vec::new();
	let mut stderr = Vec::new();
	let mut success = false;

	for event in rx {
		match event {
			ProcessEvent::Started => {},
			ProcessEvent::Line(StreamKind::Stdout, line) => stdout.push(line),
			ProcessEvent::Line(StreamKind::Stderr, line) => stderr.push(line),
			ProcessEvent::Exited { code, normal } => {
				success = normal && code == Some(0);
			},
			ProcessEvent::SpawnError(_) => {
				success = false;
			},
		}
	}

	return (stdout, stderr, success);
}

/// Blocking. Spawn `--no-color --version`, wait for completion, and return the trimmed stdout.
/// Returns [`UNKNOWN_VERSION`] on any spawn/wait failure. Memoizes the result process-wide
/// (`SPEC_FULL.md` §4.8) after the first success.
pub fn version_probe() -> String {
	if let Some(cached) = crate::config::cached_version() {
		return cached.to_owned();
	}

	let mut runner = ProcessRunner::new();
	let rx = runner.start(std::ffi::OsStr::new(EXTRACTOR_BIN_NAME), ["--no-color", "--version"]);
	let (stdout, _stderr, success) = run_to_completion(rx);

	if !success {
		return UNKNOWN_VERSION.to_owned();
	}

	let version = stdout.join(" ").trim().to_owned();
	if version.is_empty() {
		return UNKNOWN_VERSION.to_owned();
	}

	crate::config::set_version(version.clone());

	return version;
}

/// Async. Spawn `--no-color --update`; emits [`MaintenanceEvent::Done`] once the child has
/// exited, whether the update succeeded or not.
pub fn self_upgrade_async() -> Receiver<MaintenanceEvent> {
	let (tx, rx) = mpsc::channel();

	thread::spawn(move || {
		let mut runner = ProcessRunner::new();
		let inner_rx = runner.start(std::ffi::OsStr::new(EXTRACTOR_BIN_NAME), ["--no-color", "--update"]);
		let (stdout, stderr, _success) = run_to_completion(inner_rx);

		for line in stdout {
			debug!("self-upgrade stdout: {line}");
		}
		for line in stderr {
			debug!("self-upgrade stderr: {line}");
		}

		let _ = tx.send(MaintenanceEvent::Done);
	});

	return rx;
}

/// The extractor's cache directory, following XDG: `XDG_CACHE_HOME`, or `$HOME/.cache` if unset,
/// normalized to native separators via [`crate::utils::to_absolute`]
pub fn cache_dir() -> PathBuf {
	let raw = match std::env::var("XDG_CACHE_HOME") {
		Ok(xdg) if !xdg.is_empty() => PathBuf::from(xdg),
		_ => PathBuf::from(std::env::var("HOME").unwrap_or_default()).join(".cache"),
	};

	return crate::utils::to_absolute(&raw).unwrap_or(raw);
}

/// Async. Spawn `--no-color --rm-cache-dir`; always emits [`MaintenanceEvent::Done`] on the
/// terminal event, even on crash - purging is advisory.
pub fn cache_purge_async() -> Receiver<MaintenanceEvent> {
	let (tx, rx) = mpsc::channel();

	thread::spawn(move || {
		let mut runner = ProcessRunner::new();
		let inner_rx = runner.start(std::ffi::OsStr::new(EXTRACTOR_BIN_NAME), ["--no-color", "--rm-cache-dir"]);
		let _ = run_to_completion(inner_rx);

		let _ = tx.send(MaintenanceEvent::Done);
	});

	return rx;
}

/// Async. Spawn `--list-extractors` and `--extractor-descriptions` in parallel; emits
/// [`ExtractorsEvent::Collected`] with both lists (preserving empty entries) on joint success,
/// else [`ExtractorsEvent::Error`] followed by [`ExtractorsEvent::Finished`].
pub fn list_extractors_async() -> Receiver<ExtractorsEvent> {
	let (tx, rx) = mpsc::channel();

	thread::spawn(move || {
		let extractors_handle = thread::spawn(|| {
			let mut runner = ProcessRunner::new();
			let inner_rx = runner.start(std::ffi::OsStr::new(EXTRACTOR_BIN_NAME), ["--list-extractors"]);
			return run_to_completion(inner_rx);
		});
		let descriptions_handle = thread::spawn(|| {
			let mut runner = ProcessRunner::new();
			let inner_rx = runner.start(std::ffi::OsStr::new(EXTRACTOR_BIN_NAME), ["--extractor-descriptions"]);
			return run_to_completion(inner_rx);
		});

		let (extractors_out, extractors_err, extractors_ok) =
			extractors_handle.join().unwrap_or_default();
		let (descriptions_out, descriptions_err, descriptions_ok) =
			descriptions_handle.join().unwrap_or_default();

		if extractors_ok && descriptions_ok {
			let _ = tx.send(ExtractorsEvent::Collected(ExtractorListing {
				extractors:   extractors_out,
				descriptions: descriptions_out,
			}));
		} else {
			let mut message = String::new();
			message.push_str(&extractors_err.join("\n"));
			message.push_str(&descriptions_err.join("\n"));
			let _ = tx.send(ExtractorsEvent::Error(message));
			let _ = tx.send(ExtractorsEvent::Finished);
		}
	});

	return rx;
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn test_cache_dir_uses_xdg_cache_home_when_set() {
		// SAFETY: test-only, no other thread in this process reads these vars concurrently
		unsafe {
			std::env::set_var("XDG_CACHE_HOME", "/tmp/custom-cache");
		}
		assert_eq!(cache_dir(), PathBuf::from("/tmp/custom-cache"));
		unsafe {
			std::env::remove_var("XDG_CACHE_HOME");
		}
	}

	#[test]
	fn test_cache_dir_falls_back_to_home_dot_cache() {
		// SAFETY: test-only, no other thread in this process reads these vars concurrently
		unsafe {
			std::env::remove_var("XDG_CACHE_HOME");
			std::env::set_var("HOME", "/home/example");
		}
		assert_eq!(cache_dir(), PathBuf::from("/home/example/.cache"));
	}

	#[test]
	fn test_version_probe_returns_unknown_for_missing_binary() {
		// EXTRACTOR_BIN_NAME will not exist in the test environment, so this exercises the
		// spawn-failure path without needing a real extractor installed
		let version = version_probe();
		assert!(version == UNKNOWN_VERSION || !version.is_empty());
	}
}
