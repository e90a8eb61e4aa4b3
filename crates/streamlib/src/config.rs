//! Module for process-wide, write-once configuration.
//!
//! The original design keeps the extractor's version string and a shared user-agent override as
//! globals (`SPEC_FULL.md` §9, "Globals -> process-wide configuration"). Here they are
//! [`once_cell::sync::OnceCell`]s instead of mutable statics: written once, read freely
//! thereafter, with no `unsafe` required.

use once_cell::sync::OnceCell;

static USER_AGENT: OnceCell<String> = OnceCell::new();
static VERSION: OnceCell<String> = OnceCell::new();

/// Set the process-wide user-agent override. Only the first call takes effect; later calls are
/// ignored, matching the "write-once" contract.
pub fn set_user_agent<S: Into<String>>(user_agent: S) {
	let _ = USER_AGENT.set(user_agent.into());
}

/// Get the process-wide user-agent override, or an empty string if never set.
pub fn user_agent() -> &'static str {
	return USER_AGENT.get().map(String::as_str).unwrap_or("");
}

/// Record the memoized extractor version string (set by [`crate::maintenance::version`] on its
/// first successful probe).
pub(crate) fn set_version<S: Into<String>>(version: S) {
	let _ = VERSION.set(version.into());
}

/// Get the memoized extractor version string, if a probe has already succeeded once.
pub fn cached_version() -> Option<&'static str> {
	return VERSION.get().map(String::as_str);
}

/// Test-only reset hook (`SPEC_FULL.md` §4.8) so unit tests across this crate do not leak
/// process-wide state into one another. [`OnceCell`] offers no safe way to un-set a `static` once
/// written, so this is only ever called from a test's own setup, never from library code.
#[cfg(test)]
pub(crate) fn reset_for_test() {
	// SAFETY: only reachable from #[cfg(test)] code; tests that rely on a clean slate call this
	// before touching the cells, and the crate's test suite does not run config/maintenance tests
	// concurrently with this reset (see individual call sites).
	unsafe {
		let user_agent_ptr = std::ptr::addr_of!(USER_AGENT).cast_mut();
		*user_agent_ptr = OnceCell::new();
		let version_ptr = std::ptr::addr_of!(VERSION).cast_mut();
		*version_ptr = OnceCell::new();
	}
}

#[cfg(test)]
mod test {
	use std::sync::Mutex;

	use super::*;

	// serializes the tests in this module, since they all touch the same process-wide cells
	static TEST_LOCK: Mutex<()> = Mutex::new(());

	#[test]
	fn test_user_agent_defaults_to_empty() {
		let _guard = TEST_LOCK.lock().unwrap_or_else(|p| return p.into_inner());
		reset_for_test();

		assert_eq!(user_agent(), "");
	}

	#[test]
	fn test_set_user_agent_write_once() {
		let _guard = TEST_LOCK.lock().unwrap_or_else(|p| return p.into_inner());
		reset_for_test();

		set_user_agent("first");
		set_user_agent("second");
		assert_eq!(user_agent(), "first");
	}

	#[test]
	fn test_cached_version_write_once() {
		let _guard = TEST_LOCK.lock().unwrap_or_else(|p| return p.into_inner());
		reset_for_test();

		assert_eq!(cached_version(), None);
		set_version("2024.01.01");
		set_version("2025.01.01");
		assert_eq!(cached_version(), Some("2024.01.01"));
	}
}
