//! Module implementing [`MetadataCollector`] (`SPEC_FULL.md` §4.4)

use std::collections::HashMap;
use std::ffi::OsStr;
use std::sync::atomic::{
	AtomicBool,
	Ordering,
};
use std::sync::mpsc::{
	self,
	Receiver,
};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::data::{
	PlaylistItem,
	StreamError,
	StreamInfo,
};
use crate::download::{
	assemble_dump_args,
	assemble_flat_args,
};
use crate::maintenance::{
	cache_purge_async,
	MaintenanceEvent,
};
use crate::spawn::multiplatform::EXTRACTOR_BIN_NAME;
use crate::spawn::{
	ProcessEvent,
	ProcessRunner,
	StreamKind,
};

use super::json_schema::DumpItem;

/// How long a drain iteration sleeps between polls of the two child processes
const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Terminal event for a [`MetadataCollector::run_async`] job
#[derive(Debug, Clone, PartialEq)]
pub enum CollectorEvent {
	Collected(Vec<StreamInfo>),
	Error(String),
}

/// Best-effort extraction of an `id` field out of a dump line that otherwise failed to parse
static FALLBACK_ID_REGEX: Lazy<Regex> = Lazy::new(|| {
	return Regex::new(r#""id"\s*:\s*"([^"]*)""#).unwrap();
});

/// Extracts the failed item's id out of a `ERROR: <id>: <reason>` stderr line
static STDERR_ERROR_ID_REGEX: Lazy<Regex> = Lazy::new(|| {
	return Regex::new(r"^ERROR:\s*([^:]+):").unwrap();
});

/// Launches the extractor's detailed dump and flat-playlist probes in parallel and reconciles
/// their output into an ordered list of [`StreamInfo`] (`SPEC_FULL.md` §4.4).
pub struct MetadataCollector {
	cancel_flag: Arc<AtomicBool>,
	running:     Arc<AtomicBool>,
}

impl Default for MetadataCollector {
	fn default() -> Self {
		return Self::new();
	}
}

impl MetadataCollector {
	pub fn new() -> Self {
		return Self {
			cancel_flag: Arc::new(AtomicBool::new(false)),
			running:     Arc::new(AtomicBool::new(false)),
		};
	}

	pub fn is_running(&self) -> bool {
		return self.running.load(Ordering::SeqCst);
	}

	/// Kill both children, discard buffered state, and suppress any pending success emission
	pub fn stop(&mut self) {
		self.cancel_flag.store(true, Ordering::SeqCst);
	}

	/// Launch the dual-probe job for `url`, returning a channel that receives exactly one
	/// [`CollectorEvent`] once the job converges (successfully, with an error, or cancelled).
	pub fn run_async(&mut self, url: &str) -> Receiver<CollectorEvent> {
		self.cancel_flag.store(false, Ordering::SeqCst);
		self.running.store(true, Ordering::SeqCst);

		let (tx, rx) = mpsc::channel();
		let cancel_flag = Arc::clone(&self.cancel_flag);
		let running = Arc::clone(&self.running);
		let url = url.to_owned();

		thread::spawn(move || {
			let event = run_collection(&url, &cancel_flag);
			let _ = tx.send(event);
			running.store(false, Ordering::SeqCst);
		});

		return rx;
	}
}

/// Outcome of running one dump+flat pair to completion
struct ProbeOutcome {
	dump_map:         HashMap<String, StreamInfo>,
	flat_items:       Vec<PlaylistItem>,
	dump_normal_exit: bool,
	dump_exit_code:   Option<i32>,
	flat_ok:          bool,
	crashed:          bool,
}

/// What to do with one finished [`ProbeOutcome`] (`SPEC_FULL.md` §4.4's retry/error precedence),
/// split out of [`run_collection`]'s loop so the precedence itself is unit-testable without
/// spawning real child processes.
enum Decision {
	Retry,
	Error(String),
	Proceed,
}

/// Decide what to do with one finished probe pair. The retry check is evaluated *before* either
/// "empty result" error, so that a cache corruption which also starves the Flat probe
/// (`SPEC_FULL.md` §8 scenario 3) still gets its one retry instead of failing immediately.
fn decide(outcome: &ProbeOutcome, purge_attempted: bool) -> Decision {
	if outcome.crashed {
		return Decision::Error("The process crashed.".to_owned());
	}

	if outcome.dump_exit_code != Some(0)
		&& outcome.dump_normal_exit
		&& outcome.dump_map.len() <= 1
		&& !purge_attempted
	{
		return Decision::Retry;
	}

	if !outcome.flat_ok || outcome.flat_items.is_empty() {
		return Decision::Error("Couldn't parse playlist (no items found).".to_owned());
	}

	if outcome.dump_map.is_empty() {
		return Decision::Error("Couldn't parse JSON file.".to_owned());
	}

	return Decision::Proceed;
}

fn run_collection(url: &str, cancel_flag: &AtomicBool) -> CollectorEvent {
	let mut purge_attempted = false;

	loop {
		if cancel_flag.load(Ordering::SeqCst) {
			return CollectorEvent::Error("Cancelled.".to_owned());
		}

		let outcome = run_one_probe_pair(url, cancel_flag);

		if cancel_flag.load(Ordering::SeqCst) {
			return CollectorEvent::Error("Cancelled.".to_owned());
		}

		match decide(&outcome, purge_attempted) {
			Decision::Error(message) => return CollectorEvent::Error(message),
			Decision::Retry => {
				purge_attempted = true;
				wait_for_purge(cancel_flag);
				continue;
			},
			Decision::Proceed => return CollectorEvent::Collected(reconcile(outcome.dump_map, outcome.flat_items)),
		}
	}
}

fn wait_for_purge(cancel_flag: &AtomicBool) {
	let rx = cache_purge_async();
	loop {
		if cancel_flag.load(Ordering::SeqCst) {
			return;
		}
		match rx.recv_timeout(POLL_INTERVAL) {
			Ok(MaintenanceEvent::Done) => return,
			Err(mpsc::RecvTimeoutError::Timeout) => continue,
			Err(mpsc::RecvTimeoutError::Disconnected) => return,
		}
	}
}

fn run_one_probe_pair(url: &str, cancel_flag: &AtomicBool) -> ProbeOutcome {
	let user_agent = crate::config::user_agent();
	let dump_args = assemble_dump_args(url, user_agent);
	let flat_args = assemble_flat_args(url, user_agent);

	let mut dump_runner = ProcessRunner::new();
	let mut flat_runner = ProcessRunner::new();

	let mut dump_map = HashMap::new();
	let mut flat_items = Vec::new();
	let mut dump_done = false;
	let mut flat_done = false;
	let mut dump_normal_exit = false;
	let mut dump_exit_code = None;
	let mut flat_ok = false;
	let mut crashed = false;

	{
		let dump_rx = dump_runner.start(OsStr::new(EXTRACTOR_BIN_NAME), dump_args);
		let flat_rx = flat_runner.start(OsStr::new(EXTRACTOR_BIN_NAME), flat_args);

		while !(dump_done && flat_done) {
			if cancel_flag.load(Ordering::SeqCst) {
				break;
			}

			if !dump_done {
				match dump_rx.try_recv() {
					Ok(ProcessEvent::Started) => {},
					Ok(ProcessEvent::Line(StreamKind::Stdout, line)) => {
						if !line.is_empty() {
							let (id, info) = parse_dump_stdout_line(&line);
							dump_map.insert(id, info);
						}
					},
					Ok(ProcessEvent::Line(StreamKind::Stderr, line)) => {
						if !line.is_empty() {
							if let Some(id) = parse_dump_stderr_id(&line) {
								dump_map.insert(id.clone(), StreamInfo::unavailable_stub(id));
							}
						}
					},
					Ok(ProcessEvent::Exited { code, normal }) => {
						dump_done = true;
						dump_normal_exit = normal;
						dump_exit_code = code;
						if !normal {
							crashed = true;
						}
					},
					Ok(ProcessEvent::SpawnError(_)) => {
						dump_done = true;
						crashed = true;
					},
					Err(mpsc::TryRecvError::Empty) => {},
					Err(mpsc::TryRecvError::Disconnected) => dump_done = true,
				}
			}

			if !flat_done {
				match flat_rx.try_recv() {
					Ok(ProcessEvent::Started) => {},
					Ok(ProcessEvent::Line(StreamKind::Stdout, line)) => {
						if !line.is_empty() {
							if let Ok(item) = serde_json::from_str::<PlaylistItem>(&line) {
								flat_items.push(item);
							}
						}
					},
					Ok(ProcessEvent::Line(StreamKind::Stderr, _line)) => {},
					Ok(ProcessEvent::Exited { code, normal }) => {
						flat_done = true;
						flat_ok = normal && code == Some(0);
						if !normal {
							crashed = true;
						}
					},
					Ok(ProcessEvent::SpawnError(_)) => {
						flat_done = true;
						crashed = true;
					},
					Err(mpsc::TryRecvError::Empty) => {},
					Err(mpsc::TryRecvError::Disconnected) => flat_done = true,
				}
			}

			if crashed || cancel_flag.load(Ordering::SeqCst) {
				break;
			}

			if !(dump_done && flat_done) {
				thread::sleep(POLL_INTERVAL);
			}
		}
	}

	if cancel_flag.load(Ordering::SeqCst) || crashed {
		dump_runner.stop();
		flat_runner.stop();
	}

	return ProbeOutcome {
		dump_map,
		flat_items,
		dump_normal_exit,
		dump_exit_code,
		flat_ok,
		crashed,
	};
}

/// Parse one Dump stdout line, recovering a best-effort `id` even when the JSON itself is malformed
fn parse_dump_stdout_line(line: &str) -> (String, StreamInfo) {
	match serde_json::from_str::<DumpItem>(line) {
		Ok(item) => {
			let id = item.id.clone();
			return (id, item.into());
		},
		Err(_err) => {
			let id = FALLBACK_ID_REGEX
				.captures(line)
				.map(|cap| return cap[1].to_owned())
				.unwrap_or_else(|| return format!("unparsed-{:x}", simple_hash(line)));

			return (id.clone(), StreamInfo::json_format_stub(id));
		},
	}
}

/// Extract the id out of `ERROR: <id>: <reason>`
fn parse_dump_stderr_id(line: &str) -> Option<String> {
	return STDERR_ERROR_ID_REGEX.captures(line).map(|cap| return cap[1].trim().to_owned());
}

/// A tiny order-independent hash used only to synthesize a stable fallback id for completely
/// unparseable dump lines, so repeated identical garbage collapses to one entry
fn simple_hash(input: &str) -> u64 {
	let mut hash: u64 = 0xcbf29ce484222325;
	for byte in input.bytes() {
		hash ^= u64::from(byte);
		hash = hash.wrapping_mul(0x100000001b3);
	}
	return hash;
}

/// Walk the Flat list in order, emitting the Dump entry if present, else an `Unavailable` stub,
/// filling `defaultTitle`/`webpage_url` from the Flat entry and assigning a 1-based `playlist_index`
fn reconcile(mut dump_map: HashMap<String, StreamInfo>, flat_items: Vec<PlaylistItem>) -> Vec<StreamInfo> {
	let mut result = Vec::with_capacity(flat_items.len());

	for (index, flat_item) in flat_items.into_iter().enumerate() {
		let mut info = dump_map
			.remove(&flat_item.id)
			.unwrap_or_else(|| return StreamInfo::unavailable_stub(flat_item.id.clone()));

		if info.default_title.is_empty() {
			info.default_title = flat_item.title.clone();
		}
		if info.webpage_url.is_empty() {
			info.webpage_url = flat_item.url.clone();
		}
		info.playlist_index = Some(index + 1);

		result.push(info);
	}

	return result;
}

#[cfg(test)]
mod test {
	use super::*;

	fn empty_outcome() -> ProbeOutcome {
		return ProbeOutcome {
			dump_map:         HashMap::new(),
			flat_items:       Vec::new(),
			dump_normal_exit: true,
			dump_exit_code:   Some(1),
			flat_ok:          true,
			crashed:          false,
		};
	}

	#[test]
	fn test_decide_crash_takes_priority_over_everything() {
		let mut outcome = empty_outcome();
		outcome.crashed = true;
		assert!(matches!(decide(&outcome, false), Decision::Error(message) if message == "The process crashed."));
	}

	#[test]
	fn test_decide_retries_even_when_flat_is_also_empty() {
		// SPEC_FULL.md §8 scenario 3: a cache-corruption round can starve *both* probes, but the
		// one retry must still fire rather than failing on the empty-playlist check first
		let outcome = empty_outcome();
		assert!(matches!(decide(&outcome, false), Decision::Retry));
	}

	#[test]
	fn test_decide_does_not_retry_a_second_time() {
		let outcome = empty_outcome();
		assert!(matches!(decide(&outcome, true), Decision::Error(_)));
	}

	#[test]
	fn test_decide_does_not_retry_a_playlist_with_partial_failures() {
		let mut outcome = empty_outcome();
		outcome.dump_map.insert("a".to_owned(), StreamInfo::unavailable_stub("a"));
		outcome.dump_map.insert("b".to_owned(), StreamInfo::unavailable_stub("b"));
		outcome.flat_items = vec![
			PlaylistItem {
				type_:  "url".to_owned(),
				id:     "a".to_owned(),
				ie_key: String::new(),
				title:  "a".to_owned(),
				url:    "ua".to_owned(),
			},
			PlaylistItem {
				type_:  "url".to_owned(),
				id:     "b".to_owned(),
				ie_key: String::new(),
				title:  "b".to_owned(),
				url:    "ub".to_owned(),
			},
		];

		assert!(matches!(decide(&outcome, false), Decision::Proceed));
	}

	#[test]
	fn test_decide_proceeds_on_success() {
		let mut outcome = empty_outcome();
		outcome.dump_exit_code = Some(0);
		outcome.dump_map.insert("a".to_owned(), StreamInfo::unavailable_stub("a"));
		outcome.flat_items = vec![PlaylistItem {
			type_:  "url".to_owned(),
			id:     "a".to_owned(),
			ie_key: String::new(),
			title:  "a".to_owned(),
			url:    "ua".to_owned(),
		}];

		assert!(matches!(decide(&outcome, false), Decision::Proceed));
	}

	#[test]
	fn test_parse_dump_stdout_line_success() {
		let line = r#"{"id":"abc","title":"Hi","ext":"mp4","format_id":"22"}"#;
		let (id, info) = parse_dump_stdout_line(line);

		assert_eq!(id, "abc");
		assert!(info.is_available());
	}

	#[test]
	fn test_parse_dump_stdout_line_malformed_recovers_id() {
		let line = r#"{"id":"abc", this is not valid json"#;
		let (id, info) = parse_dump_stdout_line(line);

		assert_eq!(id, "abc");
		assert_eq!(info.error, StreamError::JsonFormat);
	}

	#[test]
	fn test_parse_dump_stderr_id() {
		assert_eq!(parse_dump_stderr_id("ERROR: b: unavailable"), Some("b".to_owned()));
		assert_eq!(parse_dump_stderr_id("not an error line"), None);
	}

	fn flat(id: &str, title: &str, url: &str) -> PlaylistItem {
		return PlaylistItem {
			type_: "url".to_owned(),
			id: id.to_owned(),
			ie_key: String::new(),
			title: title.to_owned(),
			url: url.to_owned(),
		};
	}

	#[test]
	fn test_reconcile_single_video() {
		let mut dump_map = HashMap::new();
		let mut info = StreamInfo::unavailable_stub("abc");
		info.error = StreamError::NoError;
		info.default_title = "Hi".to_owned();
		dump_map.insert("abc".to_owned(), info);

		let flat_items = vec![flat("abc", "Hi", "u")];

		let result = reconcile(dump_map, flat_items);

		assert_eq!(result.len(), 1);
		assert_eq!(result[0].playlist_index, Some(1));
		assert!(result[0].is_available());
	}

	#[test]
	fn test_reconcile_playlist_with_missing_item() {
		let mut dump_map = HashMap::new();
		for id in ["a", "c"] {
			let mut info = StreamInfo::unavailable_stub(id);
			info.error = StreamError::NoError;
			info.default_title = id.to_owned();
			dump_map.insert(id.to_owned(), info);
		}

		let flat_items = vec![flat("a", "a", "ua"), flat("b", "b", "ub"), flat("c", "c", "uc")];

		let result = reconcile(dump_map, flat_items);

		assert_eq!(result.len(), 3);
		assert!(result[0].is_available());
		assert!(!result[1].is_available());
		assert!(result[2].is_available());
		assert_eq!(result[0].playlist_index, Some(1));
		assert_eq!(result[1].playlist_index, Some(2));
		assert_eq!(result[2].playlist_index, Some(3));
	}

	#[test]
	fn test_reconcile_fills_missing_fields_from_flat() {
		let mut dump_map = HashMap::new();
		let mut info = StreamInfo::unavailable_stub("abc");
		info.error = StreamError::NoError;
		// deliberately leave default_title and webpage_url empty
		dump_map.insert("abc".to_owned(), info);

		let flat_items = vec![flat("abc", "Flat Title", "flat-url")];
		let result = reconcile(dump_map, flat_items);

		assert_eq!(result[0].default_title, "Flat Title");
		assert_eq!(result[0].webpage_url, "flat-url");
	}
}
