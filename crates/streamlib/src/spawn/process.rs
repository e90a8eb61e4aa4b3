//! Module implementing [`ProcessRunner`] (the process-supervision layer): spawn, observe
//! and reap a single child process, multiplexing its stdout/stderr into a typed event stream.

use std::ffi::{
	OsStr,
	OsString,
};
use std::io::{
	BufRead,
	BufReader,
	Read,
};
use std::process::{
	Child,
	Stdio,
};
use std::sync::mpsc::{
	self,
	Receiver,
	Sender,
};
use std::sync::{
	Arc,
	Mutex,
};
use std::thread::JoinHandle;

use super::multiplatform::spawn_command;

/// Which of the child's two output streams a [`ProcessEvent::Line`] came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StreamKind {
	Stdout,
	Stderr,
}

/// Classification of how a child process could not be spawned, or did not run to completion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpawnErrorKind {
	/// The executable could not be found or executed
	FailedToStart,
	/// The process was killed by a signal, or otherwise exited abnormally
	Crashed,
	/// The process did not finish within a caller-imposed bound (unused at this layer, see `SPEC_FULL.md` §5)
	Timedout,
	/// Writing to the child's stdin failed
	WriteError,
	/// Reading one of the child's output pipes failed
	ReadError,
	/// Any other unclassified spawn/wait failure
	Unknown,
}

/// A single event emitted by a [`ProcessRunner`].
///
/// Within one run, events are totally ordered and monotonic: `Started` then zero or more
/// `Line`, then exactly one `Exited` — or a single `SpawnError` in place of the whole sequence
/// if the child could not even be started.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessEvent {
	Started,
	Line(StreamKind, String),
	Exited { code: Option<i32>, normal: bool },
	SpawnError(SpawnErrorKind),
}

/// Owns at most one running child process and republishes its output as [`ProcessEvent`]s.
///
/// A second [`ProcessRunner::start`] while a child is already running is a no-op (the existing
/// receiver is returned unchanged). Dropping the runner while a child is running kills it, so a
/// `ProcessRunner` can always be abandoned safely.
pub struct ProcessRunner {
	child:         Option<Arc<Mutex<Child>>>,
	events_rx:     Option<Receiver<ProcessEvent>>,
	waiter_handle: Option<JoinHandle<()>>,
}

impl Default for ProcessRunner {
	fn default() -> Self {
		return Self::new();
	}
}

impl ProcessRunner {
	pub fn new() -> Self {
		return Self {
			child:         None,
			events_rx:     None,
			waiter_handle: None,
		};
	}

	/// The event channel for the currently (or most recently) started child, if [`Self::start`]
	/// has been called at least once.
	pub fn events(&self) -> Option<&Receiver<ProcessEvent>> {
		return self.events_rx.as_ref();
	}

	/// Whether a child is currently believed to be running. Backed by the waiter thread's
	/// completion rather than `self.child` alone, since the latter is only cleared by
	/// [`Self::stop`] and would otherwise stay "running" forever after a normal exit.
	pub fn is_running(&self) -> bool {
		return match &self.waiter_handle {
			Some(handle) => !handle.is_finished(),
			None => false,
		};
	}

	/// Start the given binary with `args`. No-op (returns the existing receiver) if a child is
	/// already running.
	pub fn start<I, S>(&mut self, binary: &OsStr, args: I) -> &Receiver<ProcessEvent>
	where
		I: IntoIterator<Item = S>,
		S: AsRef<OsStr>,
	{
		if self.child.is_some() {
			// a child is already running, starting a second one is a no-op
			return self.events_rx.as_ref().expect("child is Some implies events_rx is Some");
		}

		let (tx, rx) = mpsc::channel();

		let mut cmd = spawn_command(&binary);
		cmd.args(args);
		cmd.stdin(Stdio::null());
		cmd.stdout(Stdio::piped());
		cmd.stderr(Stdio::piped());

		match cmd.spawn() {
			Err(err) => {
				let _ = tx.send(ProcessEvent::SpawnError(classify_spawn_error(&err)));
				self.events_rx = Some(rx);
			},
			Ok(mut child) => {
				let _ = tx.send(ProcessEvent::Started);

				// taking the pipes before moving "child" into the shared handle, so the reader
				// threads can own them directly instead of needing to lock the child
				let stdout = child.stdout.take().expect("stdout was requested as piped");
				let stderr = child.stderr.take().expect("stderr was requested as piped");

				let out_handle = spawn_reader(stdout, StreamKind::Stdout, tx.clone());
				let err_handle = spawn_reader(stderr, StreamKind::Stderr, tx.clone());

				let child_handle = Arc::new(Mutex::new(child));
				self.child = Some(Arc::clone(&child_handle));

				self.waiter_handle = Some(std::thread::spawn(move || {
					// wait for both pipes to be fully drained before reaping, so that all "Line"
					// events are guaranteed to have been sent before the "Exited" event
					let _ = out_handle.join();
					let _ = err_handle.join();

					let wait_result = {
						let mut guard = match child_handle.lock() {
							Ok(guard) => guard,
							Err(poisoned) => poisoned.into_inner(),
						};
						guard.wait()
					};

					let event = match wait_result {
						Ok(status) => ProcessEvent::Exited {
							code:   status.code(),
							normal: status.code().is_some(),
						},
						Err(_err) => ProcessEvent::SpawnError(SpawnErrorKind::Crashed),
					};

					// if the receiver has been dropped (eg. because "stop" was called), this
					// silently does nothing - that is the mechanism by which cancellation
					// guarantees no further events are observed
					let _ = tx.send(event);
				}));

				self.events_rx = Some(rx);
			},
		}

		return self.events_rx.as_ref().expect("events_rx was just assigned");
	}

	/// Forcibly terminate the running child, if any, and guarantee no further events are
	/// observable through the (now dropped) event channel.
	pub fn stop(&mut self) {
		if let Some(child_handle) = self.child.take() {
			let mut guard = match child_handle.lock() {
				Ok(guard) => guard,
				Err(poisoned) => poisoned.into_inner(),
			};
			let _ = guard.kill();
			drop(guard);
		}

		// dropping the receiver makes all pending/future "tx.send" calls from the reader and
		// waiter threads fail silently, which is what guarantees "no further events"
		self.events_rx = None;

		if let Some(handle) = self.waiter_handle.take() {
			let _ = handle.join();
		}
	}
}

impl Drop for ProcessRunner {
	fn drop(&mut self) {
		if let Some(child_handle) = self.child.take() {
			if let Ok(mut guard) = child_handle.lock() {
				let _ = guard.kill();
			}
		}
		// intentionally not joining here: dropping a still-running runner must not block the
		// owning thread, the background threads will observe the dropped channel and exit on
		// their own once the (now-killed) child's pipes close
	}
}

/// Collapse runs of ASCII whitespace into a single space and trim the ends, matching the
/// extractor's line-oriented, ASCII-ish text output (`SPEC_FULL.md` §4.1).
fn normalize_line(raw: &str) -> String {
	return raw.split_whitespace().collect::<Vec<_>>().join(" ");
}

fn spawn_reader<R: Read + Send + 'static>(
	pipe: R,
	kind: StreamKind,
	tx: Sender<ProcessEvent>,
) -> JoinHandle<()> {
	return std::thread::spawn(move || {
		let reader = BufReader::new(pipe);
		for line in reader.lines() {
			match line {
				Ok(raw) => {
					let normalized = normalize_line(&raw);
					if tx.send(ProcessEvent::Line(kind, normalized)).is_err() {
						// receiver dropped (cancelled) - stop reading eagerly
						return;
					}
				},
				Err(_err) => {
					let _ = tx.send(ProcessEvent::SpawnError(SpawnErrorKind::ReadError));
					return;
				},
			}
		}
	});
}

fn classify_spawn_error(err: &std::io::Error) -> SpawnErrorKind {
	return match err.kind() {
		std::io::ErrorKind::NotFound | std::io::ErrorKind::PermissionDenied => SpawnErrorKind::FailedToStart,
		std::io::ErrorKind::TimedOut => SpawnErrorKind::Timedout,
		std::io::ErrorKind::WriteZero | std::io::ErrorKind::BrokenPipe => SpawnErrorKind::WriteError,
		_ => SpawnErrorKind::Unknown,
	};
}

/// Build an argument vector for a named binary as a convenience for callers that assemble
/// arguments as [`OsString`]s (mirrors [`std::process::Command::args`] but as an owned `Vec`).
pub fn to_osstring_args<I, S>(args: I) -> Vec<OsString>
where
	I: IntoIterator<Item = S>,
	S: Into<OsString>,
{
	return args.into_iter().map(Into::into).collect();
}
