//! Module implementing [`DownloadDriver`] (`SPEC_FULL.md` §4.5)

use std::path::PathBuf;

use crate::data::{
	FormatId,
	StreamInfo,
};
use crate::spawn::multiplatform::EXTRACTOR_BIN_NAME;
use crate::spawn::{
	ProcessEvent,
	ProcessRunner,
	StreamKind,
};

use super::assemble_cmd::{
	assemble_download_args,
	DownloadArgsInput,
};
use super::progress::{
	classify_stderr_line,
	classify_stdout_line,
	ProgressLine,
	StderrLine,
};

/// A single notification out of [`DownloadDriver`] (`SPEC_FULL.md` §6's `download*` events)
#[derive(Debug, Clone, PartialEq)]
pub enum DownloadEvent {
	Progress { received: u64, total: u64 },
	MetadataChanged,
	Finished,
	Error(String),
}

/// Drives a single download of one composite format through the extractor, translating its
/// stdout/stderr into [`DownloadEvent`]s.
///
/// Mirrors [`crate::spawn::ProcessRunner`]'s "single control thread per object" model (`SPEC_FULL.md`
/// §5): nothing here spawns its own background thread - [`Self::poll_events`] must be called by
/// the owner (directly, or from a loop reading its own channel) to drain whatever the underlying
/// [`ProcessRunner`] has produced so far.
pub struct DownloadDriver {
	runner: ProcessRunner,

	url: String,
	local_full_output_path: PathBuf,
	referring_page: String,
	selected_format_id: FormatId,
	file_base_name: String,
	file_extension: String,

	bytes_received: u64,
	bytes_received_current_section: u64,
	bytes_total_current_section: u64,
	bytes_total: u64,

	/// Last non-empty stderr line seen, used as the error tail on a non-zero normal exit
	/// (`SPEC_FULL.md` §4.5 Termination)
	last_stderr_line: String,
}

impl DownloadDriver {
	/// Initialize from a [`StreamInfo`] snapshot, per `SPEC_FULL.md` §4.5's init rule
	pub fn from_stream_info(info: &StreamInfo) -> Self {
		let guestimate = info.guestimate_selected_size();

		return Self {
			runner: ProcessRunner::new(),
			url: info.webpage_url.clone(),
			local_full_output_path: PathBuf::new(),
			referring_page: String::new(),
			selected_format_id: info.format_id().clone(),
			file_base_name: info.file_base_name(),
			file_extension: info.suffix(),
			bytes_received: 0,
			bytes_received_current_section: 0,
			bytes_total_current_section: guestimate.max(0) as u64,
			bytes_total: 0,
			last_stderr_line: String::new(),
		};
	}

	/// The event channel for the underlying child process, once [`Self::start`] has been called
	pub fn events(&self) -> Option<&std::sync::mpsc::Receiver<ProcessEvent>> {
		return self.runner.events();
	}

	pub fn set_url<S: Into<String>>(&mut self, url: S) {
		self.url = url.into();
	}

	pub fn set_local_full_output_path<P: Into<PathBuf>>(&mut self, path: P) {
		self.local_full_output_path = path.into();
	}

	pub fn set_referring_page<S: Into<String>>(&mut self, referring_page: S) {
		self.referring_page = referring_page.into();
	}

	pub fn set_selected_format_id(&mut self, format_id: FormatId) {
		self.selected_format_id = format_id;
	}

	/// A caller-supplied hint for the overall byte total (`SPEC_FULL.md` §6's `setFileSizeInBytes`)
	pub fn set_file_size_in_bytes(&mut self, bytes: u64) {
		self.bytes_total = bytes;
	}

	/// `fileBaseName.fileExtension`, reflecting any merge-format change applied mid-download
	pub fn file_name(&self) -> String {
		return format!("{}.{}", self.file_base_name, self.file_extension);
	}

	/// Reset all counters to their initial state, without touching the running child (if any)
	pub fn clear(&mut self) {
		self.bytes_received = 0;
		self.bytes_received_current_section = 0;
		self.bytes_total_current_section = 0;
		self.bytes_total = 0;
	}

	pub fn is_running(&self) -> bool {
		return self.runner.is_running();
	}

	/// Launch the download. A no-op if `selectedFormatId` is empty or a child is already running.
	pub fn start(&mut self) {
		if self.selected_format_id.is_empty() || self.runner.is_running() {
			return;
		}

		let args = assemble_download_args(&DownloadArgsInput {
			output_path:         &self.local_full_output_path,
			selected_format_id:  &self.selected_format_id,
			url:                 &self.url,
			user_agent:          crate::config::user_agent(),
			referring_page:      &self.referring_page,
			merge_output_format: &self.file_extension,
		});

		self.runner.start(std::ffi::OsStr::new(EXTRACTOR_BIN_NAME), args);
	}

	/// Kill the child (if running) and report a normal finish - abort is user-initiated, not an error
	pub fn abort(&mut self) -> Vec<DownloadEvent> {
		self.runner.stop();
		return vec![DownloadEvent::Finished];
	}

	/// Drain whatever [`ProcessEvent`]s the underlying runner has produced since the last call,
	/// translating them into zero or more [`DownloadEvent`]s and updating internal byte counters.
	pub fn poll_events(&mut self, raw_events: &[ProcessEvent]) -> Vec<DownloadEvent> {
		let mut out = Vec::new();

		for event in raw_events {
			match event {
				ProcessEvent::Started => {},
				ProcessEvent::Line(StreamKind::Stdout, line) => {
					if let Some(ev) = self.handle_stdout_line(line) {
						out.push(ev);
					}
				},
				ProcessEvent::Line(StreamKind::Stderr, line) => {
					if let Some(ev) = self.handle_stderr_line(line) {
						out.push(ev);
					}
				},
				ProcessEvent::Exited { code, normal } => {
					out.extend(self.handle_exit(*code, *normal));
				},
				ProcessEvent::SpawnError(_) => {
					out.push(DownloadEvent::Error("The process crashed.".to_owned()));
				},
			}
		}

		return out;
	}

	fn total_or_section_total(&self) -> u64 {
		if self.bytes_total > 0 {
			return self.bytes_total;
		}
		return self.bytes_total_current_section;
	}

	fn handle_stdout_line(&mut self, line: &str) -> Option<DownloadEvent> {
		match classify_stdout_line(line) {
			ProgressLine::SectionStart { .. } => {
				// a finished section counts in full, not just the last-observed percentage of it
				// (SPEC_FULL.md §8 scenario 4)
				self.bytes_received += self.bytes_total_current_section;
				self.bytes_received_current_section = 0;
				self.bytes_total_current_section = 0;

				return Some(DownloadEvent::Progress {
					received: self.bytes_received,
					total:    self.total_or_section_total(),
				});
			},
			ProgressLine::Progress { percent, section_total_bytes } => {
				self.bytes_total_current_section = section_total_bytes;
				self.bytes_received_current_section =
					(percent * self.bytes_total_current_section as f64 / 100.0).ceil() as u64;

				return Some(DownloadEvent::Progress {
					received: self.bytes_received + self.bytes_received_current_section,
					total:    self.total_or_section_total(),
				});
			},
			ProgressLine::Ignored => None,
		}
	}

	fn handle_stderr_line(&mut self, line: &str) -> Option<DownloadEvent> {
		if !line.is_empty() {
			self.last_stderr_line = line.to_owned();
		}

		match classify_stderr_line(line) {
			StderrLine::Error(message) => Some(DownloadEvent::Error(message)),
			StderrLine::MergeWarning => {
				self.file_extension = "mkv".to_owned();
				Some(DownloadEvent::MetadataChanged)
			},
			StderrLine::OtherWarning | StderrLine::Ignored => None,
		}
	}

	/// On a normal, successful exit: a final `progress(total, total)` followed by `Finished`, per
	/// `SPEC_FULL.md` §4.5 Termination. On a tool-reported failure: a single `Error` carrying the
	/// tail of stderr. On an abnormal exit: a single "crashed" `Error`.
	fn handle_exit(&mut self, code: Option<i32>, normal: bool) -> Vec<DownloadEvent> {
		if !normal {
			return vec![DownloadEvent::Error("The process crashed.".to_owned())];
		}

		if code == Some(0) {
			let total = self.total_or_section_total();
			self.bytes_received = total;
			return vec![
				DownloadEvent::Progress {
					received: total,
					total,
				},
				DownloadEvent::Finished,
			];
		}

		let tail = if self.last_stderr_line.is_empty() {
			format!("yt-dlp exited with a non-zero status ({code:?})")
		} else {
			self.last_stderr_line.clone()
		};

		return vec![DownloadEvent::Error(tail)];
	}
}
