//! Handler function for the default ("download") action: probe a URL, let the user (or
//! `--yes`/non-interactive defaulting) pick a composite format per stream, then drive a download
//! to completion while rendering an `indicatif` progress bar off `DownloadEvent`s.

use std::path::PathBuf;
use std::sync::mpsc::RecvTimeoutError;
use std::time::Duration;

use indicatif::{
	ProgressBar,
	ProgressStyle,
};
use streamlib::data::StreamInfo;
use streamlib::download::{
	DownloadDriver,
	DownloadEvent,
};
use streamlib::metadata::{
	CollectorEvent,
	MetadataCollector,
};

use crate::clap_conf::CliDerive;
use crate::utils::{
	select_index,
	set_progressbar,
};

/// How long a single poll of the download's event channel blocks for before re-checking
const POLL_TIMEOUT: Duration = Duration::from_millis(100);

/// Handler function for the default (no subcommand given) action: download `main_args.url`
/// This function is mainly to keep the code structured and sorted
pub fn command_download(main_args: &CliDerive) -> Result<(), streamlib::Error> {
	let url = main_args
		.url
		.as_ref()
		.ok_or_else(|| return streamlib::Error::other("A URL is required when no subcommand is given"))?;

	let output_dir = main_args.output.clone().unwrap_or_else(|| {
		return dirs::download_dir().unwrap_or_else(|| return PathBuf::from("."));
	});
	std::fs::create_dir_all(&output_dir)?;

	println!("Probing \"{url}\"...");

	let mut collector = MetadataCollector::new();
	let rx = collector.run_async(url);

	let streams = match rx.recv() {
		Ok(CollectorEvent::Collected(streams)) => streams,
		Ok(CollectorEvent::Error(message)) => return Err(streamlib::Error::other(message)),
		Err(_) => return Err(streamlib::Error::other("Metadata collector worker thread vanished")),
	};

	if streams.is_empty() {
		return Err(streamlib::Error::other("No streams found for this URL"));
	}

	for stream in &streams {
		if !stream.is_available() {
			println!("Skipping unavailable stream: \"{}\" (id: {})", stream.title(), stream.id);
			continue;
		}

		download_one(main_args, &output_dir, stream)?;
	}

	return Ok(());
}

/// Probe-and-pick a format for a single [`StreamInfo`], then drive its download to completion
fn download_one(main_args: &CliDerive, output_dir: &PathBuf, stream: &StreamInfo) -> Result<(), streamlib::Error> {
	let mut stream = stream.clone();

	println!(
		"\"{}\" (extractor: {}, id: {})",
		stream.title(),
		stream.extractor,
		stream.id
	);

	let candidates = stream.default_formats();
	if !candidates.is_empty() {
		let labels: Vec<String> = candidates
			.iter()
			.map(|format| {
				return format!(
					"{} [{}] {} ({} bytes)",
					format.format_id, format.ext, format.format_note, format.filesize
				);
			})
			.collect();

		let chosen = select_index(main_args, "Pick a format to download", &labels)?;
		stream.set_format_id(candidates[chosen].format_id.clone());
	}

	let style = ProgressStyle::default_bar()
		.template("{prefix:.dim} [{elapsed_precise}] {wide_bar:.cyan/blue} {bytes}/{total_bytes} {msg}")
		.expect("Expected progress bar template to be valid")
		.progress_chars("#>-");

	let pgbar = ProgressBar::new(stream.guestimate_selected_size().max(0) as u64).with_style(style);
	set_progressbar(&pgbar, main_args);
	pgbar.set_prefix(stream.file_base_name());

	let mut driver = DownloadDriver::from_stream_info(&stream);
	driver.set_referring_page(stream.webpage_url.clone());
	driver.set_local_full_output_path(output_dir.join(stream.full_file_name()));
	driver.set_file_size_in_bytes(stream.guestimate_selected_size().max(0) as u64);
	driver.start();

	loop {
		let mut batch = Vec::new();

		if let Some(events_rx) = driver.events() {
			match events_rx.recv_timeout(POLL_TIMEOUT) {
				Ok(event) => batch.push(event),
				Err(RecvTimeoutError::Timeout) => {},
				Err(RecvTimeoutError::Disconnected) => break,
			}

			while let Ok(event) = events_rx.try_recv() {
				batch.push(event);
			}
		} else {
			return Err(streamlib::Error::other("Download never started (empty format selection?)"));
		}

		for event in driver.poll_events(&batch) {
			match event {
				DownloadEvent::Progress { received, total } => {
					pgbar.set_length(total);
					pgbar.set_position(received);
				},
				DownloadEvent::MetadataChanged => {
					pgbar.println(format!("Output reformatted, now \"{}\"", driver.file_name()));
				},
				DownloadEvent::Finished => {
					pgbar.finish_with_message(format!("Finished: {}", driver.file_name()));
					return Ok(());
				},
				DownloadEvent::Error(message) => {
					pgbar.finish_and_clear();
					return Err(streamlib::Error::other(message));
				},
			}
		}
	}

	pgbar.finish_and_clear();
	return Err(streamlib::Error::other("Download ended without a Finished or Error event"));
}
