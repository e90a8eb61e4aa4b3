//! Handler functions for the maintenance subcommands (`version`, `update`, `purge-cache`,
//! `extractors`), all of which call straight through to [`streamlib::maintenance`]

use streamlib::maintenance::{
	self,
	ExtractorsEvent,
	MaintenanceEvent,
};

use crate::clap_conf::{
	CliDerive,
	CommandExtractors,
	CommandPurgeCache,
	CommandUpdate,
	CommandVersion,
};

/// Handler function for the "version" subcommand
/// This function is mainly to keep the code structured and sorted
#[inline]
pub fn command_version(_main_args: &CliDerive, _sub_args: &CommandVersion) -> Result<(), streamlib::Error> {
	println!("{}", maintenance::version_probe());

	return Ok(());
}

/// Handler function for the "update" subcommand
/// This function is mainly to keep the code structured and sorted
#[inline]
pub fn command_update(_main_args: &CliDerive, _sub_args: &CommandUpdate) -> Result<(), streamlib::Error> {
	println!("Requesting self-upgrade...");

	let rx = maintenance::self_upgrade_async();
	match rx.recv() {
		Ok(MaintenanceEvent::Done) => {
			println!("Self-upgrade finished.");
		},
		Err(_) => {
			return Err(streamlib::Error::other("Self-upgrade worker thread vanished"));
		},
	}

	return Ok(());
}

/// Handler function for the "purge-cache" subcommand
/// This function is mainly to keep the code structured and sorted
#[inline]
pub fn command_purge_cache(_main_args: &CliDerive, _sub_args: &CommandPurgeCache) -> Result<(), streamlib::Error> {
	println!("Purging cache directory \"{}\"...", maintenance::cache_dir().to_string_lossy());

	let rx = maintenance::cache_purge_async();
	match rx.recv() {
		Ok(MaintenanceEvent::Done) => {
			println!("Cache purge finished.");
		},
		Err(_) => {
			return Err(streamlib::Error::other("Cache-purge worker thread vanished"));
		},
	}

	return Ok(());
}

/// Handler function for the "extractors" subcommand
/// This function is mainly to keep the code structured and sorted
#[inline]
pub fn command_extractors(_main_args: &CliDerive, _sub_args: &CommandExtractors) -> Result<(), streamlib::Error> {
	let rx = maintenance::list_extractors_async();

	for event in rx {
		match event {
			ExtractorsEvent::Collected(listing) => {
				for (extractor, description) in listing.extractors.iter().zip(listing.descriptions.iter()) {
					if description.is_empty() {
						println!("{extractor}");
					} else {
						println!("{extractor}: {description}");
					}
				}
			},
			ExtractorsEvent::Error(message) => {
				return Err(streamlib::Error::other(message));
			},
			ExtractorsEvent::Finished => {},
		}
	}

	return Ok(());
}
