//! Module for assembling extractor argument vectors and driving a single download
//! (`SPEC_FULL.md` §4.4, §4.5)

pub mod assemble_cmd;
pub mod driver;
pub mod progress;

pub use assemble_cmd::{
	assemble_dump_args,
	assemble_flat_args,
	DownloadArgsInput,
};
pub use driver::{
	DownloadDriver,
	DownloadEvent,
};
