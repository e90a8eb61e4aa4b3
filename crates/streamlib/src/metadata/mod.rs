//! Module for probing the extractor and turning its JSON output into [`crate::data::StreamInfo`]
//! (`SPEC_FULL.md` §4.4, §6)

pub mod collector;
pub mod json_schema;

pub use collector::{
	CollectorEvent,
	MetadataCollector,
};
pub use json_schema::DumpItem;
