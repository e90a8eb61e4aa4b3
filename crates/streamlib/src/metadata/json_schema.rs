//! Wire schema for the extractor's per-item `--dump-json` output (`SPEC_FULL.md` §6)

use serde::Deserialize;

use crate::data::{
	FormatId,
	StreamError,
	StreamFormat,
	StreamInfo,
};

/// One flat object from the extractor's detailed dump. Field names and casing follow the tool's
/// actual JSON keys, not Rust convention - missing keys default rather than fail the parse.
#[derive(Debug, Clone, Deserialize)]
pub struct DumpItem {
	#[serde(default)]
	pub id: String,
	#[serde(rename = "_filename", default)]
	pub filename: String,
	#[serde(default)]
	pub webpage_url: String,
	#[serde(default)]
	pub fulltitle: String,
	#[serde(default)]
	pub title: String,
	#[serde(default)]
	pub ext: String,
	#[serde(default)]
	pub description: String,
	#[serde(default)]
	pub thumbnail: String,
	#[serde(default)]
	pub extractor: String,
	#[serde(default)]
	pub extractor_key: String,
	#[serde(default)]
	pub format_id: FormatId,
	#[serde(default)]
	pub formats: Vec<StreamFormat>,
	#[serde(default)]
	pub playlist: Option<String>,
	#[serde(default)]
	pub playlist_index: Option<usize>,
}

impl From<DumpItem> for StreamInfo {
	fn from(item: DumpItem) -> Self {
		return StreamInfo {
			id:                 item.id,
			filename:           item.filename,
			webpage_url:        item.webpage_url,
			fulltitle:          item.fulltitle,
			default_title:      item.title,
			default_suffix:     item.ext,
			description:        item.description,
			thumbnail:          item.thumbnail,
			extractor:          item.extractor,
			extractor_key:      item.extractor_key,
			default_format_id:  item.format_id,
			formats:            item.formats,
			playlist:           item.playlist,
			playlist_index:     item.playlist_index,
			error:              StreamError::NoError,
			user_title:         None,
			user_suffix:        None,
			user_format_id:     None,
		};
	}
}
