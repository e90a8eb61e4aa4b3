//! Module containing [`PlaylistItem`] (`SPEC_FULL.md` §3)

use serde::{
	Deserialize,
	Serialize,
};

/// A flat playlist entry, as emitted by the `--flat-playlist` probe. Used as the authoritative
/// ordering for a playlist during [`crate::metadata::collector::MetadataCollector`] reconciliation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaylistItem {
	#[serde(rename = "_type", default)]
	pub type_: String,
	#[serde(default)]
	pub id: String,
	#[serde(default)]
	pub ie_key: String,
	#[serde(default)]
	pub title: String,
	#[serde(default)]
	pub url: String,
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn test_deserialize() {
		let json = r#"{"id":"abc","title":"Hi","url":"u"}"#;
		let parsed: PlaylistItem = serde_json::from_str(json).expect("Expected parse to succeed");

		assert_eq!(parsed.id, "abc");
		assert_eq!(parsed.title, "Hi");
		assert_eq!(parsed.url, "u");
		assert_eq!(parsed.type_, "");
	}
}
