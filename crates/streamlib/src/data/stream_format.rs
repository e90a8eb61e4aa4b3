//! Module containing [`StreamFormat`] (`SPEC_FULL.md` §3)

use serde::{
	Deserialize,
	Serialize,
};

use super::format_id::FormatId;

/// Sentinel value the extractor uses for "no codec" in `acodec`/`vcodec`
pub const CODEC_NONE: &str = "none";

/// A single atomic track description, as reported by the extractor for one `formats[]` entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamFormat {
	/// Single-token format identifier for this atom
	#[serde(rename = "format_id")]
	pub format_id: FormatId,
	/// Container extension, eg. `"mp4"`, `"webm"`, `"m4a"`
	#[serde(default)]
	pub ext: String,
	/// Free-form human-readable note from the extractor (eg. `"720p"`, `"DASH audio"`)
	#[serde(default)]
	pub format_note: String,
	/// Size in bytes, `0` if unknown
	#[serde(default)]
	pub filesize: u64,
	/// Audio codec, or [`CODEC_NONE`] if this atom carries no audio
	#[serde(default = "default_codec_none")]
	pub acodec: String,
	/// Average audio bitrate, in kbit/s
	#[serde(default)]
	pub abr: f64,
	/// Audio sample rate, in Hz
	#[serde(default)]
	pub asr: u64,
	/// Video codec, or [`CODEC_NONE`] if this atom carries no video
	#[serde(default = "default_codec_none")]
	pub vcodec: String,
	/// Pixel width, `0` if unknown/not applicable
	#[serde(default)]
	pub width: u64,
	/// Pixel height, `0` if unknown/not applicable
	#[serde(default)]
	pub height: u64,
	/// Frames per second, `0.0` if unknown/not applicable
	#[serde(default)]
	pub fps: f64,
	/// Total bitrate, in kbit/s
	#[serde(default)]
	pub tbr: f64,
}

fn default_codec_none() -> String {
	return CODEC_NONE.to_owned();
}

impl StreamFormat {
	/// Whether this atom carries a video track
	pub fn has_video(&self) -> bool {
		return self.vcodec != CODEC_NONE;
	}

	/// Whether this atom carries an audio track
	pub fn has_audio(&self) -> bool {
		return self.acodec != CODEC_NONE;
	}
}

#[cfg(test)]
mod test {
	use super::*;

	fn video_format() -> StreamFormat {
		return StreamFormat {
			format_id:   FormatId::single("137"),
			ext:         "mp4".to_owned(),
			format_note: "720p".to_owned(),
			filesize:    1000,
			acodec:      CODEC_NONE.to_owned(),
			abr:         0.0,
			asr:         0,
			vcodec:      "avc1".to_owned(),
			width:       1280,
			height:      720,
			fps:         30.0,
			tbr:         500.0,
		};
	}

	#[test]
	fn test_has_video_and_audio() {
		let video_only = video_format();
		assert!(video_only.has_video());
		assert!(!video_only.has_audio());

		let mut audio_only = video_format();
		audio_only.vcodec = CODEC_NONE.to_owned();
		audio_only.acodec = "mp4a".to_owned();
		assert!(!audio_only.has_video());
		assert!(audio_only.has_audio());
	}

	#[test]
	fn test_deserialize_missing_keys_default() {
		let json = r#"{"format_id":"22"}"#;
		let parsed: StreamFormat = serde_json::from_str(json).expect("Expected parse to succeed");

		assert_eq!(parsed.format_id, FormatId::single("22"));
		assert_eq!(parsed.ext, "");
		assert_eq!(parsed.filesize, 0);
		assert_eq!(parsed.acodec, CODEC_NONE);
		assert_eq!(parsed.vcodec, CODEC_NONE);
	}

	#[test]
	fn test_equality_is_field_wise() {
		assert_eq!(video_format(), video_format());

		let mut other = video_format();
		other.filesize = 2000;
		assert_ne!(video_format(), other);
	}
}
