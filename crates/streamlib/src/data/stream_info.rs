//! Module containing [`StreamInfo`] (`SPEC_FULL.md` §3)

use serde::{
	Deserialize,
	Serialize,
};

use super::format_id::FormatId;
use super::stream_format::StreamFormat;

/// The fixed set of punctuation characters (beyond letters/digits) that survive filename
/// sanitization (`SPEC_FULL.md` §3, `fileBaseName`)
const LEGAL_FILENAME_CHARS: &str = "-+' @()[]{}\u{b0}#,.&";

/// Availability status of a [`StreamInfo`], as produced by [`crate::metadata::collector::MetadataCollector`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum StreamError {
	#[default]
	NoError,
	JsonFormat,
	Unavailable,
}

/// A single media resource's metadata: a value-typed snapshot produced atomically by
/// [`crate::metadata::collector::MetadataCollector`]. Only the three `user_*` override fields
/// are mutated after emission; the core never mutates a produced [`StreamInfo`] itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamInfo {
	pub id: String,
	/// Suggested filename as reported by the extractor (`_filename`)
	#[serde(default)]
	pub filename: String,
	#[serde(default)]
	pub webpage_url: String,
	#[serde(default)]
	pub fulltitle: String,
	#[serde(default)]
	pub default_title: String,
	#[serde(default)]
	pub default_suffix: String,
	#[serde(default)]
	pub description: String,
	#[serde(default)]
	pub thumbnail: String,
	#[serde(default)]
	pub extractor: String,
	#[serde(default)]
	pub extractor_key: String,
	#[serde(default)]
	pub default_format_id: FormatId,
	#[serde(default)]
	pub formats: Vec<StreamFormat>,
	#[serde(default)]
	pub playlist: Option<String>,
	#[serde(default)]
	pub playlist_index: Option<usize>,
	#[serde(default)]
	pub error: StreamError,

	#[serde(default)]
	pub(crate) user_title: Option<String>,
	#[serde(default)]
	pub(crate) user_suffix: Option<String>,
	#[serde(default)]
	pub(crate) user_format_id: Option<FormatId>,
}

impl StreamInfo {
	/// Build a stub entry for a playlist member the extractor could not produce a dump for
	/// (`SPEC_FULL.md` §4.4 reconciliation)
	pub fn unavailable_stub<I: Into<String>>(id: I) -> Self {
		return Self::stub_with_error(id, StreamError::Unavailable);
	}

	/// Build a stub entry for a dump line that failed to parse as JSON (`SPEC_FULL.md` §4.4)
	pub fn json_format_stub<I: Into<String>>(id: I) -> Self {
		return Self::stub_with_error(id, StreamError::JsonFormat);
	}

	fn stub_with_error<I: Into<String>>(id: I, error: StreamError) -> Self {
		return Self {
			id: id.into(),
			filename: String::new(),
			webpage_url: String::new(),
			fulltitle: String::new(),
			default_title: String::new(),
			default_suffix: String::new(),
			description: String::new(),
			thumbnail: String::new(),
			extractor: String::new(),
			extractor_key: String::new(),
			default_format_id: FormatId::empty(),
			formats: Vec::new(),
			playlist: None,
			playlist_index: None,
			error,
			user_title: None,
			user_suffix: None,
			user_format_id: None,
		};
	}

	/// `title() = userTitle if present else defaultTitle`
	pub fn title(&self) -> &str {
		return self.user_title.as_deref().unwrap_or(&self.default_title);
	}

	/// Setting `title` to the default clears the override
	pub fn set_title<S: Into<String>>(&mut self, title: S) {
		let title = title.into();
		if title == self.default_title {
			self.user_title = None;
		} else {
			self.user_title = Some(title);
		}
	}

	/// `formatId() = userFormatId if present else defaultFormatId`
	pub fn format_id(&self) -> &FormatId {
		return self.user_format_id.as_ref().unwrap_or(&self.default_format_id);
	}

	/// Setting `formatId` clears `userSuffix` (the suffix must be re-derived from the new composite)
	pub fn set_format_id(&mut self, format_id: FormatId) {
		self.user_suffix = None;
		self.user_format_id = Some(format_id);
	}

	/// Look up the atomic [`StreamFormat`] for a single-token [`FormatId`], if known
	fn find_format(&self, atom: &FormatId) -> Option<&StreamFormat> {
		return self.formats.iter().find(|format| return &format.format_id == atom);
	}

	/// See `SPEC_FULL.md` §3 for the full derivation rule
	pub fn suffix(&self) -> String {
		if let Some(suffix) = &self.user_suffix {
			return suffix.clone();
		}

		if self.default_format_id.is_empty() {
			return "???".to_owned();
		}

		if self.format_id() == &self.default_format_id {
			return self.default_suffix.clone();
		}

		let mut last_ext = String::new();
		for atom in self.format_id().compound_ids() {
			let Some(format) = self.find_format(&atom) else {
				continue;
			};

			last_ext = format.ext.clone();

			if format.has_video() {
				return format.ext.clone();
			}
		}

		return last_ext;
	}

	/// Set the suffix override directly
	pub fn set_suffix<S: Into<String>>(&mut self, suffix: S) {
		self.user_suffix = Some(suffix.into());
	}

	/// Sanitized base name derived from [`Self::title`]: letters/digits and the fixed legal
	/// punctuation set are kept, `"` becomes `'`, anything else becomes `_`, runs of `_` collapse
	/// to one, and the result is trimmed.
	pub fn file_base_name(&self) -> String {
		return sanitize_filename(self.title());
	}

	/// `baseName + "." + suffix()` when the suffix is non-empty, else just `baseName`
	pub fn full_file_name(&self) -> String {
		let base = self.file_base_name();
		let suffix = self.suffix();

		if suffix.is_empty() {
			return base;
		}

		return format!("{base}.{suffix}");
	}

	/// `isAvailable() <=> error == NoError`
	pub fn is_available(&self) -> bool {
		return self.error == StreamError::NoError;
	}

	/// Sum of `filesize` for each atom in `fid.compoundIds()`, `0` for missing atoms, `-1` for
	/// an empty `fid`
	pub fn guestimate_full_size(&self, fid: &FormatId) -> i64 {
		if fid.is_empty() {
			return -1;
		}

		return fid
			.compound_ids()
			.iter()
			.map(|atom| return self.find_format(atom).map_or(0, |format| return format.filesize as i64))
			.sum();
	}

	/// Convenience over [`Self::guestimate_full_size`] using the currently selected [`Self::format_id`]
	pub fn guestimate_selected_size(&self) -> i64 {
		return self.guestimate_full_size(self.format_id());
	}

	/// The user-facing "one-click" set: formats with both video and audio, deduplicated and
	/// sorted ascending by `(width, height, description)`
	pub fn default_formats(&self) -> Vec<StreamFormat> {
		let mut formats: Vec<StreamFormat> = self
			.formats
			.iter()
			.filter(|format| return format.has_video() && format.has_audio())
			.cloned()
			.collect();

		formats.sort_by(|a, b| {
			return (a.width, a.height, description_key(a)).cmp(&(b.width, b.height, description_key(b)));
		});
		formats.dedup();

		return formats;
	}

	/// Audio-only formats, in insertion order
	pub fn audio_formats(&self) -> Vec<StreamFormat> {
		return self
			.formats
			.iter()
			.filter(|format| return format.has_audio() && !format.has_video())
			.cloned()
			.collect();
	}

	/// Video-only formats, in insertion order
	pub fn video_formats(&self) -> Vec<StreamFormat> {
		return self
			.formats
			.iter()
			.filter(|format| return format.has_video() && !format.has_audio())
			.cloned()
			.collect();
	}
}

/// Stable tie-break key for [`StreamInfo::default_formats`] sorting
fn description_key(format: &StreamFormat) -> String {
	return format!("{} {} {}", format.ext, format.format_note, format.tbr);
}

/// See [`StreamInfo::file_base_name`]
fn sanitize_filename(title: &str) -> String {
	let mut mapped = String::with_capacity(title.len());
	for ch in title.chars() {
		let out = if ch == '"' {
			'\''
		} else if ch.is_alphanumeric() || LEGAL_FILENAME_CHARS.contains(ch) {
			ch
		} else {
			'_'
		};
		mapped.push(out);
	}

	let mut collapsed = String::with_capacity(mapped.len());
	let mut prev_was_underscore = false;
	for ch in mapped.chars() {
		if ch == '_' {
			if !prev_was_underscore {
				collapsed.push('_');
			}
			prev_was_underscore = true;
		} else {
			collapsed.push(ch);
			prev_was_underscore = false;
		}
	}

	return collapsed.trim().to_owned();
}

#[cfg(test)]
mod test {
	use super::*;

	fn base_info() -> StreamInfo {
		return StreamInfo {
			id:              "abc".to_owned(),
			filename:        String::new(),
			webpage_url:     "https://example.com/abc".to_owned(),
			fulltitle:       "Hi".to_owned(),
			default_title:   "Hi".to_owned(),
			default_suffix:  "mp4".to_owned(),
			description:     String::new(),
			thumbnail:       String::new(),
			extractor:       "generic".to_owned(),
			extractor_key:   "Generic".to_owned(),
			default_format_id: FormatId::single("22"),
			formats:         vec![StreamFormat {
				format_id:   FormatId::single("22"),
				ext:         "mp4".to_owned(),
				format_note: String::new(),
				filesize:    1000,
				acodec:      "mp4a".to_owned(),
				abr:         128.0,
				asr:         44100,
				vcodec:      "avc1".to_owned(),
				width:       1280,
				height:      720,
				fps:         30.0,
				tbr:         500.0,
			}],
			playlist:        None,
			playlist_index:  Some(1),
			error:           StreamError::NoError,
			user_title:      None,
			user_suffix:     None,
			user_format_id:  None,
		};
	}

	#[test]
	fn test_title_default_and_override() {
		let mut info = base_info();
		assert_eq!(info.title(), "Hi");

		info.set_title("Custom");
		assert_eq!(info.title(), "Custom");

		// setting back to default clears the override
		info.set_title("Hi");
		assert_eq!(info.title(), "Hi");
	}

	#[test]
	fn test_format_id_default_and_override_clears_suffix() {
		let mut info = base_info();
		info.set_suffix("webm");
		assert_eq!(info.suffix(), "webm");

		info.set_format_id(FormatId::single("137"));
		assert_eq!(info.format_id(), &FormatId::single("137"));
		// invariant: setFormatId always clears userSuffix
		assert_ne!(info.suffix(), "webm");
	}

	#[test]
	fn test_suffix_idempotence_property() {
		let mut info = base_info();
		info.set_suffix(info.default_suffix.clone());
		assert_eq!(info.suffix(), info.default_suffix);
	}

	#[test]
	fn test_suffix_falls_back_to_default_suffix_when_format_id_is_default() {
		let info = base_info();
		assert_eq!(info.format_id(), &info.default_format_id);
		assert_eq!(info.suffix(), "mp4");
	}

	#[test]
	fn test_suffix_scans_composite_atoms_for_video() {
		let mut info = base_info();
		info.formats.push(StreamFormat {
			format_id:   FormatId::single("251"),
			ext:         "webm".to_owned(),
			format_note: String::new(),
			filesize:    500,
			acodec:      "opus".to_owned(),
			abr:         160.0,
			asr:         48000,
			vcodec:      "none".to_owned(),
			width:       0,
			height:      0,
			fps:         0.0,
			tbr:         160.0,
		});

		// "22" is a combined video+audio atom (mp4), so as a composite "22+251" the scan should
		// return the video atom's ext ("mp4"), not the audio atom's ("webm")
		info.set_format_id(FormatId::parse("22+251"));
		assert_eq!(info.suffix(), "mp4");
	}

	#[test]
	fn test_suffix_is_question_marks_when_default_format_id_empty() {
		let info = StreamInfo::unavailable_stub("missing");
		assert_eq!(info.suffix(), "???");
	}

	#[test]
	fn test_file_base_name_sanitization() {
		let mut info = base_info();
		info.set_title("Weird: Title/With*Chars \"quoted\" #1 (2024)");

		let sanitized = info.file_base_name();

		assert!(sanitized.chars().all(|c| return c.is_alphanumeric() || LEGAL_FILENAME_CHARS.contains(c)));
		assert!(!sanitized.contains("__"));
		assert_eq!(sanitized, sanitized.trim());
	}

	#[test]
	fn test_file_base_name_never_produces_double_underscore() {
		let mut info = base_info();
		info.set_title("a///b***c");
		assert!(!info.file_base_name().contains("__"));
	}

	#[test]
	fn test_full_file_name() {
		let info = base_info();
		assert_eq!(info.full_file_name(), "Hi.mp4");
	}

	#[test]
	fn test_is_available() {
		let mut info = base_info();
		assert!(info.is_available());

		info.error = StreamError::Unavailable;
		assert!(!info.is_available());
	}

	#[test]
	fn test_guestimate_full_size() {
		let info = base_info();
		assert_eq!(info.guestimate_full_size(&FormatId::single("22")), 1000);
		assert_eq!(info.guestimate_full_size(&FormatId::empty()), -1);
		assert_eq!(info.guestimate_full_size(&FormatId::single("missing")), 0);
	}

	#[test]
	fn test_guestimate_full_size_sums_missing_atoms_as_zero() {
		let info = base_info();
		assert_eq!(info.guestimate_full_size(&FormatId::parse("22+missing")), 1000);
	}

	#[test]
	fn test_default_audio_video_formats_partition() {
		let mut info = base_info();
		info.formats.push(StreamFormat {
			format_id:   FormatId::single("251"),
			ext:         "webm".to_owned(),
			format_note: String::new(),
			filesize:    500,
			acodec:      "opus".to_owned(),
			abr:         160.0,
			asr:         48000,
			vcodec:      "none".to_owned(),
			width:       0,
			height:      0,
			fps:         0.0,
			tbr:         160.0,
		});
		info.formats.push(StreamFormat {
			format_id:   FormatId::single("137"),
			ext:         "mp4".to_owned(),
			format_note: String::new(),
			filesize:    2000,
			acodec:      "none".to_owned(),
			abr:         0.0,
			asr:         0,
			vcodec:      "avc1".to_owned(),
			width:       1920,
			height:      1080,
			fps:         30.0,
			tbr:         800.0,
		});

		assert_eq!(info.default_formats().len(), 1); // only "22" has both video+audio
		assert_eq!(info.audio_formats().len(), 1);
		assert_eq!(info.video_formats().len(), 1);
	}
}
