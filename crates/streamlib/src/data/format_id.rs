//! Module containing [`FormatId`] (`SPEC_FULL.md` §3, §4.2)

use std::cmp::Ordering;
use std::fmt;

/// An ordered, non-empty-when-valid sequence of atomic format tokens (opaque strings chosen by
/// the extractor, eg. `"137"`, `"251"`) identifying a composite download format.
///
/// The first token is always the video track, later tokens audio/subtitle tracks - order is
/// meaningful and is never re-sorted.
#[derive(Debug, Clone, Eq, Default)]
pub struct FormatId(Vec<String>);

impl FormatId {
	/// The empty [`FormatId`] (no tokens); used as a sentinel for "nothing selected"
	pub fn empty() -> Self {
		return Self(Vec::new());
	}

	/// Parse a `"+"`-joined string into a [`FormatId`], discarding any empty tokens (eg. from a
	/// leading/trailing/doubled `"+"`)
	pub fn parse<I: AsRef<str>>(input: I) -> Self {
		let tokens = input
			.as_ref()
			.split('+')
			.filter(|token| return !token.is_empty())
			.map(str::to_owned)
			.collect();

		return Self(tokens);
	}

	/// Construct a single-token [`FormatId`] directly, without going through string parsing
	pub fn single<I: Into<String>>(token: I) -> Self {
		return Self(vec![token.into()]);
	}

	/// Whether this [`FormatId`] has no tokens
	pub fn is_empty(&self) -> bool {
		return self.0.is_empty();
	}

	/// The atomic tokens, in order
	pub fn tokens(&self) -> &[String] {
		return &self.0;
	}

	/// Decompose into single-token [`FormatId`]s, in order
	pub fn compound_ids(&self) -> Vec<FormatId> {
		return self.0.iter().map(|token| return FormatId::single(token.clone())).collect();
	}
}

impl fmt::Display for FormatId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		return write!(f, "{}", self.0.join("+"));
	}
}

impl PartialEq for FormatId {
	fn eq(&self, other: &Self) -> bool {
		return self.to_string() == other.to_string();
	}
}

impl PartialOrd for FormatId {
	fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
		return Some(self.cmp(other));
	}
}

impl Ord for FormatId {
	fn cmp(&self, other: &Self) -> Ordering {
		return self.to_string().cmp(&other.to_string());
	}
}

impl From<&str> for FormatId {
	fn from(v: &str) -> Self {
		return Self::parse(v);
	}
}

impl From<String> for FormatId {
	fn from(v: String) -> Self {
		return Self::parse(v);
	}
}

impl From<&FormatId> for String {
	fn from(v: &FormatId) -> Self {
		return v.to_string();
	}
}

// custom Serialize/Deserialize as a plain string rather than deriving it
impl serde::Serialize for FormatId {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: serde::Serializer,
	{
		return serializer.serialize_str(&self.to_string());
	}
}

impl<'de> serde::Deserialize<'de> for FormatId {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: serde::Deserializer<'de>,
	{
		let raw = String::deserialize(deserializer)?;
		return Ok(FormatId::parse(raw));
	}
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn test_parse_basic() {
		assert_eq!(FormatId::parse("137+251").tokens(), &["137".to_owned(), "251".to_owned()]);
		assert_eq!(FormatId::parse("137").tokens(), &["137".to_owned()]);
	}

	#[test]
	fn test_parse_discards_empty_tokens() {
		assert_eq!(FormatId::parse("+137++251+").tokens(), &["137".to_owned(), "251".to_owned()]);
		assert_eq!(FormatId::parse("").tokens(), Vec::<String>::new().as_slice());
		assert_eq!(FormatId::parse("+").is_empty(), true);
	}

	#[test]
	fn test_display() {
		assert_eq!(FormatId::parse("137+251").to_string(), "137+251");
		assert_eq!(FormatId::empty().to_string(), "");
	}

	#[test]
	fn test_compound_ids() {
		let id = FormatId::parse("137+251");
		let compound = id.compound_ids();

		assert_eq!(compound, vec![FormatId::single("137"), FormatId::single("251")]);
	}

	#[test]
	fn test_roundtrip_property() {
		for input in ["137", "137+251", "a+b+c", ""] {
			let id = FormatId::parse(input);
			let roundtripped = FormatId::parse(id.to_string());
			assert_eq!(id, roundtripped);

			let joined = id
				.compound_ids()
				.iter()
				.map(FormatId::to_string)
				.collect::<Vec<_>>()
				.join("+");
			assert_eq!(joined, id.to_string());
		}
	}

	#[test]
	fn test_ordering_is_lexicographic_on_string_form() {
		assert!(FormatId::parse("137") < FormatId::parse("251"));
		assert!(FormatId::parse("137+251") < FormatId::parse("137+999"));
	}

	#[test]
	fn test_no_internal_sort() {
		// order must be preserved, not normalized - the video track comes first
		assert_eq!(FormatId::parse("251+137").to_string(), "251+137");
	}

	#[test]
	fn test_serde_roundtrip() {
		let id = FormatId::parse("137+251");
		let json = serde_json::to_string(&id).expect("Expected serialization to succeed");
		assert_eq!(json, "\"137+251\"");

		let back: FormatId = serde_json::from_str(&json).expect("Expected deserialization to succeed");
		assert_eq!(back, id);
	}
}
