//! Module for the extractor host-matching helper (`SPEC_FULL.md` §4.7).
//!
//! Used by a surrounding system to decide whether a URL's host is claimed by a given
//! extractor's host pattern, without needing a real regex engine for the common case.

/// Check whether `host` (dot-separated, eg. `"www.example.com"`) matches `pattern` (tokens
/// separated by `.` or `:`, eg. `"example.com"` or `"example:videos"`).
///
/// The match succeeds iff *every* token in `pattern` appears as some dot-component of `host`,
/// case-insensitively. Token order in `pattern` does not matter.
pub fn matches_host(host: &str, pattern: &str) -> bool {
	let host_components: Vec<String> = host.split('.').map(|c| return c.to_lowercase()).collect();

	return pattern
		.split(|c| return c == '.' || c == ':')
		.filter(|token| return !token.is_empty())
		.all(|token| {
			let token = token.to_lowercase();
			return host_components.iter().any(|component| return component == &token);
		});
}

/// Check whether `host` matches any pattern in `patterns`.
pub fn matches_any_host<I, S>(host: &str, patterns: I) -> bool
where
	I: IntoIterator<Item = S>,
	S: AsRef<str>,
{
	return patterns.into_iter().any(|pattern| return matches_host(host, pattern.as_ref()));
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn test_spec_examples() {
		assert!(matches_host("www.absnews.com", "absnews.com"));
		assert!(matches_host("videos.absnews.com", "absnews:videos"));
		assert!(!matches_host("www.absnews.com", "absnews:videos"));
	}

	#[test]
	fn test_case_insensitive() {
		assert!(matches_host("WWW.ABSNEWS.COM", "absnews.com"));
		assert!(matches_host("www.absnews.com", "ABSNEWS.COM"));
	}

	#[test]
	fn test_token_order_does_not_matter() {
		assert_eq!(
			matches_host("videos.absnews.com", "absnews:videos"),
			matches_host("videos.absnews.com", "videos:absnews"),
		);
	}

	#[test]
	fn test_empty_pattern_matches_everything() {
		// an empty pattern has no mandatory tokens, so it is vacuously satisfied
		assert!(matches_host("anything.example.com", ""));
	}

	#[test]
	fn test_matches_any_host() {
		assert!(matches_any_host("www.absnews.com", ["other.com", "absnews.com"]));
		assert!(!matches_any_host("www.absnews.com", ["other.com", "else.com"]));
	}
}
