//! URL-safe identifiers derived from human-readable names.
//!
//! Posts and categories use different rules. Existing rows carry slugs
//! generated by each rule, so the two functions must stay separate.

use std::sync::OnceLock;

use regex::Regex;

fn non_word_run() -> &'static Regex {
	static NON_WORD: OnceLock<Regex> = OnceLock::new();
	NON_WORD.get_or_init(|| Regex::new(r"[^A-Za-z0-9_-]+").expect("static pattern"))
}

fn whitespace_run() -> &'static Regex {
	static WHITESPACE: OnceLock<Regex> = OnceLock::new();
	WHITESPACE.get_or_init(|| Regex::new(r"\s+").expect("static pattern"))
}

/// Slug for a post title.
///
/// Lowercases, turns each space into a hyphen, then drops everything that is
/// not an ASCII word character or a hyphen. Other whitespace (tabs, newlines)
/// is dropped rather than hyphenated.
pub fn post_slug(title: &str) -> String {
	let hyphenated = title.to_lowercase().replace(' ', "-");
	non_word_run().replace_all(&hyphenated, "").into_owned()
}

/// Slug for a category name: lowercased, whitespace runs collapsed into a
/// single hyphen. Nothing else is stripped.
pub fn category_slug(name: &str) -> String {
	whitespace_run().replace_all(&name.to_lowercase(), "-").into_owned()
}
