use crate::{Error, Result};

pub const MAX_REVIEW_TEXT_CHARS: usize = 1_000;

pub fn validate_author(author: &str) -> Result<String> {
	require_non_empty("author", author)
}

pub fn validate_location_name(name: &str) -> Result<String> {
	require_non_empty("name", name)
}

/// Review text is stored as written; only the blank check ignores surrounding whitespace.
pub fn validate_review_text(text: &str) -> Result<String> {
	if text.trim().is_empty() {
		return Err(Error::OutOfRange { field: "reviewText", message: "must be non-empty.".to_string() });
	}
	if text.chars().count() > MAX_REVIEW_TEXT_CHARS {
		return Err(Error::OutOfRange {
			field: "reviewText",
			message: format!("must be at most {MAX_REVIEW_TEXT_CHARS} characters."),
		});
	}

	Ok(text.to_string())
}

fn require_non_empty(field: &'static str, value: &str) -> Result<String> {
	let trimmed = value.trim();

	if trimmed.is_empty() {
		return Err(Error::OutOfRange { field, message: "must be non-empty.".to_string() });
	}

	Ok(trimmed.to_string())
}
