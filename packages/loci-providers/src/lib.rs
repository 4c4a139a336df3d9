pub mod images;
pub mod places;

mod error;

pub use error::{Error, Result};

use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderName, HeaderValue};
use serde_json::{Map, Value};

/// The place directory expects the raw key in `Authorization`, without a scheme prefix.
pub fn auth_headers(api_key: Option<&str>, default_headers: &Map<String, Value>) -> Result<HeaderMap> {
	let mut headers = HeaderMap::new();

	headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

	if let Some(api_key) = api_key {
		let mut value = HeaderValue::from_str(api_key)?;

		value.set_sensitive(true);
		headers.insert(AUTHORIZATION, value);
	}

	for (key, value) in default_headers {
		let Some(raw) = value.as_str() else {
			return Err(Error::InvalidConfig {
				message: format!("Default header {key} must be a string."),
			});
		};

		headers.insert(HeaderName::from_bytes(key.as_bytes())?, HeaderValue::from_str(raw)?);
	}

	Ok(headers)
}
