use reqwest::Url;

use crate::{Error, Result};

/// Accepts absolute `http`/`https` URLs with a host. The image itself is never fetched.
pub fn external_image_url(raw: &str) -> Result<Url> {
	let url = Url::parse(raw.trim()).map_err(|err| Error::InvalidUrl {
		message: format!("Image URL is not valid: {err}."),
	})?;

	if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
		return Err(Error::InvalidUrl {
			message: "Image URL must be an absolute http(s) URL.".to_string(),
		});
	}

	Ok(url)
}
