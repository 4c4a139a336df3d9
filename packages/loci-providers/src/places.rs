use std::time::Duration;

use reqwest::{Client, Url};
use serde::Deserialize;
use serde_json::Value;

use crate::{Error, Result};

pub const PLACE_FIELDS: &str = "fsq_id,name,geocodes,location,categories,description";

/// A directory entry reduced to what a Location needs.
#[derive(Debug, Clone, PartialEq)]
pub struct Place {
	pub place_id: String,
	pub name: String,
	pub description: Option<String>,
	pub address: Option<String>,
	pub tags: Vec<String>,
	pub lng: f64,
	pub lat: f64,
}

#[derive(Debug, Deserialize)]
struct PlaceDetails {
	fsq_id: Option<String>,
	name: Option<String>,
	description: Option<String>,
	#[serde(default)]
	categories: Vec<Category>,
	location: Option<PlaceLocation>,
	geocodes: Option<Geocodes>,
}

#[derive(Debug, Deserialize)]
struct Category {
	short_name: Option<String>,
	name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PlaceLocation {
	formatted_address: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Geocodes {
	main: Option<Point>,
}

#[derive(Debug, Deserialize)]
struct Point {
	latitude: f64,
	longitude: f64,
}

pub async fn fetch_place(cfg: &loci_config::Places, place_id: &str) -> Result<Place> {
	let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
	let url = place_details_url(&cfg.api_base, place_id)?;
	let res = client
		.get(url)
		.headers(crate::auth_headers(cfg.api_key.as_deref(), &cfg.default_headers)?)
		.send()
		.await?;
	let json: Value = res.error_for_status()?.json().await?;

	parse_place(json, place_id)
}

pub fn place_details_url(api_base: &str, place_id: &str) -> Result<Url> {
	let mut url = Url::parse(api_base).map_err(|err| Error::InvalidConfig {
		message: format!("places.api_base is not a valid URL: {err}."),
	})?;

	url.path_segments_mut()
		.map_err(|_| Error::InvalidConfig {
			message: "places.api_base cannot be used as a base URL.".to_string(),
		})?
		.pop_if_empty()
		.extend(["v3", "places", place_id]);
	url.query_pairs_mut().append_pair("fields", PLACE_FIELDS);

	Ok(url)
}

fn parse_place(json: Value, requested_id: &str) -> Result<Place> {
	let details: PlaceDetails = serde_json::from_value(json)?;
	let name = details
		.name
		.filter(|name| !name.trim().is_empty())
		.ok_or_else(|| Error::InvalidResponse {
			message: format!("Place {requested_id} is missing a name."),
		})?;
	let point = details.geocodes.and_then(|geocodes| geocodes.main).ok_or_else(|| {
		Error::InvalidResponse { message: format!("Place {requested_id} is missing geocodes.") }
	})?;
	let tags = details
		.categories
		.into_iter()
		.filter_map(|category| category.short_name.or(category.name))
		.collect();

	Ok(Place {
		place_id: details.fsq_id.unwrap_or_else(|| requested_id.to_string()),
		name,
		description: details.description.filter(|text| !text.is_empty()),
		address: details.location.and_then(|location| location.formatted_address),
		tags,
		lng: point.longitude,
		lat: point.latitude,
	})
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn maps_place_details() {
		let json = serde_json::json!({
			"fsq_id": "4adcda38f964a5205d3c21e3",
			"name": "Estadio Santiago Bernabéu",
			"geocodes": { "main": { "latitude": 40.453053, "longitude": -3.688344 } },
			"location": { "formatted_address": "Av. de Concha Espina, 1, 28036 Madrid" },
			"categories": [
				{ "id": 18_021, "name": "Soccer Stadium", "short_name": "Soccer Stadium" },
				{ "id": 10_000, "name": "Landmark" }
			]
		});
		let place = parse_place(json, "4adcda38f964a5205d3c21e3").expect("parse failed");

		assert_eq!(place.name, "Estadio Santiago Bernabéu");
		assert_eq!(place.lng, -3.688344);
		assert_eq!(place.lat, 40.453053);
		assert_eq!(place.tags, vec!["Soccer Stadium".to_string(), "Landmark".to_string()]);
		assert_eq!(place.address.as_deref(), Some("Av. de Concha Espina, 1, 28036 Madrid"));
		assert_eq!(place.description, None);
	}

	#[test]
	fn rejects_place_without_geocodes() {
		let json = serde_json::json!({ "fsq_id": "abc", "name": "Nowhere" });

		assert!(matches!(parse_place(json, "abc"), Err(Error::InvalidResponse { .. })));
	}

	#[test]
	fn escapes_place_id_in_path() {
		let url = place_details_url("https://api.example.com/", "a/b c").expect("url failed");

		assert_eq!(url.path(), "/v3/places/a%2Fb%20c");
		assert_eq!(url.query(), Some("fields=fsq_id%2Cname%2Cgeocodes%2Clocation%2Ccategories%2Cdescription"));
	}
}
