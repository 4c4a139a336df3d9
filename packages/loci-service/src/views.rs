//! JSON shapes returned to clients. Field names are camelCase on the wire.

use serde::Serialize;
use time::OffsetDateTime;
use uuid::Uuid;

use loci_domain::Coordinates;
use loci_storage::models::{Image, Location, Review};

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationView {
	pub id: Uuid,
	pub name: String,
	pub address: Option<String>,
	pub description: Option<String>,
	pub rating: f64,
	pub tags: Vec<String>,
	pub num_reviews: i64,
	pub coordinates: Coordinates,
	#[serde(with = "crate::time_serde")]
	pub created_on: OffsetDateTime,
	pub image_id: Option<Uuid>,
}
impl From<Location> for LocationView {
	fn from(location: Location) -> Self {
		Self {
			id: location.location_id,
			name: location.name,
			address: location.address,
			description: location.description,
			rating: location.rating,
			tags: location.tags,
			num_reviews: location.review_count,
			coordinates: location.position,
			created_on: location.created_at,
			image_id: location.image_id,
		}
	}
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewView {
	pub id: Uuid,
	pub author: String,
	pub review_text: String,
	pub rating: f64,
	#[serde(with = "crate::time_serde")]
	pub created_on: OffsetDateTime,
	pub coordinates: Coordinates,
}
impl From<Review> for ReviewView {
	fn from(review: Review) -> Self {
		Self {
			id: review.review_id,
			author: review.author,
			review_text: review.review_text,
			rating: review.rating,
			created_on: review.created_at,
			coordinates: review.position,
		}
	}
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageView {
	pub id: Uuid,
	pub hosted: bool,
	pub url: Option<String>,
	pub path: Option<String>,
	#[serde(with = "crate::time_serde")]
	pub uploaded_at: OffsetDateTime,
}
impl From<Image> for ImageView {
	fn from(image: Image) -> Self {
		Self {
			id: image.image_id,
			hosted: image.hosted,
			url: image.url,
			path: image.path,
			uploaded_at: image.uploaded_at,
		}
	}
}

/// A directory place as it would be imported.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceView {
	pub place_id: String,
	pub name: String,
	pub address: Option<String>,
	pub description: Option<String>,
	pub tags: Vec<String>,
	pub coordinates: Coordinates,
}
