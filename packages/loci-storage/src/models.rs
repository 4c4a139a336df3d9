use time::OffsetDateTime;
use uuid::Uuid;

use loci_domain::Coordinates;

#[derive(Debug, Clone, PartialEq)]
pub struct Location {
	pub location_id: Uuid,
	pub name: String,
	pub address: Option<String>,
	pub description: Option<String>,
	pub tags: Vec<String>,
	pub position: Coordinates,
	pub rating: f64,
	pub created_at: OffsetDateTime,
	pub image_id: Option<Uuid>,
	/// Bumped by every committed review write.
	pub version: i64,
	pub review_count: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Review {
	pub review_id: Uuid,
	pub location_id: Uuid,
	pub author: String,
	pub rating: f64,
	pub review_text: String,
	pub position: Coordinates,
	pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Image {
	pub image_id: Uuid,
	pub hosted: bool,
	pub path: Option<String>,
	pub url: Option<String>,
	pub uploaded_at: OffsetDateTime,
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct LocationRow {
	pub(crate) location_id: Uuid,
	pub(crate) name: String,
	pub(crate) address: Option<String>,
	pub(crate) description: Option<String>,
	pub(crate) tags: Vec<String>,
	pub(crate) lng: f64,
	pub(crate) lat: f64,
	pub(crate) rating: f64,
	pub(crate) created_at: OffsetDateTime,
	pub(crate) image_id: Option<Uuid>,
	pub(crate) version: i64,
	pub(crate) review_count: i64,
}
impl TryFrom<LocationRow> for Location {
	type Error = crate::Error;

	fn try_from(row: LocationRow) -> crate::Result<Self> {
		let position = stored_position(row.lng, row.lat, "location", row.location_id)?;

		Ok(Self {
			location_id: row.location_id,
			name: row.name,
			address: row.address,
			description: row.description,
			tags: row.tags,
			position,
			rating: row.rating,
			created_at: row.created_at,
			image_id: row.image_id,
			version: row.version,
			review_count: row.review_count,
		})
	}
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct ReviewRow {
	pub(crate) review_id: Uuid,
	pub(crate) location_id: Uuid,
	pub(crate) author: String,
	pub(crate) rating: f64,
	pub(crate) review_text: String,
	pub(crate) lng: f64,
	pub(crate) lat: f64,
	pub(crate) created_at: OffsetDateTime,
}
impl TryFrom<ReviewRow> for Review {
	type Error = crate::Error;

	fn try_from(row: ReviewRow) -> crate::Result<Self> {
		let position = stored_position(row.lng, row.lat, "review", row.review_id)?;

		Ok(Self {
			review_id: row.review_id,
			location_id: row.location_id,
			author: row.author,
			rating: row.rating,
			review_text: row.review_text,
			position,
			created_at: row.created_at,
		})
	}
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct ImageRow {
	pub(crate) image_id: Uuid,
	pub(crate) hosted: bool,
	pub(crate) path: Option<String>,
	pub(crate) url: Option<String>,
	pub(crate) uploaded_at: OffsetDateTime,
}
impl From<ImageRow> for Image {
	fn from(row: ImageRow) -> Self {
		Self {
			image_id: row.image_id,
			hosted: row.hosted,
			path: row.path,
			url: row.url,
			uploaded_at: row.uploaded_at,
		}
	}
}

fn stored_position(lng: f64, lat: f64, kind: &str, id: Uuid) -> crate::Result<Coordinates> {
	Coordinates::new(lng, lat)
		.map_err(|_| crate::Error::InvalidData(format!("{kind} {id} has out-of-range coordinates.")))
}
