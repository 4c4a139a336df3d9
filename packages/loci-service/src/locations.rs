use serde::Deserialize;
use uuid::Uuid;

use crate::{Error, LociService, Result, views::LocationView};
use loci_domain::{Coordinates, review};
use loci_storage::models::Location;

/// `rating`, `reviews` and `numReviews` are not accepted from clients and are dropped on parse.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLocationRequest {
	pub name: Option<String>,
	pub address: Option<String>,
	pub description: Option<String>,
	pub tags: Option<Vec<String>>,
	pub coordinates: Option<[f64; 2]>,
	pub image_url: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLocationRequest {
	pub name: Option<String>,
	pub address: Option<String>,
	pub description: Option<String>,
	pub tags: Option<Vec<String>>,
	pub coordinates: Option<[f64; 2]>,
	pub image_url: Option<String>,
}
impl UpdateLocationRequest {
	fn is_empty(&self) -> bool {
		self.name.is_none()
			&& self.address.is_none()
			&& self.description.is_none()
			&& self.tags.is_none()
			&& self.coordinates.is_none()
			&& self.image_url.is_none()
	}
}

impl LociService {
	pub async fn create_location(&self, req: CreateLocationRequest) -> Result<LocationView> {
		let name = review::validate_location_name(req.name.as_deref().unwrap_or_default())?;
		let position = required_coordinates(req.coordinates)?;
		let image_id = match non_blank(req.image_url) {
			Some(raw) => self.register_image_url(&raw).await?,
			None => None,
		};
		let location = Location {
			location_id: Uuid::new_v4(),
			name,
			address: non_blank(req.address),
			description: non_blank(req.description),
			tags: req.tags.unwrap_or_default(),
			position,
			rating: 0.0,
			created_at: crate::stored_now(),
			image_id,
			version: 0,
			review_count: 0,
		};

		if let Err(err) = self.store.insert_location(&location).await {
			if let Some(image_id) = image_id
				&& let Err(release_err) = self.release_image(image_id).await
			{
				tracing::warn!(%image_id, error = %release_err, "Failed to release orphaned image.");
			}

			return Err(err.into());
		}

		tracing::info!(location_id = %location.location_id, name = %location.name, "Location created.");

		Ok(LocationView::from(location))
	}

	pub async fn get_location(&self, location_id: &str) -> Result<LocationView> {
		let location_id = crate::parse_id(location_id, "Location")?;

		Ok(LocationView::from(self.load_location(location_id).await?))
	}

	/// Applies the supplied fields to the freshest read of the Location.
	///
	/// The write is checked against the version that was read; a lost race re-reads and re-applies
	/// the same edit, bounded by `storage.max_write_attempts`.
	pub async fn update_location(
		&self,
		location_id: &str,
		req: UpdateLocationRequest,
	) -> Result<LocationView> {
		let location_id = crate::parse_id(location_id, "Location")?;

		if req.is_empty() {
			return Err(Error::out_of_range("No updates provided."));
		}

		let edit = LocationEdit {
			name: req.name.as_deref().map(review::validate_location_name).transpose()?,
			address: req.address.map(|address| non_blank(Some(address))),
			description: req.description.map(|description| non_blank(Some(description))),
			tags: req.tags,
			position: req.coordinates.map(Coordinates::try_from).transpose()?,
		};

		self.load_location(location_id).await?;

		let new_image = match non_blank(req.image_url) {
			Some(raw) => self.register_image_url(&raw).await?,
			None => None,
		};

		match self.commit_location_edit(location_id, &edit, new_image).await {
			Ok(previous_image) => {
				if let (Some(_), Some(previous)) = (new_image, previous_image) {
					self.release_image(previous).await?;
				}
			},
			Err(err) => {
				if let Some(image_id) = new_image
					&& let Err(release_err) = self.release_image(image_id).await
				{
					tracing::warn!(
						%image_id,
						error = %release_err,
						"Failed to release orphaned image."
					);
				}

				return Err(err);
			},
		}

		tracing::info!(%location_id, "Location updated.");

		Ok(LocationView::from(self.load_location(location_id).await?))
	}

	/// Reviews go with the Location; its image record is released.
	pub async fn delete_location(&self, location_id: &str) -> Result<()> {
		let location_id = crate::parse_id(location_id, "Location")?;

		if !self.store.delete_location(location_id).await? {
			return Err(Error::not_found("Location not found."));
		}

		tracing::info!(%location_id, "Location deleted.");

		Ok(())
	}

	pub(crate) async fn load_location(&self, location_id: Uuid) -> Result<Location> {
		self.store
			.get_location(location_id)
			.await?
			.ok_or_else(|| Error::not_found("Location not found."))
	}

	/// Returns the image id the Location carried before the committed write.
	async fn commit_location_edit(
		&self,
		location_id: Uuid,
		edit: &LocationEdit,
		new_image: Option<Uuid>,
	) -> Result<Option<Uuid>> {
		let max_attempts = self.cfg.storage.max_write_attempts.max(1);

		for attempt in 1..=max_attempts {
			let mut location = self.load_location(location_id).await?;
			let previous_image = location.image_id;

			edit.apply(&mut location);

			if new_image.is_some() {
				location.image_id = new_image;
			}

			match self.store.update_location(&location).await {
				Ok(()) => return Ok(previous_image),
				Err(loci_storage::Error::VersionMismatch { .. }) => {
					tracing::warn!(
						%location_id,
						attempt,
						"Location changed during update. Retrying."
					);
				},
				Err(err) => return Err(err.into()),
			}
		}

		Err(Error::Conflict {
			message: format!(
				"Location {location_id} is being modified concurrently. Retry the request."
			),
		})
	}
}

struct LocationEdit {
	name: Option<String>,
	address: Option<Option<String>>,
	description: Option<Option<String>>,
	tags: Option<Vec<String>>,
	position: Option<Coordinates>,
}
impl LocationEdit {
	fn apply(&self, location: &mut Location) {
		if let Some(name) = &self.name {
			location.name = name.clone();
		}
		if let Some(address) = &self.address {
			location.address = address.clone();
		}
		if let Some(description) = &self.description {
			location.description = description.clone();
		}
		if let Some(tags) = &self.tags {
			location.tags = tags.clone();
		}
		if let Some(position) = self.position {
			location.position = position;
		}
	}
}

pub(crate) fn required_coordinates(raw: Option<[f64; 2]>) -> Result<Coordinates> {
	let Some(pair) = raw else {
		return Err(Error::out_of_range("coordinates are required as [lng, lat]."));
	};

	Ok(Coordinates::try_from(pair)?)
}

fn non_blank(value: Option<String>) -> Option<String> {
	value.map(|value| value.trim().to_string()).filter(|value| !value.is_empty())
}
