use serde::Deserialize;

use crate::{
	Error, LociService, Result,
	locations::CreateLocationRequest,
	views::{LocationView, PlaceView},
};
use loci_domain::Coordinates;
use loci_providers::places::Place;

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportPlacesRequest {
	pub place_ids: Vec<String>,
}

impl LociService {
	/// Reads one directory place without creating anything.
	pub async fn preview_place(&self, place_id: &str) -> Result<PlaceView> {
		let place_id = place_id.trim();

		if place_id.is_empty() {
			return Err(Error::malformed("placeId must not be blank."));
		}

		let place = self.fetch_place(place_id).await?;
		let coordinates = Coordinates::new(place.lng, place.lat).map_err(|err| Error::Provider {
			message: format!("Place {place_id} has unusable coordinates: {err}"),
		})?;

		Ok(PlaceView {
			place_id: place.place_id,
			name: place.name,
			address: place.address,
			description: place.description,
			tags: place.tags,
			coordinates,
		})
	}

	/// Creates one Location per directory place, in request order.
	///
	/// Places are fetched one at a time; a directory failure stops the batch but keeps the
	/// Locations already created.
	pub async fn import_places(&self, req: ImportPlacesRequest) -> Result<Vec<LocationView>> {
		let max_batch = self.cfg.places.max_import_batch as usize;

		if req.place_ids.is_empty() || req.place_ids.len() > max_batch {
			return Err(Error::malformed(format!(
				"placeIds must contain between 1 and {max_batch} place ids."
			)));
		}

		let mut place_ids = Vec::with_capacity(req.place_ids.len());

		for place_id in &req.place_ids {
			let place_id = place_id.trim();

			if place_id.is_empty() {
				return Err(Error::malformed("placeIds must not contain blank ids."));
			}

			place_ids.push(place_id);
		}

		let mut created = Vec::with_capacity(place_ids.len());

		for place_id in place_ids {
			let place = self.fetch_place(place_id).await?;
			let location = self.create_location(place_request(place)).await.map_err(|err| match err {
				Error::OutOfRange { message } => Error::Provider {
					message: format!("Place {place_id} cannot be imported: {message}"),
				},
				other => other,
			})?;

			created.push(location);
		}

		tracing::info!(count = created.len(), "Imported places.");

		Ok(created)
	}

	async fn fetch_place(&self, place_id: &str) -> Result<Place> {
		self.places.fetch_place(&self.cfg.places, place_id).await.map_err(|err| {
			tracing::warn!(place_id, error = %err, "Place directory request failed.");

			Error::from(err)
		})
	}
}

fn place_request(place: Place) -> CreateLocationRequest {
	CreateLocationRequest {
		name: Some(place.name),
		address: place.address,
		description: place.description,
		tags: Some(place.tags),
		coordinates: Some([place.lng, place.lat]),
		image_url: None,
	}
}
