use std::collections::HashMap;

use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
	BoxFuture, Error, LocationFilter, LocationStore, Result, ReviewWrite,
	models::{Image, Location, Review},
};

#[derive(Default)]
struct Tables {
	locations: HashMap<Uuid, Location>,
	reviews: HashMap<Uuid, Vec<Review>>,
	images: HashMap<Uuid, Image>,
}
impl Tables {
	fn with_review_count(&self, location: &Location) -> Location {
		let mut location = location.clone();

		location.review_count =
			self.reviews.get(&location.location_id).map_or(0, |reviews| reviews.len() as i64);

		location
	}
}

/// Process-local store with the same ordering and version semantics as the Postgres backend.
#[derive(Default)]
pub struct MemoryStore {
	tables: RwLock<Tables>,
}
impl MemoryStore {
	pub fn new() -> Self {
		Self::default()
	}
}
impl LocationStore for MemoryStore {
	fn find_matching<'a>(
		&'a self,
		filter: &'a LocationFilter,
	) -> BoxFuture<'a, Result<Vec<Location>>> {
		Box::pin(async move {
			let tables = self.tables.read().await;
			let mut matched = tables
				.locations
				.values()
				.filter(|location| filter.matches(location))
				.map(|location| tables.with_review_count(location))
				.collect::<Vec<_>>();

			matched.sort_by(|a, b| {
				a.created_at.cmp(&b.created_at).then_with(|| a.location_id.cmp(&b.location_id))
			});

			Ok(matched)
		})
	}

	fn count<'a>(&'a self, filter: &'a LocationFilter) -> BoxFuture<'a, Result<u64>> {
		Box::pin(async move {
			let tables = self.tables.read().await;

			Ok(tables.locations.values().filter(|location| filter.matches(location)).count() as u64)
		})
	}

	fn get_location(&self, location_id: Uuid) -> BoxFuture<'_, Result<Option<Location>>> {
		Box::pin(async move {
			let tables = self.tables.read().await;

			Ok(tables.locations.get(&location_id).map(|location| tables.with_review_count(location)))
		})
	}

	fn insert_location<'a>(&'a self, location: &'a Location) -> BoxFuture<'a, Result<()>> {
		Box::pin(async move {
			let mut tables = self.tables.write().await;

			if tables.locations.contains_key(&location.location_id) {
				return Err(Error::Conflict("Location already exists.".to_string()));
			}

			let mut stored = location.clone();

			stored.review_count = 0;

			tables.locations.insert(stored.location_id, stored);

			Ok(())
		})
	}

	fn update_location<'a>(&'a self, location: &'a Location) -> BoxFuture<'a, Result<()>> {
		Box::pin(async move {
			let mut tables = self.tables.write().await;
			let Some(stored) = tables.locations.get_mut(&location.location_id) else {
				return Err(Error::NotFound("Location not found.".to_string()));
			};

			if stored.version != location.version {
				return Err(Error::VersionMismatch { location_id: location.location_id });
			}

			stored.name = location.name.clone();
			stored.address = location.address.clone();
			stored.description = location.description.clone();
			stored.tags = location.tags.clone();
			stored.position = location.position;
			stored.image_id = location.image_id;
			stored.version += 1;

			Ok(())
		})
	}

	fn delete_location(&self, location_id: Uuid) -> BoxFuture<'_, Result<bool>> {
		Box::pin(async move {
			let mut tables = self.tables.write().await;
			let Some(location) = tables.locations.remove(&location_id) else {
				return Ok(false);
			};

			tables.reviews.remove(&location_id);

			if let Some(image_id) = location.image_id {
				tables.images.remove(&image_id);
			}

			Ok(true)
		})
	}

	fn list_reviews(&self, location_id: Uuid) -> BoxFuture<'_, Result<Vec<Review>>> {
		Box::pin(async move {
			let tables = self.tables.read().await;
			let mut reviews = tables.reviews.get(&location_id).cloned().unwrap_or_default();

			reviews.sort_by(|a, b| {
				a.created_at.cmp(&b.created_at).then_with(|| a.review_id.cmp(&b.review_id))
			});

			Ok(reviews)
		})
	}

	fn get_review(
		&self,
		location_id: Uuid,
		review_id: Uuid,
	) -> BoxFuture<'_, Result<Option<Review>>> {
		Box::pin(async move {
			let tables = self.tables.read().await;

			Ok(tables
				.reviews
				.get(&location_id)
				.and_then(|reviews| reviews.iter().find(|review| review.review_id == review_id))
				.cloned())
		})
	}

	fn commit_review_write<'a>(
		&'a self,
		location_id: Uuid,
		expected_version: i64,
		write: &'a ReviewWrite,
		rating: f64,
	) -> BoxFuture<'a, Result<()>> {
		Box::pin(async move {
			let mut tables = self.tables.write().await;
			let Some(location) = tables.locations.get(&location_id) else {
				return Err(Error::NotFound("Location not found.".to_string()));
			};

			if location.version != expected_version {
				return Err(Error::VersionMismatch { location_id });
			}

			let reviews = tables.reviews.entry(location_id).or_default();

			match write {
				ReviewWrite::Insert(review) => {
					if reviews.iter().any(|existing| existing.review_id == review.review_id) {
						return Err(Error::Conflict("Review already exists.".to_string()));
					}

					let mut review = review.clone();

					review.location_id = location_id;

					reviews.push(review);
				},
				ReviewWrite::Update(review) => {
					let Some(existing) =
						reviews.iter_mut().find(|existing| existing.review_id == review.review_id)
					else {
						return Err(Error::NotFound("Review not found.".to_string()));
					};

					existing.author = review.author.clone();
					existing.rating = review.rating;
					existing.review_text = review.review_text.clone();
					existing.position = review.position;
				},
				ReviewWrite::Delete { review_id } => {
					let before = reviews.len();

					reviews.retain(|existing| existing.review_id != *review_id);

					if reviews.len() == before {
						return Err(Error::NotFound("Review not found.".to_string()));
					}
				},
			}

			if let Some(location) = tables.locations.get_mut(&location_id) {
				location.rating = rating;
				location.version += 1;
			}

			Ok(())
		})
	}

	fn insert_image<'a>(&'a self, image: &'a Image) -> BoxFuture<'a, Result<()>> {
		Box::pin(async move {
			let mut tables = self.tables.write().await;

			if tables.images.contains_key(&image.image_id) {
				return Err(Error::Conflict("Image already exists.".to_string()));
			}

			tables.images.insert(image.image_id, image.clone());

			Ok(())
		})
	}

	fn get_image(&self, image_id: Uuid) -> BoxFuture<'_, Result<Option<Image>>> {
		Box::pin(async move { Ok(self.tables.read().await.images.get(&image_id).cloned()) })
	}

	fn delete_image(&self, image_id: Uuid) -> BoxFuture<'_, Result<bool>> {
		Box::pin(async move {
			let mut tables = self.tables.write().await;
			let removed = tables.images.remove(&image_id).is_some();

			// Mirrors ON DELETE SET NULL on locations.image_id.
			if removed {
				for location in tables.locations.values_mut() {
					if location.image_id == Some(image_id) {
						location.image_id = None;
					}
				}
			}

			Ok(removed)
		})
	}
}
