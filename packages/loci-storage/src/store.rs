use std::{future::Future, pin::Pin};

use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
	Result,
	models::{Image, Location, Review},
};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Record selection pushed down to the store. Ordering and pagination stay with the caller.
#[derive(Debug, Clone, PartialEq)]
pub enum LocationFilter {
	All,
	/// Case-insensitive substring match on `name`.
	NameContains(String),
	/// `created_at >= since`.
	CreatedSince(OffsetDateTime),
}
impl LocationFilter {
	pub fn matches(&self, location: &Location) -> bool {
		match self {
			Self::All => true,
			Self::NameContains(needle) =>
				location.name.to_lowercase().contains(&needle.to_lowercase()),
			Self::CreatedSince(since) => location.created_at >= *since,
		}
	}
}

/// A single change to a Location's review set, committed together with the new aggregate.
#[derive(Debug, Clone, PartialEq)]
pub enum ReviewWrite {
	Insert(Review),
	Update(Review),
	Delete { review_id: Uuid },
}

pub trait LocationStore
where
	Self: Send + Sync,
{
	/// Locations matching `filter` in store order: `created_at`, then `location_id`.
	fn find_matching<'a>(&'a self, filter: &'a LocationFilter)
	-> BoxFuture<'a, Result<Vec<Location>>>;

	fn count<'a>(&'a self, filter: &'a LocationFilter) -> BoxFuture<'a, Result<u64>>;

	fn get_location(&self, location_id: Uuid) -> BoxFuture<'_, Result<Option<Location>>>;

	fn insert_location<'a>(&'a self, location: &'a Location) -> BoxFuture<'a, Result<()>>;

	/// Writes the client-editable columns only; `rating` and `version` are left untouched.
	/// Stores the editable fields if the Location is still at `location.version`.
	///
	/// Rating is never written here. Fails with `Error::VersionMismatch` on a lost race.
	fn update_location<'a>(&'a self, location: &'a Location) -> BoxFuture<'a, Result<()>>;

	/// Removes the Location, its reviews and its image record. Returns `false` when absent.
	fn delete_location(&self, location_id: Uuid) -> BoxFuture<'_, Result<bool>>;

	/// Reviews of a Location in store order: `created_at`, then `review_id`.
	fn list_reviews(&self, location_id: Uuid) -> BoxFuture<'_, Result<Vec<Review>>>;

	fn get_review(&self, location_id: Uuid, review_id: Uuid)
	-> BoxFuture<'_, Result<Option<Review>>>;

	/// Applies `write` and stores `rating` only if the Location is still at `expected_version`.
	///
	/// Fails with `Error::VersionMismatch` when another write won the race, and with
	/// `Error::NotFound` when the Location or the targeted review no longer exists.
	fn commit_review_write<'a>(
		&'a self,
		location_id: Uuid,
		expected_version: i64,
		write: &'a ReviewWrite,
		rating: f64,
	) -> BoxFuture<'a, Result<()>>;

	fn insert_image<'a>(&'a self, image: &'a Image) -> BoxFuture<'a, Result<()>>;

	fn get_image(&self, image_id: Uuid) -> BoxFuture<'_, Result<Option<Image>>>;

	fn delete_image(&self, image_id: Uuid) -> BoxFuture<'_, Result<bool>>;
}
