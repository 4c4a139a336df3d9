pub mod admin;
pub mod images;
pub mod import;
pub mod locations;
pub mod query;
pub mod reviews;
pub mod search;
pub mod time_serde;
pub mod views;

mod error;

pub use admin::CatalogStats;
pub use error::{Error, Result};
pub use import::ImportPlacesRequest;
pub use locations::{CreateLocationRequest, UpdateLocationRequest};
pub use query::{ReviewListParams, SearchParams};
pub use reviews::{CreateReviewRequest, UpdateReviewRequest};
pub use search::Page;
pub use views::{ImageView, LocationView, PlaceView, ReviewView};

use std::{future::Future, pin::Pin, sync::Arc};

use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use loci_config::Config;
use loci_providers::places::{self, Place};
use loci_storage::LocationStore;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub trait PlaceProvider
where
	Self: Send + Sync,
{
	fn fetch_place<'a>(
		&'a self,
		cfg: &'a loci_config::Places,
		place_id: &'a str,
	) -> BoxFuture<'a, loci_providers::Result<Place>>;
}

pub struct LociService {
	pub cfg: Config,
	pub store: Arc<dyn LocationStore>,
	pub places: Arc<dyn PlaceProvider>,
}
impl LociService {
	pub fn new(cfg: Config, store: Arc<dyn LocationStore>) -> Self {
		Self { cfg, store, places: Arc::new(DirectoryPlaces) }
	}

	pub fn with_places(
		cfg: Config,
		store: Arc<dyn LocationStore>,
		places: Arc<dyn PlaceProvider>,
	) -> Self {
		Self { cfg, store, places }
	}
}

struct DirectoryPlaces;
impl PlaceProvider for DirectoryPlaces {
	fn fetch_place<'a>(
		&'a self,
		cfg: &'a loci_config::Places,
		place_id: &'a str,
	) -> BoxFuture<'a, loci_providers::Result<Place>> {
		Box::pin(places::fetch_place(cfg, place_id))
	}
}

/// Ids that are not UUIDs cannot name any record, so they resolve to not-found.
pub(crate) fn parse_id(raw: &str, kind: &str) -> Result<Uuid> {
	Uuid::parse_str(raw.trim()).map_err(|_| Error::not_found(format!("{kind} not found.")))
}

/// Current time truncated to the microsecond precision of a `timestamptz` column.
pub(crate) fn stored_now() -> OffsetDateTime {
	let now = OffsetDateTime::now_utc();

	now - Duration::nanoseconds(i64::from(now.nanosecond() % 1_000))
}
