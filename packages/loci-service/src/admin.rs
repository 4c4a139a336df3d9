use serde::Serialize;

use crate::{LociService, Result};
use loci_storage::LocationFilter;

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogStats {
	pub locations: u64,
	pub reviews: u64,
	pub rated_locations: u64,
}

impl LociService {
	pub async fn catalog_stats(&self) -> Result<CatalogStats> {
		let locations = self.store.count(&LocationFilter::All).await?;
		let all = self.store.find_matching(&LocationFilter::All).await?;
		let reviews = all.iter().map(|location| location.review_count.max(0) as u64).sum();
		let rated_locations = all.iter().filter(|location| location.review_count > 0).count() as u64;

		Ok(CatalogStats { locations, reviews, rated_locations })
	}
}
