use std::cmp::Ordering;

use serde::Serialize;

use crate::{
	LociService, Result,
	query::{self, QueryPlan, ReviewQueryPlan, ReviewSortField, SearchParams, SortField, SortOrder},
	views::LocationView,
};
use loci_domain::geo::GeoRanker;
use loci_storage::{
	LocationStore,
	models::{Location, Review},
};

/// One page of an ordered result set. `total` counts every match, not just this page.
#[derive(Clone, Debug, Serialize)]
pub struct Page<T> {
	pub total: u64,
	pub limit: usize,
	pub offset: usize,
	pub results: Vec<T>,
}
impl<T> Page<T> {
	pub fn map<U, F>(self, f: F) -> Page<U>
	where
		F: FnMut(T) -> U,
	{
		Page {
			total: self.total,
			limit: self.limit,
			offset: self.offset,
			results: self.results.into_iter().map(f).collect(),
		}
	}
}

pub async fn execute(store: &dyn LocationStore, plan: &QueryPlan) -> Result<Page<Location>> {
	let candidates = store.find_matching(&plan.filter).await?;

	if let Some(target) = plan.geo_target {
		let ranked = GeoRanker::new(target).rank(candidates, |location| location.position);
		let total = ranked.len() as u64;
		let results = paginate(ranked, plan.limit, plan.offset)
			.into_iter()
			.map(|ranked| ranked.item)
			.collect();

		return Ok(Page { total, limit: plan.limit, offset: plan.offset, results });
	}

	let total = candidates.len() as u64;
	let mut ordered = candidates;

	sort_locations(&mut ordered, plan.sort_field, plan.sort_order);

	Ok(Page {
		total,
		limit: plan.limit,
		offset: plan.offset,
		results: paginate(ordered, plan.limit, plan.offset),
	})
}

pub fn page_reviews(mut reviews: Vec<Review>, plan: &ReviewQueryPlan) -> Page<Review> {
	let total = reviews.len() as u64;

	reviews.sort_by(|a, b| {
		let ordering = match plan.sort_field {
			ReviewSortField::Rating => compare_f64(a.rating, b.rating),
			ReviewSortField::Date => a.created_at.cmp(&b.created_at),
		};

		directed(ordering, plan.sort_order)
	});

	Page {
		total,
		limit: plan.limit,
		offset: plan.offset,
		results: paginate(reviews, plan.limit, plan.offset),
	}
}

/// Stable, so equal keys keep store order in both directions.
pub fn sort_locations(locations: &mut [Location], field: SortField, order: SortOrder) {
	locations.sort_by(|a, b| {
		let ordering = match field {
			SortField::Name => compare_names(&a.name, &b.name),
			SortField::Rating => compare_f64(a.rating, b.rating),
			SortField::Date => a.created_at.cmp(&b.created_at),
		};

		directed(ordering, order)
	});
}

fn compare_names(a: &str, b: &str) -> Ordering {
	a.to_lowercase().cmp(&b.to_lowercase()).then_with(|| a.cmp(b))
}

fn compare_f64(a: f64, b: f64) -> Ordering {
	a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}

fn directed(ordering: Ordering, order: SortOrder) -> Ordering {
	match order {
		SortOrder::Asc => ordering,
		SortOrder::Desc => ordering.reverse(),
	}
}

fn paginate<T>(items: Vec<T>, limit: usize, offset: usize) -> Vec<T> {
	items.into_iter().skip(offset).take(limit).collect()
}

impl LociService {
	pub async fn search_locations(&self, params: &SearchParams) -> Result<Page<LocationView>> {
		let plan = query::plan_search(params)?;
		let page = execute(self.store.as_ref(), &plan).await?;

		tracing::debug!(
			total = page.total,
			returned = page.results.len(),
			geo = plan.geo_target.is_some(),
			"Location search executed."
		);

		Ok(page.map(LocationView::from))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	use time::{Duration, macros::datetime};
	use uuid::Uuid;

	use loci_domain::Coordinates;

	fn location(name: &str, rating: f64, minutes: i64) -> Location {
		Location {
			location_id: Uuid::new_v4(),
			name: name.to_string(),
			address: None,
			description: None,
			tags: Vec::new(),
			position: Coordinates::new(0.0, 0.0).expect("valid coordinates"),
			rating,
			created_at: datetime!(2024-01-01 00:00 UTC) + Duration::minutes(minutes),
			image_id: None,
			version: 0,
			review_count: 0,
		}
	}

	fn names(locations: &[Location]) -> Vec<&str> {
		locations.iter().map(|location| location.name.as_str()).collect()
	}

	#[test]
	fn name_sort_ignores_case_then_breaks_ties_bytewise() {
		let mut locations =
			vec![location("beta", 0.0, 0), location("Alpha", 0.0, 1), location("alpha", 0.0, 2)];

		sort_locations(&mut locations, SortField::Name, SortOrder::Asc);

		assert_eq!(names(&locations), vec!["Alpha", "alpha", "beta"]);

		sort_locations(&mut locations, SortField::Name, SortOrder::Desc);

		assert_eq!(names(&locations), vec!["beta", "alpha", "Alpha"]);
	}

	#[test]
	fn equal_ratings_keep_store_order() {
		let mut locations =
			vec![location("a", 4.0, 0), location("b", 5.0, 1), location("c", 4.0, 2)];

		sort_locations(&mut locations, SortField::Rating, SortOrder::Desc);

		assert_eq!(names(&locations), vec!["b", "a", "c"]);
	}

	#[test]
	fn pagination_past_the_end_is_empty() {
		assert_eq!(paginate(vec![1, 2, 3], 10, 3), Vec::<i32>::new());
		assert_eq!(paginate(vec![1, 2, 3], 2, 1), vec![2, 3]);
	}
}
