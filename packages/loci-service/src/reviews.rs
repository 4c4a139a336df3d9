//! Review mutations and the rating aggregate they maintain.
//!
//! Every mutation is an optimistic read-modify-write on the parent Location: read the Location
//! and its reviews, plan the change plus the recomputed rating, then commit both against the
//! `version` that was read. A lost race re-reads and re-plans.

use serde::Deserialize;
use uuid::Uuid;

use crate::{
	Error, LociService, Result,
	locations::required_coordinates,
	query::{self, ReviewListParams},
	search::{self, Page},
	views::{LocationView, ReviewView},
};
use loci_domain::{Coordinates, rating, review};
use loci_storage::{
	ReviewWrite,
	models::{Location, Review},
};

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReviewRequest {
	pub author: Option<String>,
	pub rating: Option<f64>,
	pub review_text: Option<String>,
	pub coordinates: Option<[f64; 2]>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateReviewRequest {
	pub author: Option<String>,
	pub rating: Option<f64>,
	pub review_text: Option<String>,
	pub coordinates: Option<[f64; 2]>,
}
impl UpdateReviewRequest {
	fn is_empty(&self) -> bool {
		self.author.is_none()
			&& self.rating.is_none()
			&& self.review_text.is_none()
			&& self.coordinates.is_none()
	}
}

struct ReviewChange<T> {
	write: ReviewWrite,
	rating: f64,
	output: T,
}

struct ReviewEdit {
	author: Option<String>,
	rating: Option<f64>,
	review_text: Option<String>,
	position: Option<Coordinates>,
}

impl LociService {
	/// Adds a review and returns the parent Location with its refreshed aggregate.
	pub async fn create_review(
		&self,
		location_id: &str,
		req: CreateReviewRequest,
	) -> Result<LocationView> {
		let location_id = crate::parse_id(location_id, "Location")?;
		let author = review::validate_author(req.author.as_deref().unwrap_or_default())?;
		let Some(score) = req.rating else {
			return Err(Error::out_of_range("rating is required."));
		};
		let score = rating::validate_rating(score)?;
		let review_text =
			review::validate_review_text(req.review_text.as_deref().unwrap_or_default())?;
		let position = required_coordinates(req.coordinates)?;
		let new_review = Review {
			review_id: Uuid::new_v4(),
			location_id,
			author,
			rating: score,
			review_text,
			position,
			created_at: crate::stored_now(),
		};

		self.commit_review_change(location_id, |_, reviews| {
			let rating =
				rating::recompute(reviews.iter().map(|review| review.rating).chain([score]));

			Ok(ReviewChange { write: ReviewWrite::Insert(new_review.clone()), rating, output: () })
		})
		.await?;

		Ok(LocationView::from(self.load_location(location_id).await?))
	}

	pub async fn get_review(&self, location_id: &str, review_id: &str) -> Result<ReviewView> {
		let location_id = crate::parse_id(location_id, "Location")?;
		let review_id = crate::parse_id(review_id, "Review")?;

		self.load_location(location_id).await?;

		let review = self
			.store
			.get_review(location_id, review_id)
			.await?
			.ok_or_else(|| Error::not_found("Review not found."))?;

		Ok(ReviewView::from(review))
	}

	pub async fn list_reviews(
		&self,
		location_id: &str,
		params: &ReviewListParams,
	) -> Result<Page<ReviewView>> {
		let plan = query::plan_review_list(params)?;
		let location_id = crate::parse_id(location_id, "Location")?;

		self.load_location(location_id).await?;

		let reviews = self.store.list_reviews(location_id).await?;

		Ok(search::page_reviews(reviews, &plan).map(ReviewView::from))
	}

	/// Applies the supplied fields; the aggregate is recomputed only when the score changed.
	pub async fn update_review(
		&self,
		location_id: &str,
		review_id: &str,
		req: UpdateReviewRequest,
	) -> Result<ReviewView> {
		let location_id = crate::parse_id(location_id, "Location")?;
		let review_id = crate::parse_id(review_id, "Review")?;

		if req.is_empty() {
			return Err(Error::out_of_range("No updates provided."));
		}

		let edit = ReviewEdit {
			author: req.author.as_deref().map(review::validate_author).transpose()?,
			rating: req.rating.map(rating::validate_rating).transpose()?,
			review_text: req.review_text.as_deref().map(review::validate_review_text).transpose()?,
			position: req.coordinates.map(Coordinates::try_from).transpose()?,
		};
		let updated = self
			.commit_review_change(location_id, |location, reviews| {
				let Some(current) = reviews.iter().find(|review| review.review_id == review_id)
				else {
					return Err(Error::not_found("Review not found."));
				};
				let updated = apply_edit(current, &edit);
				let rating = if updated.rating == current.rating {
					location.rating
				} else {
					rating::recompute(reviews.iter().map(|review| {
						if review.review_id == review_id { updated.rating } else { review.rating }
					}))
				};

				Ok(ReviewChange {
					write: ReviewWrite::Update(updated.clone()),
					rating,
					output: updated,
				})
			})
			.await?;

		Ok(ReviewView::from(updated))
	}

	pub async fn delete_review(&self, location_id: &str, review_id: &str) -> Result<()> {
		let location_id = crate::parse_id(location_id, "Location")?;
		let review_id = crate::parse_id(review_id, "Review")?;

		self.commit_review_change(location_id, |_, reviews| {
			if !reviews.iter().any(|review| review.review_id == review_id) {
				return Err(Error::not_found("Review not found."));
			}

			let rating = rating::recompute(
				reviews
					.iter()
					.filter(|review| review.review_id != review_id)
					.map(|review| review.rating),
			);

			Ok(ReviewChange { write: ReviewWrite::Delete { review_id }, rating, output: () })
		})
		.await
	}

	async fn commit_review_change<T, F>(&self, location_id: Uuid, mut plan: F) -> Result<T>
	where
		F: FnMut(&Location, &[Review]) -> Result<ReviewChange<T>>,
	{
		let max_attempts = self.cfg.storage.max_write_attempts.max(1);

		for attempt in 1..=max_attempts {
			let location = self.load_location(location_id).await?;
			let reviews = self.store.list_reviews(location_id).await?;
			let change = plan(&location, &reviews)?;

			match self
				.store
				.commit_review_write(location_id, location.version, &change.write, change.rating)
				.await
			{
				Ok(()) => {
					tracing::info!(
						%location_id,
						rating = change.rating,
						version = location.version + 1,
						"Review change committed."
					);

					return Ok(change.output);
				},
				Err(loci_storage::Error::VersionMismatch { .. }) => {
					tracing::warn!(
						%location_id,
						attempt,
						"Location changed during review write. Retrying."
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

fn apply_edit(current: &Review, edit: &ReviewEdit) -> Review {
	let mut updated = current.clone();

	if let Some(author) = &edit.author {
		updated.author = author.clone();
	}
	if let Some(rating) = edit.rating {
		updated.rating = rating;
	}
	if let Some(review_text) = &edit.review_text {
		updated.review_text = review_text.clone();
	}
	if let Some(position) = edit.position {
		updated.position = position;
	}

	updated
}
