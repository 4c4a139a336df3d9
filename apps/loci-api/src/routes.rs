use axum::{
	Json, Router,
	extract::{
		FromRequest, Path, Query, Request, State,
		rejection::{JsonRejection, QueryRejection},
	},
	http::StatusCode,
	response::{IntoResponse, Response},
	routing::{get, post},
};
use serde::{Serialize, de::DeserializeOwned};

use crate::state::AppState;
use loci_service::{
	CatalogStats, CreateLocationRequest, CreateReviewRequest, Error as ServiceError, ImageView,
	ImportPlacesRequest, LocationView, Page, PlaceView, ReviewListParams, ReviewView, SearchParams,
	UpdateLocationRequest, UpdateReviewRequest,
};

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(health))
		.route("/api/locations", get(search_locations).post(create_location))
		.route(
			"/api/locations/{location_id}",
			get(get_location).put(update_location).delete(delete_location),
		)
		.route("/api/locations/{location_id}/reviews", get(list_reviews).post(create_review))
		.route(
			"/api/locations/{location_id}/reviews/{review_id}",
			get(get_review).put(update_review).delete(delete_review),
		)
		.route("/api/images/{image_id}", get(get_image))
		.with_state(state)
}

pub fn admin_router(state: AppState) -> Router {
	Router::new()
		.route("/api/places/import", post(import_places))
		.route("/api/places/{place_id}", get(preview_place))
		.route("/v1/admin/stats", get(catalog_stats))
		.with_state(state)
}

async fn health() -> StatusCode {
	StatusCode::OK
}

async fn search_locations(
	State(state): State<AppState>,
	params: Result<Query<SearchParams>, QueryRejection>,
) -> Result<Envelope<Page<LocationView>>, ApiError> {
	let Query(params) = params.map_err(|err| ApiError::malformed(err.body_text()))?;
	let page = state.service.search_locations(&params).await?;

	Ok(Envelope::ok("Locations retrieved successfully.", page))
}

async fn create_location(
	State(state): State<AppState>,
	JsonBody(payload): JsonBody<CreateLocationRequest>,
) -> Result<Envelope<LocationView>, ApiError> {
	let location = state.service.create_location(payload).await?;

	Ok(Envelope::created("Location created successfully.", location))
}

async fn get_location(
	State(state): State<AppState>,
	Path(location_id): Path<String>,
) -> Result<Envelope<LocationView>, ApiError> {
	let location = state.service.get_location(&location_id).await?;

	Ok(Envelope::ok("Location found.", location))
}

async fn update_location(
	State(state): State<AppState>,
	Path(location_id): Path<String>,
	JsonBody(payload): JsonBody<UpdateLocationRequest>,
) -> Result<Envelope<LocationView>, ApiError> {
	let location = state.service.update_location(&location_id, payload).await?;

	Ok(Envelope::ok("Location updated successfully.", location))
}

async fn delete_location(
	State(state): State<AppState>,
	Path(location_id): Path<String>,
) -> Result<StatusCode, ApiError> {
	state.service.delete_location(&location_id).await?;

	Ok(StatusCode::NO_CONTENT)
}

async fn list_reviews(
	State(state): State<AppState>,
	Path(location_id): Path<String>,
	params: Result<Query<ReviewListParams>, QueryRejection>,
) -> Result<Envelope<Page<ReviewView>>, ApiError> {
	let Query(params) = params.map_err(|err| ApiError::malformed(err.body_text()))?;
	let page = state.service.list_reviews(&location_id, &params).await?;

	Ok(Envelope::ok("Reviews retrieved successfully.", page))
}

async fn create_review(
	State(state): State<AppState>,
	Path(location_id): Path<String>,
	JsonBody(payload): JsonBody<CreateReviewRequest>,
) -> Result<Envelope<LocationView>, ApiError> {
	let location = state.service.create_review(&location_id, payload).await?;

	Ok(Envelope::created("Review created successfully.", location))
}

async fn get_review(
	State(state): State<AppState>,
	Path((location_id, review_id)): Path<(String, String)>,
) -> Result<Envelope<ReviewView>, ApiError> {
	let review = state.service.get_review(&location_id, &review_id).await?;

	Ok(Envelope::ok("Review found.", review))
}

async fn update_review(
	State(state): State<AppState>,
	Path((location_id, review_id)): Path<(String, String)>,
	JsonBody(payload): JsonBody<UpdateReviewRequest>,
) -> Result<Envelope<ReviewView>, ApiError> {
	let review = state.service.update_review(&location_id, &review_id, payload).await?;

	Ok(Envelope::ok("Review updated successfully.", review))
}

async fn delete_review(
	State(state): State<AppState>,
	Path((location_id, review_id)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
	state.service.delete_review(&location_id, &review_id).await?;

	Ok(StatusCode::NO_CONTENT)
}

async fn get_image(
	State(state): State<AppState>,
	Path(image_id): Path<String>,
) -> Result<Envelope<ImageView>, ApiError> {
	let image = state.service.get_image(&image_id).await?;

	Ok(Envelope::ok("Image found.", image))
}

async fn import_places(
	State(state): State<AppState>,
	JsonBody(payload): JsonBody<ImportPlacesRequest>,
) -> Result<Envelope<Vec<LocationView>>, ApiError> {
	let imported = state.service.import_places(payload).await?;

	Ok(Envelope::created("Places imported successfully.", imported))
}

async fn preview_place(
	State(state): State<AppState>,
	Path(place_id): Path<String>,
) -> Result<Envelope<PlaceView>, ApiError> {
	let place = state.service.preview_place(&place_id).await?;

	Ok(Envelope::ok("Place found.", place))
}

async fn catalog_stats(
	State(state): State<AppState>,
) -> Result<Envelope<CatalogStats>, ApiError> {
	let stats = state.service.catalog_stats().await?;

	Ok(Envelope::ok("Catalog stats retrieved successfully.", stats))
}

/// `Json` with body rejections reported through the error envelope as malformed input.
pub struct JsonBody<T>(pub T);
impl<S, T> FromRequest<S> for JsonBody<T>
where
	S: Send + Sync,
	T: DeserializeOwned,
{
	type Rejection = ApiError;

	async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
		let Json(value) = Json::<T>::from_request(req, state)
			.await
			.map_err(|err: JsonRejection| ApiError::malformed(err.body_text()))?;

		Ok(Self(value))
	}
}

#[derive(Debug, Serialize)]
struct EnvelopeBody<T> {
	success: bool,
	message: String,
	data: Option<T>,
}

pub struct Envelope<T> {
	status: StatusCode,
	message: &'static str,
	data: T,
}
impl<T> Envelope<T> {
	fn ok(message: &'static str, data: T) -> Self {
		Self { status: StatusCode::OK, message, data }
	}

	fn created(message: &'static str, data: T) -> Self {
		Self { status: StatusCode::CREATED, message, data }
	}
}

impl<T> IntoResponse for Envelope<T>
where
	T: Serialize,
{
	fn into_response(self) -> Response {
		let body = EnvelopeBody {
			success: true,
			message: self.message.to_string(),
			data: Some(self.data),
		};

		(self.status, Json(body)).into_response()
	}
}

#[derive(Debug)]
pub struct ApiError {
	status: StatusCode,
	message: String,
}
impl ApiError {
	fn new(status: StatusCode, message: impl Into<String>) -> Self {
		Self { status, message: message.into() }
	}

	fn malformed(message: impl Into<String>) -> Self {
		Self::new(StatusCode::BAD_REQUEST, message)
	}
}

impl From<ServiceError> for ApiError {
	fn from(err: ServiceError) -> Self {
		match err {
			ServiceError::MalformedParameter { message } | ServiceError::OutOfRange { message } =>
				Self::new(StatusCode::BAD_REQUEST, message),
			ServiceError::NotFound { message } => Self::new(StatusCode::NOT_FOUND, message),
			ServiceError::Conflict { message } => Self::new(StatusCode::CONFLICT, message),
			ServiceError::Provider { message } => {
				tracing::error!(error = %message, "Place directory request failed.");

				Self::new(StatusCode::BAD_GATEWAY, "Place directory request failed.")
			},
			ServiceError::Storage { message } => {
				tracing::error!(error = %message, "Storage operation failed.");

				Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error.")
			},
		}
	}
}

impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let body = EnvelopeBody::<()> { success: false, message: self.message, data: None };

		(self.status, Json(body)).into_response()
	}
}
