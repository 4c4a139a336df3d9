use std::sync::Arc;

use axum::{
	Router,
	body::{self, Body},
	http::{Request, StatusCode},
};
use serde_json::{Value, json};
use tower::util::ServiceExt;

use loci_api::{routes, state::AppState};
use loci_providers::places::Place;
use loci_service::{BoxFuture, LociService, PlaceProvider};
use loci_storage::memory::MemoryStore;

const TEST_CONFIG: &str = r#"
[service]
http_bind  = "127.0.0.1:0"
admin_bind = "127.0.0.1:0"
log_level  = "info"

[storage]
backend = "memory"

[places]
api_base   = "https://places.invalid"
timeout_ms = 1000

[security]
bind_localhost_only = true
"#;

struct FixedPlaces;
impl PlaceProvider for FixedPlaces {
	fn fetch_place<'a>(
		&'a self,
		_cfg: &'a loci_config::Places,
		place_id: &'a str,
	) -> BoxFuture<'a, loci_providers::Result<Place>> {
		Box::pin(async move {
			if place_id == "broken" {
				return Err(loci_providers::Error::InvalidResponse {
					message: "Place directory returned 500.".to_string(),
				});
			}

			Ok(Place {
				place_id: place_id.to_string(),
				name: "Estadio Santiago Bernabéu".to_string(),
				description: None,
				address: Some("Av. de Concha Espina, 1".to_string()),
				tags: vec!["Soccer Stadium".to_string()],
				lng: -3.688344,
				lat: 40.453053,
			})
		})
	}
}

async fn test_state() -> AppState {
	let config = loci_config::parse(TEST_CONFIG).expect("Failed to parse test config.");

	AppState::new(config).await.expect("Failed to initialize app state.")
}

async fn call(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
	let builder = Request::builder().method(method).uri(uri);
	let request = match body {
		Some(body) => builder
			.header("content-type", "application/json")
			.body(Body::from(body.to_string()))
			.expect("Failed to build request."),
		None => builder.body(Body::empty()).expect("Failed to build request."),
	};
	let response = app.clone().oneshot(request).await.expect("Failed to call router.");
	let status = response.status();
	let bytes = body::to_bytes(response.into_body(), usize::MAX)
		.await
		.expect("Failed to read response body.");

	if bytes.is_empty() {
		return (status, Value::Null);
	}

	(status, serde_json::from_slice(&bytes).expect("Failed to parse response."))
}

async fn create_location(app: &Router, name: &str) -> String {
	let (status, body) = call(
		app,
		"POST",
		"/api/locations",
		Some(json!({ "name": name, "coordinates": [-3.688333, 40.453056], "rating": 4.9 })),
	)
	.await;

	assert_eq!(status, StatusCode::CREATED);

	body["data"]["id"].as_str().expect("Missing location id.").to_string()
}

fn review_body(rating: f64) -> Value {
	json!({
		"author": "Ana",
		"rating": rating,
		"reviewText": "Great atmosphere.",
		"coordinates": [-3.7, 40.4]
	})
}

#[tokio::test]
async fn health_is_ok() {
	let app = routes::router(test_state().await);
	let (status, _) = call(&app, "GET", "/health", None).await;

	assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn location_crud_uses_envelope() {
	let app = routes::router(test_state().await);
	let id = create_location(&app, "Santiago Bernabeu").await;
	let (status, body) = call(&app, "GET", &format!("/api/locations/{id}"), None).await;

	assert_eq!(status, StatusCode::OK);
	assert_eq!(body["success"], true);
	assert_eq!(body["data"]["rating"], 0.0);
	assert_eq!(body["data"]["numReviews"], 0);
	assert_eq!(body["data"]["coordinates"], json!([-3.688333, 40.453056]));
	assert_eq!(body["data"]["imageId"], Value::Null);

	let (status, body) = call(
		&app,
		"PUT",
		&format!("/api/locations/{id}"),
		Some(json!({ "description": "Home of Real Madrid.", "tags": ["stadium", "football"] })),
	)
	.await;

	assert_eq!(status, StatusCode::OK);
	assert_eq!(body["data"]["description"], "Home of Real Madrid.");
	assert_eq!(body["data"]["tags"], json!(["stadium", "football"]));

	let (status, body) = call(&app, "DELETE", &format!("/api/locations/{id}"), None).await;

	assert_eq!(status, StatusCode::NO_CONTENT);
	assert_eq!(body, Value::Null);

	let (status, body) = call(&app, "GET", &format!("/api/locations/{id}"), None).await;

	assert_eq!(status, StatusCode::NOT_FOUND);
	assert_eq!(body["success"], false);
	assert_eq!(body["data"], Value::Null);
}

#[tokio::test]
async fn review_routes_maintain_rating() {
	let app = routes::router(test_state().await);
	let id = create_location(&app, "Santiago Bernabeu").await;
	let reviews_uri = format!("/api/locations/{id}/reviews");
	let (status, _) = call(&app, "POST", &reviews_uri, Some(review_body(5.0))).await;

	assert_eq!(status, StatusCode::CREATED);

	let (status, body) = call(&app, "POST", &reviews_uri, Some(review_body(4.5))).await;

	assert_eq!(status, StatusCode::CREATED);
	assert_eq!(body["data"]["rating"], 4.75);
	assert_eq!(body["data"]["numReviews"], 2);

	let (status, body) = call(&app, "GET", &format!("{reviews_uri}?sort=rating&order=asc"), None).await;

	assert_eq!(status, StatusCode::OK);
	assert_eq!(body["data"]["total"], 2);

	let lowest = body["data"]["results"][0]["id"].as_str().expect("Missing review id.").to_string();

	assert_eq!(body["data"]["results"][0]["reviewText"], "Great atmosphere.");

	let (status, body) = call(
		&app,
		"PUT",
		&format!("{reviews_uri}/{lowest}"),
		Some(json!({ "rating": 3.0 })),
	)
	.await;

	assert_eq!(status, StatusCode::OK);
	assert_eq!(body["data"]["rating"], 3.0);

	let (_, location) = call(&app, "GET", &format!("/api/locations/{id}"), None).await;

	assert_eq!(location["data"]["rating"], 4.0);

	let (status, _) = call(&app, "DELETE", &format!("{reviews_uri}/{lowest}"), None).await;

	assert_eq!(status, StatusCode::NO_CONTENT);

	let (_, location) = call(&app, "GET", &format!("/api/locations/{id}"), None).await;

	assert_eq!(location["data"]["rating"], 5.0);
	assert_eq!(location["data"]["numReviews"], 1);
}

#[tokio::test]
async fn invalid_input_maps_to_bad_request() {
	let app = routes::router(test_state().await);
	let id = create_location(&app, "Santiago Bernabeu").await;

	for uri in [
		"/api/locations?limit=-1",
		"/api/locations?limit=",
		"/api/locations?sort=",
		"/api/locations?limit=100000",
		"/api/locations?sort=distance",
		"/api/locations?order=sideways",
		"/api/locations?searchBy=coordinates&q=%5B999%2C999%5D",
		"/api/locations?searchBy=date&q=someday",
	] {
		let (status, body) = call(&app, "GET", uri, None).await;

		assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
		assert_eq!(body["success"], false);
	}

	let (status, _) =
		call(&app, "POST", &format!("/api/locations/{id}/reviews"), Some(review_body(7.0))).await;

	assert_eq!(status, StatusCode::BAD_REQUEST);

	let request = Request::builder()
		.method("POST")
		.uri("/api/locations")
		.header("content-type", "application/json")
		.body(Body::from("{not json"))
		.expect("Failed to build request.");
	let response = app.clone().oneshot(request).await.expect("Failed to call router.");

	assert_eq!(response.status(), StatusCode::BAD_REQUEST);

	let (status, _) =
		call(&app, "PUT", &format!("/api/locations/{id}/reviews/not-a-uuid"), Some(json!({}))).await;

	assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn search_returns_paginated_payload() {
	let app = routes::router(test_state().await);

	for name in ["Bernabeu", "Metropolitano", "Vallecas"] {
		create_location(&app, name).await;
	}

	let (status, body) =
		call(&app, "GET", "/api/locations?sort=name&order=asc&limit=2", None).await;

	assert_eq!(status, StatusCode::OK);
	assert_eq!(body["data"]["total"], 3);
	assert_eq!(body["data"]["limit"], 2);
	assert_eq!(body["data"]["offset"], 0);
	assert_eq!(body["data"]["results"][0]["name"], "Bernabeu");
	assert_eq!(body["data"]["results"].as_array().map(Vec::len), Some(2));

	let (_, body) = call(&app, "GET", "/api/locations?searchBy=name&q=vall", None).await;

	assert_eq!(body["data"]["total"], 1);
	assert_eq!(body["data"]["results"][0]["name"], "Vallecas");
}

#[tokio::test]
async fn image_metadata_is_served() {
	let app = routes::router(test_state().await);
	let (status, body) = call(
		&app,
		"POST",
		"/api/locations",
		Some(json!({
			"name": "Bernabeu",
			"coordinates": [-3.688333, 40.453056],
			"imageUrl": "https://cdn.example.com/bernabeu.jpg"
		})),
	)
	.await;

	assert_eq!(status, StatusCode::CREATED);

	let image_id = body["data"]["imageId"].as_str().expect("Missing image id.").to_string();
	let (status, body) = call(&app, "GET", &format!("/api/images/{image_id}"), None).await;

	assert_eq!(status, StatusCode::OK);
	assert_eq!(body["data"]["url"], "https://cdn.example.com/bernabeu.jpg");
	assert_eq!(body["data"]["hosted"], false);

	let (status, _) = call(&app, "GET", &format!("/api/images/{}", uuid::Uuid::new_v4()), None).await;

	assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn admin_router_imports_places_and_reports_stats() {
	let config = loci_config::parse(TEST_CONFIG).expect("Failed to parse test config.");
	let service =
		LociService::with_places(config, Arc::new(MemoryStore::new()), Arc::new(FixedPlaces));
	let state = AppState::from_service(service);
	let admin = routes::admin_router(state.clone());
	let app = routes::router(state);
	let (status, body) = call(
		&admin,
		"POST",
		"/api/places/import",
		Some(json!({ "placeIds": ["4adcda38f964a5205d3c21e3"] })),
	)
	.await;

	assert_eq!(status, StatusCode::CREATED);
	assert_eq!(body["data"][0]["name"], "Estadio Santiago Bernabéu");
	assert_eq!(body["data"][0]["tags"], json!(["Soccer Stadium"]));

	let (status, _) = call(&admin, "POST", "/api/places/import", Some(json!({ "placeIds": [] }))).await;

	assert_eq!(status, StatusCode::BAD_REQUEST);

	let (status, _) =
		call(&admin, "POST", "/api/places/import", Some(json!({ "placeIds": ["broken"] }))).await;

	assert_eq!(status, StatusCode::BAD_GATEWAY);

	let (status, body) = call(&admin, "GET", "/api/places/4adcda38f964a5205d3c21e3", None).await;

	assert_eq!(status, StatusCode::OK);
	assert_eq!(body["data"]["placeId"], "4adcda38f964a5205d3c21e3");
	assert_eq!(body["data"]["coordinates"], json!([-3.688344, 40.453053]));

	let (status, _) = call(&admin, "GET", "/api/places/broken", None).await;

	assert_eq!(status, StatusCode::BAD_GATEWAY);

	let (status, body) = call(&admin, "GET", "/v1/admin/stats", None).await;

	assert_eq!(status, StatusCode::OK);
	assert_eq!(body["data"]["locations"], 1);

	// Admin routes are not mounted on the public router.
	let (status, _) = call(&app, "GET", "/v1/admin/stats", None).await;

	assert_eq!(status, StatusCode::NOT_FOUND);
}
