use loci_domain::{
	Coordinates, Error,
	geo::{self, GeoRanker},
	rating,
	review::{self, MAX_REVIEW_TEXT_CHARS},
};

#[test]
fn coordinates_round_trip_as_lng_lat_array() {
	let coords = Coordinates::new(40.453056, -3.688333).expect("valid coordinates");
	let json = serde_json::to_string(&coords).expect("serialize failed");

	assert_eq!(json, "[40.453056,-3.688333]");

	let back: Coordinates = serde_json::from_str(&json).expect("deserialize failed");

	assert_eq!(back, coords);
}

#[test]
fn coordinates_deserialization_enforces_bounds() {
	let err = serde_json::from_str::<Coordinates>("[999, 999]").expect_err("must reject");

	assert!(err.to_string().contains("valid geographic bounds"));
}

#[test]
fn aggregate_follows_review_lifecycle() {
	let mut ratings = vec![5.0, 4.5];

	assert_eq!(rating::recompute(ratings.iter().copied()), 4.75);

	ratings.retain(|value| *value != 4.5);

	assert_eq!(rating::recompute(ratings.iter().copied()), 5.0);

	ratings.clear();

	assert_eq!(rating::recompute(ratings.iter().copied()), 0.0);
}

#[test]
fn review_text_limits() {
	assert!(review::validate_review_text("Great views").is_ok());
	assert!(review::validate_review_text(&"x".repeat(MAX_REVIEW_TEXT_CHARS)).is_ok());
	assert_eq!(
		review::validate_review_text(&"x".repeat(MAX_REVIEW_TEXT_CHARS + 1)),
		Err(Error::OutOfRange {
			field: "reviewText",
			message: "must be at most 1000 characters.".to_string(),
		})
	);
	assert!(review::validate_review_text("   ").is_err());
}

#[test]
fn review_text_counts_characters_not_bytes() {
	let text = "é".repeat(MAX_REVIEW_TEXT_CHARS);

	assert!(text.len() > MAX_REVIEW_TEXT_CHARS);
	assert!(review::validate_review_text(&text).is_ok());
}

#[test]
fn author_and_name_are_trimmed() {
	assert_eq!(review::validate_author("  Olivia Knight ").as_deref(), Ok("Olivia Knight"));
	assert!(review::validate_author(" ").is_err());
	assert!(review::validate_location_name("").is_err());
}

#[test]
fn ranking_is_non_decreasing_within_radius() {
	let target = Coordinates::new(-3.688333, 40.453056).expect("valid coordinates");
	let ranker = GeoRanker::new(target);
	let candidates: Vec<Coordinates> = (0..40)
		.map(|step| {
			Coordinates::new(-3.688333 + f64::from(step) * 0.37, 40.453056 - f64::from(step) * 0.11)
				.expect("valid coordinates")
		})
		.rev()
		.collect();
	let ranked = ranker.rank(candidates.clone(), |at| *at);

	assert!(!ranked.is_empty());
	assert!(ranked.len() < candidates.len());
	assert!(ranked.windows(2).all(|pair| pair[0].distance_km <= pair[1].distance_km));
	assert!(ranked.iter().all(|entry| entry.distance_km <= geo::MAX_RADIUS_KM));

	for at in &candidates {
		let inside = geo::haversine_km(target, *at) <= geo::MAX_RADIUS_KM;

		assert_eq!(inside, ranked.iter().any(|entry| entry.item == *at));
	}
}
