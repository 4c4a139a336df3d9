//! Great-circle ranking for proximity search.

use std::cmp::Ordering;

use crate::Coordinates;

pub const EARTH_RADIUS_KM: f64 = 6_371.0;
pub const MAX_RADIUS_KM: f64 = 500.0;

/// Haversine distance in kilometres.
pub fn haversine_km(a: Coordinates, b: Coordinates) -> f64 {
	let lat_a = a.lat().to_radians();
	let lat_b = b.lat().to_radians();
	let d_lat = lat_b - lat_a;
	let d_lng = (b.lng() - a.lng()).to_radians();
	let h = (d_lat / 2.0).sin().powi(2) + lat_a.cos() * lat_b.cos() * (d_lng / 2.0).sin().powi(2);

	2.0 * EARTH_RADIUS_KM * h.sqrt().min(1.0).asin()
}

#[derive(Debug, Clone)]
pub struct Ranked<T> {
	pub item: T,
	pub distance_km: f64,
}

#[derive(Debug, Clone, Copy)]
pub struct GeoRanker {
	target: Coordinates,
	max_radius_km: f64,
}
impl GeoRanker {
	pub fn new(target: Coordinates) -> Self {
		Self { target, max_radius_km: MAX_RADIUS_KM }
	}

	pub fn target(&self) -> Coordinates {
		self.target
	}

	pub fn max_radius_km(&self) -> f64 {
		self.max_radius_km
	}

	/// Drops candidates outside the radius and orders the rest by ascending distance.
	///
	/// The sort is stable: equal distances keep the order in which candidates were supplied.
	/// The returned length is the within-radius total used for pagination.
	pub fn rank<T, I, F>(&self, candidates: I, position: F) -> Vec<Ranked<T>>
	where
		I: IntoIterator<Item = T>,
		F: Fn(&T) -> Coordinates,
	{
		let mut ranked: Vec<Ranked<T>> = candidates
			.into_iter()
			.filter_map(|item| {
				let distance_km = haversine_km(self.target, position(&item));

				(distance_km <= self.max_radius_km).then_some(Ranked { item, distance_km })
			})
			.collect();

		ranked.sort_by(|a, b| a.distance_km.partial_cmp(&b.distance_km).unwrap_or(Ordering::Equal));

		ranked
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn point(lng: f64, lat: f64) -> Coordinates {
		Coordinates::new(lng, lat).expect("valid coordinates")
	}

	#[test]
	fn zero_distance_to_self() {
		let madrid = point(-3.688333, 40.453056);

		assert!(haversine_km(madrid, madrid).abs() < 1e-9);
	}

	#[test]
	fn madrid_to_barcelona_is_about_505_km() {
		let madrid = point(-3.7038, 40.4168);
		let barcelona = point(2.1734, 41.3851);
		let distance = haversine_km(madrid, barcelona);

		assert!((distance - 505.0).abs() < 5.0, "distance was {distance}");
	}

	#[test]
	fn antipodal_points_do_not_overflow() {
		let distance = haversine_km(point(0.0, 0.0), point(180.0, 0.0));

		assert!((distance - std::f64::consts::PI * EARTH_RADIUS_KM).abs() < 1e-6);
	}

	#[test]
	fn rank_filters_by_radius_and_keeps_tie_order() {
		let ranker = GeoRanker::new(point(0.0, 0.0));
		let candidates = vec![
			("far", point(10.0, 0.0)),
			("east", point(1.0, 0.0)),
			("west", point(-1.0, 0.0)),
			("here", point(0.0, 0.0)),
		];
		let ranked = ranker.rank(candidates, |(_, at)| *at);
		let names: Vec<_> = ranked.iter().map(|entry| entry.item.0).collect();

		assert_eq!(names, vec!["here", "east", "west"]);
		assert!(ranked.iter().all(|entry| entry.distance_km <= MAX_RADIUS_KM));
	}
}
