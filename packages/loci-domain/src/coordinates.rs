use serde::{Deserialize, Serialize};

use crate::{Error, Result};

pub const LNG_RANGE: std::ops::RangeInclusive<f64> = -180.0..=180.0;
pub const LAT_RANGE: std::ops::RangeInclusive<f64> = -90.0..=90.0;

/// A WGS84 point. Serialized as `[lng, lat]`, the order used on the wire and in storage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "[f64; 2]", into = "[f64; 2]")]
pub struct Coordinates {
	lng: f64,
	lat: f64,
}
impl Coordinates {
	pub fn new(lng: f64, lat: f64) -> Result<Self> {
		if !lng.is_finite() || !lat.is_finite() {
			return Err(Error::InvalidCoordinates);
		}
		if !LNG_RANGE.contains(&lng) || !LAT_RANGE.contains(&lat) {
			return Err(Error::InvalidCoordinates);
		}

		Ok(Self { lng, lat })
	}

	/// Parses the `[lng, lat]` JSON literal accepted by search and creation requests.
	pub fn parse_json(raw: &str) -> Result<Self> {
		let pair: [f64; 2] =
			serde_json::from_str(raw.trim()).map_err(|_| Error::InvalidCoordinates)?;

		Self::try_from(pair)
	}

	pub fn lng(&self) -> f64 {
		self.lng
	}

	pub fn lat(&self) -> f64 {
		self.lat
	}
}
impl TryFrom<[f64; 2]> for Coordinates {
	type Error = Error;

	fn try_from([lng, lat]: [f64; 2]) -> Result<Self> {
		Self::new(lng, lat)
	}
}
impl From<Coordinates> for [f64; 2] {
	fn from(value: Coordinates) -> Self {
		[value.lng, value.lat]
	}
}
