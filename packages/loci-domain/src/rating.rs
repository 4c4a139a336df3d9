use std::ops::RangeInclusive;

use crate::{Error, Result};

pub const RATING_RANGE: RangeInclusive<f64> = 0.0..=5.0;

// Absorbs binary representation error so that e.g. a 4.745 mean rounds up, not down.
const ROUNDING_NUDGE: f64 = 1e-9;

/// Mean of `ratings` rounded half-up to two decimals, or `0.0` for an empty set.
pub fn recompute<I>(ratings: I) -> f64
where
	I: IntoIterator<Item = f64>,
{
	let (sum, count) = ratings.into_iter().fold((0.0, 0_usize), |(sum, count), rating| {
		(sum + rating, count + 1)
	});

	if count == 0 {
		return 0.0;
	}

	round_half_up_2(sum / count as f64)
}

pub fn round_half_up_2(value: f64) -> f64 {
	((value * 100.0) + ROUNDING_NUDGE).round() / 100.0
}

pub fn validate_rating(rating: f64) -> Result<f64> {
	if !rating.is_finite() || !RATING_RANGE.contains(&rating) {
		return Err(Error::OutOfRange {
			field: "rating",
			message: "must be a number between 0 and 5.".to_string(),
		});
	}

	Ok(rating)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn empty_set_is_zero() {
		assert_eq!(recompute(Vec::new()), 0.0);
	}

	#[test]
	fn mean_is_rounded_to_two_decimals() {
		assert_eq!(recompute([5.0, 4.5]), 4.75);
		assert_eq!(recompute([4.2, 3.0, 5.0]), 4.07);
		assert_eq!(recompute([1.0, 2.0, 2.0]), 1.67);
	}

	#[test]
	fn halves_round_up() {
		assert_eq!(recompute([4.74, 4.75]), 4.75);
		assert_eq!(recompute([0.0, 0.01]), 0.01);
		assert_eq!(round_half_up_2(2.675), 2.68);
	}

	#[test]
	fn rating_bounds_are_inclusive() {
		assert!(validate_rating(0.0).is_ok());
		assert!(validate_rating(5.0).is_ok());
		assert!(validate_rating(-0.01).is_err());
		assert!(validate_rating(5.01).is_err());
		assert!(validate_rating(f64::NAN).is_err());
	}
}
