//! Query planning: raw list parameters in, an immutable query plan out.
//!
//! Planning never touches the store, so every malformed request is rejected before any read.

use serde::Deserialize;
use time::{
	Date, OffsetDateTime, PrimitiveDateTime, format_description::well_known::Rfc3339,
	macros::format_description,
};

use crate::{Error, Result};
use loci_domain::Coordinates;
use loci_storage::LocationFilter;

pub const DEFAULT_LIMIT: usize = 10;
pub const MAX_LIMIT: usize = 100;

/// Location search parameters exactly as they arrived on the query string.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchParams {
	pub q: Option<String>,
	pub search_by: Option<String>,
	pub sort: Option<String>,
	pub order: Option<String>,
	pub limit: Option<String>,
	pub offset: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct ReviewListParams {
	pub sort: Option<String>,
	pub order: Option<String>,
	pub limit: Option<String>,
	pub offset: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortField {
	Name,
	Rating,
	Date,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReviewSortField {
	Rating,
	Date,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortOrder {
	Asc,
	Desc,
}

#[derive(Clone, Debug, PartialEq)]
pub struct QueryPlan {
	pub filter: LocationFilter,
	pub sort_field: SortField,
	pub sort_order: SortOrder,
	pub limit: usize,
	pub offset: usize,
	/// When set, ordering is by distance and `sort_field`/`sort_order` are ignored.
	pub geo_target: Option<Coordinates>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ReviewQueryPlan {
	pub sort_field: ReviewSortField,
	pub sort_order: SortOrder,
	pub limit: usize,
	pub offset: usize,
}

pub fn plan_search(params: &SearchParams) -> Result<QueryPlan> {
	let sort_field = match supplied(&params.sort) {
		None => SortField::Rating,
		Some("name") => SortField::Name,
		Some("rating") => SortField::Rating,
		Some("date") => SortField::Date,
		Some(other) => {
			return Err(Error::malformed(format!(
				"Unsupported sort field '{other}'. Use one of name, rating, date."
			)));
		},
	};
	let sort_order = parse_order(&params.order)?;
	let (limit, offset) = parse_window(&params.limit, &params.offset)?;
	// searchBy is validated on its own so a typo is reported even without a query.
	let search_by = match present(&params.search_by) {
		None => None,
		Some(mode @ ("name" | "date" | "coordinates")) => Some(mode),
		Some(other) => {
			return Err(Error::malformed(format!(
				"Unsupported searchBy '{other}'. Use one of name, date, coordinates."
			)));
		},
	};
	let mut filter = LocationFilter::All;
	let mut geo_target = None;

	if let (Some(mode), Some(q)) = (search_by, present(&params.q)) {
		match mode {
			"name" => filter = LocationFilter::NameContains(q.to_string()),
			"date" => filter = LocationFilter::CreatedSince(parse_since(q)?),
			_ => {
				let target =
					Coordinates::parse_json(q).map_err(|err| Error::malformed(err.to_string()))?;

				geo_target = Some(target);
			},
		}
	}

	Ok(QueryPlan { filter, sort_field, sort_order, limit, offset, geo_target })
}

pub fn plan_review_list(params: &ReviewListParams) -> Result<ReviewQueryPlan> {
	let sort_field = match supplied(&params.sort) {
		None | Some("date") => ReviewSortField::Date,
		Some("rating") => ReviewSortField::Rating,
		Some(other) => {
			return Err(Error::malformed(format!(
				"Unsupported sort field '{other}'. Use one of rating, date."
			)));
		},
	};
	let sort_order = parse_order(&params.order)?;
	let (limit, offset) = parse_window(&params.limit, &params.offset)?;

	Ok(ReviewQueryPlan { sort_field, sort_order, limit, offset })
}

/// Accepts RFC 3339, an offset-less date-time taken as UTC, or a bare `YYYY-MM-DD` at UTC midnight.
pub fn parse_since(raw: &str) -> Result<OffsetDateTime> {
	if let Ok(parsed) = OffsetDateTime::parse(raw, &Rfc3339) {
		return Ok(parsed);
	}

	let local_formats = [
		format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond]"),
		format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"),
		format_description!("[year]-[month]-[day]T[hour]:[minute]"),
	];

	for format in local_formats {
		if let Ok(parsed) = PrimitiveDateTime::parse(raw, format) {
			return Ok(parsed.assume_utc());
		}
	}

	if let Ok(date) = Date::parse(raw, format_description!("[year]-[month]-[day]")) {
		return Ok(date.midnight().assume_utc());
	}

	Err(Error::malformed(format!(
		"Invalid date '{raw}'. Expected an ISO-8601 date such as 2024-05-01 or 2024-05-01T10:00:00Z."
	)))
}

/// Search terms only: a blank `q` or `searchBy` counts as not given.
fn present(value: &Option<String>) -> Option<&str> {
	supplied(value).filter(|value| !value.is_empty())
}

/// Sort and window parameters: a blank value is still a value and fails validation.
fn supplied(value: &Option<String>) -> Option<&str> {
	value.as_deref().map(str::trim)
}

fn parse_order(raw: &Option<String>) -> Result<SortOrder> {
	match supplied(raw) {
		None | Some("desc") => Ok(SortOrder::Desc),
		Some("asc") => Ok(SortOrder::Asc),
		Some(other) => Err(Error::malformed(format!("Unsupported order '{other}'. Use asc or desc."))),
	}
}

fn parse_window(limit: &Option<String>, offset: &Option<String>) -> Result<(usize, usize)> {
	let limit = match supplied(limit) {
		None => DEFAULT_LIMIT,
		Some(raw) => match raw.parse::<usize>() {
			Ok(value) if (1..=MAX_LIMIT).contains(&value) => value,
			_ => {
				return Err(Error::malformed(format!(
					"limit must be an integer between 1 and {MAX_LIMIT}."
				)));
			},
		},
	};
	let offset = match supplied(offset) {
		None => 0,
		Some(raw) => raw
			.parse::<usize>()
			.map_err(|_| Error::malformed("offset must be a non-negative integer."))?,
	};

	Ok((limit, offset))
}
