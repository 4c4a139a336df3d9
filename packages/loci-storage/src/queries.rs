use sqlx::{Executor, Postgres, QueryBuilder, Transaction};
use uuid::Uuid;

use crate::{
	Error, LocationFilter, Result, ReviewWrite,
	models::{Image, ImageRow, Location, LocationRow, Review, ReviewRow},
};

const LOCATION_COLUMNS: &str = "\
SELECT
	l.location_id,
	l.name,
	l.address,
	l.description,
	l.tags,
	l.lng,
	l.lat,
	l.rating,
	l.created_at,
	l.image_id,
	l.version,
	(SELECT count(*) FROM location_reviews r WHERE r.location_id = l.location_id) AS review_count
FROM locations l";

pub async fn find_locations<'e, E>(executor: E, filter: &LocationFilter) -> Result<Vec<Location>>
where
	E: Executor<'e, Database = Postgres>,
{
	let mut builder = QueryBuilder::<Postgres>::new(LOCATION_COLUMNS);

	push_filter(&mut builder, filter);
	builder.push(" ORDER BY l.created_at, l.location_id");

	let rows: Vec<LocationRow> = builder.build_query_as().fetch_all(executor).await?;

	rows.into_iter().map(Location::try_from).collect()
}

pub async fn count_locations<'e, E>(executor: E, filter: &LocationFilter) -> Result<u64>
where
	E: Executor<'e, Database = Postgres>,
{
	let mut builder = QueryBuilder::<Postgres>::new("SELECT count(*) FROM locations l");

	push_filter(&mut builder, filter);

	let count: i64 = builder.build_query_scalar().fetch_one(executor).await?;

	Ok(count.max(0) as u64)
}

pub async fn get_location<'e, E>(executor: E, location_id: Uuid) -> Result<Option<Location>>
where
	E: Executor<'e, Database = Postgres>,
{
	let sql = format!("{LOCATION_COLUMNS} WHERE l.location_id = $1");
	let row: Option<LocationRow> =
		sqlx::query_as(&sql).bind(location_id).fetch_optional(executor).await?;

	row.map(Location::try_from).transpose()
}

pub async fn insert_location<'e, E>(executor: E, location: &Location) -> Result<()>
where
	E: Executor<'e, Database = Postgres>,
{
	sqlx::query(
		"\
INSERT INTO locations (
	location_id,
	name,
	address,
	description,
	tags,
	lng,
	lat,
	rating,
	created_at,
	image_id,
	version
)
VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)",
	)
	.bind(location.location_id)
	.bind(location.name.as_str())
	.bind(location.address.as_deref())
	.bind(location.description.as_deref())
	.bind(&location.tags)
	.bind(location.position.lng())
	.bind(location.position.lat())
	.bind(location.rating)
	.bind(location.created_at)
	.bind(location.image_id)
	.bind(location.version)
	.execute(executor)
	.await
	.map_err(|err| unique_violation_as_conflict(err, "Location already exists."))?;

	Ok(())
}

/// Writes the editable columns if the row is still at `location.version`, bumping the version.
pub async fn update_location(
	tx: &mut Transaction<'_, Postgres>,
	location: &Location,
) -> Result<()> {
	let result = sqlx::query(
		"\
UPDATE locations
SET
	name = $1,
	address = $2,
	description = $3,
	tags = $4,
	lng = $5,
	lat = $6,
	image_id = $7,
	version = version + 1
WHERE location_id = $8 AND version = $9",
	)
	.bind(location.name.as_str())
	.bind(location.address.as_deref())
	.bind(location.description.as_deref())
	.bind(&location.tags)
	.bind(location.position.lng())
	.bind(location.position.lat())
	.bind(location.image_id)
	.bind(location.location_id)
	.bind(location.version)
	.execute(&mut **tx)
	.await?;

	if result.rows_affected() == 0 {
		return Err(version_miss(tx, location.location_id).await?);
	}

	Ok(())
}

pub async fn delete_location(tx: &mut Transaction<'_, Postgres>, location_id: Uuid) -> Result<bool> {
	let deleted: Option<Option<Uuid>> =
		sqlx::query_scalar("DELETE FROM locations WHERE location_id = $1 RETURNING image_id")
			.bind(location_id)
			.fetch_optional(&mut **tx)
			.await?;
	let Some(image_id) = deleted else {
		return Ok(false);
	};

	if let Some(image_id) = image_id {
		delete_image(&mut **tx, image_id).await?;
	}

	Ok(true)
}

pub async fn list_reviews<'e, E>(executor: E, location_id: Uuid) -> Result<Vec<Review>>
where
	E: Executor<'e, Database = Postgres>,
{
	let rows: Vec<ReviewRow> = sqlx::query_as(
		"\
SELECT review_id, location_id, author, rating, review_text, lng, lat, created_at
FROM location_reviews
WHERE location_id = $1
ORDER BY created_at, review_id",
	)
	.bind(location_id)
	.fetch_all(executor)
	.await?;

	rows.into_iter().map(Review::try_from).collect()
}

pub async fn get_review<'e, E>(
	executor: E,
	location_id: Uuid,
	review_id: Uuid,
) -> Result<Option<Review>>
where
	E: Executor<'e, Database = Postgres>,
{
	let row: Option<ReviewRow> = sqlx::query_as(
		"\
SELECT review_id, location_id, author, rating, review_text, lng, lat, created_at
FROM location_reviews
WHERE location_id = $1 AND review_id = $2",
	)
	.bind(location_id)
	.bind(review_id)
	.fetch_optional(executor)
	.await?;

	row.map(Review::try_from).transpose()
}

/// Version compare-and-swap first: the row lock it takes serializes concurrent writers of the
/// same Location until the transaction ends.
pub async fn commit_review_write(
	tx: &mut Transaction<'_, Postgres>,
	location_id: Uuid,
	expected_version: i64,
	write: &ReviewWrite,
	rating: f64,
) -> Result<()> {
	let swapped = sqlx::query(
		"\
UPDATE locations
SET rating = $1, version = version + 1
WHERE location_id = $2 AND version = $3",
	)
	.bind(rating)
	.bind(location_id)
	.bind(expected_version)
	.execute(&mut **tx)
	.await?;

	if swapped.rows_affected() == 0 {
		return Err(version_miss(tx, location_id).await?);
	}

	let affected = match write {
		ReviewWrite::Insert(review) => sqlx::query(
			"\
INSERT INTO location_reviews (
	location_id,
	review_id,
	author,
	rating,
	review_text,
	lng,
	lat,
	created_at
)
VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
		)
		.bind(location_id)
		.bind(review.review_id)
		.bind(review.author.as_str())
		.bind(review.rating)
		.bind(review.review_text.as_str())
		.bind(review.position.lng())
		.bind(review.position.lat())
		.bind(review.created_at)
		.execute(&mut **tx)
		.await
		.map_err(|err| unique_violation_as_conflict(err, "Review already exists."))?,
		ReviewWrite::Update(review) => sqlx::query(
			"\
UPDATE location_reviews
SET
	author = $1,
	rating = $2,
	review_text = $3,
	lng = $4,
	lat = $5
WHERE location_id = $6 AND review_id = $7",
		)
		.bind(review.author.as_str())
		.bind(review.rating)
		.bind(review.review_text.as_str())
		.bind(review.position.lng())
		.bind(review.position.lat())
		.bind(location_id)
		.bind(review.review_id)
		.execute(&mut **tx)
		.await?,
		ReviewWrite::Delete { review_id } =>
			sqlx::query("DELETE FROM location_reviews WHERE location_id = $1 AND review_id = $2")
				.bind(location_id)
				.bind(review_id)
				.execute(&mut **tx)
				.await?,
	};

	if affected.rows_affected() == 0 {
		return Err(Error::NotFound("Review not found.".to_string()));
	}

	Ok(())
}

pub async fn insert_image<'e, E>(executor: E, image: &Image) -> Result<()>
where
	E: Executor<'e, Database = Postgres>,
{
	sqlx::query(
		"\
INSERT INTO images (image_id, hosted, path, url, uploaded_at)
VALUES ($1, $2, $3, $4, $5)",
	)
	.bind(image.image_id)
	.bind(image.hosted)
	.bind(image.path.as_deref())
	.bind(image.url.as_deref())
	.bind(image.uploaded_at)
	.execute(executor)
	.await
	.map_err(|err| unique_violation_as_conflict(err, "Image already exists."))?;

	Ok(())
}

pub async fn get_image<'e, E>(executor: E, image_id: Uuid) -> Result<Option<Image>>
where
	E: Executor<'e, Database = Postgres>,
{
	let row: Option<ImageRow> = sqlx::query_as(
		"SELECT image_id, hosted, path, url, uploaded_at FROM images WHERE image_id = $1",
	)
	.bind(image_id)
	.fetch_optional(executor)
	.await?;

	Ok(row.map(Image::from))
}

pub async fn delete_image<'e, E>(executor: E, image_id: Uuid) -> Result<bool>
where
	E: Executor<'e, Database = Postgres>,
{
	let result = sqlx::query("DELETE FROM images WHERE image_id = $1")
		.bind(image_id)
		.execute(executor)
		.await?;

	Ok(result.rows_affected() > 0)
}

fn push_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: &LocationFilter) {
	match filter {
		LocationFilter::All => {},
		LocationFilter::NameContains(needle) => {
			// strpos avoids LIKE wildcard escaping for user-supplied text.
			builder.push(" WHERE strpos(lower(l.name), lower(");
			builder.push_bind(needle.clone());
			builder.push(")) > 0");
		},
		LocationFilter::CreatedSince(since) => {
			builder.push(" WHERE l.created_at >= ");
			builder.push_bind(*since);
		},
	}
}

fn unique_violation_as_conflict(err: sqlx::Error, message: &str) -> Error {
	match &err {
		sqlx::Error::Database(db_err) if db_err.is_unique_violation() =>
			Error::Conflict(message.to_string()),
		_ => Error::Sqlx(err),
	}
}

/// Tells a lost version race apart from a Location that is gone.
async fn version_miss(tx: &mut Transaction<'_, Postgres>, location_id: Uuid) -> Result<Error> {
	let exists: Option<i64> =
		sqlx::query_scalar("SELECT version FROM locations WHERE location_id = $1")
			.bind(location_id)
			.fetch_optional(&mut **tx)
			.await?;

	Ok(match exists {
		Some(_) => Error::VersionMismatch { location_id },
		None => Error::NotFound("Location not found.".to_string()),
	})
}
