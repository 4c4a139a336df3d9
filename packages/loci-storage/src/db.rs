use sqlx::{PgPool, postgres::PgPoolOptions};
use uuid::Uuid;

use crate::{
	BoxFuture, LocationFilter, LocationStore, Result, ReviewWrite,
	models::{Image, Location, Review},
	queries, schema,
};

pub struct Db {
	pub pool: PgPool,
}
impl Db {
	pub async fn connect(cfg: &loci_config::Postgres) -> Result<Self> {
		let pool =
			PgPoolOptions::new().max_connections(cfg.pool_max_conns).connect(&cfg.dsn).await?;

		Ok(Self { pool })
	}

	pub async fn ensure_schema(&self) -> Result<()> {
		let sql = schema::render_schema();
		let lock_id: i64 = 5_626_413;
		// Advisory locks are held per connection. Use a single transaction so the lock is scoped to
		// one connection and automatically released when the transaction ends.
		let mut tx = self.pool.begin().await?;

		sqlx::query("SELECT pg_advisory_xact_lock($1)").bind(lock_id).execute(&mut *tx).await?;

		for statement in sql.split(';') {
			let trimmed = statement.trim();

			if trimmed.is_empty() {
				continue;
			}

			sqlx::query(trimmed).execute(&mut *tx).await?;
		}

		tx.commit().await?;

		tracing::debug!("Schema is up to date.");

		Ok(())
	}
}
impl LocationStore for Db {
	fn find_matching<'a>(
		&'a self,
		filter: &'a LocationFilter,
	) -> BoxFuture<'a, Result<Vec<Location>>> {
		Box::pin(queries::find_locations(&self.pool, filter))
	}

	fn count<'a>(&'a self, filter: &'a LocationFilter) -> BoxFuture<'a, Result<u64>> {
		Box::pin(queries::count_locations(&self.pool, filter))
	}

	fn get_location(&self, location_id: Uuid) -> BoxFuture<'_, Result<Option<Location>>> {
		Box::pin(queries::get_location(&self.pool, location_id))
	}

	fn insert_location<'a>(&'a self, location: &'a Location) -> BoxFuture<'a, Result<()>> {
		Box::pin(queries::insert_location(&self.pool, location))
	}

	fn update_location<'a>(&'a self, location: &'a Location) -> BoxFuture<'a, Result<()>> {
		Box::pin(async move {
			let mut tx = self.pool.begin().await?;

			queries::update_location(&mut tx, location).await?;
			tx.commit().await?;

			Ok(())
		})
	}

	fn delete_location(&self, location_id: Uuid) -> BoxFuture<'_, Result<bool>> {
		Box::pin(async move {
			let mut tx = self.pool.begin().await?;
			let deleted = queries::delete_location(&mut tx, location_id).await?;

			tx.commit().await?;

			Ok(deleted)
		})
	}

	fn list_reviews(&self, location_id: Uuid) -> BoxFuture<'_, Result<Vec<Review>>> {
		Box::pin(queries::list_reviews(&self.pool, location_id))
	}

	fn get_review(
		&self,
		location_id: Uuid,
		review_id: Uuid,
	) -> BoxFuture<'_, Result<Option<Review>>> {
		Box::pin(queries::get_review(&self.pool, location_id, review_id))
	}

	fn commit_review_write<'a>(
		&'a self,
		location_id: Uuid,
		expected_version: i64,
		write: &'a ReviewWrite,
		rating: f64,
	) -> BoxFuture<'a, Result<()>> {
		Box::pin(async move {
			let mut tx = self.pool.begin().await?;

			// Dropping `tx` on error rolls the aggregate update back with the review change.
			queries::commit_review_write(&mut tx, location_id, expected_version, write, rating)
				.await?;

			tx.commit().await?;

			Ok(())
		})
	}

	fn insert_image<'a>(&'a self, image: &'a Image) -> BoxFuture<'a, Result<()>> {
		Box::pin(queries::insert_image(&self.pool, image))
	}

	fn get_image(&self, image_id: Uuid) -> BoxFuture<'_, Result<Option<Image>>> {
		Box::pin(queries::get_image(&self.pool, image_id))
	}

	fn delete_image(&self, image_id: Uuid) -> BoxFuture<'_, Result<bool>> {
		Box::pin(queries::delete_image(&self.pool, image_id))
	}
}
