use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error(transparent)]
	Sqlx(#[from] sqlx::Error),
	#[error("Invalid argument: {0}")]
	InvalidArgument(String),
	#[error("Not found: {0}")]
	NotFound(String),
	#[error("Conflict: {0}")]
	Conflict(String),
	#[error("Location {location_id} was modified concurrently.")]
	VersionMismatch { location_id: Uuid },
	#[error("Invalid stored data: {0}")]
	InvalidData(String),
}
