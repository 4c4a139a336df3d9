pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
	#[error("Coordinates must be a JSON array [lng, lat] within valid geographic bounds.")]
	InvalidCoordinates,
	#[error("{field} {message}")]
	OutOfRange { field: &'static str, message: String },
}
