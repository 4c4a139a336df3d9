pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("{message}")]
	MalformedParameter { message: String },
	#[error("{message}")]
	OutOfRange { message: String },
	#[error("{message}")]
	NotFound { message: String },
	#[error("{message}")]
	Conflict { message: String },
	#[error("Provider error: {message}")]
	Provider { message: String },
	#[error("Storage error: {message}")]
	Storage { message: String },
}
impl Error {
	pub(crate) fn malformed(message: impl Into<String>) -> Self {
		Self::MalformedParameter { message: message.into() }
	}

	pub(crate) fn out_of_range(message: impl Into<String>) -> Self {
		Self::OutOfRange { message: message.into() }
	}

	pub(crate) fn not_found(message: impl Into<String>) -> Self {
		Self::NotFound { message: message.into() }
	}
}

impl From<loci_storage::Error> for Error {
	fn from(err: loci_storage::Error) -> Self {
		match err {
			loci_storage::Error::Sqlx(inner) => Self::Storage { message: inner.to_string() },
			loci_storage::Error::InvalidArgument(message) => Self::MalformedParameter { message },
			loci_storage::Error::NotFound(message) => Self::NotFound { message },
			loci_storage::Error::Conflict(message) => Self::Conflict { message },
			err @ loci_storage::Error::VersionMismatch { .. } =>
				Self::Conflict { message: err.to_string() },
			loci_storage::Error::InvalidData(message) => Self::Storage { message },
		}
	}
}

impl From<loci_domain::Error> for Error {
	fn from(err: loci_domain::Error) -> Self {
		Self::OutOfRange { message: err.to_string() }
	}
}

impl From<loci_providers::Error> for Error {
	fn from(err: loci_providers::Error) -> Self {
		Self::Provider { message: err.to_string() }
	}
}
