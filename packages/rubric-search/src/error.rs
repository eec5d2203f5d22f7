use uuid::Uuid;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
	#[error("{message}")]
	SchemaResolution { message: String },
	#[error("{message}")]
	FilterParse { message: String },
	#[error("{message}")]
	InvalidValue { message: String },
	#[error("Search backend unavailable: {message}")]
	BackendUnavailable { message: String },
	#[error("Index state error: {message}")]
	IndexState { message: String },
	/// A bulk mutation was rejected as a whole; `failed` lists the offending record ids.
	#[error("Batch rejected: {message}")]
	PartialBatchFailure { message: String, failed: Vec<Uuid> },
	#[error("Search backend error: {message}")]
	Backend { message: String },
}
impl Error {
	/// Whether the error was raised while validating request input, before any backend call.
	pub fn is_validation(&self) -> bool {
		matches!(
			self,
			Self::SchemaResolution { .. } | Self::FilterParse { .. } | Self::InvalidValue { .. }
		)
	}
}
impl From<rubric_domain::Error> for Error {
	fn from(err: rubric_domain::Error) -> Self {
		match err {
			rubric_domain::Error::SchemaResolution { message } => Self::SchemaResolution { message },
			rubric_domain::Error::FilterParse { message } => Self::FilterParse { message },
			rubric_domain::Error::InvalidValue { message } => Self::InvalidValue { message },
		}
	}
}
