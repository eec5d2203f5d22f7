pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Validation-class failures raised while turning request parameters into value objects.
///
/// Both kinds are detected against the already loaded dataset schema, before any backend call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
	/// A referenced field, question or metadata property does not exist on the dataset.
	#[error("{message}")]
	SchemaResolution { message: String },
	/// A filter, sort or status wire value is malformed.
	#[error("{message}")]
	FilterParse { message: String },
	/// A value does not fit the value space a schema element declares.
	#[error("{message}")]
	InvalidValue { message: String },
}
impl Error {
	pub(crate) fn schema(message: impl Into<String>) -> Self {
		Self::SchemaResolution { message: message.into() }
	}

	pub(crate) fn parse(message: impl Into<String>) -> Self {
		Self::FilterParse { message: message.into() }
	}

	pub(crate) fn invalid_value(message: impl Into<String>) -> Self {
		Self::InvalidValue { message: message.into() }
	}
}
