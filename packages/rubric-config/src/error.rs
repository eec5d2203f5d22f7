use std::{io, path::PathBuf};

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Cannot read search config at {path:?}: {source}.")]
	Read { path: PathBuf, source: io::Error },
	#[error("Search config at {path:?} is not valid TOML: {source}")]
	Parse { path: PathBuf, source: toml::de::Error },
	/// A setting parsed but holds an unusable value; `key` is its dotted TOML path.
	#[error("Invalid `{key}`: {message}")]
	Invalid { key: &'static str, message: String },
}
impl Error {
	pub(crate) fn invalid(key: &'static str, message: &str) -> Self {
		Self::Invalid { key, message: message.to_string() }
	}
}
