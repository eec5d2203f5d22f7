use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{Dataset, Error, Result, ResponseStatus, User};

/// Free-text query, optionally scoped to one dataset field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StringQuery {
	pub q: String,
	#[serde(default)]
	pub field: Option<String>,
}
impl StringQuery {
	pub fn new(q: impl Into<String>, field: Option<String>) -> Result<Self> {
		let q = q.into();

		if q.is_empty() {
			return Err(Error::parse("Provided query text must be non-empty.".to_string()));
		}

		Ok(Self { q, field })
	}

	/// Checks that a scoped field exists on the dataset.
	pub fn validate(&self, dataset: &Dataset) -> Result<()> {
		match self.field.as_deref() {
			Some(field) if dataset.field_by_name(field).is_none() => Err(Error::schema(format!(
				"Field `{field}` not found in dataset `{}`.",
				dataset.id
			))),
			_ => Ok(()),
		}
	}
}
impl TryFrom<&str> for StringQuery {
	type Error = Error;

	fn try_from(q: &str) -> Result<Self> {
		Self::new(q, None)
	}
}
impl TryFrom<String> for StringQuery {
	type Error = Error;

	fn try_from(q: String) -> Result<Self> {
		Self::new(q, None)
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStatusFilter {
	Missing,
	Discarded,
	Submitted,
	Draft,
}
impl ResponseStatusFilter {
	pub fn as_str(&self) -> &'static str {
		match self {
			Self::Missing => "missing",
			Self::Discarded => "discarded",
			Self::Submitted => "submitted",
			Self::Draft => "draft",
		}
	}

	/// The response status this filter selects, or `None` for `missing`.
	pub fn response_status(&self) -> Option<ResponseStatus> {
		match self {
			Self::Missing => None,
			Self::Discarded => Some(ResponseStatus::Discarded),
			Self::Submitted => Some(ResponseStatus::Submitted),
			Self::Draft => Some(ResponseStatus::Draft),
		}
	}
}
impl FromStr for ResponseStatusFilter {
	type Err = Error;

	fn from_str(raw: &str) -> Result<Self> {
		match raw {
			"missing" => Ok(Self::Missing),
			"discarded" => Ok(Self::Discarded),
			"submitted" => Ok(Self::Submitted),
			"draft" => Ok(Self::Draft),
			_ => Err(Error::parse(format!(
				"Provided response status '{raw}' is not valid. It must be one of 'missing', 'discarded', 'submitted' or 'draft'."
			))),
		}
	}
}

/// Response-status constraint scoped to one user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserResponseStatusFilter {
	statuses: Vec<ResponseStatusFilter>,
	pub user: Option<User>,
}
impl UserResponseStatusFilter {
	/// Repeated statuses collapse to their first occurrence.
	pub fn new(statuses: Vec<ResponseStatusFilter>, user: Option<User>) -> Result<Self> {
		let mut unique = Vec::with_capacity(statuses.len());

		for status in statuses {
			if !unique.contains(&status) {
				unique.push(status);
			}
		}

		if unique.is_empty() {
			return Err(Error::parse("At least one response status must be provided.".to_string()));
		}

		Ok(Self { statuses: unique, user })
	}

	/// Parses repeated `response_status` wire values; no values means no status constraint.
	pub fn parse<S>(raw: &[S], user: Option<User>) -> Result<Option<Self>>
	where
		S: AsRef<str>,
	{
		if raw.is_empty() {
			return Ok(None);
		}

		let statuses = raw
			.iter()
			.map(|status| status.as_ref().parse::<ResponseStatusFilter>())
			.collect::<Result<Vec<_>>>()?;

		Self::new(statuses, user).map(Some)
	}

	pub fn statuses(&self) -> &[ResponseStatusFilter] {
		&self.statuses
	}

	pub fn has_missing_status(&self) -> bool {
		self.statuses.contains(&ResponseStatusFilter::Missing)
	}

	/// Whether a record whose responses from the scoped user carry `statuses` is selected.
	///
	/// When no user is bound, `statuses` holds the statuses of every response on the record.
	pub fn matches<I>(&self, statuses: I) -> bool
	where
		I: IntoIterator<Item = ResponseStatus>,
	{
		let mut any = false;

		for status in statuses {
			any = true;

			if self.statuses.iter().any(|filter| filter.response_status() == Some(status)) {
				return true;
			}
		}

		!any && self.has_missing_status()
	}
}
