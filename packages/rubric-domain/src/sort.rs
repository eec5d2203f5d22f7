use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{Dataset, Error, MetadataProperty, Result};

const METADATA_PREFIX: &str = "metadata.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordSortField {
	InsertedAt,
	UpdatedAt,
}
impl RecordSortField {
	pub fn as_str(&self) -> &'static str {
		match self {
			Self::InsertedAt => "inserted_at",
			Self::UpdatedAt => "updated_at",
		}
	}
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
	#[default]
	Asc,
	Desc,
}
impl SortOrder {
	pub fn as_str(&self) -> &'static str {
		match self {
			Self::Asc => "asc",
			Self::Desc => "desc",
		}
	}
}
impl FromStr for SortOrder {
	type Err = ();

	/// Case-sensitive.
	fn from_str(raw: &str) -> std::result::Result<Self, Self::Err> {
		match raw {
			"asc" => Ok(Self::Asc),
			"desc" => Ok(Self::Desc),
			_ => Err(()),
		}
	}
}

#[derive(Debug, Clone, PartialEq)]
pub enum SortField {
	Record(RecordSortField),
	Metadata(MetadataProperty),
}
impl Display for SortField {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::Record(field) => f.write_str(field.as_str()),
			Self::Metadata(property) => write!(f, "{METADATA_PREFIX}{}", property.name),
		}
	}
}

/// One sort directive. A list of them is applied key by key, earlier keys first.
#[derive(Debug, Clone, PartialEq)]
pub struct SortBy {
	pub field: SortField,
	pub order: SortOrder,
}
impl SortBy {
	pub fn new(field: SortField, order: SortOrder) -> Self {
		Self { field, order }
	}

	/// Resolves a `"<field>[:<order>]"` wire token against the dataset's schema.
	pub fn parse(dataset: &Dataset, raw: &str) -> Result<Self> {
		let (field, order) = match raw.split_once(':') {
			Some((field, order)) => (field, Some(order)),
			None => (raw, None),
		};
		let order = match order {
			None => SortOrder::default(),
			Some(order) => order.parse::<SortOrder>().map_err(|_| {
				Error::parse(format!(
					"Provided sort order in 'sort_by' query param '{order}' for field '{field}' is not valid."
				))
			})?,
		};
		let field = match field {
			"inserted_at" => SortField::Record(RecordSortField::InsertedAt),
			"updated_at" => SortField::Record(RecordSortField::UpdatedAt),
			_ => match field.strip_prefix(METADATA_PREFIX) {
				Some(name) => {
					let property = dataset.metadata_property_by_name(name).ok_or_else(|| {
						Error::schema(format!(
							"Provided metadata property in 'sort_by' query param '{name}' not found in dataset with '{}'.",
							dataset.id
						))
					})?;

					SortField::Metadata(property.clone())
				},
				None =>
					return Err(Error::parse(format!(
						"Provided sort field in 'sort_by' query param '{field}' is not valid. It must be either 'inserted_at', 'updated_at' or `metadata.metadata-property-name`"
					))),
			},
		};

		Ok(Self { field, order })
	}

	/// Resolves every token in order. Repeated keys are kept as given.
	pub fn parse_list<S>(dataset: &Dataset, raw: &[S]) -> Result<Vec<Self>>
	where
		S: AsRef<str>,
	{
		raw.iter().map(|token| Self::parse(dataset, token.as_ref())).collect()
	}
}
impl Display for SortBy {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}:{}", self.field, self.order.as_str())
	}
}
