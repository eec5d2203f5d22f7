use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{Error, MetadataProperty, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatasetStatus {
	Draft,
	Ready,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Field {
	pub id: Uuid,
	pub name: String,
	pub title: String,
	#[serde(default)]
	pub required: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
	pub id: Uuid,
	pub name: String,
	pub title: String,
	#[serde(default)]
	pub required: bool,
}

/// A named collection of records sharing one schema.
///
/// Owned by the persistence layer; search code only reads it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dataset {
	pub id: Uuid,
	pub name: String,
	pub status: DatasetStatus,
	#[serde(default)]
	pub allow_extra_metadata: bool,
	#[serde(default)]
	pub fields: Vec<Field>,
	#[serde(default)]
	pub questions: Vec<Question>,
	#[serde(default)]
	pub metadata_properties: Vec<MetadataProperty>,
}
impl Dataset {
	pub fn field_by_name(&self, name: &str) -> Option<&Field> {
		self.fields.iter().find(|field| field.name == name)
	}

	pub fn metadata_property_by_name(&self, name: &str) -> Option<&MetadataProperty> {
		self.metadata_properties.iter().find(|property| property.name == name)
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
	pub id: Uuid,
	pub username: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStatus {
	Draft,
	Submitted,
	Discarded,
}
impl ResponseStatus {
	pub fn as_str(&self) -> &'static str {
		match self {
			Self::Draft => "draft",
			Self::Submitted => "submitted",
			Self::Discarded => "discarded",
		}
	}
}

/// One user's answer set for a record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
	pub id: Uuid,
	pub record_id: Uuid,
	pub user_id: Uuid,
	pub status: ResponseStatus,
	#[serde(default)]
	pub values: Option<Map<String, Value>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Record {
	pub id: Uuid,
	pub dataset_id: Uuid,
	#[serde(default)]
	pub external_id: Option<String>,
	pub fields: BTreeMap<String, String>,
	#[serde(default)]
	pub metadata: Option<Map<String, Value>>,
	#[serde(default)]
	pub responses: Vec<Response>,
	#[serde(with = "time::serde::rfc3339")]
	pub inserted_at: OffsetDateTime,
	#[serde(with = "time::serde::rfc3339")]
	pub updated_at: OffsetDateTime,
}
impl Record {
	pub fn metadata_value(&self, name: &str) -> Option<&Value> {
		self.metadata.as_ref().and_then(|metadata| metadata.get(name)).filter(|v| !v.is_null())
	}

	/// Checks every metadata entry against the dataset's configured properties.
	///
	/// Keys without a configured property are accepted only when the dataset allows extra
	/// metadata.
	pub fn validate_metadata(&self, dataset: &Dataset) -> Result<()> {
		let Some(metadata) = self.metadata.as_ref() else {
			return Ok(());
		};

		for (name, value) in metadata {
			match dataset.metadata_property_by_name(name) {
				Some(property) => property.validate_value(value)?,
				None if dataset.allow_extra_metadata => {},
				None => {
					return Err(Error::schema(format!(
						"'{name}' metadata property does not exists for dataset '{}' and extra metadata is not allowed for this dataset",
						dataset.id
					)));
				},
			}
		}

		Ok(())
	}
}
