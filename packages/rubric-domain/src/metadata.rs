use std::fmt::{Debug, Display};

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::{Error, Result};

const PROPERTY_NAME_PATTERN: &str = r"^[a-z0-9_-]+$";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetadataPropertyType {
	Terms,
	Integer,
	Float,
}
impl MetadataPropertyType {
	pub fn as_str(&self) -> &'static str {
		match self {
			Self::Terms => "terms",
			Self::Integer => "integer",
			Self::Float => "float",
		}
	}
}

/// Value space of a metadata property, tagged by its kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MetadataPropertySettings {
	Terms {
		#[serde(default)]
		values: Option<Vec<String>>,
	},
	Integer {
		#[serde(default)]
		min: Option<i64>,
		#[serde(default)]
		max: Option<i64>,
	},
	Float {
		#[serde(default)]
		min: Option<f64>,
		#[serde(default)]
		max: Option<f64>,
	},
}
impl MetadataPropertySettings {
	pub fn kind(&self) -> MetadataPropertyType {
		match self {
			Self::Terms { .. } => MetadataPropertyType::Terms,
			Self::Integer { .. } => MetadataPropertyType::Integer,
			Self::Float { .. } => MetadataPropertyType::Float,
		}
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataProperty {
	pub id: Uuid,
	pub dataset_id: Uuid,
	pub name: String,
	pub title: String,
	pub settings: MetadataPropertySettings,
}
impl MetadataProperty {
	pub fn new(
		dataset_id: Uuid,
		name: impl Into<String>,
		title: impl Into<String>,
		settings: MetadataPropertySettings,
	) -> Result<Self> {
		let name = name.into();

		if !is_valid_property_name(&name) {
			return Err(Error::invalid_value(format!(
				"metadata property name '{name}' must contain only lowercase letters, numbers, '_' or '-', with at least one letter or number"
			)));
		}

		match &settings {
			MetadataPropertySettings::Integer { min: Some(min), max: Some(max) } if min > max =>
				return Err(Error::invalid_value(format!(
					"'min' value {min} must be lower or equal than 'max' value {max}"
				))),
			MetadataPropertySettings::Float { min: Some(min), max: Some(max) } if min > max =>
				return Err(Error::invalid_value(format!(
					"'min' value {min} must be lower or equal than 'max' value {max}"
				))),
			_ => {},
		}

		Ok(Self { id: Uuid::new_v4(), dataset_id, name, title: title.into(), settings })
	}

	pub fn kind(&self) -> MetadataPropertyType {
		self.settings.kind()
	}

	/// Checks a single record metadata value against this property's value space.
	///
	/// `null` is always accepted and means "no value".
	pub fn validate_value(&self, value: &Value) -> Result<()> {
		if value.is_null() {
			return Ok(());
		}

		match &self.settings {
			MetadataPropertySettings::Terms { values } => {
				let terms = terms_of(value).ok_or_else(|| {
					self.value_error(format!("'{value}' is not a string or a list of strings"))
				})?;

				if let Some(allowed) = values {
					for term in terms {
						if !allowed.iter().any(|candidate| candidate == term) {
							return Err(self.value_error(format!("'{term}' is not an allowed term")));
						}
					}
				}

				Ok(())
			},
			MetadataPropertySettings::Integer { min, max } => {
				let number = i64::coerce(value)
					.ok_or_else(|| self.value_error(format!("'{value}' is not an integer")))?;

				self.check_range(number, *min, *max)
			},
			MetadataPropertySettings::Float { min, max } => {
				let number = f64::coerce(value)
					.ok_or_else(|| self.value_error(format!("'{value}' is not a float")))?;

				self.check_range(number, *min, *max)
			},
		}
	}

	fn check_range<N>(&self, value: N, min: Option<N>, max: Option<N>) -> Result<()>
	where
		N: MetadataNumber,
	{
		if let Some(min) = min
			&& value < min
		{
			return Err(self.value_error(format!("{value} is lower than {min}")));
		}
		if let Some(max) = max
			&& value > max
		{
			return Err(self.value_error(format!("{value} is greater than {max}")));
		}

		Ok(())
	}

	fn value_error(&self, reason: String) -> Error {
		Error::invalid_value(format!(
			"'{}' metadata property validation failed because {reason}.",
			self.name
		))
	}
}

/// Numeric kinds a metadata property can hold.
pub trait MetadataNumber
where
	Self: Copy + PartialOrd + Display + Debug + Serialize + Send + Sync + 'static,
{
	const KIND: MetadataPropertyType;

	/// Converts a JSON value into this kind, accepting numbers and numeric strings.
	fn coerce(raw: &Value) -> Option<Self>;
}

impl MetadataNumber for i64 {
	const KIND: MetadataPropertyType = MetadataPropertyType::Integer;

	fn coerce(raw: &Value) -> Option<Self> {
		match raw {
			Value::Number(number) => number.as_i64().or_else(|| {
				number
					.as_f64()
					.filter(|value| value.fract() == 0.0 && value.abs() < i64::MAX as f64)
					.map(|value| value as i64)
			}),
			Value::String(raw) => raw.trim().parse().ok(),
			_ => None,
		}
	}
}

impl MetadataNumber for f64 {
	const KIND: MetadataPropertyType = MetadataPropertyType::Float;

	fn coerce(raw: &Value) -> Option<Self> {
		let value = match raw {
			Value::Number(number) => number.as_f64(),
			Value::String(raw) => raw.trim().parse().ok(),
			_ => None,
		}?;

		value.is_finite().then_some(value)
	}
}

/// Terms carried by a record value: a single string or a list of strings.
pub fn terms_of(value: &Value) -> Option<Vec<&str>> {
	match value {
		Value::String(term) => Some(vec![term.as_str()]),
		Value::Array(items) => items.iter().map(Value::as_str).collect(),
		_ => None,
	}
}

fn is_valid_property_name(name: &str) -> bool {
	Regex::new(PROPERTY_NAME_PATTERN).map(|re| re.is_match(name)).unwrap_or(false)
		&& name.chars().any(|c| c.is_ascii_alphanumeric())
}
