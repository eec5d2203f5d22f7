use serde_json::{Map, Value};

use crate::{
	Dataset, Error, MetadataNumber, MetadataProperty, MetadataPropertyType, Result, metadata,
};

/// Constraint over one metadata property.
///
/// A list of filters is a conjunction; a record with no value for the property never matches.
#[derive(Debug, Clone, PartialEq)]
pub enum MetadataFilter {
	Terms(TermsMetadataFilter),
	Integer(IntegerMetadataFilter),
	Float(FloatMetadataFilter),
}
impl MetadataFilter {
	/// Parses a `"<name>:<value-expression>"` wire fragment against the dataset's schema.
	pub fn parse(dataset: &Dataset, raw: &str) -> Result<Self> {
		let Some((name, expression)) = raw.split_once(':') else {
			return Err(Error::parse(format!(
				"Provided metadata filter '{raw}' is not valid. It must follow the form 'metadata-property-name:value'."
			)));
		};
		let property = dataset.metadata_property_by_name(name).ok_or_else(|| {
			Error::schema(format!(
				"Provided metadata property in 'metadata' query param '{name}' not found in dataset with '{}'.",
				dataset.id
			))
		})?;

		if expression.is_empty() {
			return Err(Error::parse(format!(
				"Provided metadata filter for metadata property '{name}' has an empty value."
			)));
		}

		Self::from_string(property, expression)
	}

	/// Parses a value expression for an already resolved property, dispatching on its kind.
	pub fn from_string(metadata_property: &MetadataProperty, raw: &str) -> Result<Self> {
		match metadata_property.kind() {
			MetadataPropertyType::Terms =>
				Ok(Self::Terms(TermsMetadataFilter::from_string(metadata_property, raw))),
			MetadataPropertyType::Integer =>
				IntegerMetadataFilter::from_string(metadata_property, raw).map(Self::Integer),
			MetadataPropertyType::Float =>
				FloatMetadataFilter::from_string(metadata_property, raw).map(Self::Float),
		}
	}

	pub fn metadata_property(&self) -> &MetadataProperty {
		match self {
			Self::Terms(filter) => &filter.metadata_property,
			Self::Integer(filter) => &filter.metadata_property,
			Self::Float(filter) => &filter.metadata_property,
		}
	}

	pub fn matches(&self, value: Option<&Value>) -> bool {
		let Some(value) = value.filter(|value| !value.is_null()) else {
			return false;
		};

		match self {
			Self::Terms(filter) => filter.matches(value),
			Self::Integer(filter) => filter.matches(value),
			Self::Float(filter) => filter.matches(value),
		}
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct TermsMetadataFilter {
	pub metadata_property: MetadataProperty,
	pub values: Vec<String>,
}
impl TermsMetadataFilter {
	pub fn new(metadata_property: MetadataProperty, values: Vec<String>) -> Self {
		Self { metadata_property, values }
	}

	/// Splits on `,` without trimming. Empty segments are kept as empty-string terms.
	pub fn from_string(metadata_property: &MetadataProperty, raw: &str) -> Self {
		Self::new(metadata_property.clone(), raw.split(',').map(str::to_string).collect())
	}

	fn matches(&self, value: &Value) -> bool {
		metadata::terms_of(value)
			.map(|terms| terms.iter().any(|term| self.values.iter().any(|v| v == term)))
			.unwrap_or(false)
	}
}

/// Inclusive numeric range over an integer or float property.
///
/// At least one bound is set and `ge <= le` whenever both are; both hold from construction on.
#[derive(Debug, Clone, PartialEq)]
pub struct NumericMetadataFilter<N>
where
	N: MetadataNumber,
{
	pub metadata_property: MetadataProperty,
	ge: Option<N>,
	le: Option<N>,
}
impl<N> NumericMetadataFilter<N>
where
	N: MetadataNumber,
{
	pub fn new(metadata_property: MetadataProperty, ge: Option<N>, le: Option<N>) -> Result<Self> {
		match (ge, le) {
			(None, None) =>
				Err(Error::parse("One of 'ge' or 'le' values must be specified".to_string())),
			(Some(ge), Some(le)) if ge > le =>
				Err(Error::parse(format!("'ge' ({ge}) must be lower or equal than 'le' ({le})"))),
			_ => Ok(Self { metadata_property, ge, le }),
		}
	}

	/// Parses a JSON object with optional `ge`/`le` keys coerced to the property's kind.
	pub fn from_string(metadata_property: &MetadataProperty, raw: &str) -> Result<Self> {
		let invalid = |reason: String| {
			Error::parse(format!(
				"Provided metadata filter value '{raw}' for metadata property '{}' is not valid: {reason}.",
				metadata_property.name
			))
		};
		let parsed: Value =
			serde_json::from_str(raw).map_err(|err| invalid(format!("malformed JSON ({err})")))?;
		let Value::Object(object) = parsed else {
			return Err(invalid("expected a JSON object with 'ge' and/or 'le' keys".to_string()));
		};
		let ge = coerce_bound::<N>(&object, "ge").map_err(&invalid)?;
		let le = coerce_bound::<N>(&object, "le").map_err(&invalid)?;

		Self::new(metadata_property.clone(), ge, le).map_err(|err| invalid(err.to_string()))
	}

	pub fn ge(&self) -> Option<N> {
		self.ge
	}

	pub fn le(&self) -> Option<N> {
		self.le
	}

	fn matches(&self, value: &Value) -> bool {
		let Some(value) = N::coerce(value) else {
			return false;
		};

		self.ge.is_none_or(|ge| ge <= value) && self.le.is_none_or(|le| value <= le)
	}
}

pub type IntegerMetadataFilter = NumericMetadataFilter<i64>;

pub type FloatMetadataFilter = NumericMetadataFilter<f64>;

fn coerce_bound<N>(object: &Map<String, Value>, key: &str) -> std::result::Result<Option<N>, String>
where
	N: MetadataNumber,
{
	match object.get(key) {
		None | Some(Value::Null) => Ok(None),
		Some(raw) => N::coerce(raw)
			.map(Some)
			.ok_or_else(|| format!("'{key}' value {raw} is not a valid {}", N::KIND.as_str())),
	}
}
