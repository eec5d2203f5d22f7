use serde::{Deserialize, Serialize};

use crate::MetadataNumber;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermCount {
	pub term: String,
	pub count: u64,
}

/// Term distribution of a terms property.
///
/// `values` is ordered by descending count, ties by ascending term. `total` counts records
/// carrying a value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermsMetadataMetrics {
	pub total: u64,
	pub values: Vec<TermCount>,
}
impl TermsMetadataMetrics {
	/// Builds metrics from unordered counts, applying the canonical ordering.
	pub fn from_counts<I>(total: u64, counts: I) -> Self
	where
		I: IntoIterator<Item = (String, u64)>,
	{
		let mut values =
			counts.into_iter().map(|(term, count)| TermCount { term, count }).collect::<Vec<_>>();

		values.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.term.cmp(&b.term)));

		Self { total, values }
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericMetadataMetrics<N>
where
	N: MetadataNumber,
{
	pub min: Option<N>,
	pub max: Option<N>,
}
impl<N> NumericMetadataMetrics<N>
where
	N: MetadataNumber,
{
	/// Folds observed values into min/max; no values leaves both unset.
	pub fn from_values<I>(values: I) -> Self
	where
		I: IntoIterator<Item = N>,
	{
		let mut metrics = Self { min: None, max: None };

		for value in values {
			if metrics.min.is_none_or(|min| value < min) {
				metrics.min = Some(value);
			}
			if metrics.max.is_none_or(|max| value > max) {
				metrics.max = Some(value);
			}
		}

		metrics
	}
}
impl<N> Default for NumericMetadataMetrics<N>
where
	N: MetadataNumber,
{
	fn default() -> Self {
		Self { min: None, max: None }
	}
}

pub type IntegerMetadataMetrics = NumericMetadataMetrics<i64>;

pub type FloatMetadataMetrics = NumericMetadataMetrics<f64>;

/// Aggregation result whose variant matches the property's kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MetadataMetrics {
	Terms(TermsMetadataMetrics),
	Integer(IntegerMetadataMetrics),
	Float(FloatMetadataMetrics),
}
