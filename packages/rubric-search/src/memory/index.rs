use std::{
	cmp::Ordering,
	collections::{BTreeMap, HashMap},
};

use serde_json::{Map, Value};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{SearchParams, SearchResponseItem, SearchResponses, memory::text};
use rubric_domain::{
	FloatMetadataMetrics, IntegerMetadataMetrics, MetadataMetrics, MetadataNumber,
	MetadataProperty, MetadataPropertyType, Record, RecordSortField, Response, ResponseStatus,
	SortBy, SortField, SortOrder, TermsMetadataMetrics, metadata,
};

#[derive(Debug, Clone)]
struct ResponseEntry {
	user_id: Uuid,
	status: ResponseStatus,
}

#[derive(Debug, Clone)]
struct Document {
	id: Uuid,
	fields: BTreeMap<String, String>,
	metadata: Map<String, Value>,
	responses: HashMap<Uuid, ResponseEntry>,
	inserted_at: OffsetDateTime,
	updated_at: OffsetDateTime,
}
impl Document {
	fn statuses_for(&self, user_id: Option<Uuid>) -> Vec<ResponseStatus> {
		self.responses
			.values()
			.filter(|entry| user_id.is_none_or(|user_id| entry.user_id == user_id))
			.map(|entry| entry.status)
			.collect()
	}

	fn text_score(&self, tokens: &[String], field: Option<&str>) -> Option<u32> {
		match field {
			Some(field) => text::score(tokens, self.fields.get(field).map(String::as_str)),
			None => text::score(tokens, self.fields.values().map(String::as_str)),
		}
	}
}

struct Hit<'a> {
	document: &'a Document,
	score: Option<u32>,
}

/// Sort key extracted from one metadata value.
#[derive(Debug, Clone, PartialEq, PartialOrd)]
enum MetadataKey<'a> {
	Integer(i64),
	Float(f64),
	Term(&'a str),
}

/// Searchable state of one dataset.
#[derive(Debug, Clone)]
pub(crate) struct DatasetIndex {
	properties: BTreeMap<String, MetadataProperty>,
	documents: HashMap<Uuid, Document>,
}
impl DatasetIndex {
	pub(crate) fn new<'a, I>(properties: I) -> Self
	where
		I: IntoIterator<Item = &'a MetadataProperty>,
	{
		let mut index = Self { properties: BTreeMap::new(), documents: HashMap::new() };

		for property in properties {
			index.configure(property);
		}

		index
	}

	pub(crate) fn configure(&mut self, property: &MetadataProperty) {
		self.properties.insert(property.name.clone(), property.clone());
	}

	pub(crate) fn len(&self) -> usize {
		self.documents.len()
	}

	pub(crate) fn record_ids(&self) -> impl Iterator<Item = Uuid> + '_ {
		self.documents.keys().copied()
	}

	/// Replaces any previous version of the record. Only configured properties are kept.
	pub(crate) fn upsert(&mut self, record: &Record) {
		let metadata = record
			.metadata
			.iter()
			.flatten()
			.filter(|(name, value)| !value.is_null() && self.properties.contains_key(*name))
			.map(|(name, value)| (name.clone(), value.clone()))
			.collect();
		let responses = record
			.responses
			.iter()
			.map(|response| {
				(response.id, ResponseEntry { user_id: response.user_id, status: response.status })
			})
			.collect();

		self.documents.insert(
			record.id,
			Document {
				id: record.id,
				fields: record.fields.clone(),
				metadata,
				responses,
				inserted_at: record.inserted_at,
				updated_at: record.updated_at,
			},
		);
	}

	pub(crate) fn remove(&mut self, record_id: Uuid) -> bool {
		self.documents.remove(&record_id).is_some()
	}

	/// Returns `false` when the response's record is not indexed.
	pub(crate) fn put_response(&mut self, response: &Response) -> bool {
		let Some(document) = self.documents.get_mut(&response.record_id) else {
			return false;
		};

		document
			.responses
			.insert(response.id, ResponseEntry { user_id: response.user_id, status: response.status });

		true
	}

	/// Returns `false` when the response's record is not indexed.
	pub(crate) fn remove_response(&mut self, response: &Response) -> bool {
		let Some(document) = self.documents.get_mut(&response.record_id) else {
			return false;
		};

		document.responses.remove(&response.id);

		true
	}

	pub(crate) fn search(&self, params: &SearchParams) -> SearchResponses {
		let query = params
			.query
			.as_ref()
			.map(|query| (text::tokenize(&query.q), query.field.as_deref()));
		let user_id = params
			.user_response_status_filter
			.as_ref()
			.and_then(|filter| filter.user.as_ref())
			.map(|user| user.id);
		let mut hits = Vec::new();

		for document in self.documents.values() {
			let score = match &query {
				Some((tokens, field)) => match document.text_score(tokens, *field) {
					Some(score) => Some(score),
					None => continue,
				},
				None => None,
			};

			if !params
				.metadata_filters
				.iter()
				.all(|filter| filter.matches(document.metadata.get(&filter.metadata_property().name)))
			{
				continue;
			}
			if let Some(filter) = &params.user_response_status_filter
				&& !filter.matches(document.statuses_for(user_id))
			{
				continue;
			}

			hits.push(Hit { document, score });
		}

		match params.sort_by.as_deref() {
			Some(sort_by) if !sort_by.is_empty() => hits.sort_by(|a, b| {
				compare_by_keys(a.document, b.document, sort_by)
					.then_with(|| a.document.id.cmp(&b.document.id))
			}),
			_ => hits.sort_by(|a, b| {
				b.score
					.cmp(&a.score)
					.then_with(|| a.document.inserted_at.cmp(&b.document.inserted_at))
					.then_with(|| a.document.id.cmp(&b.document.id))
			}),
		}

		let total = hits.len() as u64;
		let items = hits
			.into_iter()
			.skip(params.offset)
			.take(params.limit)
			.map(|hit| SearchResponseItem {
				record_id: hit.document.id,
				score: hit.score.map(|score| score as f32),
			})
			.collect();

		SearchResponses { items, total }
	}

	/// Aggregates over indexed values; an unconfigured property has none.
	pub(crate) fn metrics(&self, property: &MetadataProperty) -> MetadataMetrics {
		let values = self
			.properties
			.contains_key(&property.name)
			.then(|| self.documents.values().filter_map(|doc| doc.metadata.get(&property.name)))
			.into_iter()
			.flatten();

		match property.kind() {
			MetadataPropertyType::Terms => {
				let mut total = 0;
				let mut counts = HashMap::<String, u64>::new();

				for value in values {
					let Some(mut terms) = metadata::terms_of(value) else {
						continue;
					};

					terms.sort_unstable();
					terms.dedup();

					total += 1;

					for term in terms {
						*counts.entry(term.to_string()).or_default() += 1;
					}
				}

				MetadataMetrics::Terms(TermsMetadataMetrics::from_counts(total, counts))
			},
			MetadataPropertyType::Integer => MetadataMetrics::Integer(
				IntegerMetadataMetrics::from_values(values.filter_map(i64::coerce)),
			),
			MetadataPropertyType::Float => MetadataMetrics::Float(FloatMetadataMetrics::from_values(
				values.filter_map(f64::coerce),
			)),
		}
	}
}

fn compare_by_keys(a: &Document, b: &Document, sort_by: &[SortBy]) -> Ordering {
	for sort in sort_by {
		let ordering = match &sort.field {
			SortField::Record(RecordSortField::InsertedAt) =>
				apply_order(a.inserted_at.cmp(&b.inserted_at), sort.order),
			SortField::Record(RecordSortField::UpdatedAt) =>
				apply_order(a.updated_at.cmp(&b.updated_at), sort.order),
			SortField::Metadata(property) => {
				let a = metadata_key(a, property, sort.order);
				let b = metadata_key(b, property, sort.order);

				match (a, b) {
					(Some(a), Some(b)) =>
						apply_order(a.partial_cmp(&b).unwrap_or(Ordering::Equal), sort.order),
					(Some(_), None) => Ordering::Less,
					(None, Some(_)) => Ordering::Greater,
					(None, None) => Ordering::Equal,
				}
			},
		};

		if ordering != Ordering::Equal {
			return ordering;
		}
	}

	Ordering::Equal
}

fn apply_order(ordering: Ordering, order: SortOrder) -> Ordering {
	match order {
		SortOrder::Asc => ordering,
		SortOrder::Desc => ordering.reverse(),
	}
}

/// Multi-term values sort by their lowest term ascending and their highest term descending.
fn metadata_key<'a>(
	document: &'a Document,
	property: &MetadataProperty,
	order: SortOrder,
) -> Option<MetadataKey<'a>> {
	let value = document.metadata.get(&property.name)?;

	match property.kind() {
		MetadataPropertyType::Terms => {
			let terms = metadata::terms_of(value)?;
			let term = match order {
				SortOrder::Asc => terms.into_iter().min(),
				SortOrder::Desc => terms.into_iter().max(),
			}?;

			Some(MetadataKey::Term(term))
		},
		MetadataPropertyType::Integer => i64::coerce(value).map(MetadataKey::Integer),
		MetadataPropertyType::Float => f64::coerce(value).map(MetadataKey::Float),
	}
}
