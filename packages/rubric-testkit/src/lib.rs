//! Fixture builders for datasets, records and responses.

use std::collections::BTreeMap;

use serde_json::{Map, Value};
use time::{Duration, OffsetDateTime, macros::datetime};
use uuid::Uuid;

use rubric_domain::{
	Dataset, DatasetStatus, Field, MetadataProperty, MetadataPropertySettings, Question, Record,
	Response, ResponseStatus, User,
};

/// Timestamp every fixture record is offset from.
pub const BASE_TIME: OffsetDateTime = datetime!(2024-01-01 00:00 UTC);

pub struct DatasetBuilder {
	dataset: Dataset,
}
impl DatasetBuilder {
	pub fn new(name: &str) -> Self {
		Self {
			dataset: Dataset {
				id: Uuid::new_v4(),
				name: name.to_string(),
				status: DatasetStatus::Ready,
				allow_extra_metadata: false,
				fields: Vec::new(),
				questions: Vec::new(),
				metadata_properties: Vec::new(),
			},
		}
	}

	pub fn draft(mut self) -> Self {
		self.dataset.status = DatasetStatus::Draft;

		self
	}

	pub fn allow_extra_metadata(mut self) -> Self {
		self.dataset.allow_extra_metadata = true;

		self
	}

	pub fn field(mut self, name: &str) -> Self {
		self.dataset.fields.push(Field {
			id: Uuid::new_v4(),
			name: name.to_string(),
			title: name.to_string(),
			required: false,
		});

		self
	}

	pub fn question(mut self, name: &str) -> Self {
		self.dataset.questions.push(Question {
			id: Uuid::new_v4(),
			name: name.to_string(),
			title: name.to_string(),
			required: false,
		});

		self
	}

	/// Adds a terms property; an empty `values` slice leaves the value space open.
	pub fn terms(self, name: &str, values: &[&str]) -> Self {
		let values =
			(!values.is_empty()).then(|| values.iter().map(|value| value.to_string()).collect());

		self.property(name, MetadataPropertySettings::Terms { values })
	}

	pub fn integer(self, name: &str) -> Self {
		self.property(name, MetadataPropertySettings::Integer { min: None, max: None })
	}

	pub fn float(self, name: &str) -> Self {
		self.property(name, MetadataPropertySettings::Float { min: None, max: None })
	}

	pub fn property(mut self, name: &str, settings: MetadataPropertySettings) -> Self {
		let property = metadata_property(&self.dataset, name, settings);

		self.dataset.metadata_properties.push(property);

		self
	}

	pub fn build(self) -> Dataset {
		self.dataset
	}
}

pub struct RecordBuilder {
	record: Record,
}
impl RecordBuilder {
	pub fn new(dataset: &Dataset) -> Self {
		Self {
			record: Record {
				id: Uuid::new_v4(),
				dataset_id: dataset.id,
				external_id: None,
				fields: BTreeMap::new(),
				metadata: None,
				responses: Vec::new(),
				inserted_at: BASE_TIME,
				updated_at: BASE_TIME,
			},
		}
	}

	pub fn field(mut self, name: &str, value: &str) -> Self {
		self.record.fields.insert(name.to_string(), value.to_string());

		self
	}

	pub fn metadata(mut self, name: &str, value: Value) -> Self {
		self.record.metadata.get_or_insert_with(Map::new).insert(name.to_string(), value);

		self
	}

	/// Places `inserted_at` `seconds` after [`BASE_TIME`]; `updated_at` follows it.
	pub fn inserted_after(mut self, seconds: i64) -> Self {
		self.record.inserted_at = BASE_TIME + Duration::seconds(seconds);
		self.record.updated_at = self.record.inserted_at;

		self
	}

	pub fn updated_after(mut self, seconds: i64) -> Self {
		self.record.updated_at = BASE_TIME + Duration::seconds(seconds);

		self
	}

	pub fn response(mut self, user: &User, status: ResponseStatus) -> Self {
		let response = response(&self.record, user, status);

		self.record.responses.push(response);

		self
	}

	pub fn build(self) -> Record {
		self.record
	}
}

pub fn metadata_property(
	dataset: &Dataset,
	name: &str,
	settings: MetadataPropertySettings,
) -> MetadataProperty {
	MetadataProperty {
		id: Uuid::new_v4(),
		dataset_id: dataset.id,
		name: name.to_string(),
		title: name.to_string(),
		settings,
	}
}

pub fn user(username: &str) -> User {
	User { id: Uuid::new_v4(), username: username.to_string() }
}

pub fn response(record: &Record, user: &User, status: ResponseStatus) -> Response {
	Response { id: Uuid::new_v4(), record_id: record.id, user_id: user.id, status, values: None }
}
