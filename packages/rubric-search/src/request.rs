use serde::Deserialize;

use crate::{Error, Result, SearchParams};
use rubric_domain::{
	Dataset, MetadataFilter, RecordSortField, SortBy, SortField, SortOrder, StringQuery, User,
	UserResponseStatusFilter,
};

/// Raw search parameters as they arrive on the wire.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchRequest {
	#[serde(default)]
	pub query: Option<String>,
	#[serde(default)]
	pub field: Option<String>,
	/// `"<property>:<expression>"` fragments.
	#[serde(default)]
	pub metadata: Vec<String>,
	/// `"<field>[:<order>]"` tokens.
	#[serde(default)]
	pub sort_by: Vec<String>,
	#[serde(default)]
	pub response_status: Vec<String>,
	#[serde(default)]
	pub offset: Option<usize>,
	#[serde(default)]
	pub limit: Option<usize>,
}
impl SearchRequest {
	/// Validates every parameter against the dataset schema and the configured limits.
	///
	/// Nothing here touches a backend. Without explicit sort tokens the result is sorted by
	/// ascending `inserted_at`.
	pub fn resolve(
		&self,
		dataset: &Dataset,
		user: Option<&User>,
		cfg: &rubric_config::Search,
	) -> Result<SearchParams> {
		let query = match (&self.query, &self.field) {
			(Some(q), field) => {
				let query = StringQuery::new(q.clone(), field.clone())?;

				query.validate(dataset)?;

				Some(query)
			},
			(None, Some(field)) =>
				return Err(Error::FilterParse {
					message: format!("Provided query field '{field}' requires query text."),
				}),
			(None, None) => None,
		};
		let metadata_filters = self
			.metadata
			.iter()
			.map(|raw| MetadataFilter::parse(dataset, raw))
			.collect::<rubric_domain::Result<Vec<_>>>()?;
		let user_response_status_filter =
			UserResponseStatusFilter::parse(&self.response_status, user.cloned())?;
		let sort_by = if self.sort_by.is_empty() {
			vec![SortBy::new(SortField::Record(RecordSortField::InsertedAt), SortOrder::Asc)]
		} else {
			SortBy::parse_list(dataset, &self.sort_by)?
		};
		let limit = match self.limit {
			None => cfg.default_limit,
			Some(limit) if limit > cfg.max_limit =>
				return Err(Error::FilterParse {
					message: format!(
						"Provided limit {limit} exceeds the maximum of {}.",
						cfg.max_limit
					),
				}),
			Some(limit) => limit,
		};

		Ok(SearchParams {
			query,
			user_response_status_filter,
			metadata_filters,
			offset: self.offset.unwrap_or_default(),
			limit,
			sort_by: Some(sort_by),
		})
	}
}
