use std::{future::Future, pin::Pin, sync::Arc};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::Result;
use rubric_domain::{
	Dataset, MetadataFilter, MetadataMetrics, MetadataProperty, Record, Response, SortBy,
	StringQuery, UserResponseStatusFilter,
};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub const DEFAULT_SEARCH_OFFSET: usize = 0;
pub const DEFAULT_SEARCH_LIMIT: usize = 100;

/// Operations every search backend implements.
///
/// Validation of request input happens before any of these are called. Backends report
/// connectivity problems as [`crate::Error::BackendUnavailable`] and never retry on their own.
pub trait SearchEngine
where
	Self: Send + Sync,
{
	/// Releases backend resources. Calling it more than once is a no-op.
	fn close(&self) -> BoxFuture<'_, Result<()>>;

	/// Must run before records are indexed into or searched in the dataset.
	fn create_index<'a>(&'a self, dataset: &'a Dataset) -> BoxFuture<'a, Result<()>>;

	fn delete_index<'a>(&'a self, dataset: &'a Dataset) -> BoxFuture<'a, Result<()>>;

	/// Adds a filterable, sortable and aggregatable dimension to an existing index.
	///
	/// Already indexed records have no value for it until they are indexed again.
	fn configure_metadata_property<'a>(
		&'a self,
		dataset: &'a Dataset,
		metadata_property: &'a MetadataProperty,
	) -> BoxFuture<'a, Result<()>>;

	/// Upserts the whole batch or nothing.
	fn index_records<'a>(
		&'a self,
		dataset: &'a Dataset,
		records: &'a [Record],
	) -> BoxFuture<'a, Result<()>>;

	/// Removes the whole batch or nothing.
	fn delete_records<'a>(
		&'a self,
		dataset: &'a Dataset,
		records: &'a [Record],
	) -> BoxFuture<'a, Result<()>>;

	fn update_record_response<'a>(&'a self, response: &'a Response) -> BoxFuture<'a, Result<()>>;

	fn delete_record_response<'a>(&'a self, response: &'a Response) -> BoxFuture<'a, Result<()>>;

	/// Runs a query against one dataset's index; ordering is deterministic for identical
	/// inputs and index state.
	fn search<'a>(
		&'a self,
		dataset: &'a Dataset,
		params: SearchParams,
	) -> BoxFuture<'a, Result<SearchResponses>>;

	/// Aggregates the property over its dataset's index. The variant follows the property kind.
	fn compute_metrics_for<'a>(
		&'a self,
		metadata_property: &'a MetadataProperty,
	) -> BoxFuture<'a, Result<MetadataMetrics>>;
}

/// Constructs engine instances for one backend name.
pub trait EngineFactory
where
	Self: Send + Sync,
{
	fn new_instance(&self) -> BoxFuture<'_, Result<Arc<dyn SearchEngine>>>;
}

/// Already validated search input.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchParams {
	/// `None` matches every record.
	pub query: Option<StringQuery>,
	pub user_response_status_filter: Option<UserResponseStatusFilter>,
	/// Conjunction; empty means no metadata constraint.
	pub metadata_filters: Vec<MetadataFilter>,
	pub offset: usize,
	pub limit: usize,
	/// `None` leaves the order to the backend's deterministic default.
	pub sort_by: Option<Vec<SortBy>>,
}
impl Default for SearchParams {
	fn default() -> Self {
		Self {
			query: None,
			user_response_status_filter: None,
			metadata_filters: Vec::new(),
			offset: DEFAULT_SEARCH_OFFSET,
			limit: DEFAULT_SEARCH_LIMIT,
			sort_by: None,
		}
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResponseItem {
	pub record_id: Uuid,
	#[serde(default)]
	pub score: Option<f32>,
}

/// One page of hits. `total` counts every match regardless of the page window.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResponses {
	pub items: Vec<SearchResponseItem>,
	pub total: u64,
}
