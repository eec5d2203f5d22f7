//! In-process backend registered as `"memory"`.
//!
//! Every instance built by one factory shares the factory's store, so writes are visible to the
//! next read on any instance immediately.

mod index;
mod text;

use std::{
	collections::HashMap,
	sync::{
		Arc, RwLock, RwLockReadGuard, RwLockWriteGuard,
		atomic::{AtomicBool, Ordering},
	},
};

use uuid::Uuid;

use crate::{
	BoxFuture, EngineFactory, Error, Result, SearchEngine, SearchParams, SearchResponses,
	memory::index::DatasetIndex,
};
use rubric_domain::{Dataset, MetadataMetrics, MetadataProperty, Record, Response};

pub const MEMORY_ENGINE_NAME: &str = "memory";

#[derive(Default)]
struct Store {
	indexes: HashMap<Uuid, DatasetIndex>,
	record_datasets: HashMap<Uuid, Uuid>,
}

#[derive(Clone, Default)]
pub struct MemoryEngineFactory {
	store: Arc<RwLock<Store>>,
}
impl MemoryEngineFactory {
	pub fn engine(&self) -> MemoryEngine {
		MemoryEngine { store: self.store.clone(), closed: AtomicBool::new(false) }
	}
}
impl EngineFactory for MemoryEngineFactory {
	fn new_instance(&self) -> BoxFuture<'_, Result<Arc<dyn SearchEngine>>> {
		let engine: Arc<dyn SearchEngine> = Arc::new(self.engine());

		Box::pin(async move { Ok(engine) })
	}
}

pub struct MemoryEngine {
	store: Arc<RwLock<Store>>,
	closed: AtomicBool,
}
impl MemoryEngine {
	pub fn is_closed(&self) -> bool {
		self.closed.load(Ordering::SeqCst)
	}

	fn read(&self) -> Result<RwLockReadGuard<'_, Store>> {
		self.ensure_open()?;

		Ok(self.store.read().unwrap_or_else(|err| err.into_inner()))
	}

	fn write(&self) -> Result<RwLockWriteGuard<'_, Store>> {
		self.ensure_open()?;

		Ok(self.store.write().unwrap_or_else(|err| err.into_inner()))
	}

	fn ensure_open(&self) -> Result<()> {
		if self.is_closed() {
			return Err(Error::BackendUnavailable {
				message: "Memory search engine instance is closed.".to_string(),
			});
		}

		Ok(())
	}

	fn do_create_index(&self, dataset: &Dataset) -> Result<()> {
		let mut store = self.write()?;

		if store.indexes.contains_key(&dataset.id) {
			return Err(Error::IndexState {
				message: format!("Index for dataset '{}' already exists.", dataset.id),
			});
		}

		store.indexes.insert(dataset.id, DatasetIndex::new(&dataset.metadata_properties));

		tracing::info!(
			dataset_id = %dataset.id,
			metadata_properties = dataset.metadata_properties.len(),
			"Dataset index created."
		);

		Ok(())
	}

	fn do_delete_index(&self, dataset: &Dataset) -> Result<()> {
		let mut store = self.write()?;
		let Some(index) = store.indexes.remove(&dataset.id) else {
			tracing::debug!(dataset_id = %dataset.id, "Dataset index already absent.");

			return Ok(());
		};

		for record_id in index.record_ids() {
			store.record_datasets.remove(&record_id);
		}

		tracing::info!(dataset_id = %dataset.id, records = index.len(), "Dataset index deleted.");

		Ok(())
	}

	fn do_configure_metadata_property(
		&self,
		dataset: &Dataset,
		metadata_property: &MetadataProperty,
	) -> Result<()> {
		if metadata_property.dataset_id != dataset.id {
			return Err(Error::SchemaResolution {
				message: format!(
					"Metadata property '{}' does not belong to dataset '{}'.",
					metadata_property.name, dataset.id
				),
			});
		}

		let mut store = self.write()?;

		index_mut(&mut store, dataset.id)?.configure(metadata_property);

		tracing::info!(
			dataset_id = %dataset.id,
			metadata_property = %metadata_property.name,
			"Metadata property configured."
		);

		Ok(())
	}

	fn do_index_records(&self, dataset: &Dataset, records: &[Record]) -> Result<()> {
		let mut store = self.write()?;

		index_mut(&mut store, dataset.id)?;
		check_batch(dataset, records, "index")?;

		let store = &mut *store;

		if let Some(index) = store.indexes.get_mut(&dataset.id) {
			for record in records {
				index.upsert(record);
				store.record_datasets.insert(record.id, dataset.id);
			}
		}

		tracing::info!(dataset_id = %dataset.id, records = records.len(), "Records indexed.");

		Ok(())
	}

	fn do_delete_records(&self, dataset: &Dataset, records: &[Record]) -> Result<()> {
		let mut store = self.write()?;

		index_mut(&mut store, dataset.id)?;
		check_batch(dataset, records, "delete")?;

		let store = &mut *store;
		let mut removed = 0;

		if let Some(index) = store.indexes.get_mut(&dataset.id) {
			for record in records {
				if index.remove(record.id) {
					store.record_datasets.remove(&record.id);

					removed += 1;
				}
			}
		}

		tracing::info!(
			dataset_id = %dataset.id,
			requested = records.len(),
			removed,
			"Records deleted."
		);

		Ok(())
	}

	fn do_update_response(&self, response: &Response, delete: bool) -> Result<()> {
		let mut store = self.write()?;
		let not_indexed = || Error::IndexState {
			message: format!("Record '{}' is not indexed.", response.record_id),
		};
		let dataset_id = *store.record_datasets.get(&response.record_id).ok_or_else(not_indexed)?;
		let index = index_mut(&mut store, dataset_id)?;
		let applied =
			if delete { index.remove_response(response) } else { index.put_response(response) };

		if !applied {
			return Err(not_indexed());
		}

		tracing::debug!(
			record_id = %response.record_id,
			response_id = %response.id,
			deleted = delete,
			"Record response synchronized."
		);

		Ok(())
	}

	fn do_search(&self, dataset: &Dataset, params: &SearchParams) -> Result<SearchResponses> {
		let store = self.read()?;
		let index = store.indexes.get(&dataset.id).ok_or_else(|| missing_index(dataset.id))?;
		let responses = index.search(params);

		tracing::debug!(
			dataset_id = %dataset.id,
			total = responses.total,
			returned = responses.items.len(),
			"Search completed."
		);

		Ok(responses)
	}

	fn do_compute_metrics(&self, metadata_property: &MetadataProperty) -> Result<MetadataMetrics> {
		let store = self.read()?;
		let index = store
			.indexes
			.get(&metadata_property.dataset_id)
			.ok_or_else(|| missing_index(metadata_property.dataset_id))?;

		Ok(index.metrics(metadata_property))
	}
}
impl SearchEngine for MemoryEngine {
	fn close(&self) -> BoxFuture<'_, Result<()>> {
		self.closed.store(true, Ordering::SeqCst);

		Box::pin(async { Ok(()) })
	}

	fn create_index<'a>(&'a self, dataset: &'a Dataset) -> BoxFuture<'a, Result<()>> {
		Box::pin(async move { self.do_create_index(dataset) })
	}

	fn delete_index<'a>(&'a self, dataset: &'a Dataset) -> BoxFuture<'a, Result<()>> {
		Box::pin(async move { self.do_delete_index(dataset) })
	}

	fn configure_metadata_property<'a>(
		&'a self,
		dataset: &'a Dataset,
		metadata_property: &'a MetadataProperty,
	) -> BoxFuture<'a, Result<()>> {
		Box::pin(async move { self.do_configure_metadata_property(dataset, metadata_property) })
	}

	fn index_records<'a>(
		&'a self,
		dataset: &'a Dataset,
		records: &'a [Record],
	) -> BoxFuture<'a, Result<()>> {
		Box::pin(async move { self.do_index_records(dataset, records) })
	}

	fn delete_records<'a>(
		&'a self,
		dataset: &'a Dataset,
		records: &'a [Record],
	) -> BoxFuture<'a, Result<()>> {
		Box::pin(async move { self.do_delete_records(dataset, records) })
	}

	fn update_record_response<'a>(&'a self, response: &'a Response) -> BoxFuture<'a, Result<()>> {
		Box::pin(async move { self.do_update_response(response, false) })
	}

	fn delete_record_response<'a>(&'a self, response: &'a Response) -> BoxFuture<'a, Result<()>> {
		Box::pin(async move { self.do_update_response(response, true) })
	}

	fn search<'a>(
		&'a self,
		dataset: &'a Dataset,
		params: SearchParams,
	) -> BoxFuture<'a, Result<SearchResponses>> {
		Box::pin(async move { self.do_search(dataset, &params) })
	}

	fn compute_metrics_for<'a>(
		&'a self,
		metadata_property: &'a MetadataProperty,
	) -> BoxFuture<'a, Result<MetadataMetrics>> {
		Box::pin(async move { self.do_compute_metrics(metadata_property) })
	}
}

fn index_mut(store: &mut Store, dataset_id: Uuid) -> Result<&mut DatasetIndex> {
	store.indexes.get_mut(&dataset_id).ok_or_else(|| missing_index(dataset_id))
}

fn missing_index(dataset_id: Uuid) -> Error {
	Error::IndexState { message: format!("Index for dataset '{dataset_id}' does not exist.") }
}

/// Rejects the whole batch when any record belongs to another dataset.
fn check_batch(dataset: &Dataset, records: &[Record], action: &str) -> Result<()> {
	let failed = records
		.iter()
		.filter(|record| record.dataset_id != dataset.id)
		.map(|record| record.id)
		.collect::<Vec<_>>();

	if failed.is_empty() {
		return Ok(());
	}

	tracing::warn!(
		dataset_id = %dataset.id,
		failed = failed.len(),
		action,
		"Record batch rejected."
	);

	Err(Error::PartialBatchFailure {
		message: format!(
			"Cannot {action} {} of {} records: they do not belong to dataset '{}'.",
			failed.len(),
			records.len(),
			dataset.id
		),
		failed,
	})
}
