use std::{fs, path::Path};

use color_eyre::eyre;
use serde::Deserialize;

use rubric_domain::{Dataset, Record, User};

/// A dataset schema together with the records and users it was exported with.
#[derive(Debug, Deserialize)]
pub struct Snapshot {
	pub dataset: Dataset,
	#[serde(default)]
	pub records: Vec<Record>,
	#[serde(default)]
	pub users: Vec<User>,
}

/// Reads a JSON snapshot and checks every record against the dataset schema.
pub fn load(path: &Path) -> color_eyre::Result<Snapshot> {
	let raw = fs::read_to_string(path)?;
	let snapshot: Snapshot = serde_json::from_str(&raw)?;

	for property in &snapshot.dataset.metadata_properties {
		if property.dataset_id != snapshot.dataset.id {
			return Err(eyre::eyre!(
				"Metadata property '{}' belongs to dataset {}, not {}.",
				property.name,
				property.dataset_id,
				snapshot.dataset.id
			));
		}
	}

	for record in &snapshot.records {
		if record.dataset_id != snapshot.dataset.id {
			return Err(eyre::eyre!(
				"Record {} belongs to dataset {}, not {}.",
				record.id,
				record.dataset_id,
				snapshot.dataset.id
			));
		}

		record.validate_metadata(&snapshot.dataset)?;
	}

	tracing::debug!(
		dataset_id = %snapshot.dataset.id,
		records = snapshot.records.len(),
		"Dataset snapshot loaded."
	);

	Ok(snapshot)
}
