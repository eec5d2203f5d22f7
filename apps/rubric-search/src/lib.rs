pub mod snapshot;

use std::{path::PathBuf, sync::Arc};

use clap::{Args as ClapArgs, Parser, Subcommand};
use color_eyre::eyre;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use rubric_config::Config;
use rubric_domain::{Dataset, Record};
use rubric_search::{SearchEngine, SearchRequest, registry};

use crate::snapshot::Snapshot;

#[derive(Debug, Parser)]
#[command(
	version = rubric_cli::VERSION,
	rename_all = "kebab",
	styles = rubric_cli::styles(),
)]
pub struct Args {
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: PathBuf,
	#[command(subcommand)]
	pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
	/// Index a dataset snapshot and run one search over it.
	Search(SearchArgs),
	/// Index a dataset snapshot and aggregate one metadata property.
	Metrics(MetricsArgs),
}

#[derive(Debug, ClapArgs)]
pub struct SearchArgs {
	#[arg(long, short = 'd', value_name = "FILE")]
	pub dataset: PathBuf,
	#[arg(long, short = 'q', value_name = "TEXT")]
	pub query: Option<String>,
	#[arg(long, value_name = "FIELD", requires = "query")]
	pub field: Option<String>,
	#[arg(long, short = 'm', value_name = "NAME:EXPR")]
	pub metadata: Vec<String>,
	#[arg(long, short = 's', value_name = "FIELD[:ORDER]")]
	pub sort_by: Vec<String>,
	#[arg(long, value_name = "STATUS")]
	pub response_status: Vec<String>,
	#[arg(long, value_name = "UUID")]
	pub user: Option<Uuid>,
	#[arg(long, value_name = "N")]
	pub offset: Option<usize>,
	#[arg(long, value_name = "N")]
	pub limit: Option<usize>,
}

#[derive(Debug, ClapArgs)]
pub struct MetricsArgs {
	#[arg(long, short = 'd', value_name = "FILE")]
	pub dataset: PathBuf,
	#[arg(long, short = 'p', value_name = "NAME")]
	pub property: String,
}

pub async fn run(args: Args) -> color_eyre::Result<()> {
	let config = rubric_config::load(&args.config)?;

	init_tracing(&config)?;

	let json = execute(&config, args.command).await?;

	println!("{json}");

	Ok(())
}

/// Runs one command against the configured engine and renders the result as JSON.
pub async fn execute(config: &Config, command: Command) -> color_eyre::Result<String> {
	match command {
		Command::Search(args) => search(config, args).await,
		Command::Metrics(args) => metrics(config, args).await,
	}
}

async fn search(config: &Config, args: SearchArgs) -> color_eyre::Result<String> {
	let Snapshot { dataset, records, users } = snapshot::load(&args.dataset)?;
	let user = match args.user {
		Some(id) => Some(
			users
				.into_iter()
				.find(|user| user.id == id)
				.ok_or_else(|| eyre::eyre!("User {id} is not part of the dataset snapshot."))?,
		),
		None => None,
	};
	let request = SearchRequest {
		query: args.query,
		field: args.field,
		metadata: args.metadata,
		sort_by: args.sort_by,
		response_status: args.response_status,
		offset: args.offset,
		limit: args.limit,
	};
	let params = request.resolve(&dataset, user.as_ref(), &config.search)?;
	let responses = registry()
		.with_engine(&config.search.engine, |engine| async move {
			let dataset = &dataset;

			with_snapshot_index(engine, dataset, &records, move |engine| async move {
				engine.search(dataset, params).await
			})
			.await
		})
		.await?;

	tracing::info!(total = responses.total, returned = responses.items.len(), "Search finished.");

	Ok(serde_json::to_string_pretty(&responses)?)
}

async fn metrics(config: &Config, args: MetricsArgs) -> color_eyre::Result<String> {
	let Snapshot { dataset, records, .. } = snapshot::load(&args.dataset)?;
	let property = dataset
		.metadata_property_by_name(&args.property)
		.cloned()
		.ok_or_else(|| {
			eyre::eyre!(
				"Metadata property '{}' not found in dataset '{}'.",
				args.property,
				dataset.id
			)
		})?;
	let metrics = registry()
		.with_engine(&config.search.engine, |engine| async move {
			with_snapshot_index(engine, &dataset, &records, move |engine| async move {
				engine.compute_metrics_for(&property).await
			})
			.await
		})
		.await?;

	Ok(serde_json::to_string_pretty(&metrics)?)
}

/// Builds a throwaway index for `dataset`, runs `op` against it and deletes the index on
/// every path. `op` only runs when the whole batch was indexed.
pub async fn with_snapshot_index<F, Fut, T>(
	engine: Arc<dyn SearchEngine>,
	dataset: &Dataset,
	records: &[Record],
	op: F,
) -> rubric_search::Result<T>
where
	F: FnOnce(Arc<dyn SearchEngine>) -> Fut,
	Fut: Future<Output = rubric_search::Result<T>>,
{
	engine.create_index(dataset).await?;

	let result = match engine.index_records(dataset, records).await {
		Ok(()) => op(engine.clone()).await,
		Err(err) => Err(err),
	};
	let cleanup = engine.delete_index(dataset).await;

	if let Err(err) = &cleanup
		&& result.is_err()
	{
		tracing::warn!(dataset_id = %dataset.id, error = %err, "Failed to delete snapshot index.");
	}

	let value = result?;

	cleanup?;

	Ok(value)
}

fn init_tracing(config: &Config) -> color_eyre::Result<()> {
	let filter =
		EnvFilter::try_new(&config.service.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

	tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

	Ok(())
}
