use std::{
	env, fs,
	path::PathBuf,
	sync::{
		Arc,
		atomic::{AtomicBool, AtomicU64, Ordering},
	},
};

use clap::Parser;
use serde_json::{Value, json};

use rubric_config::{Config, Search, Service};
use rubric_domain::{Dataset, Record, ResponseStatus};
use rubric_search::{Error, MemoryEngineFactory, SearchEngine};
use rubric_search_app::{Args, Command, execute, with_snapshot_index};
use rubric_testkit::{DatasetBuilder, RecordBuilder};

fn write_temp_snapshot(payload: Value) -> PathBuf {
	static COUNTER: AtomicU64 = AtomicU64::new(0);

	let ordinal = COUNTER.fetch_add(1, Ordering::SeqCst);
	let mut path = env::temp_dir();

	path.push(format!("rubric_snapshot_{}_{ordinal}.json", std::process::id()));

	fs::write(&path, payload.to_string()).expect("Failed to write snapshot.");

	path
}

fn config() -> Config {
	Config { service: Service { log_level: "info".to_string() }, search: Search::default() }
}

fn dataset() -> Dataset {
	DatasetBuilder::new("cli")
		.field("text")
		.terms("color", &["red", "blue"])
		.integer("score")
		.build()
}

fn records(dataset: &Dataset) -> Vec<Record> {
	[("red", 1), ("red", 5), ("blue", 10)]
		.into_iter()
		.enumerate()
		.map(|(idx, (color, score))| {
			RecordBuilder::new(dataset)
				.field("text", &format!("record number {idx}"))
				.metadata("color", json!(color))
				.metadata("score", json!(score))
				.inserted_after(idx as i64)
				.build()
		})
		.collect()
}

fn parse(args: &[&str]) -> Args {
	Args::try_parse_from(["rubric-search", "--config", "config.toml"].iter().chain(args))
		.expect("valid arguments")
}

#[test]
fn search_arguments_parse() {
	let args = parse(&[
		"search",
		"--dataset",
		"snapshot.json",
		"--query",
		"hello",
		"--field",
		"text",
		"--metadata",
		"color:red",
		"--metadata",
		r#"score:{"ge": 5}"#,
		"--sort-by",
		"metadata.score:desc",
		"--response-status",
		"missing",
		"--limit",
		"5",
	]);

	match args.command {
		Command::Search(search) => {
			assert_eq!(search.metadata.len(), 2);
			assert_eq!(search.sort_by, ["metadata.score:desc"]);
			assert_eq!(search.limit, Some(5));
		},
		other => panic!("unexpected command: {other:?}"),
	}
}

#[test]
fn field_requires_query() {
	let result = Args::try_parse_from([
		"rubric-search",
		"--config",
		"config.toml",
		"search",
		"--dataset",
		"snapshot.json",
		"--field",
		"text",
	]);

	assert!(result.is_err());
}

#[tokio::test]
async fn search_command_filters_and_sorts() {
	let dataset = dataset();
	let records = records(&dataset);
	let path = write_temp_snapshot(json!({ "dataset": dataset, "records": records }));
	let args = parse(&[
		"search",
		"--dataset",
		path.to_str().expect("utf-8 path"),
		"--metadata",
		"color:red",
		"--sort-by",
		"metadata.score:desc",
	]);
	let output = execute(&config(), args.command).await.expect("search command");
	let output: Value = serde_json::from_str(&output).expect("JSON output");

	assert_eq!(output["total"], json!(2));
	assert_eq!(output["items"][0]["record_id"], json!(records[1].id));
	assert_eq!(output["items"][1]["record_id"], json!(records[0].id));

	fs::remove_file(path).expect("Failed to remove snapshot.");
}

#[tokio::test]
async fn search_command_scopes_statuses_to_user() {
	let dataset = dataset();
	let annotator = rubric_testkit::user("annotator");
	let answered =
		RecordBuilder::new(&dataset).response(&annotator, ResponseStatus::Discarded).build();
	let open = RecordBuilder::new(&dataset).inserted_after(1).build();
	let path = write_temp_snapshot(json!({
		"dataset": dataset,
		"records": [answered, open],
		"users": [annotator],
	}));
	let user_id = annotator.id.to_string();
	let args = parse(&[
		"search",
		"--dataset",
		path.to_str().expect("utf-8 path"),
		"--response-status",
		"missing",
		"--user",
		&user_id,
	]);
	let output = execute(&config(), args.command).await.expect("search command");
	let output: Value = serde_json::from_str(&output).expect("JSON output");

	assert_eq!(output["total"], json!(1));
	assert_eq!(output["items"][0]["record_id"], json!(open.id));

	let stranger = uuid::Uuid::new_v4().to_string();
	let args = parse(&[
		"search",
		"--dataset",
		path.to_str().expect("utf-8 path"),
		"--user",
		&stranger,
	]);

	assert!(execute(&config(), args.command).await.is_err());

	fs::remove_file(path).expect("Failed to remove snapshot.");
}

#[tokio::test]
async fn metrics_command_reports_tagged_metrics() {
	let dataset = dataset();
	let records = records(&dataset);
	let path = write_temp_snapshot(json!({ "dataset": dataset, "records": records }));
	let snapshot = path.to_str().expect("utf-8 path");
	let output = execute(
		&config(),
		parse(&["metrics", "--dataset", snapshot, "--property", "color"]).command,
	)
	.await
	.expect("metrics command");

	assert_eq!(
		serde_json::from_str::<Value>(&output).expect("JSON output"),
		json!({
			"type": "terms",
			"total": 3,
			"values": [{ "term": "red", "count": 2 }, { "term": "blue", "count": 1 }],
		})
	);

	let output = execute(
		&config(),
		parse(&["metrics", "--dataset", snapshot, "--property", "score"]).command,
	)
	.await
	.expect("metrics command");

	assert_eq!(
		serde_json::from_str::<Value>(&output).expect("JSON output"),
		json!({ "type": "integer", "min": 1, "max": 10 })
	);

	let unknown = parse(&["metrics", "--dataset", snapshot, "--property", "missing"]);

	assert!(execute(&config(), unknown.command).await.is_err());

	fs::remove_file(path).expect("Failed to remove snapshot.");
}

#[tokio::test]
async fn invalid_snapshots_are_rejected_before_indexing() {
	let dataset = dataset();
	let other = DatasetBuilder::new("other").build();
	let foreign = RecordBuilder::new(&other).build();
	let off_schema = RecordBuilder::new(&dataset).metadata("color", json!("green")).build();

	for records in [vec![foreign], vec![off_schema]] {
		let path = write_temp_snapshot(json!({ "dataset": dataset, "records": records }));
		let args = parse(&["search", "--dataset", path.to_str().expect("utf-8 path")]);

		assert!(execute(&config(), args.command).await.is_err());

		fs::remove_file(path).expect("Failed to remove snapshot.");
	}
}

#[tokio::test]
async fn foreign_metadata_properties_are_rejected() {
	let mut dataset = dataset();

	dataset.metadata_properties[0].dataset_id = uuid::Uuid::new_v4();

	let path = write_temp_snapshot(json!({ "dataset": dataset }));
	let args = parse(&["metrics", "--dataset", path.to_str().expect("utf-8 path"), "-p", "color"]);
	let err = execute(&config(), args.command).await.expect_err("foreign property");

	assert!(err.to_string().contains("Metadata property 'color' belongs to dataset"), "{err}");

	fs::remove_file(path).expect("Failed to remove snapshot.");
}

#[tokio::test]
async fn snapshot_index_is_dropped_when_indexing_fails() {
	let dataset = dataset();
	let foreign = RecordBuilder::new(&DatasetBuilder::new("other").build()).build();
	let engine: Arc<dyn SearchEngine> = Arc::new(MemoryEngineFactory::default().engine());
	let ran = AtomicBool::new(false);
	let err = with_snapshot_index(engine.clone(), &dataset, &[foreign], |_| async {
		ran.store(true, Ordering::SeqCst);

		Ok(())
	})
	.await
	.expect_err("foreign record");

	assert!(matches!(err, Error::PartialBatchFailure { .. }));
	assert!(!ran.load(Ordering::SeqCst));

	engine.create_index(&dataset).await.expect("index was dropped");
}

#[tokio::test]
async fn search_command_can_run_twice_on_one_snapshot() {
	let dataset = dataset();
	let records = records(&dataset);
	let path = write_temp_snapshot(json!({ "dataset": dataset, "records": records }));

	for _ in 0..2 {
		let args = parse(&["search", "--dataset", path.to_str().expect("utf-8 path")]);
		let output = execute(&config(), args.command).await.expect("search command");
		let output: Value = serde_json::from_str(&output).expect("JSON output");

		assert_eq!(output["total"], json!(3));
	}

	fs::remove_file(path).expect("Failed to remove snapshot.");
}
