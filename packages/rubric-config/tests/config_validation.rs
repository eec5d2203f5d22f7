use std::{
	env, fs,
	path::PathBuf,
	sync::atomic::{AtomicU64, Ordering},
	time::{SystemTime, UNIX_EPOCH},
};

use toml::Value;

use rubric_config::{Config, Error, Search, Service};

const SAMPLE_CONFIG_TEMPLATE_TOML: &str = include_str!("fixtures/sample_config.template.toml");

fn sample_toml_with_search(engine: &str, default_limit: i64, max_limit: i64) -> String {
	let mut value: Value =
		toml::from_str(SAMPLE_CONFIG_TEMPLATE_TOML).expect("Failed to parse template config.");
	let root = value.as_table_mut().expect("Template config must be a table.");
	let search = root
		.get_mut("search")
		.and_then(Value::as_table_mut)
		.expect("Template config must include [search].");

	search.insert("engine".to_string(), Value::String(engine.to_string()));
	search.insert("default_limit".to_string(), Value::Integer(default_limit));
	search.insert("max_limit".to_string(), Value::Integer(max_limit));

	toml::to_string(&value).expect("Failed to render template config.")
}

fn write_temp_config(payload: String) -> PathBuf {
	static COUNTER: AtomicU64 = AtomicU64::new(0);

	let nanos = SystemTime::now()
		.duration_since(UNIX_EPOCH)
		.expect("System time must be valid.")
		.as_nanos();
	let ordinal = COUNTER.fetch_add(1, Ordering::SeqCst);
	let pid = std::process::id();
	let mut path = env::temp_dir();

	path.push(format!("rubric_config_test_{nanos}_{pid}_{ordinal}.toml"));

	fs::write(&path, payload).expect("Failed to write test config.");

	path
}

fn base_config() -> Config {
	Config { service: Service { log_level: "info".to_string() }, search: Search::default() }
}

#[test]
fn sample_config_loads() {
	let path = write_temp_config(SAMPLE_CONFIG_TEMPLATE_TOML.to_string());
	let result = rubric_config::load(&path);

	fs::remove_file(&path).expect("Failed to remove test config.");

	let cfg = result.expect("Expected sample config to load.");

	assert_eq!(cfg.search.engine, "memory");
	assert_eq!(cfg.search.default_limit, 50);
	assert_eq!(cfg.search.max_limit, 1_000);
	assert_eq!(cfg.service.log_level, "info");
}

#[test]
fn engine_name_is_normalized() {
	let path = write_temp_config(sample_toml_with_search("  Memory ", 10, 20));
	let result = rubric_config::load(&path);

	fs::remove_file(&path).expect("Failed to remove test config.");

	assert_eq!(result.expect("Expected config to load.").search.engine, "memory");
}

#[test]
fn engine_name_must_be_non_empty() {
	let path = write_temp_config(sample_toml_with_search("   ", 10, 20));
	let result = rubric_config::load(&path);

	fs::remove_file(&path).expect("Failed to remove test config.");

	let err = result.expect_err("Expected engine validation error.");

	assert!(matches!(err, Error::Invalid { key: "search.engine", .. }), "Unexpected error: {err}");
	assert_eq!(err.to_string(), "Invalid `search.engine`: must be non-empty.");
}

#[test]
fn default_limit_must_be_positive() {
	let path = write_temp_config(sample_toml_with_search("memory", 0, 20));
	let result = rubric_config::load(&path);

	fs::remove_file(&path).expect("Failed to remove test config.");

	let err = result.expect_err("Expected default_limit validation error.");

	assert!(
		matches!(err, Error::Invalid { key: "search.default_limit", .. }),
		"Unexpected error: {err}"
	);
}

#[test]
fn max_limit_must_cover_default_limit() {
	let mut cfg = base_config();

	cfg.search.default_limit = 200;
	cfg.search.max_limit = 100;

	let err = rubric_config::validate(&cfg).expect_err("Expected max_limit validation error.");

	assert!(matches!(err, Error::Invalid { key: "search.max_limit", .. }));
	assert!(err.to_string().contains("greater than or equal to search.default_limit"));

	cfg.search.max_limit = 200;

	assert!(rubric_config::validate(&cfg).is_ok());
}

#[test]
fn log_level_must_be_non_empty() {
	let mut cfg = base_config();

	cfg.service.log_level = " ".to_string();

	let err = rubric_config::validate(&cfg).expect_err("Expected log_level validation error.");

	assert!(matches!(err, Error::Invalid { key: "service.log_level", .. }));
}

#[test]
fn limits_fall_back_to_defaults() {
	let payload = "[service]\n\n[search]\nengine = \"memory\"\n".to_string();
	let path = write_temp_config(payload);
	let result = rubric_config::load(&path);

	fs::remove_file(&path).expect("Failed to remove test config.");

	let cfg = result.expect("Expected config with defaults to load.");

	assert_eq!(cfg.search.default_limit, 50);
	assert_eq!(cfg.search.max_limit, 1_000);
	assert_eq!(cfg.service.log_level, "info");
}

#[test]
fn missing_engine_is_a_parse_error() {
	let path = write_temp_config("[service]\n\n[search]\ndefault_limit = 10\n".to_string());
	let err = rubric_config::load(&path).expect_err("Expected parse error.");

	fs::remove_file(&path).expect("Failed to remove test config.");

	let message = match err {
		Error::Parse { source, .. } => source.to_string(),
		err => panic!("Expected parse config error, got {err}"),
	};

	assert!(message.contains("missing field `engine`"), "Unexpected parse error: {message}");
}

#[test]
fn missing_file_is_a_read_error() {
	let mut path = env::temp_dir();

	path.push("rubric_config_test_does_not_exist.toml");

	assert!(matches!(rubric_config::load(&path), Err(Error::Read { .. })));
}
