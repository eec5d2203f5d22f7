use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
	pub service: Service,
	pub search: Search,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Service {
	#[serde(default = "default_log_level")]
	pub log_level: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Search {
	/// Name of the registered search backend, matched case-insensitively.
	pub engine: String,
	/// Page size used when a request does not carry an explicit limit.
	#[serde(default = "default_limit")]
	pub default_limit: usize,
	#[serde(default = "default_max_limit")]
	pub max_limit: usize,
}
impl Default for Search {
	fn default() -> Self {
		Self {
			engine: "memory".to_string(),
			default_limit: default_limit(),
			max_limit: default_max_limit(),
		}
	}
}

fn default_log_level() -> String {
	"info".to_string()
}

fn default_limit() -> usize {
	50
}

fn default_max_limit() -> usize {
	1_000
}
