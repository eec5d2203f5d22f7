mod error;
mod types;

pub use error::{Error, Result};
pub use types::{Config, Search, Service};

use std::{fs, path::Path};

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|source| Error::Read { path: path.to_path_buf(), source })?;
	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|source| Error::Parse { path: path.to_path_buf(), source })?;

	normalize(&mut cfg);
	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.log_level.trim().is_empty() {
		return Err(Error::invalid("service.log_level", "must be non-empty."));
	}
	if cfg.search.engine.trim().is_empty() {
		return Err(Error::invalid("search.engine", "must be non-empty."));
	}
	if cfg.search.default_limit == 0 {
		return Err(Error::invalid("search.default_limit", "must be greater than zero."));
	}
	if cfg.search.max_limit < cfg.search.default_limit {
		return Err(Error::invalid(
			"search.max_limit",
			"must be greater than or equal to search.default_limit.",
		));
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	cfg.search.engine = cfg.search.engine.trim().to_lowercase();
	cfg.service.log_level = cfg.service.log_level.trim().to_string();
}
