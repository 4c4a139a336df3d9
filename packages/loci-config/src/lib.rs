mod error;
mod types;

pub use error::{Error, Result};
pub use types::{Config, Places, Postgres, Security, Service, Storage};

use std::{fs, path::Path};

pub const MAX_IMPORT_BATCH_CEILING: u32 = 50;

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	parse(&raw).map_err(|err| match err {
		Error::ParseConfig { source, .. } => Error::ParseConfig { path: path.to_path_buf(), source },
		other => other,
	})
}

pub fn parse(raw: &str) -> Result<Config> {
	let mut cfg: Config = toml::from_str(raw)
		.map_err(|err| Error::ParseConfig { path: Default::default(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	for (label, value) in
		[("service.http_bind", &cfg.service.http_bind), ("service.admin_bind", &cfg.service.admin_bind)]
	{
		if value.trim().is_empty() {
			return Err(Error::Validation { message: format!("{label} must be non-empty.") });
		}
	}

	match cfg.storage.backend.as_str() {
		"postgres" => {
			let Some(postgres) = cfg.storage.postgres.as_ref() else {
				return Err(Error::Validation {
					message: "storage.postgres is required when storage.backend is postgres."
						.to_string(),
				});
			};

			if postgres.dsn.trim().is_empty() {
				return Err(Error::Validation {
					message: "storage.postgres.dsn must be non-empty.".to_string(),
				});
			}
			if postgres.pool_max_conns == 0 {
				return Err(Error::Validation {
					message: "storage.postgres.pool_max_conns must be greater than zero."
						.to_string(),
				});
			}
		},
		"memory" => {},
		_ => {
			return Err(Error::Validation {
				message: "storage.backend must be one of postgres or memory.".to_string(),
			});
		},
	}

	if cfg.storage.max_write_attempts == 0 {
		return Err(Error::Validation {
			message: "storage.max_write_attempts must be greater than zero.".to_string(),
		});
	}
	if cfg.places.api_base.trim().is_empty() {
		return Err(Error::Validation { message: "places.api_base must be non-empty.".to_string() });
	}
	if cfg.places.timeout_ms == 0 {
		return Err(Error::Validation {
			message: "places.timeout_ms must be greater than zero.".to_string(),
		});
	}
	if !(1..=MAX_IMPORT_BATCH_CEILING).contains(&cfg.places.max_import_batch) {
		return Err(Error::Validation {
			message: format!(
				"places.max_import_batch must be in the range 1-{MAX_IMPORT_BATCH_CEILING}."
			),
		});
	}

	for (key, value) in &cfg.places.default_headers {
		if !value.is_string() {
			return Err(Error::Validation {
				message: format!("places.default_headers.{key} must be a string."),
			});
		}
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	cfg.storage.backend = cfg.storage.backend.trim().to_ascii_lowercase();
	cfg.places.api_base = cfg.places.api_base.trim().trim_end_matches('/').to_string();

	if cfg.places.api_key.as_deref().map(|key| key.trim().is_empty()).unwrap_or(false) {
		cfg.places.api_key = None;
	}
}
