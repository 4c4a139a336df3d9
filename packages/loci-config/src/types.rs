use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	pub storage: Storage,
	pub places: Places,
	pub security: Security,
}

#[derive(Debug, Deserialize)]
pub struct Service {
	pub http_bind: String,
	pub admin_bind: String,
	pub log_level: String,
}

#[derive(Debug, Deserialize)]
pub struct Storage {
	#[serde(default = "default_backend")]
	pub backend: String,
	/// Upper bound on optimistic read-modify-write rounds for a single review mutation.
	#[serde(default = "default_max_write_attempts")]
	pub max_write_attempts: u32,
	pub postgres: Option<Postgres>,
}

#[derive(Debug, Deserialize)]
pub struct Postgres {
	pub dsn: String,
	pub pool_max_conns: u32,
}

/// Third-party place directory used by the import endpoint.
#[derive(Debug, Deserialize)]
pub struct Places {
	pub api_base: String,
	pub api_key: Option<String>,
	pub timeout_ms: u64,
	#[serde(default = "default_max_import_batch")]
	pub max_import_batch: u32,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
pub struct Security {
	pub bind_localhost_only: bool,
}

fn default_backend() -> String {
	"postgres".to_string()
}

fn default_max_write_attempts() -> u32 {
	8
}

fn default_max_import_batch() -> u32 {
	10
}
