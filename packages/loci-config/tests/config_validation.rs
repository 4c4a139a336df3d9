use std::{
	env, fs,
	path::PathBuf,
	sync::atomic::{AtomicU64, Ordering},
	time::{SystemTime, UNIX_EPOCH},
};

use toml::Value;

use loci_config::{Config, Error};

const SAMPLE_CONFIG_TOML: &str = include_str!("fixtures/sample_config.toml");

fn sample_with(section: &str, key: &str, value: Value) -> String {
	let mut root: Value = toml::from_str(SAMPLE_CONFIG_TOML).expect("Failed to parse sample config.");
	let mut table = root.as_table_mut().expect("Sample config must be a table.");

	for part in section.split('.') {
		table = table
			.get_mut(part)
			.and_then(Value::as_table_mut)
			.unwrap_or_else(|| panic!("Sample config must include [{section}]."));
	}

	table.insert(key.to_string(), value);

	toml::to_string(&root).expect("Failed to render sample config.")
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

	path.push(format!("loci_config_test_{nanos}_{pid}_{ordinal}.toml"));

	fs::write(&path, payload).expect("Failed to write test config.");

	path
}

fn validation_message(payload: String) -> String {
	match loci_config::parse(&payload) {
		Err(Error::Validation { message }) => message,
		Err(other) => panic!("Expected validation error, got {other}."),
		Ok(_) => panic!("Expected validation error, got a valid config."),
	}
}

#[test]
fn sample_config_loads_and_normalizes() {
	let path = write_temp_config(SAMPLE_CONFIG_TOML.to_string());
	let result = loci_config::load(&path);

	fs::remove_file(&path).expect("Failed to remove test config.");

	let cfg: Config = result.expect("Sample config must be valid.");

	assert_eq!(cfg.storage.backend, "postgres");
	assert_eq!(cfg.storage.max_write_attempts, 8);
	assert_eq!(cfg.places.api_base, "https://api.foursquare.com");
	assert_eq!(cfg.places.max_import_batch, 10);
}

#[test]
fn missing_file_reports_path() {
	let path = env::temp_dir().join("loci_config_test_does_not_exist.toml");
	let err = loci_config::load(&path).expect_err("Expected read error.");

	assert!(matches!(err, Error::ReadConfig { .. }), "Unexpected error: {err}");
	assert!(err.to_string().contains("loci_config_test_does_not_exist"));
}

#[test]
fn parse_errors_carry_the_file_path() {
	let path = write_temp_config("[service\nhttp_bind = ".to_string());
	let result = loci_config::load(&path);

	fs::remove_file(&path).expect("Failed to remove test config.");

	match result {
		Err(Error::ParseConfig { path: reported, .. }) => assert_eq!(reported, path),
		other => panic!("Expected parse error, got {other:?}."),
	}
}

#[test]
fn backend_must_be_known() {
	let message = validation_message(sample_with("storage", "backend", Value::from("mongo")));

	assert_eq!(message, "storage.backend must be one of postgres or memory.");
}

#[test]
fn memory_backend_does_not_need_postgres() {
	let mut root: Value = toml::from_str(SAMPLE_CONFIG_TOML).expect("Failed to parse sample config.");
	let storage = root
		.get_mut("storage")
		.and_then(Value::as_table_mut)
		.expect("Sample config must include [storage].");

	storage.remove("postgres");
	storage.insert("backend".to_string(), Value::from(" Memory "));

	let cfg = loci_config::parse(&toml::to_string(&root).expect("Failed to render config."))
		.expect("Memory backend config must be valid.");

	assert_eq!(cfg.storage.backend, "memory");
	assert!(cfg.storage.postgres.is_none());
}

#[test]
fn postgres_backend_requires_pool_connections() {
	let message =
		validation_message(sample_with("storage.postgres", "pool_max_conns", Value::from(0)));

	assert_eq!(message, "storage.postgres.pool_max_conns must be greater than zero.");
}

#[test]
fn write_attempts_must_be_positive() {
	let message = validation_message(sample_with("storage", "max_write_attempts", Value::from(0)));

	assert_eq!(message, "storage.max_write_attempts must be greater than zero.");
}

#[test]
fn import_batch_has_a_ceiling() {
	let message = validation_message(sample_with("places", "max_import_batch", Value::from(51)));

	assert_eq!(message, "places.max_import_batch must be in the range 1-50.");
}

#[test]
fn blank_api_key_is_treated_as_absent() {
	let cfg = loci_config::parse(&sample_with("places", "api_key", Value::from("   ")))
		.expect("Blank api key must be accepted.");

	assert!(cfg.places.api_key.is_none());
}

#[test]
fn default_headers_must_be_strings() {
	let message = validation_message(sample_with("places.default_headers", "X-Trace", Value::from(1)));

	assert_eq!(message, "places.default_headers.X-Trace must be a string.");
}
