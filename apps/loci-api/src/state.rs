use std::sync::Arc;

use color_eyre::eyre;

use loci_service::LociService;
use loci_storage::{LocationStore, db::Db, memory::MemoryStore};

#[derive(Clone)]
pub struct AppState {
	pub service: Arc<LociService>,
}
impl AppState {
	pub async fn new(config: loci_config::Config) -> color_eyre::Result<Self> {
		let store: Arc<dyn LocationStore> = match config.storage.backend.as_str() {
			"memory" => {
				tracing::warn!("Using the in-memory store. Data is lost on restart.");

				Arc::new(MemoryStore::new())
			},
			"postgres" => {
				let postgres = config.storage.postgres.as_ref().ok_or_else(|| {
					eyre::eyre!("storage.postgres is required when storage.backend is postgres.")
				})?;
				let db = Db::connect(postgres).await?;

				db.ensure_schema().await?;

				Arc::new(db)
			},
			other => return Err(eyre::eyre!("Unsupported storage backend {other:?}.")),
		};

		Ok(Self::from_service(LociService::new(config, store)))
	}

	pub fn from_service(service: LociService) -> Self {
		Self { service: Arc::new(service) }
	}
}
