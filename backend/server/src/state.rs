use std::{io, sync::Arc};

use tokio::fs;
use tracing::info;

use super::{config::Config, database::JsonStore};

pub struct State {
    pub config: Config,
    pub store: JsonStore,
}

impl State {
    pub async fn new() -> Arc<Self> {
        Self::with_config(Config::load())
            .await
            .expect("Uploads directory misconfigured!")
    }

    pub async fn with_config(config: Config) -> io::Result<Arc<Self>> {
        fs::create_dir_all(&config.uploads_dir).await?;
        info!("Serving uploads from {}", config.uploads_dir.display());

        let store = JsonStore::new(&config.data_dir);
        info!("Storing records in {}", config.data_dir.display());

        Ok(Arc::new(Self { config, store }))
    }
}
