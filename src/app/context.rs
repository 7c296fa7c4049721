use std::path::PathBuf;
use std::sync::Arc;

use crate::app::error::{HarvestError, Result};
use crate::config::{Config, SinkKind};
use crate::store::{HttpSink, Sink, SqliteStore};

pub struct AppContext {
    pub config: Config,
    pub config_path: PathBuf,
}

impl AppContext {
    /// Load the configuration from `config_path`, or from the default location.
    pub fn new(config_path: Option<PathBuf>) -> Result<Self> {
        let config_path = match config_path {
            Some(p) => p,
            None => Config::default_config_path().map_err(|e| HarvestError::Config(e.to_string()))?,
        };
        let config =
            Config::load_from(&config_path).map_err(|e| HarvestError::Config(e.to_string()))?;

        Ok(Self {
            config,
            config_path,
        })
    }

    pub fn with_config(config: Config) -> Self {
        Self {
            config,
            config_path: PathBuf::new(),
        }
    }

    /// Build the sink selected in the configuration
    pub fn sink(&self) -> Result<Arc<dyn Sink>> {
        let sink: Arc<dyn Sink> = match self.config.sink.kind {
            SinkKind::Http => Arc::new(HttpSink::new(self.config.sink.url.clone())?),
            SinkKind::Sqlite => Arc::new(self.open_store()?),
        };
        Ok(sink)
    }

    pub fn open_store(&self) -> Result<SqliteStore> {
        let db_path = match self.config.sink.database {
            Some(ref p) => p.clone(),
            None => Self::default_db_path()?,
        };
        SqliteStore::new(&db_path)
    }

    fn default_db_path() -> Result<PathBuf> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| HarvestError::Config("Could not find data directory".into()))?;
        let app_dir = data_dir.join("scrollharvest");
        std::fs::create_dir_all(&app_dir)?;
        Ok(app_dir.join("entries.db"))
    }
}
