use crate::api;
use crate::bootstrap;
use crate::cache::PostCache;
use crate::config::SubcurrentConfig;
use crate::database::Database;
use anyhow::Result;

/// Convenience wrapper that bootstraps the backend once and hands out cloned
/// handles for whichever entrypoint needs them.
pub struct SubcurrentNode {
    config: SubcurrentConfig,
    database: Database,
    cache: PostCache,
}

impl SubcurrentNode {
    /// Creates directories, runs migrations, and connects the snapshot cache.
    pub async fn start(config: SubcurrentConfig) -> Result<Self> {
        let bootstrap = bootstrap::initialize(&config)?;

        let cache = match &config.cache.redis_url {
            Some(url) => PostCache::connect(url).await,
            None => {
                tracing::info!("no redis url configured, post snapshot cache disabled");
                PostCache::disabled()
            }
        };

        tracing::info!(
            directories_created = ?bootstrap.directories_created,
            database_initialized = bootstrap.database_initialized,
            cache_enabled = cache.is_enabled(),
            "subcurrent node initialized"
        );

        Ok(Self {
            config,
            database: bootstrap.database,
            cache,
        })
    }

    pub fn database(&self) -> Database {
        self.database.clone()
    }

    pub async fn run_http_server(self) -> Result<()> {
        api::serve_http(self.config, self.database, self.cache).await
    }
}
