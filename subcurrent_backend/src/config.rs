use anyhow::{anyhow, Result};
use std::env;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct SubcurrentConfig {
    pub api_port: u16,
    pub paths: SubcurrentPaths,
    pub cache: CacheConfig,
}

impl SubcurrentConfig {
    pub fn from_env() -> Result<Self> {
        let paths = SubcurrentPaths::discover()?;
        let api_port = env::var("SUBCURRENT_API_PORT")
            .ok()
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(8080);
        let cache = CacheConfig::from_env();
        Ok(Self {
            api_port,
            paths,
            cache,
        })
    }

    pub fn new(api_port: u16, paths: SubcurrentPaths, cache: CacheConfig) -> Self {
        Self {
            api_port,
            paths,
            cache,
        }
    }
}

/// Connection settings for the post-snapshot cache store. When no URL is
/// configured the cache stays disabled and snapshot writes are skipped.
#[derive(Debug, Clone, Default)]
pub struct CacheConfig {
    pub redis_url: Option<String>,
}

impl CacheConfig {
    pub fn from_env() -> Self {
        let redis_url = env::var("SUBCURRENT_REDIS_URL").ok().and_then(|raw| {
            if raw.trim().is_empty() {
                None
            } else {
                Some(raw)
            }
        });
        Self { redis_url }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SubcurrentPaths {
    pub base: PathBuf,
    pub data_dir: PathBuf,
    pub db_path: PathBuf,
}

impl SubcurrentPaths {
    pub fn discover() -> Result<Self> {
        let exe_path = std::env::current_exe()
            .map_err(|err| anyhow!("failed to resolve current executable: {err}"))?;
        let base = exe_path
            .parent()
            .ok_or_else(|| anyhow!("executable path missing parent"))?
            .to_path_buf();
        Ok(Self::from_base_dir(base))
    }

    pub fn from_base_dir<P: AsRef<Path>>(base: P) -> Self {
        let base = base.as_ref().to_path_buf();
        let data_dir = base.join("data");
        let db_path = data_dir.join("subcurrent.db");
        Self {
            base,
            data_dir,
            db_path,
        }
    }
}
