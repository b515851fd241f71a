use async_trait::async_trait;
use moka::future::Cache;
use tracing::debug;

use crate::cache::register::{BoxedObjectCacheFuture, ObjectCacheConstructor};
use crate::cache::{CacheResult, ObjectCache};
use crate::config::AppConfig;

pub const PLUGIN_NAME: &str = "moka";

pub struct MokaCacheWrapper {
    inner: Cache<String, String>,
}

impl MokaCacheWrapper {
    /// 按全局配置构建
    pub fn new() -> Self {
        let config = AppConfig::get();
        Self::with_settings(config.cache.memory.max_capacity, config.cache.default_ttl)
    }

    pub fn with_settings(max_capacity: u64, default_ttl: u64) -> Self {
        let inner = Cache::builder()
            .max_capacity(max_capacity)
            .time_to_live(std::time::Duration::from_secs(default_ttl))
            .build();

        debug!(
            "MokaCacheWrapper initialized with max capacity: {}",
            max_capacity
        );
        Self { inner }
    }

    pub fn constructor() -> ObjectCacheConstructor {
        std::sync::Arc::new(|| -> BoxedObjectCacheFuture {
            Box::pin(async { Ok(Box::new(MokaCacheWrapper::new()) as Box<dyn ObjectCache>) })
        })
    }
}

impl Default for MokaCacheWrapper {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ObjectCache for MokaCacheWrapper {
    async fn get_raw(&self, key: &str) -> CacheResult<String> {
        if let Some(value) = self.inner.get(key).await {
            debug!("Successfully retrieved key: {}", key);
            CacheResult::Found(value)
        } else {
            debug!("Key not found in cache: {}", key);
            CacheResult::NotFound
        }
    }

    async fn insert_raw(&self, key: String, value: String, ttl: u64) {
        // Moka 使用构建时的全局 TTL
        self.inner.insert(key, value).await;

        if ttl != 0 {
            debug!("Moka cache ignores per-item TTL, using global TTL configuration");
        }
    }

    async fn remove(&self, key: &str) {
        self.inner.invalidate(key).await;
    }

    async fn invalidate_all(&self) {
        self.inner.invalidate_all();
    }
}
