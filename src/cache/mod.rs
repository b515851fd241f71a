//! 对象缓存层
//!
//! 缓存后端以插件形式注册，启动时按 `cache.type` 选择。

pub mod object_cache;
pub mod register;

use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};

/// 缓存查询结果
#[derive(Debug, Clone, PartialEq)]
pub enum CacheResult<T> {
    Found(T),
    NotFound,
}

#[async_trait]
pub trait ObjectCache: Send + Sync {
    async fn get_raw(&self, key: &str) -> CacheResult<String>;
    /// `ttl` 为秒，0 表示使用后端默认值
    async fn insert_raw(&self, key: String, value: String, ttl: u64);
    async fn remove(&self, key: &str);
    async fn invalidate_all(&self);
}

impl dyn ObjectCache {
    /// 读取并反序列化，格式不匹配时视为未命中
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> CacheResult<T> {
        match self.get_raw(key).await {
            CacheResult::Found(raw) => match serde_json::from_str::<T>(&raw) {
                Ok(value) => CacheResult::Found(value),
                Err(e) => {
                    tracing::warn!("Cache entry {} has unexpected shape: {}", key, e);
                    self.remove(key).await;
                    CacheResult::NotFound
                }
            },
            CacheResult::NotFound => CacheResult::NotFound,
        }
    }

    pub async fn insert<T: Serialize>(&self, key: String, value: &T, ttl: u64) {
        match serde_json::to_string(value) {
            Ok(raw) => self.insert_raw(key, raw, ttl).await,
            Err(e) => tracing::warn!("Failed to serialize cache entry {}: {}", key, e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::object_cache::moka::MokaCacheWrapper;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_typed_roundtrip_and_remove() {
        let cache: Arc<dyn ObjectCache> = Arc::new(MokaCacheWrapper::with_settings(100, 60));
        cache.insert("user:1".to_string(), &vec![1_i64, 2, 3], 0).await;

        assert_eq!(
            cache.get::<Vec<i64>>("user:1").await,
            CacheResult::Found(vec![1, 2, 3])
        );

        cache.remove("user:1").await;
        assert_eq!(cache.get::<Vec<i64>>("user:1").await, CacheResult::NotFound);
    }

    #[tokio::test]
    async fn test_mismatched_shape_is_a_miss() {
        let cache: Arc<dyn ObjectCache> = Arc::new(MokaCacheWrapper::with_settings(100, 60));
        cache
            .insert_raw("k".to_string(), "not json".to_string(), 0)
            .await;
        assert_eq!(cache.get::<i64>("k").await, CacheResult::NotFound);
    }
}
