use redis::aio::ConnectionManager;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur with cache operations
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Redis error: {0}")]
    RedisError(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Cache miss: {0}")]
    CacheMiss(String),
}

/// Two-tier cache for read-heavy engine data (preferences, locations).
///
/// L1 is a per-process moka cache, L2 is Redis shared across instances.
/// Match results themselves are never cached; only their inputs are, so a
/// preference save plus invalidation is immediately visible.
pub struct CacheManager {
    redis: ConnectionManager,
    l1_cache: moka::future::Cache<String, Vec<u8>>,
    ttl_secs: u64,
}

impl CacheManager {
    pub async fn new(redis_url: &str, l1_size: u64, ttl_secs: u64) -> Result<Self, CacheError> {
        let client = redis::Client::open(redis_url)?;
        let redis = ConnectionManager::new(client).await?;

        let l1_cache = moka::future::CacheBuilder::new(l1_size)
            .time_to_live(Duration::from_secs(ttl_secs))
            .build();

        Ok(Self {
            redis,
            l1_cache,
            ttl_secs,
        })
    }

    /// Get a value from cache (L1 first, then L2)
    pub async fn get<T>(&self, key: &str) -> Result<T, CacheError>
    where
        T: for<'de> Deserialize<'de>,
    {
        if let Some(bytes) = self.l1_cache.get(key).await {
            tracing::trace!("L1 cache hit: {}", key);
            return Ok(serde_json::from_slice(&bytes)?);
        }

        // ConnectionManager is Clone; each call gets its own handle
        let mut conn = self.redis.clone();
        let value: Option<String> = redis::cmd("GET").arg(key).query_async(&mut conn).await?;

        if let Some(json) = value {
            tracing::trace!("L2 cache hit: {}", key);
            self.l1_cache
                .insert(key.to_string(), json.as_bytes().to_vec())
                .await;
            return Ok(serde_json::from_str(&json)?);
        }

        tracing::trace!("Cache miss: {}", key);
        Err(CacheError::CacheMiss(key.to_string()))
    }

    /// Set a value in both tiers
    pub async fn set<T>(&self, key: &str, value: &T) -> Result<(), CacheError>
    where
        T: Serialize,
    {
        let json = serde_json::to_string(value)?;

        self.l1_cache
            .insert(key.to_string(), json.as_bytes().to_vec())
            .await;

        let mut conn = self.redis.clone();
        redis::cmd("SETEX")
            .arg(key)
            .arg(self.ttl_secs)
            .arg(json)
            .query_async::<()>(&mut conn)
            .await?;

        tracing::trace!("Cache set: {}", key);
        Ok(())
    }

    /// Delete a value from both tiers
    pub async fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.l1_cache.invalidate(key).await;
        let mut conn = self.redis.clone();
        redis::cmd("DEL").arg(key).query_async::<()>(&mut conn).await?;
        Ok(())
    }
}

/// Cache key builder
pub struct CacheKey;

impl CacheKey {
    /// Build a cache key for user match preferences
    pub fn preferences(user_id: i64) -> String {
        format!("match:prefs:{}", user_id)
    }

    /// Build a cache key for a user's home location
    pub fn location(user_id: i64) -> String {
        format!("match:location:{}", user_id)
    }

    /// Build a cache key for a user's hidden listing set
    pub fn hidden(user_id: i64) -> String {
        format!("match:hidden:{}", user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[ignore = "Requires Redis"]
    async fn test_cache_set_get() {
        let cache = CacheManager::new("redis://127.0.0.1:6379", 1000, 60)
            .await
            .expect("Failed to create cache");

        let key = "test_key";
        let value = "test_value";

        cache.set(key, &value).await.unwrap();
        let result: String = cache.get(key).await.unwrap();
        assert_eq!(result, value);

        cache.delete(key).await.unwrap();
        assert!(cache.get::<String>(key).await.is_err());
    }

    #[test]
    fn test_cache_key_builder() {
        assert_eq!(CacheKey::preferences(42), "match:prefs:42");
        assert_eq!(CacheKey::location(42), "match:location:42");
        assert_eq!(CacheKey::hidden(42), "match:hidden:42");
    }
}
