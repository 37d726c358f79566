mod catalog;
mod redis_store;

use std::future::Future;
use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::warn;

use redis_store::RedisCacheStore;

pub use catalog::CatalogCache;

/// Redis lifetime of the shared catalog copy.
///
/// Each process also holds its own snapshot for up to an hour, so a catalog
/// edit shows after at most this plus that refresh interval.
pub const CATALOG_CACHE_TTL: Duration = Duration::from_secs(5 * 60);

#[derive(Clone, Debug)]
enum CacheBackend {
    Disabled,
    Redis(RedisCacheStore),
}

/// Optional shared JSON cache in front of the store.
///
/// Failures never surface to callers of [`CacheService::get_or_load_json`];
/// they are logged and the loader's value is used instead.
#[derive(Clone, Debug)]
pub struct CacheService {
    key_prefix: String,
    backend: CacheBackend,
}

impl CacheService {
    pub fn disabled(prefix: impl Into<String>) -> Self {
        Self {
            key_prefix: prefix.into(),
            backend: CacheBackend::Disabled,
        }
    }

    pub fn redis(redis_url: &str, prefix: impl Into<String>) -> anyhow::Result<Self> {
        Ok(Self {
            key_prefix: prefix.into(),
            backend: CacheBackend::Redis(RedisCacheStore::from_url(redis_url)?),
        })
    }

    pub fn is_redis_enabled(&self) -> bool {
        matches!(self.backend, CacheBackend::Redis(_))
    }

    pub fn key(&self, suffix: impl AsRef<str>) -> String {
        format!("{}:{}", self.key_prefix, suffix.as_ref())
    }

    pub async fn ping(&self) -> anyhow::Result<()> {
        match &self.backend {
            CacheBackend::Disabled => Ok(()),
            CacheBackend::Redis(store) => store.ping().await,
        }
    }

    pub async fn get_json<T>(&self, key: &str) -> anyhow::Result<Option<T>>
    where
        T: DeserializeOwned,
    {
        let bytes = match &self.backend {
            CacheBackend::Disabled => return Ok(None),
            CacheBackend::Redis(store) => store.get(key).await?,
        };

        bytes
            .map(|bytes| {
                serde_json::from_slice(&bytes).map_err(|e| {
                    anyhow::anyhow!("failed to deserialize cache value for `{key}`: {e}")
                })
            })
            .transpose()
    }

    pub async fn set_json<T>(&self, key: &str, value: &T, ttl: Duration) -> anyhow::Result<()>
    where
        T: Serialize,
    {
        let CacheBackend::Redis(store) = &self.backend else {
            return Ok(());
        };

        let payload = serde_json::to_vec(value)
            .map_err(|e| anyhow::anyhow!("failed to serialize cache value for `{key}`: {e}"))?;
        store.set(key, payload, ttl.as_secs().max(1)).await
    }

    pub async fn get_or_load_json<T, F, Fut>(
        &self,
        key: &str,
        ttl: Duration,
        loader: F,
    ) -> anyhow::Result<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = anyhow::Result<T>>,
    {
        match self.get_json::<T>(key).await {
            Ok(Some(cached)) => return Ok(cached),
            Ok(None) => {}
            Err(e) => warn!(?e, cache_key = key, "cache get failed; falling back to store"),
        }

        let loaded = loader().await?;

        if let Err(e) = self.set_json(key, &loaded, ttl).await {
            warn!(?e, cache_key = key, "cache set failed; returning store value");
        }

        Ok(loaded)
    }
}

pub fn catalog_key(cache: &CacheService) -> String {
    cache.key("catalog:courses")
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::{CATALOG_CACHE_TTL, CacheService, catalog_key};

    #[test]
    fn keys_are_prefixed() {
        let cache = CacheService::disabled("questline:test");
        assert_eq!(catalog_key(&cache), "questline:test:catalog:courses");
        assert!(!cache.is_redis_enabled());
    }

    #[test]
    fn shared_catalog_copy_expires_well_within_the_hourly_refresh() {
        assert!(CATALOG_CACHE_TTL <= Duration::from_secs(60 * 60) / 10);
    }

    #[tokio::test]
    async fn disabled_cache_always_loads() {
        let cache = CacheService::disabled("questline:test");
        cache
            .set_json("k", &vec![1, 2, 3], Duration::from_secs(5))
            .await
            .expect("noop set");
        assert_eq!(cache.get_json::<Vec<i32>>("k").await.expect("noop get"), None);

        let value = cache
            .get_or_load_json("k", Duration::from_secs(5), || async { Ok(vec![4, 5]) })
            .await
            .expect("loader value");
        assert_eq!(value, vec![4, 5]);
    }
}
