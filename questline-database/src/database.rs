use sqlx::{PgPool, migrate::Migrator};

use crate::cache::CacheService;
use crate::model::course::Course;
use crate::store::MemoryStore;

/// Compile-time discovered SQLx migrations for the `questline-database` crate.
pub static MIGRATOR: Migrator = sqlx::migrate!();

#[derive(Clone, Debug)]
pub(crate) enum StoreBackend {
    Postgres(PgPool),
    Memory(MemoryStore),
}

/// Shared database handle passed across crates.
#[derive(Clone, Debug)]
pub struct Database {
    backend: StoreBackend,
    cache: CacheService,
}

impl Database {
    /// Create a Postgres-backed handle from an existing pool and cache service.
    pub fn with_cache(pool: PgPool, cache: CacheService) -> Self {
        Self {
            backend: StoreBackend::Postgres(pool),
            cache,
        }
    }

    /// Process-local store seeded with `catalog`. Nothing survives a restart.
    pub fn in_memory(catalog: Vec<Course>) -> Self {
        Self {
            backend: StoreBackend::Memory(MemoryStore::new(catalog)),
            cache: CacheService::disabled("questline:memory"),
        }
    }

    /// The Postgres pool, if this handle is Postgres-backed.
    pub fn pool(&self) -> Option<&PgPool> {
        match &self.backend {
            StoreBackend::Postgres(pool) => Some(pool),
            StoreBackend::Memory(_) => None,
        }
    }

    pub fn is_persistent(&self) -> bool {
        self.pool().is_some()
    }

    /// Expose the cache service for query modules.
    pub fn cache(&self) -> &CacheService {
        &self.cache
    }

    pub(crate) fn backend(&self) -> &StoreBackend {
        &self.backend
    }
}
