pub mod cache;
pub mod database;
pub mod impls;
pub mod model;
pub mod store;

pub use cache::{CacheService, CatalogCache};
pub use database::{Database, MIGRATOR};
pub use store::SaveOutcome;
