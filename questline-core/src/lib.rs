pub mod auth;
pub mod merge;
pub mod profiles;
pub mod progress;

use questline_database::{CatalogCache, Database};
use questline_runner::RunnerService;

use auth::TokenVerifier;

pub type Error = anyhow::Error;

/// Shared state handed to every request handler.
#[derive(Clone, Debug)]
pub struct AppState {
    pub db: Database,
    pub catalog: CatalogCache,
    pub auth: TokenVerifier,
    pub runner: Option<RunnerService>,
}
