pub mod compile;
pub mod error;
pub mod extract;
pub mod meta;
pub mod profile;
pub mod validate;

use axum::Router;
use axum::routing::{get, post, put};
use serde::Serialize;

use questline_core::AppState;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct RouteMeta {
    pub method: &'static str,
    pub path: &'static str,
    pub desc: &'static str,
    /// Whether a bearer token is required.
    pub auth: bool,
}

pub const ROUTES: &[RouteMeta] = &[
    meta::health::META,
    meta::listing::META,
    profile::view::META,
    profile::select_pet::META,
    validate::theoretical::META,
    validate::sub_level::META,
    compile::META,
];

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(meta::health::health))
        .route("/routes", get(meta::listing::listing))
        .route("/profile", get(profile::view::view))
        .route("/select-pet", put(profile::select_pet::select_pet))
        .route(
            "/validate/course/:course_id/theoretical",
            post(validate::theoretical::theoretical),
        )
        .route(
            "/validate/course/:course_id/:sub_level",
            post(validate::sub_level::sub_level),
        )
        .route("/compile", post(compile::compile))
        .with_state(state)
}
