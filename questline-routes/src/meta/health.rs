use axum::Json;
use serde::Serialize;

use crate::RouteMeta;

pub const META: RouteMeta = RouteMeta {
    method: "GET",
    path: "/health",
    desc: "Liveness probe with the server version.",
    auth: false,
};

#[derive(Serialize)]
pub struct Health {
    pub status: &'static str,
    pub version: &'static str,
}

pub async fn health() -> Json<Health> {
    Json(Health {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}
