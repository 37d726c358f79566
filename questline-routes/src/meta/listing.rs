use axum::Json;

use crate::{ROUTES, RouteMeta};

pub const META: RouteMeta = RouteMeta {
    method: "GET",
    path: "/routes",
    desc: "List every route with its method and whether it needs a token.",
    auth: false,
};

pub async fn listing() -> Json<&'static [RouteMeta]> {
    Json(ROUTES)
}
