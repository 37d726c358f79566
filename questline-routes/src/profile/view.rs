use axum::Json;
use axum::extract::State;

use questline_core::AppState;
use questline_core::merge::{ProfileView, profile_view};
use questline_database::impls::profiles::get_or_create_profile;

use crate::RouteMeta;
use crate::error::AppError;
use crate::extract::AuthUser;

pub const META: RouteMeta = RouteMeta {
    method: "GET",
    path: "/profile",
    desc: "Return the learner's profile, creating it on first use.",
    auth: true,
};

pub async fn view(
    AuthUser(identity): AuthUser,
    State(state): State<AppState>,
) -> Result<Json<ProfileView>, AppError> {
    let catalog = state.catalog.courses(&state.db).await?;
    let profile = get_or_create_profile(&state.db, &identity.uid, &identity.email, &catalog).await?;

    Ok(Json(profile_view(&profile, &catalog)))
}
