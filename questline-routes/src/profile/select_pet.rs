use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use serde::Deserialize;
use tracing::info;

use questline_core::AppState;
use questline_core::merge::{ProfileView, profile_view};
use questline_core::profiles::update_profile;
use questline_core::progress::{parse_pet, select_pet as apply_pet};

use crate::RouteMeta;
use crate::error::AppError;
use crate::extract::AuthUser;

pub const META: RouteMeta = RouteMeta {
    method: "PUT",
    path: "/select-pet",
    desc: "Pick the learner's avatar pet.",
    auth: true,
};

#[derive(Deserialize)]
pub struct SelectPetRequest {
    pub pet: String,
}

pub async fn select_pet(
    AuthUser(identity): AuthUser,
    State(state): State<AppState>,
    payload: Result<Json<SelectPetRequest>, JsonRejection>,
) -> Result<Json<ProfileView>, AppError> {
    let Json(request) = payload?;
    let pet = parse_pet(&request.pet).map_err(|err| AppError::BadRequest(err.to_string()))?;

    let catalog = state.catalog.courses(&state.db).await?;
    let (profile, ()) = update_profile(&state.db, &identity, &catalog, |profile| {
        apply_pet(profile, pet);
    })
    .await?;

    info!(uid = %identity.uid, pet, "Pet selected.");
    Ok(Json(profile_view(&profile, &catalog)))
}
