use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use serde::{Deserialize, Serialize};
use tracing::info;

use questline_core::AppState;
use questline_core::merge::{ProfileView, profile_view};
use questline_core::profiles::update_profile;
use questline_core::progress::{TheoreticalOutcome, record_theoretical_score};
use questline_utils::grade::MAX_SCORE;

use super::find_course;
use crate::RouteMeta;
use crate::error::AppError;
use crate::extract::AuthUser;

pub const META: RouteMeta = RouteMeta {
    method: "POST",
    path: "/validate/course/{id}/theoretical",
    desc: "Record a theoretical quiz score; only improvements are kept.",
    auth: true,
};

#[derive(Deserialize)]
pub struct ScoreRequest {
    pub score: u32,
}

#[derive(Serialize)]
pub struct TheoreticalResponse {
    pub profile: ProfileView,
    #[serde(flatten)]
    pub outcome: TheoreticalOutcome,
}

pub async fn theoretical(
    AuthUser(identity): AuthUser,
    State(state): State<AppState>,
    path: Result<Path<u64>, PathRejection>,
    payload: Result<Json<ScoreRequest>, JsonRejection>,
) -> Result<Json<TheoreticalResponse>, AppError> {
    let Path(course_id) = path?;
    let (catalog, course) = find_course(&state, course_id).await?;

    let Json(request) = payload?;
    if request.score > MAX_SCORE {
        return Err(AppError::BadRequest(format!(
            "score must be between 0 and {MAX_SCORE}"
        )));
    }

    let (profile, outcome) = update_profile(&state.db, &identity, &catalog, |profile| {
        record_theoretical_score(profile, &course, request.score)
    })
    .await?;

    if outcome.score_difference > 0 {
        info!(
            uid = %identity.uid,
            course_id,
            score = request.score,
            grade = outcome.grade.as_str(),
            xp = outcome.award.xp_awarded,
            "Theoretical score improved."
        );
    }

    Ok(Json(TheoreticalResponse {
        profile: profile_view(&profile, &catalog),
        outcome,
    }))
}
