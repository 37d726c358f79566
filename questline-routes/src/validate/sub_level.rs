use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use questline_core::AppState;
use questline_core::merge::{ProfileView, profile_view};
use questline_core::profiles::update_profile;
use questline_core::progress::{AwardOutcome, complete_sub_level};
use questline_database::impls::profiles::get_or_create_profile;
use questline_utils::java::evaluate;

use super::{find_course, sub_level_rules};
use crate::RouteMeta;
use crate::error::AppError;
use crate::extract::AuthUser;

pub const META: RouteMeta = RouteMeta {
    method: "POST",
    path: "/validate/course/{id}/{sub_level}",
    desc: "Check submitted code against a sub-level's rules and record completion.",
    auth: true,
};

const VALIDATION_FAILED: &str = "validation failed";

#[derive(Deserialize)]
pub struct SubmissionRequest {
    pub code: String,
}

#[derive(Serialize)]
pub struct SubLevelResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<&'static str>,
    pub profile: ProfileView,
    pub passed: Vec<String>,
    pub failed: Vec<String>,
    #[serde(flatten)]
    pub award: Option<AwardOutcome>,
}

/// A failing submission is still a 200: the body carries the missing codes
/// and the untouched profile.
pub async fn sub_level(
    AuthUser(identity): AuthUser,
    State(state): State<AppState>,
    path: Result<Path<(u64, u32)>, PathRejection>,
    payload: Result<Json<SubmissionRequest>, JsonRejection>,
) -> Result<Json<SubLevelResponse>, AppError> {
    let Path((course_id, sub_level)) = path?;
    let (catalog, course) = find_course(&state, course_id).await?;

    let rules = sub_level_rules(course_id, sub_level)
        .filter(|_| course.has_sub_level(sub_level))
        .ok_or_else(|| AppError::NotFound(format!("sub-level {sub_level} of course {course_id}")))?;

    let Json(request) = payload?;
    let report = evaluate(rules, &request.code);

    if !report.is_success() {
        debug!(uid = %identity.uid, course_id, sub_level, failed = ?report.failed, "Submission rejected.");
        let profile = get_or_create_profile(&state.db, &identity.uid, &identity.email, &catalog).await?;

        return Ok(Json(SubLevelResponse {
            error: Some(VALIDATION_FAILED),
            profile: profile_view(&profile, &catalog),
            passed: report.passed,
            failed: report.failed,
            award: None,
        }));
    }

    let (profile, award) = update_profile(&state.db, &identity, &catalog, |profile| {
        complete_sub_level(profile, &course, sub_level)
    })
    .await?;

    if award.xp_awarded > 0 {
        info!(
            uid = %identity.uid,
            course_id,
            sub_level,
            xp = award.xp_awarded,
            level_up = award.level_up,
            "Sub-level completed."
        );
    }

    Ok(Json(SubLevelResponse {
        error: None,
        profile: profile_view(&profile, &catalog),
        passed: report.passed,
        failed: report.failed,
        award: Some(award),
    }))
}
