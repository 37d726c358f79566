use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use serde::Deserialize;
use tracing::info;

use questline_core::AppState;
use questline_runner::RunOutput;

use crate::RouteMeta;
use crate::error::AppError;

pub const META: RouteMeta = RouteMeta {
    method: "POST",
    path: "/compile",
    desc: "Compile and run a Father/Main Java pair, returning program or compiler output.",
    auth: false,
};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompileRequest {
    pub father_code: String,
    pub main_code: String,
}

pub async fn compile(
    State(state): State<AppState>,
    payload: Result<Json<CompileRequest>, JsonRejection>,
) -> Result<Json<RunOutput>, AppError> {
    let Some(runner) = state.runner.as_ref() else {
        return Err(AppError::NotFound("route".to_owned()));
    };

    let Json(request) = payload?;
    let output = runner
        .compile_and_run(&request.father_code, &request.main_code)
        .await?;

    info!(
        stage = ?output.stage,
        success = output.success,
        timed_out = output.timed_out,
        "Compile request finished."
    );
    Ok(Json(output))
}
