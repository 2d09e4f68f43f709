use axum::extract::{Path, State};

use super::AppState;
use crate::middleware::{ApiResponse, ApiResult};
use crate::models::Job;

/// GET /companies/:handle/jobs
pub async fn company_jobs(
    State(state): State<AppState>,
    Path(handle): Path<String>,
) -> ApiResult<Vec<Job>> {
    let jobs = state.jobs().find_for_company(&handle).await?;
    Ok(ApiResponse::success("jobs", jobs))
}
