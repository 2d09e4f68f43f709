use std::collections::HashMap;

use axum::extract::{rejection::JsonRejection, Path, Query, State};
use axum::Json;
use serde_json::Value;

use super::{json_body, AppState};
use crate::error::ApiError;
use crate::helpers::sql::UpdatePayload;
use crate::middleware::{ApiResponse, ApiResult};
use crate::models::{Job, JobDetail, JobFilter, JobListing, NewJob};

/// GET /jobs?title=&minSalary=&hasEquity=
pub async fn job_list(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<Vec<JobListing>> {
    let filter = JobFilter::from_query(&params)?;
    let jobs = state.jobs().find_all(&filter).await?;
    Ok(ApiResponse::success("jobs", jobs))
}

/// POST /jobs (admin)
pub async fn job_post(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Job> {
    let new_job: NewJob = serde_json::from_value(json_body(body)?)
        .map_err(|e| ApiError::bad_request(e.to_string()))?;
    let job = state.jobs().create(new_job).await?;
    Ok(ApiResponse::created("job", job))
}

/// GET /jobs/:id
pub async fn job_get(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<JobDetail> {
    let job = state.jobs().get(parse_id(&id)?).await?;
    Ok(ApiResponse::success("job", job))
}

/// PATCH /jobs/:id (admin)
pub async fn job_patch(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Job> {
    let id = parse_id(&id)?;
    let payload = match json_body(body)? {
        Value::Object(map) => UpdatePayload::from_json(&map)?,
        _ => return Err(ApiError::bad_request("Request body must be a JSON object")),
    };
    let job = state.jobs().update(id, payload).await?;
    Ok(ApiResponse::success("job", job))
}

/// DELETE /jobs/:id (admin)
pub async fn job_delete(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<i32> {
    let id = parse_id(&id)?;
    state.jobs().remove(id).await?;
    Ok(ApiResponse::success("deleted", id))
}

fn parse_id(raw: &str) -> Result<i32, ApiError> {
    raw.parse::<i32>()
        .map_err(|_| ApiError::bad_request(format!("Invalid job id: {}", raw)))
}
