// Route handlers, grouped by resource. Authorization is applied by the
// router in lib.rs, so handlers assume their guard has already passed.
pub mod companies;
pub mod health;
pub mod jobs;

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::Json;
use serde_json::Value;

use crate::database::QueryExecutor;
use crate::error::ApiError;
use crate::models::Jobs;

/// Shared handler state: the executor every model query goes through.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<dyn QueryExecutor>,
}

impl AppState {
    pub fn new(db: Arc<dyn QueryExecutor>) -> Self {
        Self { db }
    }

    pub fn jobs(&self) -> Jobs<Arc<dyn QueryExecutor>> {
        Jobs::new(self.db.clone())
    }
}

/// Unwrap a JSON body, turning axum's rejection into a JSON 400.
pub(crate) fn json_body(body: Result<Json<Value>, JsonRejection>) -> Result<Value, ApiError> {
    body.map(|Json(value)| value)
        .map_err(|rejection| ApiError::bad_request(rejection.body_text()))
}
