pub mod company;
pub mod error;
pub mod job;

pub use company::Company;
pub use error::{ModelError, ModelResult};
pub use job::{Job, JobDetail, JobFilter, JobListing, Jobs, NewJob};

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::database::DatabaseError;

/// Decode one executor row into a model struct
pub(crate) fn decode_row<T: DeserializeOwned>(row: Value) -> ModelResult<T> {
    serde_json::from_value(row)
        .map_err(|e| DatabaseError::QueryError(format!("unexpected row shape: {}", e)).into())
}

pub(crate) fn decode_rows<T: DeserializeOwned>(rows: Vec<Value>) -> ModelResult<Vec<T>> {
    rows.into_iter().map(decode_row).collect()
}
