use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use crate::database::{DatabaseError, QueryExecutor};
use crate::helpers::sql::SqlValue;

/// A statement seen by [`RecordingExecutor`], whitespace collapsed.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedQuery {
    pub sql: String,
    pub params: Vec<SqlValue>,
}

/// Scripted executor: replays queued row sets in order and records every
/// statement it receives. An exhausted script answers with no rows.
#[derive(Default)]
pub struct RecordingExecutor {
    script: Mutex<VecDeque<Result<Vec<Value>, String>>>,
    calls: Mutex<Vec<RecordedQuery>>,
}

impl RecordingExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the rows returned by the next unanswered statement
    pub fn respond(self, rows: Vec<Value>) -> Self {
        self.script.lock().unwrap().push_back(Ok(rows));
        self
    }

    /// Queue a storage failure for the next unanswered statement
    pub fn fail(self, message: &str) -> Self {
        self.script.lock().unwrap().push_back(Err(message.to_string()));
        self
    }

    pub fn calls(&self) -> Vec<RecordedQuery> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call(&self, index: usize) -> RecordedQuery {
        self.calls()[index].clone()
    }
}

#[async_trait]
impl QueryExecutor for RecordingExecutor {
    async fn query(&self, sql: &str, params: &[SqlValue]) -> Result<Vec<Value>, DatabaseError> {
        self.calls.lock().unwrap().push(RecordedQuery {
            sql: sql.split_whitespace().collect::<Vec<_>>().join(" "),
            params: params.to_vec(),
        });
        match self.script.lock().unwrap().pop_front() {
            Some(Ok(rows)) => Ok(rows),
            Some(Err(message)) => Err(DatabaseError::QueryError(message)),
            None => Ok(vec![]),
        }
    }
}
