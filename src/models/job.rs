use std::collections::HashMap;
use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::database::QueryExecutor;
use crate::helpers::sql::{placeholder, sql_for_partial_update, ColumnMap, SqlValue, UpdatePayload};
use crate::models::company::Company;
use crate::models::error::{ModelError, ModelResult};
use crate::models::{decode_row, decode_rows};

/// Columns returned for a job row. Equity is read as text so its
/// fixed-point scale reaches callers untouched.
const JOB_COLUMNS: &str = r#"id,
       title,
       salary,
       equity::text AS equity,
       company_handle AS "companyHandle""#;

const IMMUTABLE_FIELDS: &[&str] = &["id", "companyHandle", "company_handle"];

const EQUITY_SCALE: u32 = 2;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: i32,
    pub title: String,
    pub salary: Option<i32>,
    pub equity: Option<String>,
    pub company_handle: String,
}

/// Row of the job list: flat company handle plus the company's name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobListing {
    pub id: i32,
    pub title: String,
    pub salary: Option<i32>,
    pub equity: Option<String>,
    pub company_handle: String,
    pub company_name: Option<String>,
}

/// Single-job view with the owning company nested in place of its handle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobDetail {
    pub id: i32,
    pub title: String,
    pub salary: Option<i32>,
    pub equity: Option<String>,
    pub company: Option<Company>,
}

impl JobDetail {
    fn from_job(job: Job, company: Option<Company>) -> Self {
        Self {
            id: job.id,
            title: job.title,
            salary: job.salary,
            equity: job.equity,
            company,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewJob {
    pub title: String,
    #[serde(default)]
    pub salary: Option<i32>,
    #[serde(default)]
    pub equity: Option<Decimal>,
    pub company_handle: String,
}

/// Optional criteria for listing jobs. Absent criteria add no predicate.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobFilter {
    /// Case-insensitive substring of the title
    pub title: Option<String>,
    /// Inclusive salary floor
    pub min_salary: Option<i32>,
    /// `Some(true)` keeps only jobs with equity above zero
    pub has_equity: Option<bool>,
}

impl JobFilter {
    /// Parse query-string criteria (`title`, `minSalary`, `hasEquity`).
    pub fn from_query(params: &HashMap<String, String>) -> ModelResult<Self> {
        let mut filter = Self::default();
        for (key, value) in params {
            match key.as_str() {
                "title" => filter.title = Some(value.clone()),
                "minSalary" => {
                    let min = value
                        .trim()
                        .parse::<i32>()
                        .ok()
                        .filter(|n| *n >= 0)
                        .ok_or_else(|| ModelError::bad_request("minSalary must be a non-negative integer"))?;
                    filter.min_salary = Some(min);
                }
                "hasEquity" => {
                    let flag = match value.trim() {
                        "true" => true,
                        "false" => false,
                        _ => return Err(ModelError::bad_request("hasEquity must be true or false")),
                    };
                    filter.has_equity = Some(flag);
                }
                other => return Err(ModelError::bad_request(format!("Unknown filter: {}", other))),
            }
        }
        Ok(filter)
    }

    /// The `WHERE` clause (leading space included) and its bind values.
    /// Each placeholder is numbered from the values pushed so far.
    fn where_clause(&self) -> (String, Vec<SqlValue>) {
        let mut predicates = Vec::new();
        let mut values = Vec::new();

        if let Some(title) = &self.title {
            values.push(SqlValue::Text(format!("%{}%", title)));
            predicates.push(format!("j.title ILIKE {}", placeholder(values.len())));
        }
        if let Some(min_salary) = self.min_salary {
            values.push(SqlValue::from(min_salary));
            predicates.push(format!("j.salary >= {}", placeholder(values.len())));
        }
        if self.has_equity == Some(true) {
            predicates.push("j.equity > 0".to_string());
        }

        if predicates.is_empty() {
            (String::new(), values)
        } else {
            (format!(" WHERE {}", predicates.join(" AND ")), values)
        }
    }
}

/// Job queries over an injected executor.
pub struct Jobs<E> {
    db: E,
}

impl<E: QueryExecutor> Jobs<E> {
    pub fn new(db: E) -> Self {
        Self { db }
    }

    /// Insert a job for an existing company.
    ///
    /// Fails with `BadRequest` when the company is unknown or a field is
    /// out of range. Equity is stored with two decimal places.
    pub async fn create(&self, data: NewJob) -> ModelResult<Job> {
        if !Company::exists(&self.db, &data.company_handle).await? {
            return Err(ModelError::bad_request(format!(
                "Company does not exist: {}",
                data.company_handle
            )));
        }
        if data.title.trim().is_empty() {
            return Err(ModelError::bad_request("title must be a non-empty string"));
        }
        if data.salary.is_some_and(|s| s < 0) {
            return Err(ModelError::bad_request("salary must be a non-negative integer or null"));
        }
        let equity = data.equity.map(normalize_equity).transpose()?;

        let rows = self
            .db
            .query(
                &format!(
                    "INSERT INTO jobs (title, salary, equity, company_handle)
                     VALUES ($1, $2, $3, $4)
                     RETURNING {}",
                    JOB_COLUMNS
                ),
                &[
                    SqlValue::from(data.title),
                    SqlValue::from(data.salary),
                    SqlValue::from(equity),
                    SqlValue::from(data.company_handle),
                ],
            )
            .await?;

        let job: Job = first_row(rows, || {
            ModelError::Database(crate::database::DatabaseError::QueryError(
                "INSERT returned no row".to_string(),
            ))
        })?;
        tracing::info!(job_id = job.id, company = %job.company_handle, "created job");
        Ok(job)
    }

    /// All jobs matching `filter`, ordered by title.
    pub async fn find_all(&self, filter: &JobFilter) -> ModelResult<Vec<JobListing>> {
        let (where_clause, values) = filter.where_clause();
        let sql = format!(
            r#"SELECT j.id,
                      j.title,
                      j.salary,
                      j.equity::text AS equity,
                      j.company_handle AS "companyHandle",
                      c.name AS "companyName"
               FROM jobs j
                    LEFT JOIN companies AS c ON c.handle = j.company_handle{}
               ORDER BY j.title"#,
            where_clause
        );

        let rows = self.db.query(&sql, &values).await?;
        decode_rows(rows)
    }

    /// One job with its company nested. `NotFound` if no such id.
    pub async fn get(&self, id: i32) -> ModelResult<JobDetail> {
        let rows = self
            .db
            .query(
                &format!("SELECT {} FROM jobs WHERE id = $1", JOB_COLUMNS),
                &[SqlValue::from(id)],
            )
            .await?;
        let job: Job = first_row(rows, || not_found(id))?;

        let company = Company::find(&self.db, &job.company_handle).await?;
        if company.is_none() {
            tracing::warn!(job_id = id, company = %job.company_handle, "job references a missing company");
        }
        Ok(JobDetail::from_job(job, company))
    }

    /// Partially update a job with the fields present in `data`.
    ///
    /// Only `title`, `salary` and `equity` may change; naming the id or
    /// the company handle is a `BadRequest` raised before any query runs.
    pub async fn update(&self, id: i32, data: UpdatePayload) -> ModelResult<Job> {
        let data = prepare_update(data)?;
        let fragment = sql_for_partial_update(data, &ColumnMap::new())?;

        let id_placeholder = placeholder(fragment.values.len() + 1);
        let sql = format!(
            "UPDATE jobs
             SET {}
             WHERE id = {}
             RETURNING {}",
            fragment.set_clause, id_placeholder, JOB_COLUMNS
        );
        let mut values = fragment.values;
        values.push(SqlValue::from(id));

        let rows = self.db.query(&sql, &values).await?;
        let job: Job = first_row(rows, || not_found(id))?;
        tracing::info!(job_id = id, "updated job");
        Ok(job)
    }

    /// Delete a job. `NotFound` if nothing was deleted.
    pub async fn remove(&self, id: i32) -> ModelResult<()> {
        let rows = self
            .db
            .query(
                "DELETE FROM jobs WHERE id = $1 RETURNING id",
                &[SqlValue::from(id)],
            )
            .await?;
        if rows.is_empty() {
            return Err(not_found(id));
        }
        tracing::info!(job_id = id, "removed job");
        Ok(())
    }

    /// Jobs posted by one company, oldest first. Empty for unknown handles.
    pub async fn find_for_company(&self, handle: &str) -> ModelResult<Vec<Job>> {
        let rows = self
            .db
            .query(
                &format!(
                    "SELECT {} FROM jobs WHERE company_handle = $1 ORDER BY id",
                    JOB_COLUMNS
                ),
                &[SqlValue::from(handle)],
            )
            .await?;
        decode_rows(rows)
    }
}

fn not_found(id: i32) -> ModelError {
    ModelError::not_found(format!("Job not found: {}", id))
}

fn first_row<T, F>(rows: Vec<serde_json::Value>, missing: F) -> ModelResult<T>
where
    T: serde::de::DeserializeOwned,
    F: FnOnce() -> ModelError,
{
    match rows.into_iter().next() {
        Some(row) => decode_row(row),
        None => Err(missing()),
    }
}

/// Validate and coerce the fields of a job update, keeping their order.
fn prepare_update(data: UpdatePayload) -> ModelResult<UpdatePayload> {
    if let Some(field) = IMMUTABLE_FIELDS.iter().find(|f| data.contains_key(f)) {
        return Err(ModelError::bad_request(format!(
            "Cannot change immutable field: {}",
            field
        )));
    }

    let mut prepared = UpdatePayload::new();
    for (field, value) in data {
        let value = match field.as_str() {
            "title" => match value {
                SqlValue::Text(title) if !title.trim().is_empty() => SqlValue::Text(title),
                _ => return Err(ModelError::bad_request("title must be a non-empty string")),
            },
            "salary" => match value {
                SqlValue::Null => SqlValue::Null,
                SqlValue::Int(n) if (0..=i64::from(i32::MAX)).contains(&n) => SqlValue::Int(n),
                _ => {
                    return Err(ModelError::bad_request(
                        "salary must be a non-negative integer or null",
                    ))
                }
            },
            "equity" => match value {
                SqlValue::Null => SqlValue::Null,
                other => SqlValue::Decimal(normalize_equity(equity_from(&other)?)?),
            },
            other => return Err(ModelError::bad_request(format!("Unknown job field: {}", other))),
        };
        prepared.insert(field, value);
    }
    Ok(prepared)
}

fn equity_from(value: &SqlValue) -> ModelResult<Decimal> {
    let invalid = || ModelError::bad_request("equity must be a decimal number");
    match value {
        SqlValue::Decimal(d) => Ok(*d),
        SqlValue::Int(n) => Ok(Decimal::from(*n)),
        SqlValue::Float(f) => Decimal::try_from(*f).map_err(|_| invalid()),
        SqlValue::Text(s) => Decimal::from_str(s.trim()).map_err(|_| invalid()),
        SqlValue::Null | SqlValue::Bool(_) => Err(invalid()),
    }
}

/// Equity is a fraction in [0, 1] kept at exactly two decimal places.
pub fn normalize_equity(equity: Decimal) -> ModelResult<Decimal> {
    if equity < Decimal::ZERO || equity > Decimal::ONE {
        return Err(ModelError::bad_request("equity must be between 0 and 1"));
    }
    let mut fixed = equity.round_dp_with_strategy(EQUITY_SCALE, RoundingStrategy::MidpointAwayFromZero);
    fixed.rescale(EQUITY_SCALE);
    Ok(fixed)
}
