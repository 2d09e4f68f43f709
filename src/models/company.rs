use serde::{Deserialize, Serialize};

use crate::database::QueryExecutor;
use crate::helpers::sql::SqlValue;
use crate::models::error::ModelResult;
use crate::models::decode_row;

/// Company details as embedded in a job's detail view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub handle: String,
    pub name: String,
    pub description: String,
    pub num_employees: Option<i32>,
    pub logo_url: Option<String>,
}

impl Company {
    pub async fn exists<E>(db: &E, handle: &str) -> ModelResult<bool>
    where
        E: QueryExecutor + ?Sized,
    {
        let rows = db
            .query(
                "SELECT handle FROM companies WHERE handle = $1",
                &[SqlValue::from(handle)],
            )
            .await?;
        Ok(!rows.is_empty())
    }

    pub async fn find<E>(db: &E, handle: &str) -> ModelResult<Option<Company>>
    where
        E: QueryExecutor + ?Sized,
    {
        let rows = db
            .query(
                r#"SELECT handle,
                          name,
                          description,
                          num_employees AS "numEmployees",
                          logo_url AS "logoUrl"
                   FROM companies
                   WHERE handle = $1"#,
                &[SqlValue::from(handle)],
            )
            .await?;
        rows.into_iter().next().map(decode_row).transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingExecutor;
    use serde_json::json;

    #[tokio::test]
    async fn exists_reports_presence() {
        let db = RecordingExecutor::new()
            .respond(vec![json!({ "handle": "c1" })])
            .respond(vec![]);

        assert!(Company::exists(&db, "c1").await.unwrap());
        assert!(!Company::exists(&db, "nope").await.unwrap());
        assert_eq!(db.call(1).params, vec![SqlValue::from("nope")]);
    }

    #[tokio::test]
    async fn find_decodes_camel_case_row() {
        let db = RecordingExecutor::new().respond(vec![json!({
            "handle": "c1",
            "name": "C1",
            "description": "Desc1",
            "numEmployees": 1,
            "logoUrl": "http://c1.img"
        })]);

        let company = Company::find(&db, "c1").await.unwrap().unwrap();
        assert_eq!(company.num_employees, Some(1));
        assert_eq!(company.logo_url.as_deref(), Some("http://c1.img"));
    }
}
