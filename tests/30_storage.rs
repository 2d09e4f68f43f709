mod common;

use std::str::FromStr;

use anyhow::Result;
use jobly::database::DatabaseManager;
use jobly::helpers::sql::{SqlValue, UpdatePayload};
use jobly::models::{JobFilter, Jobs, NewJob};
use rust_decimal::Decimal;

fn new_job(title: &str, salary: Option<i32>, equity: Option<&str>, handle: &str) -> NewJob {
    NewJob {
        title: title.to_string(),
        salary,
        equity: equity.map(|e| Decimal::from_str(e).expect("decimal")),
        company_handle: handle.to_string(),
    }
}

// One connection means every call below reuses the same session.
#[tokio::test]
async fn null_then_value_binds_on_one_connection() -> Result<()> {
    if !common::database_configured() {
        return Ok(());
    }
    let pool = common::test_pool_with(1).await?;
    DatabaseManager::migrate(&pool).await?;
    common::seed_company(&pool, "itest-binds", "Binds Co").await?;
    let jobs = Jobs::new(pool);

    let bare = jobs.create(new_job("Binds Bare", None, None, "itest-binds")).await?;
    assert_eq!(bare.salary, None);
    assert_eq!(bare.equity, None);

    let full = jobs
        .create(new_job("Binds Full", Some(100), Some("0.25"), "itest-binds"))
        .await?;
    assert_eq!(full.salary, Some(100));
    assert_eq!(full.equity.as_deref(), Some("0.25"));

    let cleared = jobs
        .update(full.id, UpdatePayload::new().with("equity", SqlValue::Null))
        .await?;
    assert_eq!(cleared.equity, None);

    let set = jobs
        .update(bare.id, UpdatePayload::new().with("equity", "0.5"))
        .await?;
    assert_eq!(set.equity.as_deref(), Some("0.50"));

    let salaried = jobs
        .update(bare.id, UpdatePayload::new().with("salary", 70))
        .await?;
    assert_eq!(salaried.salary, Some(70));
    Ok(())
}

#[tokio::test]
async fn find_all_returns_rows_in_title_order() -> Result<()> {
    if !common::database_configured() {
        return Ok(());
    }
    let pool = common::test_pool_with(1).await?;
    DatabaseManager::migrate(&pool).await?;
    common::seed_company(&pool, "itest-order", "Order Co").await?;
    let jobs = Jobs::new(pool);

    for title in ["Ordered Zulu", "Ordered Alpha", "Ordered Mike", "Ordered Echo"] {
        jobs.create(new_job(title, Some(1), None, "itest-order")).await?;
    }

    let filter = JobFilter {
        title: Some("ordered ".to_string()),
        ..Default::default()
    };
    let titles: Vec<String> = jobs.find_all(&filter).await?.into_iter().map(|j| j.title).collect();
    assert_eq!(titles, vec!["Ordered Alpha", "Ordered Echo", "Ordered Mike", "Ordered Zulu"]);

    let ids: Vec<i32> = jobs
        .find_for_company("itest-order")
        .await?
        .into_iter()
        .map(|j| j.id)
        .collect();
    let mut sorted = ids.clone();
    sorted.sort();
    assert_eq!(ids, sorted);
    Ok(())
}
