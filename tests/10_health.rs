mod common;

use anyhow::Result;
use reqwest::StatusCode;

#[tokio::test]
async fn health_endpoint_reports_database() -> Result<()> {
    if !common::database_configured() {
        return Ok(());
    }
    let server = common::start_server().await?;

    let res = reqwest::Client::new()
        .get(format!("{}/health", server.base_url))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["database"], "ok", "unexpected body: {}", body);
    Ok(())
}

#[tokio::test]
async fn dropping_the_server_stops_it() -> Result<()> {
    if !common::database_configured() {
        return Ok(());
    }
    let server = common::start_server().await?;
    let health_url = format!("{}/health", server.base_url);
    drop(server);

    let res = reqwest::Client::new()
        .get(&health_url)
        .timeout(std::time::Duration::from_secs(2))
        .send()
        .await;
    assert!(res.is_err(), "server still answering after drop");
    Ok(())
}
