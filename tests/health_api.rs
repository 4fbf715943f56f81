//! Liveness and readiness endpoints.

mod common;

use axum::http::StatusCode;
use common::{get, setup_app};

#[tokio::test]
async fn test_healthz_is_ok() {
    let app = setup_app().await;
    let (status, body) = get(&app, "/healthz").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_readyz_reports_checks() {
    let app = setup_app().await;
    let (status, body) = get(&app, "/readyz").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["checks"]["sqlite"]["ok"], true);
    assert_eq!(body["checks"]["schema"]["ok"], true);
}
