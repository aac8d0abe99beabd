//! Transport client tests against a mock backend

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use taskflow::client::{RemoteTaskStatus, TaskRequest, TaskflowClient};
use taskflow::error::TaskflowError;

#[tokio::test]
async fn create_task_posts_the_prompt() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/tasks"))
        .and(body_json(json!({ "prompt": "build a page" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "task-123",
            "status": "pending",
            "message": "queued"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = TaskflowClient::new(&server.uri()).unwrap();
    let created = client
        .create_task(&TaskRequest::new("build a page"))
        .await
        .unwrap();

    assert_eq!(created.id, "task-123");
    assert_eq!(created.status, RemoteTaskStatus::Pending);
    assert_eq!(created.message.as_deref(), Some("queued"));
}

#[tokio::test]
async fn task_status_parses_progress_and_usage() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tasks/task-123/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "task-123",
            "status": "running",
            "progress": 40,
            "message": "Processing... 40%",
            "token_usage": {
                "prompt_tokens": 120,
                "completion_tokens": 300,
                "total_tokens": 420,
                "estimated_cost": 0.0042
            }
        })))
        .mount(&server)
        .await;

    let client = TaskflowClient::new(&server.uri()).unwrap();
    let report = client.task_status("task-123").await.unwrap();

    assert_eq!(report.status, RemoteTaskStatus::Running);
    assert!(!report.status.is_terminal());
    assert_eq!(report.progress, 40);
    assert_eq!(report.token_usage.unwrap().total_tokens, 420);
}

#[tokio::test]
async fn non_2xx_surfaces_as_backend_error_without_retry() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tasks/missing/status"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1) // exactly one attempt: no retry at this layer
        .mount(&server)
        .await;

    let client = TaskflowClient::new(&server.uri()).unwrap();
    let err = client.task_status("missing").await.unwrap_err();
    assert!(matches!(err, TaskflowError::Backend { status: 404 }));
}

#[tokio::test]
async fn cancel_succeeds_on_2xx_with_no_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/tasks/task-123/cancel"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = TaskflowClient::new(&server.uri()).unwrap();
    client.cancel_task("task-123").await.unwrap();
}

#[tokio::test]
async fn health_reports_per_service_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "ok",
            "services": {
                "api": "up",
                "database": "up",
                "ai_services": "degraded"
            }
        })))
        .mount(&server)
        .await;

    let client = TaskflowClient::new(&server.uri()).unwrap();
    let health = client.health().await.unwrap();
    assert_eq!(health.status, "ok");
    assert_eq!(health.services.ai_services, "degraded");
}

#[tokio::test]
async fn poll_stops_at_the_first_terminal_report() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tasks/task-9/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "task-9",
            "status": "running",
            "progress": 50
        })))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/tasks/task-9/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "task-9",
            "status": "completed",
            "progress": 100
        })))
        .mount(&server)
        .await;

    let client = TaskflowClient::new(&server.uri()).unwrap();
    let mut reports = 0;
    let final_report = client
        .poll_until_terminal("task-9", Duration::from_millis(10), |_| reports += 1)
        .await
        .unwrap();

    assert_eq!(final_report.status, RemoteTaskStatus::Completed);
    assert_eq!(final_report.progress, 100);
    assert_eq!(reports, 3);
}
