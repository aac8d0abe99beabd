//! Transport client for the real Taskflow backend
//!
//! Thin HTTP wrapper over the wire contract the simulation stands in for.
//! Non-2xx responses are surfaced as errors; retry policy, if any, belongs
//! to the caller.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::error::TaskflowError;
use crate::state::TokenUsage;

// ─────────────────────────────────────────────────────────────────────────────
// Wire types
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct TaskRequest {
    pub prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<TaskOptions>,
}

impl TaskRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            options: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct TaskOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RemoteTaskStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

impl RemoteTaskStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TaskResponse {
    pub id: String,
    pub status: RemoteTaskStatus,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TaskStatusReport {
    pub id: String,
    pub status: RemoteTaskStatus,
    pub progress: u8,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub result: Option<serde_json::Value>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub token_usage: Option<TokenUsage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub services: ServiceHealth,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceHealth {
    pub api: String,
    pub database: String,
    pub ai_services: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// Client
// ─────────────────────────────────────────────────────────────────────────────

pub struct TaskflowClient {
    base: Url,
    http: reqwest::Client,
}

impl TaskflowClient {
    pub fn new(base_url: &str) -> Result<Self, TaskflowError> {
        // Url::join treats a base without a trailing slash as a file.
        let normalized = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{base_url}/")
        };
        Ok(Self {
            base: Url::parse(&normalized)?,
            http: reqwest::Client::new(),
        })
    }

    pub async fn create_task(&self, request: &TaskRequest) -> Result<TaskResponse, TaskflowError> {
        let url = self.base.join("tasks")?;
        debug!(%url, "creating task");
        let response = self.http.post(url).json(request).send().await?;
        Ok(ensure_ok(response)?.json().await?)
    }

    pub async fn task_status(&self, task_id: &str) -> Result<TaskStatusReport, TaskflowError> {
        let url = self.base.join(&format!("tasks/{task_id}/status"))?;
        let response = self.http.get(url).send().await?;
        Ok(ensure_ok(response)?.json().await?)
    }

    pub async fn cancel_task(&self, task_id: &str) -> Result<(), TaskflowError> {
        let url = self.base.join(&format!("tasks/{task_id}/cancel"))?;
        let response = self.http.post(url).send().await?;
        ensure_ok(response)?;
        Ok(())
    }

    pub async fn health(&self) -> Result<HealthResponse, TaskflowError> {
        let url = self.base.join("health")?;
        let response = self.http.get(url).send().await?;
        Ok(ensure_ok(response)?.json().await?)
    }

    /// Poll task status at `interval` until the backend reports a terminal
    /// status, invoking `on_update` for every report. Retry-free like the
    /// rest of the client: any transport failure ends the poll.
    pub async fn poll_until_terminal(
        &self,
        task_id: &str,
        interval: Duration,
        mut on_update: impl FnMut(&TaskStatusReport),
    ) -> Result<TaskStatusReport, TaskflowError> {
        loop {
            let report = self.task_status(task_id).await?;
            on_update(&report);
            if report.status.is_terminal() {
                return Ok(report);
            }
            tokio::time::sleep(interval).await;
        }
    }
}

fn ensure_ok(response: reqwest::Response) -> Result<reqwest::Response, TaskflowError> {
    if response.status().is_success() {
        Ok(response)
    } else {
        Err(TaskflowError::Backend {
            status: response.status().as_u16(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn base_url_gets_trailing_slash() {
        let client = TaskflowClient::new("http://localhost:8000").unwrap();
        assert_eq!(client.base.as_str(), "http://localhost:8000/");
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        assert!(matches!(
            TaskflowClient::new("not a url"),
            Err(TaskflowError::InvalidUrl(_))
        ));
    }

    #[test]
    fn request_omits_absent_options() {
        let body = serde_json::to_value(TaskRequest::new("hello")).unwrap();
        assert_eq!(body, json!({ "prompt": "hello" }));
    }

    #[test]
    fn status_report_parses_with_token_usage() {
        let report: TaskStatusReport = serde_json::from_value(json!({
            "id": "abc",
            "status": "completed",
            "progress": 100,
            "token_usage": {
                "prompt_tokens": 10,
                "completion_tokens": 20,
                "total_tokens": 30,
                "estimated_cost": 0.0003
            }
        }))
        .unwrap();

        assert_eq!(report.status, RemoteTaskStatus::Completed);
        assert!(report.status.is_terminal());
        assert_eq!(report.token_usage.unwrap().total_tokens, 30);
    }
}
