//! REST client for the Height API.
//!
//! Thin wrapper over `reqwest`: read endpoints return `{ "list": [...] }`
//! envelopes, mutations go through [`HeightClient::update`] (partial task
//! patch) or [`HeightClient::batch_update`] (field effects). Rejections
//! always carry a human-readable description, which the feedback layer
//! surfaces verbatim.

use log::debug;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::config::Config;
use crate::fields::{BatchUpdate, TaskUpdate, UpdatePayload};
use crate::task::{Collection, FieldTemplate, List, Task, TaskCollection, User};

/// Tasks search filter excluding soft-deleted tasks.
const ACTIVE_TASKS_FILTER: &str = r#"{"deleted":{"values":[false]}}"#;

/// Any rejection from the mutation client. Network errors, validation
/// errors and authorization errors are treated uniformly.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("invalid API url: {0}")]
    Url(#[from] url::ParseError),
    #[error("{0}")]
    Remote(String),
}

/// Authenticated client for one Height workspace.
pub struct HeightClient {
    http: Client,
    base_url: Url,
    api_key: String,
}

impl HeightClient {
    /// Build a client from resolved configuration.
    pub fn new(config: &Config) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert("Accept", HeaderValue::from_static("application/json"));
        let http = Client::builder().default_headers(headers).build()?;
        Ok(HeightClient {
            http,
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
        })
    }

    async fn call<R: DeserializeOwned, B: Serialize>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: Option<&B>,
    ) -> Result<R, ApiError> {
        let url = self.base_url.join(path)?;
        debug!("{method} {url}");

        let mut request = self
            .http
            .request(method, url)
            .header("Authorization", format!("api-key {}", self.api_key));
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Remote(error_message(status, &body)));
        }
        Ok(response.json().await?)
    }

    /// All non-deleted tasks known to the workspace.
    pub async fn tasks(&self) -> Result<Vec<Task>, ApiError> {
        let collection: TaskCollection = self
            .call(Method::GET, "tasks", &[("filters", ACTIVE_TASKS_FILTER)], None::<&()>)
            .await?;
        Ok(collection.list)
    }

    /// All lists of the workspace.
    pub async fn lists(&self) -> Result<Vec<List>, ApiError> {
        let collection: Collection<List> =
            self.call(Method::GET, "lists", &[], None::<&()>).await?;
        Ok(collection.list)
    }

    /// All workspace members.
    pub async fn users(&self) -> Result<Vec<User>, ApiError> {
        let collection: Collection<User> =
            self.call(Method::GET, "users", &[], None::<&()>).await?;
        Ok(collection.list)
    }

    /// All field templates, including their allowed labels.
    pub async fn field_templates(&self) -> Result<Vec<FieldTemplate>, ApiError> {
        let collection: Collection<FieldTemplate> = self
            .call(Method::GET, "fieldTemplates", &[], None::<&()>)
            .await?;
        Ok(collection.list)
    }

    /// Direct field update: patch a single task with partial fields.
    pub async fn update(
        &self,
        task_id: &str,
        update: &TaskUpdate,
    ) -> Result<TaskCollection, ApiError> {
        self.call(Method::PATCH, &format!("tasks/{task_id}"), &[], Some(update))
            .await
    }

    /// Batch field-template effects across one or more tasks. Either fully
    /// succeeds or is reported as a single failure.
    pub async fn batch_update(&self, batch: &BatchUpdate) -> Result<TaskCollection, ApiError> {
        self.call(Method::PATCH, "tasks", &[], Some(batch)).await
    }

    /// Route a resolved payload to the endpoint matching its shape.
    pub async fn apply(&self, payload: &UpdatePayload) -> Result<TaskCollection, ApiError> {
        match payload {
            UpdatePayload::Direct { task_id, update } => self.update(task_id, update).await,
            UpdatePayload::Batch(batch) => self.batch_update(batch).await,
        }
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    error: Option<ErrorDetail>,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

/// Best human-readable description of a non-2xx response: the server's own
/// error message when the body carries one, the status line otherwise.
fn error_message(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.error)
        .map(|e| e.message)
        .unwrap_or_else(|| status.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message_prefers_the_server_description() {
        let body = r#"{"error": {"message": "Task not found"}}"#;
        assert_eq!(
            error_message(StatusCode::NOT_FOUND, body),
            "Task not found"
        );
    }

    #[test]
    fn test_error_message_falls_back_to_the_status_line() {
        assert_eq!(
            error_message(StatusCode::BAD_GATEWAY, "<html>oops</html>"),
            "502 Bad Gateway"
        );
    }
}
