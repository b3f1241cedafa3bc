use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use url::Url;

use crate::error::{ConfigError, SubmissionError};
use crate::integrations::traits::{RecordSubmitter, RemoteRecordId};
use crate::storage::{Credentials, NotionConfig, PropertyNames};
use crate::timer::CompletedInterval;

/// Writes completed intervals as pages of a Notion database.
///
/// The HTTP client is async; a private current-thread runtime drives the
/// single request so callers stay synchronous.
pub struct NotionSubmitter {
    pages_url: Url,
    version: String,
    properties: PropertyNames,
    client: Client,
    runtime: tokio::runtime::Runtime,
}

impl NotionSubmitter {
    /// Build a submitter from the `[notion]` config section.
    ///
    /// # Errors
    /// Returns an error if `api_base` is not a URL or the HTTP client
    /// cannot be constructed.
    pub fn new(config: &NotionConfig) -> Result<Self, ConfigError> {
        let invalid = |message: String| ConfigError::InvalidValue {
            key: "notion.api_base".into(),
            message,
        };
        let base = Url::parse(&config.api_base).map_err(|e| invalid(e.to_string()))?;
        let pages_url = ensure_trailing_slash(base)
            .join("pages")
            .map_err(|e| invalid(e.to_string()))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ConfigError::InvalidValue {
                key: "notion.timeout_secs".into(),
                message: e.to_string(),
            })?;

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| ConfigError::InvalidValue {
                key: "notion".into(),
                message: format!("cannot start HTTP runtime: {e}"),
            })?;

        Ok(Self {
            pages_url,
            version: config.version.clone(),
            properties: config.properties.clone(),
            client,
            runtime,
        })
    }

    pub fn pages_url(&self) -> &Url {
        &self.pages_url
    }

    async fn post_page(&self, body: &Value, token: &str) -> Result<RemoteRecordId, SubmissionError> {
        let endpoint = self.pages_url.to_string();
        let network = |status: Option<u16>, message: String| SubmissionError::Network {
            endpoint: endpoint.clone(),
            status,
            message,
        };

        let resp = self
            .client
            .post(self.pages_url.clone())
            .bearer_auth(token)
            .header("Notion-Version", &self.version)
            .json(body)
            .send()
            .await
            .map_err(|e| network(None, e.to_string()))?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| network(Some(status.as_u16()), e.to_string()))?;

        if !status.is_success() {
            return Err(classify_failure(status, &text, &endpoint));
        }

        let parsed: Value = serde_json::from_str(&text).unwrap_or(Value::Null);
        parsed
            .get("id")
            .and_then(Value::as_str)
            .map(|id| RemoteRecordId(id.to_string()))
            .ok_or_else(|| SubmissionError::SchemaMismatch {
                status: status.as_u16(),
                message: "response did not contain a page id".into(),
            })
    }
}

impl RecordSubmitter for NotionSubmitter {
    fn submit(
        &self,
        interval: &CompletedInterval,
        credentials: &Credentials,
    ) -> Result<RemoteRecordId, SubmissionError> {
        let body = page_payload(interval, &credentials.database_id, &self.properties);
        let result = self.runtime.block_on(self.post_page(&body, &credentials.token));

        match &result {
            Ok(id) => tracing::info!(record_id = %id, "notion page created"),
            Err(e) => tracing::warn!(error = %e, "notion page creation failed"),
        }
        result
    }
}

/// Request body for `POST /v1/pages`.
pub fn page_payload(
    interval: &CompletedInterval,
    database_id: &str,
    properties: &PropertyNames,
) -> Value {
    let mut props = serde_json::Map::new();
    props.insert(
        properties.title.clone(),
        json!({ "title": [{ "text": { "content": interval.task } }] }),
    );
    props.insert(
        properties.select.clone(),
        json!({ "select": { "name": interval.project } }),
    );
    props.insert(
        properties.start.clone(),
        json!({ "date": { "start": interval.started_at.to_rfc3339() } }),
    );
    props.insert(
        properties.end.clone(),
        json!({ "date": { "start": interval.ended_at.to_rfc3339() } }),
    );
    props.insert(
        properties.duration.clone(),
        json!({ "number": interval.duration_minutes }),
    );

    json!({
        "parent": { "database_id": database_id },
        "properties": Value::Object(props),
    })
}

/// Map a non-2xx response onto the submission error classes.
fn classify_failure(status: StatusCode, body: &str, endpoint: &str) -> SubmissionError {
    let message = error_message(body);
    let code = status.as_u16();
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => SubmissionError::Auth {
            status: code,
            message,
        },
        StatusCode::TOO_MANY_REQUESTS => SubmissionError::Network {
            endpoint: endpoint.to_string(),
            status: Some(code),
            message,
        },
        s if s.is_client_error() => SubmissionError::SchemaMismatch {
            status: code,
            message,
        },
        _ => SubmissionError::Network {
            endpoint: endpoint.to_string(),
            status: Some(code),
            message,
        },
    }
}

/// Notion error bodies look like `{"object":"error","code":"...","message":"..."}`.
fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            let message = v.get("message")?.as_str()?.to_string();
            Some(match v.get("code").and_then(Value::as_str) {
                Some(code) => format!("{code}: {message}"),
                None => message,
            })
        })
        .unwrap_or_else(|| body.trim().to_string())
}

fn ensure_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}
