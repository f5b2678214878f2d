/// Backend client — the single point of entry for all REST calls to the
/// matching backend.
///
/// Every store goes through this module: it owns bearer-token attachment,
/// the `{ "error": ... }` envelope convention, 204 handling and per-request
/// duration logging. No other module builds HTTP requests.
use std::time::{Duration, Instant};

use bytes::Bytes;
use reqwest::{header, multipart, Client, Method, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::config::Config;
use crate::errors::{ConsoleError, Result};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// File payload for multipart endpoints. Callers validate emptiness before
/// handing it over; the client only packages it.
#[derive(Debug, Clone)]
pub struct FileUpload {
    pub filename: String,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

impl FileUpload {
    pub fn new(filename: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        FileUpload {
            filename: filename.into(),
            content_type: None,
            bytes: bytes.into(),
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    fn into_part(self) -> Result<multipart::Part> {
        let mut part = multipart::Part::bytes(self.bytes.to_vec()).file_name(self.filename);
        if let Some(content_type) = self.content_type {
            part = part.mime_str(&content_type)?;
        }
        Ok(part)
    }
}

#[derive(Clone)]
pub struct BackendClient {
    http: Client,
    base_url: String,
}

impl BackendClient {
    pub fn new(config: &Config) -> Self {
        Self::with_base_url(config.rest_base())
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            http: Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .expect("Failed to build HTTP client"),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str, token: Option<&str>) -> Result<T> {
        let value = self
            .execute(Method::GET, path, token, RequestBody::None)
            .await?
            .unwrap_or(serde_json::Value::Null);
        Ok(serde_json::from_value(value)?)
    }

    pub async fn post_json<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
        token: Option<&str>,
    ) -> Result<T> {
        let body = serde_json::to_value(body)?;
        let value = self
            .execute(Method::POST, path, token, RequestBody::Json(body))
            .await?
            .unwrap_or(serde_json::Value::Null);
        Ok(serde_json::from_value(value)?)
    }

    /// DELETE with no expected body; the backend answers 204.
    pub async fn delete(&self, path: &str, token: Option<&str>) -> Result<()> {
        self.execute(Method::DELETE, path, token, RequestBody::None)
            .await?;
        Ok(())
    }

    /// POST a multipart form (file uploads). Extra text fields ride along
    /// with the file part.
    pub async fn upload_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        field: &str,
        file: FileUpload,
        text_fields: &[(&str, &str)],
        token: Option<&str>,
    ) -> Result<T> {
        let mut form = multipart::Form::new().part(field.to_string(), file.into_part()?);
        for (name, value) in text_fields {
            form = form.text(name.to_string(), value.to_string());
        }
        let value = self
            .execute(Method::POST, path, token, RequestBody::Multipart(form))
            .await?
            .unwrap_or(serde_json::Value::Null);
        Ok(serde_json::from_value(value)?)
    }

    /// One request, with shared header/logging/error handling. `Ok(None)`
    /// means 204 No Content.
    async fn execute(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
        body: RequestBody,
    ) -> Result<Option<serde_json::Value>> {
        let url = self.url(path);
        let mut request = self
            .http
            .request(method.clone(), &url)
            .header(header::ACCEPT, "application/json");
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        request = match body {
            RequestBody::None => request,
            RequestBody::Json(value) => request.json(&value),
            RequestBody::Multipart(form) => request.multipart(form),
        };

        let started = Instant::now();
        let response = request.send().await?;
        let elapsed_ms = started.elapsed().as_millis() as u64;
        let status = response.status();

        if !status.is_success() {
            let content_type = response
                .headers()
                .get(header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);
            let body = response.bytes().await.unwrap_or_default();
            let message = extract_error_message(status, content_type.as_deref(), &body);
            error!(%method, %url, status = status.as_u16(), elapsed_ms, "backend request failed: {message}");
            return Err(ConsoleError::Transport { message });
        }

        if is_mutation(&method) {
            info!(%method, %url, elapsed_ms, "backend request ok");
        } else {
            debug!(%method, %url, elapsed_ms, "backend request ok");
        }

        if status == StatusCode::NO_CONTENT {
            return Ok(None);
        }
        let body = response.bytes().await?;
        Ok(Some(serde_json::from_slice(&body)?))
    }
}

enum RequestBody {
    None,
    Json(serde_json::Value),
    Multipart(multipart::Form),
}

fn is_mutation(method: &Method) -> bool {
    *method == Method::POST
        || *method == Method::PUT
        || *method == Method::PATCH
        || *method == Method::DELETE
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    #[serde(default)]
    error: serde_json::Value,
}

/// Best-effort human message for a failed response: the `error` field of a
/// JSON envelope when present, otherwise `<status> <reason>`.
fn extract_error_message(status: StatusCode, content_type: Option<&str>, body: &[u8]) -> String {
    let fallback = format!(
        "{} {}",
        status.as_u16(),
        status.canonical_reason().unwrap_or("Unknown")
    );
    let is_json = content_type
        .map(|v| v.contains("application/json"))
        .unwrap_or(false);
    if !is_json {
        return fallback;
    }
    match serde_json::from_slice::<ErrorEnvelope>(body) {
        Ok(envelope) => match &envelope.error {
            serde_json::Value::String(message) if !message.is_empty() => message.clone(),
            // some endpoints nest `{ "error": { "message": ... } }`
            serde_json::Value::Object(inner) => inner
                .get("message")
                .and_then(|m| m.as_str())
                .map(str::to_string)
                .unwrap_or(fallback),
            _ => fallback,
        },
        Err(_) => fallback,
    }
}
