use assist_core::{BackendOperation, Endpoint};
use assist_logging::{assist_debug, assist_error, assist_info};
use reqwest::header::CONTENT_TYPE;

/// Failure talking to the generation backend.
///
/// `status` is `None` when no HTTP response was received at all.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{}", render(.status, .body))]
pub struct BackendError {
    pub status: Option<u16>,
    pub body: String,
}

impl BackendError {
    pub fn http(status: u16, body: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            body: body.into(),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            status: None,
            body: message.into(),
        }
    }
}

fn render(status: &Option<u16>, body: &str) -> String {
    match status {
        Some(code) => format!("API Error {code}: {body}"),
        None => body.to_string(),
    }
}

#[async_trait::async_trait]
pub trait Backend: Send + Sync {
    /// One round trip; returns the response body verbatim.
    async fn call(&self, operation: &BackendOperation) -> Result<String, BackendError>;
}

/// `reqwest` client posting JSON to `{base}/generate` and `{base}/summarize`.
///
/// No retries and no timeout beyond the client default.
#[derive(Debug, Clone)]
pub struct ReqwestBackend {
    client: reqwest::Client,
    base_url: String,
}

impl ReqwestBackend {
    pub fn new(base_url: impl Into<String>) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|err| BackendError::transport(err.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    pub fn endpoint_url(&self, endpoint: Endpoint) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), endpoint.path())
    }
}

#[async_trait::async_trait]
impl Backend for ReqwestBackend {
    async fn call(&self, operation: &BackendOperation) -> Result<String, BackendError> {
        let url = self.endpoint_url(operation.endpoint());
        let body = operation
            .to_json()
            .map_err(|err| BackendError::transport(err.to_string()))?;
        assist_debug!(
            "POST {} ({} chars of email content)",
            url,
            operation.email_content().chars().count()
        );

        let response = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(|err| {
                assist_error!("Backend request to {} failed: {}", url, err);
                BackendError::transport(err.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            assist_error!("Backend {} answered {}", url, status);
            return Err(BackendError::http(status.as_u16(), text));
        }

        let text = response
            .text()
            .await
            .map_err(|err| BackendError::transport(err.to_string()))?;
        assist_info!("Backend {} answered {} ({} bytes)", url, status, text.len());
        Ok(text)
    }
}
