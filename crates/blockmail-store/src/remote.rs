//! Submitting a finished email to a remote endpoint.
//!
//! The payload is `{name, html, blocks, createdAt}` as JSON. Any 2xx answer
//! counts as success; the body is optional and may carry an `id`.
//!
//! ## Learning: Async at the Edge
//!
//! Submission is the only network call in the system, so it is the only
//! `async` code. It works on a copy of the blocks and never touches the
//! live document, which keeps the editing core synchronous.

use std::time::Duration;

use blockmail_core::{Block, ExportConfig};
use blockmail_render::HtmlExporter;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};
use url::Url;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Why a submission failed.
#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error("{0}")]
    Validation(String),

    #[error("Invalid endpoint URL: {0}")]
    InvalidEndpoint(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("HTTP error! status: {0}")]
    HttpStatus(u16),

    #[error("A submission is already in progress")]
    AlreadyPending,
}

/// Where the last submission stands.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SubmissionState {
    #[default]
    Idle,
    Pending,
    Succeeded { id: Option<String> },
    Failed { message: String },
}

impl SubmissionState {
    /// Everything except an in-flight request may be (re)submitted.
    pub fn can_submit(&self) -> bool {
        !matches!(self, SubmissionState::Pending)
    }

    /// Status line for display.
    pub fn message(&self) -> Option<String> {
        match self {
            SubmissionState::Idle => None,
            SubmissionState::Pending => Some("Saving to database...".to_string()),
            SubmissionState::Succeeded { id: Some(id) } => {
                Some(format!("Successfully saved to database! ID: {id}"))
            }
            SubmissionState::Succeeded { id: None } => {
                Some("Successfully saved to database!".to_string())
            }
            SubmissionState::Failed { message } => Some(format!(
                "Error: {message}. Please check your API endpoint and try again."
            )),
        }
    }
}

/// What the endpoint told us on success.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitReceipt {
    pub id: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Submission<'a> {
    name: &'a str,
    html: String,
    blocks: &'a [Block],
    created_at: DateTime<Utc>,
}

/// Posts exported emails to an HTTP endpoint.
pub struct RemoteSubmitter {
    client: reqwest::Client,
    exporter: HtmlExporter,
    state: SubmissionState,
}

impl RemoteSubmitter {
    pub fn new(export: ExportConfig) -> Result<Self, SubmitError> {
        let client = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            exporter: HtmlExporter::new(export),
            state: SubmissionState::Idle,
        })
    }

    pub fn state(&self) -> &SubmissionState {
        &self.state
    }

    /// Validates, exports and posts `blocks` under `name`.
    ///
    /// Validation failures are reported before any request is made. Every
    /// error, including a dropped future, leaves the state `Failed`.
    pub async fn submit(
        &mut self,
        endpoint: &str,
        name: &str,
        blocks: &[Block],
    ) -> Result<SubmitReceipt, SubmitError> {
        if !self.state.can_submit() {
            return Err(SubmitError::AlreadyPending);
        }

        let pending = Pending::start(&mut self.state);
        let result = match validate(endpoint, name, blocks) {
            Ok((url, name)) => post(&self.client, &self.exporter, url, name, blocks).await,
            Err(e) => Err(e),
        };
        pending.finish(&result);
        result
    }
}

/// Holds the state at `Pending` for one submission.
struct Pending<'a> {
    state: &'a mut SubmissionState,
}

impl<'a> Pending<'a> {
    fn start(state: &'a mut SubmissionState) -> Self {
        *state = SubmissionState::Pending;
        Self { state }
    }

    fn finish(self, result: &Result<SubmitReceipt, SubmitError>) {
        *self.state = match result {
            Ok(receipt) => SubmissionState::Succeeded {
                id: receipt.id.clone(),
            },
            Err(e) => {
                warn!("Submission failed: {}", e);
                SubmissionState::Failed {
                    message: e.to_string(),
                }
            }
        };
    }
}

impl Drop for Pending<'_> {
    fn drop(&mut self) {
        if *self.state == SubmissionState::Pending {
            warn!("Submission cancelled");
            *self.state = SubmissionState::Failed {
                message: CANCELLED.to_string(),
            };
        }
    }
}

const CANCELLED: &str = "Submission cancelled";

fn validate<'a>(
    endpoint: &str,
    name: &'a str,
    blocks: &[Block],
) -> Result<(Url, &'a str), SubmitError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(SubmitError::Validation("Please enter a template name".to_string()));
    }
    let url = parse_endpoint(endpoint)?;
    if blocks.is_empty() {
        return Err(SubmitError::Validation(
            "No blocks to save. Please add some blocks first.".to_string(),
        ));
    }
    Ok((url, name))
}

async fn post(
    client: &reqwest::Client,
    exporter: &HtmlExporter,
    url: Url,
    name: &str,
    blocks: &[Block],
) -> Result<SubmitReceipt, SubmitError> {
    let payload = Submission {
        name,
        html: exporter.export(blocks),
        blocks,
        created_at: Utc::now(),
    };

    let response = client.post(url.clone()).json(&payload).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(SubmitError::HttpStatus(status.as_u16()));
    }

    let body = response.bytes().await?;
    let id = receipt_id(&body);
    info!(endpoint = %url, id = ?id, "Submitted template");
    Ok(SubmitReceipt { id })
}

fn parse_endpoint(endpoint: &str) -> Result<Url, SubmitError> {
    let endpoint = endpoint.trim();
    if endpoint.is_empty() {
        return Err(SubmitError::Validation("Please enter an API endpoint URL".to_string()));
    }
    let url = Url::parse(endpoint).map_err(|e| SubmitError::InvalidEndpoint(format!("{endpoint}: {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(SubmitError::InvalidEndpoint(format!(
            "{endpoint}: unsupported scheme {scheme}"
        ))),
    }
}

/// Pulls `id` out of a JSON body; anything unparseable means no id.
fn receipt_id(body: &[u8]) -> Option<String> {
    let value: serde_json::Value = serde_json::from_slice(body).ok()?;
    match value.get("id")? {
        serde_json::Value::String(id) => Some(id.clone()),
        serde_json::Value::Number(id) => Some(id.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blockmail_core::BlockKind;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    /// Answers one request with `status` and `body`; resolves to the request body.
    async fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let endpoint = format!("http://{}/templates", listener.local_addr().unwrap());

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut chunk = [0u8; 4096];
            let body_start = loop {
                let n = socket.read(&mut chunk).await.unwrap();
                assert!(n > 0, "connection closed before headers");
                request.extend_from_slice(&chunk[..n]);
                if let Some(pos) = request.windows(4).position(|w| w == b"\r\n\r\n") {
                    break pos + 4;
                }
            };
            let head = String::from_utf8_lossy(&request[..body_start]).to_ascii_lowercase();
            let length: usize = head
                .lines()
                .find_map(|line| line.strip_prefix("content-length:"))
                .map(|v| v.trim().parse().unwrap())
                .unwrap_or(0);
            while request.len() < body_start + length {
                let n = socket.read(&mut chunk).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&chunk[..n]);
            }

            let response = format!(
                "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
            String::from_utf8(request[body_start..].to_vec()).unwrap()
        });

        (endpoint, handle)
    }

    fn blocks() -> Vec<Block> {
        vec![Block::new(BlockKind::Title), Block::new(BlockKind::Button)]
    }

    #[tokio::test]
    async fn test_successful_submission() {
        let (endpoint, server) = serve_once("201 Created", r#"{"id": 42}"#).await;
        let mut submitter = RemoteSubmitter::new(ExportConfig::default()).unwrap();

        let receipt = submitter.submit(&endpoint, "  Launch  ", &blocks()).await.unwrap();
        assert_eq!(receipt.id.as_deref(), Some("42"));
        assert_eq!(
            *submitter.state(),
            SubmissionState::Succeeded {
                id: Some("42".to_string())
            }
        );

        let sent: serde_json::Value = serde_json::from_str(&server.await.unwrap()).unwrap();
        assert_eq!(sent["name"], "Launch");
        assert_eq!(sent["blocks"].as_array().unwrap().len(), 2);
        assert!(sent["html"].as_str().unwrap().starts_with("<!DOCTYPE html>"));
        assert!(sent["createdAt"].as_str().unwrap().parse::<DateTime<Utc>>().is_ok());
    }

    #[tokio::test]
    async fn test_empty_response_body_has_no_id() {
        let (endpoint, _server) = serve_once("200 OK", "").await;
        let mut submitter = RemoteSubmitter::new(ExportConfig::default()).unwrap();

        let receipt = submitter.submit(&endpoint, "Launch", &blocks()).await.unwrap();
        assert_eq!(receipt.id, None);
    }

    #[tokio::test]
    async fn test_http_status_error_then_retry() {
        let (endpoint, _server) = serve_once("500 Internal Server Error", "{}").await;
        let mut submitter = RemoteSubmitter::new(ExportConfig::default()).unwrap();

        let err = submitter.submit(&endpoint, "Launch", &blocks()).await.unwrap_err();
        assert!(matches!(err, SubmitError::HttpStatus(500)));
        assert!(matches!(submitter.state(), SubmissionState::Failed { .. }));
        assert!(submitter.state().can_submit());

        let (endpoint, _server) = serve_once("200 OK", r#"{"id":"tpl_1"}"#).await;
        let receipt = submitter.submit(&endpoint, "Launch", &blocks()).await.unwrap();
        assert_eq!(receipt.id.as_deref(), Some("tpl_1"));
    }

    #[tokio::test]
    async fn test_network_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let endpoint = format!("http://{}/", listener.local_addr().unwrap());
        drop(listener);

        let mut submitter = RemoteSubmitter::new(ExportConfig::default()).unwrap();
        let err = submitter.submit(&endpoint, "Launch", &blocks()).await.unwrap_err();
        assert!(matches!(err, SubmitError::Network(_)));
    }

    #[tokio::test]
    async fn test_validation_happens_before_any_request() {
        let mut submitter = RemoteSubmitter::new(ExportConfig::default()).unwrap();

        let err = submitter.submit("http://localhost/", "   ", &blocks()).await.unwrap_err();
        assert!(matches!(err, SubmitError::Validation(_)));

        let err = submitter.submit("not a url", "Launch", &blocks()).await.unwrap_err();
        assert!(matches!(err, SubmitError::InvalidEndpoint(_)));

        let err = submitter.submit("ftp://example.com/", "Launch", &blocks()).await.unwrap_err();
        assert!(matches!(err, SubmitError::InvalidEndpoint(_)));

        let err = submitter.submit("http://localhost/", "Launch", &[]).await.unwrap_err();
        assert!(matches!(err, SubmitError::Validation(_)));

        assert_eq!(
            *submitter.state(),
            SubmissionState::Failed {
                message: "No blocks to save. Please add some blocks first.".to_string()
            }
        );
        assert!(submitter.state().can_submit());
    }

    #[tokio::test]
    async fn test_invalid_endpoint_is_reported_as_failed() {
        let mut submitter = RemoteSubmitter::new(ExportConfig::default()).unwrap();

        submitter.submit("ftp://example.com/", "Launch", &blocks()).await.unwrap_err();

        let SubmissionState::Failed { message } = submitter.state() else {
            panic!("expected failure, got {:?}", submitter.state());
        };
        assert!(message.starts_with("Invalid endpoint URL: ftp://example.com/"));
    }

    #[tokio::test]
    async fn test_cancelled_submission_allows_retry() {
        // Accepted by the backlog but never answered.
        let silent = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let endpoint = format!("http://{}/", silent.local_addr().unwrap());
        let mut submitter = RemoteSubmitter::new(ExportConfig::default()).unwrap();

        let attempt = tokio::time::timeout(
            Duration::from_millis(200),
            submitter.submit(&endpoint, "Launch", &blocks()),
        )
        .await;
        assert!(attempt.is_err());
        assert_eq!(
            *submitter.state(),
            SubmissionState::Failed {
                message: CANCELLED.to_string()
            }
        );

        let (endpoint, _server) = serve_once("200 OK", r#"{"id":"tpl_2"}"#).await;
        let receipt = submitter.submit(&endpoint, "Launch", &blocks()).await.unwrap();
        assert_eq!(receipt.id.as_deref(), Some("tpl_2"));
        drop(silent);
    }

    #[test]
    fn test_state_messages() {
        assert!(!SubmissionState::Pending.can_submit());
        assert_eq!(SubmissionState::Idle.message(), None);
        assert_eq!(
            SubmissionState::Failed {
                message: "HTTP error! status: 500".to_string()
            }
            .message()
            .unwrap(),
            "Error: HTTP error! status: 500. Please check your API endpoint and try again."
        );
    }

    #[test]
    fn test_receipt_id() {
        assert_eq!(receipt_id(br#"{"id":"abc"}"#).as_deref(), Some("abc"));
        assert_eq!(receipt_id(br#"{"ok":true}"#), None);
        assert_eq!(receipt_id(b"<html>"), None);
    }
}
