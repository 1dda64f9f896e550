// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Blocking HTTP client for a Confluent-compatible schema registry.
//!
//! Every request carries a timeout, and transport failures or 5xx responses
//! are retried with exponential backoff up to [`RetryPolicy::max_retries`]
//! times. 4xx responses fail immediately with the registry's error message.

use std::fs;
use std::path::Path;
use std::thread;
use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::ACCEPT;
use reqwest::{Certificate, Identity, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{SchemaRegistry, SchemaVersion};
use crate::config::{CodecConfig, VerifyMode};
use crate::core::{CodecError, Result};

const REGISTRY_CONTENT_TYPE: &str = "application/vnd.schemaregistry.v1+json";

/// Retry behaviour for registry requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Delay before the first retry; doubled for each further retry
    pub backoff: Duration,
}

impl RetryPolicy {
    /// No retries at all.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            backoff: Duration::ZERO,
        }
    }

    fn delay(&self, attempt: u32) -> Duration {
        self.backoff.saturating_mul(1u32 << attempt.min(16))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff: Duration::from_millis(100),
        }
    }
}

#[derive(Debug, thiserror::Error)]
enum RequestError {
    #[error("{0}")]
    Transport(#[from] reqwest::Error),
    #[error("HTTP {status}: {message}")]
    Status { status: StatusCode, message: String },
}

impl RequestError {
    fn is_retryable(&self) -> bool {
        match self {
            RequestError::Transport(e) => !e.is_decode() && !e.is_builder(),
            RequestError::Status { status, .. } => status.is_server_error(),
        }
    }

    fn is_not_found(&self) -> bool {
        matches!(self, RequestError::Status { status, .. } if *status == StatusCode::NOT_FOUND)
    }

    fn into_codec_error(self, operation: &str) -> CodecError {
        CodecError::registry(operation, self.to_string())
    }
}

#[derive(Serialize)]
struct SchemaRequest<'a> {
    schema: &'a str,
}

#[derive(Deserialize)]
struct SchemaResponse {
    schema: String,
}

#[derive(Deserialize)]
struct IdResponse {
    id: u32,
}

#[derive(Deserialize)]
struct CompatibilityResponse {
    is_compatible: bool,
}

#[derive(Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    error_code: Option<i64>,
    message: String,
}

/// Schema registry reached over HTTP(S).
#[derive(Debug, Clone)]
pub struct HttpSchemaRegistry {
    client: Client,
    endpoint: Url,
    username: Option<String>,
    password: Option<String>,
    retry: RetryPolicy,
}

impl HttpSchemaRegistry {
    /// Create a client for `endpoint` with default timeout and retry policy.
    pub fn new(endpoint: &str) -> Result<Self> {
        Self::from_config(&CodecConfig {
            endpoint: endpoint.to_string(),
            ..CodecConfig::default()
        })
    }

    /// Create a client from the registry options of a codec configuration.
    ///
    /// # Errors
    ///
    /// Returns `CodecError::Config` for an invalid endpoint, unreadable or
    /// invalid PEM files, or a certificate given without its key.
    pub fn from_config(config: &CodecConfig) -> Result<Self> {
        let endpoint = Url::parse(&config.endpoint).map_err(|e| {
            CodecError::config(format!("invalid endpoint '{}': {e}", config.endpoint))
        })?;
        if endpoint.cannot_be_a_base() {
            return Err(CodecError::config(format!(
                "endpoint '{}' is not a base URL",
                config.endpoint
            )));
        }

        let mut builder =
            Client::builder().timeout(Duration::from_millis(config.request_timeout_ms));

        if let Some(ca) = &config.ca_certificate {
            let pem = read_pem(ca)?;
            let cert = Certificate::from_pem(&pem).map_err(|e| {
                CodecError::config(format!("invalid ca_certificate {}: {e}", ca.display()))
            })?;
            builder = builder.add_root_certificate(cert);
        }

        match (&config.client_certificate, &config.client_key) {
            (Some(cert), Some(key)) => {
                let mut pem = read_pem(cert)?;
                pem.push(b'\n');
                pem.extend(read_pem(key)?);
                let identity = Identity::from_pem(&pem).map_err(|e| {
                    CodecError::config(format!("invalid client certificate/key: {e}"))
                })?;
                builder = builder.identity(identity);
            }
            (None, None) => {}
            _ => {
                return Err(CodecError::config(
                    "client_certificate and client_key must be set together",
                ))
            }
        }

        if config.verify_mode == VerifyMode::None {
            warn!(
                context = "registry_tls",
                endpoint = %config.endpoint,
                "Certificate verification disabled for schema registry"
            );
            builder = builder.danger_accept_invalid_certs(true);
        }

        let client = builder
            .build()
            .map_err(|e| CodecError::config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint,
            username: config.username.clone(),
            password: config.password.clone(),
            retry: RetryPolicy {
                max_retries: config.max_retries,
                backoff: Duration::from_millis(config.retry_backoff_ms),
            },
        })
    }

    /// Replace the retry policy.
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Registry base URL.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.endpoint.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        let request = request.header(ACCEPT, REGISTRY_CONTENT_TYPE);
        match &self.username {
            Some(user) => request.basic_auth(user, self.password.as_deref()),
            None => request,
        }
    }

    /// Send a request, retrying transient failures.
    fn send<F>(&self, operation: &str, build: F) -> std::result::Result<Response, RequestError>
    where
        F: Fn() -> RequestBuilder,
    {
        let mut attempt = 0;
        loop {
            let outcome = self
                .authorize(build())
                .send()
                .map_err(RequestError::from)
                .and_then(check_status);

            match outcome {
                Ok(response) => return Ok(response),
                Err(e) if e.is_retryable() && attempt < self.retry.max_retries => {
                    let delay = self.retry.delay(attempt);
                    warn!(
                        context = "registry_request",
                        operation,
                        attempt = attempt + 1,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Schema registry request failed, retrying"
                    );
                    thread::sleep(delay);
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn send_json<T, F>(&self, operation: &str, build: F) -> Result<T>
    where
        T: DeserializeOwned,
        F: Fn() -> RequestBuilder,
    {
        self.send(operation, build)
            .and_then(|response| response.json::<T>().map_err(RequestError::from))
            .map_err(|e| e.into_codec_error(operation))
    }
}

fn check_status(response: Response) -> std::result::Result<Response, RequestError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().unwrap_or_default();
    let message = match serde_json::from_str::<ErrorResponse>(&body) {
        Ok(ErrorResponse {
            error_code: Some(code),
            message,
        }) => format!("{message} (error code {code})"),
        Ok(ErrorResponse { message, .. }) => message,
        Err(_) if body.is_empty() => status.canonical_reason().unwrap_or("").to_string(),
        Err(_) => body,
    };
    Err(RequestError::Status { status, message })
}

fn read_pem(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).map_err(|e| CodecError::config(format!("cannot read {}: {e}", path.display())))
}

impl SchemaRegistry for HttpSchemaRegistry {
    fn fetch_schema_by_id(&self, id: u32) -> Result<String> {
        let url = self.url(&["schemas", "ids", &id.to_string()]);
        let response: SchemaResponse =
            self.send_json("fetch_schema_by_id", || self.client.get(url.clone()))?;
        debug!(context = "registry", schema_id = id, "Fetched schema");
        Ok(response.schema)
    }

    fn subject_version_id(&self, subject: &str, version: SchemaVersion) -> Result<u32> {
        let url = self.url(&["subjects", subject, "versions", &version.to_string()]);
        let response: IdResponse =
            self.send_json("subject_version_id", || self.client.get(url.clone()))?;
        Ok(response.id)
    }

    fn is_compatible(&self, subject: &str, definition: &str) -> Result<bool> {
        let url = self.url(&["compatibility", "subjects", subject, "versions", "latest"]);
        let body = SchemaRequest { schema: definition };
        match self.send("is_compatible", || self.client.post(url.clone()).json(&body)) {
            Ok(response) => response
                .json::<CompatibilityResponse>()
                .map(|r| r.is_compatible)
                .map_err(|e| RequestError::from(e).into_codec_error("is_compatible")),
            // A subject without versions has nothing to be incompatible with.
            Err(e) if e.is_not_found() => {
                debug!(context = "registry", subject, "Subject has no versions yet");
                Ok(true)
            }
            Err(e) => Err(e.into_codec_error("is_compatible")),
        }
    }

    fn is_registered(&self, subject: &str, definition: &str) -> Result<bool> {
        let url = self.url(&["subjects", subject]);
        let body = SchemaRequest { schema: definition };
        match self.send("is_registered", || self.client.post(url.clone()).json(&body)) {
            Ok(_) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e.into_codec_error("is_registered")),
        }
    }

    fn register_schema(&self, subject: &str, definition: &str) -> Result<u32> {
        let url = self.url(&["subjects", subject, "versions"]);
        let body = SchemaRequest { schema: definition };
        let response: IdResponse = self.send_json("register_schema", || {
            self.client.post(url.clone()).json(&body)
        })?;
        debug!(
            context = "registry",
            subject,
            schema_id = response.id,
            "Registered schema"
        );
        Ok(response.id)
    }

    fn verify_schema(&self, subject: &str, definition: &str) -> Result<u32> {
        let url = self.url(&["subjects", subject]);
        let body = SchemaRequest { schema: definition };
        let response: IdResponse =
            self.send_json("verify_schema", || self.client.post(url.clone()).json(&body))?;
        Ok(response.id)
    }
}
