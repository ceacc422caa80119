//! Authenticated HTTP session
//!
//! One `HttpSession` per backend, constructed once and passed to every
//! component that issues requests. Calls are sequential request/response;
//! the session paces them and optionally retries transient failures.

use reqwest::{header, Client, StatusCode};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, trace, warn};

use crate::config::BackendConfig;
use crate::error::{ConnectorError, ConnectorResult};
use crate::rate_limit::{parse_retry_after, RateLimiter};

/// HTTP method for backend operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Put,
    Delete,
}

impl HttpMethod {
    /// Get the string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

/// Authenticated session against one backend.
pub struct HttpSession {
    config: BackendConfig,
    client: Client,
    rate_limiter: RateLimiter,
}

impl std::fmt::Debug for HttpSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpSession")
            .field("config", &self.config.redacted())
            .finish()
    }
}

impl HttpSession {
    /// Create a new session with the given configuration.
    pub fn new(config: BackendConfig) -> ConnectorResult<Self> {
        config.validate()?;

        let client = Self::build_client(&config)?;
        let rate_limiter = RateLimiter::new(&config.rate_limit);

        Ok(Self {
            config,
            client,
            rate_limiter,
        })
    }

    fn build_client(config: &BackendConfig) -> ConnectorResult<Client> {
        let mut builder = Client::builder()
            .timeout(Duration::from_secs(config.connection.read_timeout_secs))
            .connect_timeout(Duration::from_secs(
                config.connection.connection_timeout_secs,
            ));

        if !config.tls.verify_certificate {
            builder = builder.danger_accept_invalid_certs(true);
        }

        if let Some(ref path) = config.tls.ca_cert_path {
            let pem = std::fs::read(path).map_err(|e| {
                ConnectorError::invalid_configuration(format!(
                    "failed to read CA bundle {path}: {e}"
                ))
            })?;
            let cert = reqwest::Certificate::from_pem(&pem).map_err(|e| {
                ConnectorError::invalid_configuration(format!("invalid CA bundle {path}: {e}"))
            })?;
            builder = builder.add_root_certificate(cert);
        }

        builder
            .build()
            .map_err(|e| ConnectorError::invalid_configuration(format!("failed to build HTTP client: {e}")))
    }

    /// Backend configuration.
    pub fn config(&self) -> &BackendConfig {
        &self.config
    }

    /// Full URL for a path relative to the base URL.
    pub fn url(&self, path: &str) -> String {
        self.config.url(path)
    }

    /// GET a JSON document.
    pub async fn get_json(&self, url: &str, query: &[(String, String)]) -> ConnectorResult<Value> {
        self.send(HttpMethod::Get, url, query, None).await
    }

    /// PUT, optionally with a JSON body.
    pub async fn put_json(
        &self,
        url: &str,
        query: &[(String, String)],
        body: Option<&Value>,
    ) -> ConnectorResult<Value> {
        self.send(HttpMethod::Put, url, query, body).await
    }

    /// DELETE with a JSON body.
    pub async fn delete_json(&self, url: &str, body: &Value) -> ConnectorResult<Value> {
        self.send(HttpMethod::Delete, url, &[], Some(body)).await
    }

    /// Send a request with pacing and the configured retry policy, and decode
    /// the JSON body of a success response (empty bodies decode to `Null`).
    async fn send(
        &self,
        method: HttpMethod,
        url: &str,
        query: &[(String, String)],
        body: Option<&Value>,
    ) -> ConnectorResult<Value> {
        let retry_config = &self.config.retry;
        let verbosity = &self.config.log_verbosity;
        let mut attempt = 0;

        let response = loop {
            attempt += 1;

            self.rate_limiter.acquire().await;

            let mut request = match method {
                HttpMethod::Get => self.client.get(url),
                HttpMethod::Put => self.client.put(url),
                HttpMethod::Delete => self.client.delete(url),
            }
            .basic_auth(&self.config.credentials.user, Some(&self.config.credentials.pass))
            .header(header::ACCEPT, "application/json");

            if !query.is_empty() {
                request = request.query(query);
            }
            if let Some(json_body) = body {
                request = request.json(json_body);
            }

            if verbosity.is_enabled() {
                debug!(url = %url, method = %method.as_str(), attempt = attempt, "Sending request");
            }
            if verbosity.log_params() && !query.is_empty() {
                trace!(query = ?query, "Request query");
            }
            if verbosity.log_bodies() {
                if let Some(json_body) = body {
                    trace!(body = %json_body, "Request body");
                }
            }

            match request.send().await {
                Ok(resp) => {
                    let status = resp.status();

                    if verbosity.is_enabled() {
                        debug!(url = %url, status = %status, attempt = attempt, "Received response");
                    }

                    if retry_config.should_retry(status.as_u16())
                        && attempt <= retry_config.max_retries
                    {
                        let wait = if status == StatusCode::TOO_MANY_REQUESTS {
                            resp.headers()
                                .get(header::RETRY_AFTER)
                                .and_then(|v| v.to_str().ok())
                                .and_then(parse_retry_after)
                                .unwrap_or_else(|| retry_config.calculate_backoff(attempt))
                        } else {
                            retry_config.calculate_backoff(attempt)
                        };

                        warn!(
                            url = %url,
                            status = %status,
                            attempt = attempt,
                            wait_ms = wait.as_millis(),
                            "Transient error, retrying with backoff"
                        );
                        tokio::time::sleep(wait).await;
                        continue;
                    }

                    break resp;
                }
                Err(e) => {
                    if attempt <= retry_config.max_retries {
                        let backoff = retry_config.calculate_backoff(attempt);
                        warn!(
                            url = %url,
                            error = %e,
                            attempt = attempt,
                            wait_ms = backoff.as_millis(),
                            "Request failed, retrying with backoff"
                        );
                        tokio::time::sleep(backoff).await;
                        continue;
                    }

                    return Err(ConnectorError::connection_failed_with_source(
                        format!("{} {url} failed after {attempt} attempt(s)", method.as_str()),
                        e,
                    ));
                }
            }
        };

        let status = response.status();
        let text = response.text().await.map_err(|e| {
            ConnectorError::connection_failed_with_source(format!("failed to read body from {url}"), e)
        })?;

        if !status.is_success() {
            return Err(response_error(status, &text));
        }

        if verbosity.log_bodies() {
            trace!(body = %text, "Response body");
        }

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&text).map_err(|e| {
            ConnectorError::invalid_data_with_source(format!("response from {url} is not JSON"), e)
        })
    }
}

/// Map a non-success response to an error, pulling the message out of a
/// JSON error body when there is one.
fn response_error(status: StatusCode, body: &str) -> ConnectorError {
    if status == StatusCode::UNAUTHORIZED {
        return ConnectorError::AuthenticationFailed;
    }

    let message = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|json| {
            json.get("message")
                .and_then(|v| v.as_str())
                .map(std::string::ToString::to_string)
        })
        .unwrap_or_else(|| body.chars().take(200).collect());

    if status == StatusCode::TOO_MANY_REQUESTS {
        return ConnectorError::RateLimited { message };
    }

    ConnectorError::Http {
        status: status.as_u16(),
        message,
    }
}
