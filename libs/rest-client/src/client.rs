//! Shared request pipeline for the clinic REST API.
//!
//! Every call goes through [`ApiClient::request`]: the path is resolved under
//! the configured base URL, JSON headers and the bearer token are attached, a
//! `traceparent` header is injected, and the response is classified into an
//! [`ApiError`] unless it is a 2xx.

use std::sync::Arc;
use std::time::Duration;

use http::header::{ACCEPT, CONTENT_TYPE};
use http::{HeaderMap, HeaderValue, Method, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tracing::{debug, field::Empty, warn, Instrument, Span};
use url::Url;

use crate::credentials::{CredentialSource, NoCredentials};
use crate::error::ApiError;
use crate::retry::RetryPolicy;
use crate::trace;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8081/api/v1";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(17_000);

const MAX_ERROR_MESSAGE_LEN: usize = 512;

/// Configured HTTP client shared by all resource gateways.
#[derive(Clone)]
pub struct ApiClient {
    inner: reqwest::Client,
    base_url: Url,
    timeout: Duration,
    credentials: Arc<dyn CredentialSource>,
    retry: RetryPolicy,
}

pub struct ApiClientBuilder {
    base_url: String,
    timeout: Duration,
    credentials: Arc<dyn CredentialSource>,
    retry: RetryPolicy,
}

impl Default for ApiClientBuilder {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            credentials: Arc::new(NoCredentials),
            retry: RetryPolicy::none(),
        }
    }
}

impl ApiClientBuilder {
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn credentials(mut self, credentials: Arc<dyn CredentialSource>) -> Self {
        self.credentials = credentials;
        self
    }

    pub fn retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn build(self) -> Result<ApiClient, ApiError> {
        let base_url = parse_base_url(&self.base_url)?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let inner = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(self.timeout)
            .build()
            .map_err(|e| ApiError::request_setup(format!("cannot build HTTP client: {e}")))?;

        Ok(ApiClient {
            inner,
            base_url,
            timeout: self.timeout,
            credentials: self.credentials,
            retry: self.retry,
        })
    }
}

impl ApiClient {
    pub fn builder() -> ApiClientBuilder {
        ApiClientBuilder::default()
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    /// Same pipeline (connection pool, timeout, credentials, retry) rooted at
    /// another base URL.
    pub fn with_base_url(&self, base_url: &str) -> Result<ApiClient, ApiError> {
        Ok(ApiClient {
            base_url: parse_base_url(base_url)?,
            ..self.clone()
        })
    }

    /// Send a request and decode the JSON response into `T`.
    ///
    /// `path` is relative to the base URL (`/appointments/7`), `query` pairs are
    /// appended as a query string. An empty 2xx body decodes as JSON `null`.
    pub async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        query: &[(&str, &str)],
    ) -> Result<T, ApiError> {
        let bytes = self.send(method, path, body, query).await?;
        decode_json(&bytes)
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.request(Method::GET, path, None, &[]).await
    }

    pub async fn get_with_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, ApiError> {
        self.request(Method::GET, path, None, query).await
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = to_json_body(body)?;
        self.request(Method::POST, path, Some(&body), &[]).await
    }

    pub async fn put<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = to_json_body(body)?;
        self.request(Method::PUT, path, Some(&body), &[]).await
    }

    /// POST whose response body is irrelevant.
    pub async fn post_empty<B>(&self, path: &str, body: &B) -> Result<(), ApiError>
    where
        B: Serialize + ?Sized,
    {
        let body = to_json_body(body)?;
        self.send(Method::POST, path, Some(&body), query_none())
            .await
            .map(drop)
    }

    /// POST with query parameters only, returning the body as plain text.
    pub async fn post_for_text(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<String, ApiError> {
        self.send_for_text(Method::POST, path, query).await
    }

    /// PUT with query parameters only, returning the body as plain text.
    pub async fn put_for_text(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<String, ApiError> {
        self.send_for_text(Method::PUT, path, query).await
    }

    async fn send_for_text(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<String, ApiError> {
        let bytes = self.send(method, path, None, query).await?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.send(Method::DELETE, path, None, query_none())
            .await
            .map(drop)
    }

    /// Resolve `path` under the base URL, segment by segment.
    pub fn url_for(&self, path: &str) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::request_setup("base URL cannot carry a path"))?
            .pop_if_empty()
            .extend(path.split('/').filter(|s| !s.is_empty()));
        Ok(url)
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        query: &[(&str, &str)],
    ) -> Result<Vec<u8>, ApiError> {
        let url = self.url_for(path)?;
        let span = tracing::info_span!(
            "outgoing_http",
            http.method = %method,
            http.url = %url,
            http.status_code = Empty,
            trace_id = Empty,
            otel.kind = "client",
        );

        async move {
            let mut attempt = 1;
            let (status, bytes) = loop {
                match self.send_once(&method, &url, body, query).await {
                    Ok(done) => break done,
                    Err(err) => match self.retry.next_delay(&method, attempt, &err) {
                        Some(delay) => {
                            warn!(attempt, ?delay, error = %err, "request failed, retrying");
                            tokio::time::sleep(delay).await;
                            attempt += 1;
                        }
                        None => {
                            warn!(attempt, error = %err, "request failed");
                            return Err(err);
                        }
                    },
                }
            };
            self.classify(status, bytes)
        }
        .instrument(span)
        .await
    }

    async fn send_once(
        &self,
        method: &Method,
        url: &Url,
        body: Option<&Value>,
        query: &[(&str, &str)],
    ) -> Result<(StatusCode, Vec<u8>), ApiError> {
        let mut builder = self.inner.request(method.clone(), url.clone());
        if !query.is_empty() {
            builder = builder.query(query);
        }
        if let Some(body) = body {
            let raw = serde_json::to_vec(body)
                .map_err(|e| ApiError::request_setup(format!("cannot encode body: {e}")))?;
            builder = builder.body(raw);
        }
        if let Some(token) = self.credentials.bearer_token()? {
            builder = builder.bearer_auth(token);
        }

        let mut req = builder.build().map_err(ApiError::from_transport)?;
        let ctx = trace::inject_trace_context(req.headers_mut());
        Span::current().record("trace_id", ctx.trace_id.as_str());

        let response = self
            .inner
            .execute(req)
            .await
            .map_err(ApiError::from_transport)?;
        let status = response.status();
        let bytes = response.bytes().await.map_err(ApiError::from_transport)?;
        Ok((status, bytes.to_vec()))
    }

    fn classify(&self, status: StatusCode, body: Vec<u8>) -> Result<Vec<u8>, ApiError> {
        Span::current().record("http.status_code", status.as_u16());

        if status.is_success() {
            debug!(status = status.as_u16(), len = body.len(), "response received");
            return Ok(body);
        }

        let message = error_message(status, &body);
        match status {
            StatusCode::UNAUTHORIZED => {
                if let Err(e) = self.credentials.invalidate() {
                    warn!(error = %e, "failed to clear session after 401");
                }
                warn!("server rejected credentials, session cleared");
                Err(ApiError::unauthorized(message))
            }
            StatusCode::FORBIDDEN => {
                warn!("access forbidden");
                Err(ApiError::forbidden(message))
            }
            _ => {
                warn!(status = status.as_u16(), %message, "server error");
                let text = (!body.is_empty()).then(|| String::from_utf8_lossy(&body).into_owned());
                Err(ApiError::server(status.as_u16(), message, text))
            }
        }
    }
}

fn query_none() -> &'static [(&'static str, &'static str)] {
    &[]
}

fn to_json_body<B: Serialize + ?Sized>(body: &B) -> Result<Value, ApiError> {
    serde_json::to_value(body)
        .map_err(|e| ApiError::request_setup(format!("cannot serialize request body: {e}")))
}

fn decode_json<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, ApiError> {
    let raw: &[u8] = if bytes.iter().all(u8::is_ascii_whitespace) {
        b"null"
    } else {
        bytes
    };
    serde_json::from_slice(raw).map_err(|e| ApiError::invalid_response(e.to_string()))
}

/// Best human-readable message from an error response body.
fn error_message(status: StatusCode, body: &[u8]) -> String {
    if let Ok(Value::Object(map)) = serde_json::from_slice::<Value>(body) {
        for key in ["message", "error", "detail"] {
            if let Some(Value::String(s)) = map.get(key) {
                if !s.trim().is_empty() {
                    return s.clone();
                }
            }
        }
    }

    let text = String::from_utf8_lossy(body);
    let text = text.trim();
    if !text.is_empty() {
        return text.chars().take(MAX_ERROR_MESSAGE_LEN).collect();
    }

    status
        .canonical_reason()
        .unwrap_or("Unknown error")
        .to_string()
}

fn parse_base_url(raw: &str) -> Result<Url, ApiError> {
    let url = Url::parse(raw.trim())
        .map_err(|e| ApiError::request_setup(format!("invalid base URL '{raw}': {e}")))?;
    if url.cannot_be_a_base() {
        return Err(ApiError::request_setup(format!(
            "base URL '{url}' cannot carry a path"
        )));
    }
    Ok(url)
}
