//! Logging HTTP client for the Orders API.
//!
//! Every call logs the outgoing request and the response it got back, then
//! hands the response to the caller as-is: status codes are never turned
//! into errors and nothing is retried.

use std::time::Duration;

use orders_types::domain::payload::{OrderPayload, StatusUpdate};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Url;
use serde::de::DeserializeOwned;
use serde_json::Value;

pub use reqwest::{Method, StatusCode};

#[derive(thiserror::Error, Debug)]
pub enum ClientError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("invalid url: {0}")]
    InvalidUrl(String),

    #[error("invalid header: {0}")]
    InvalidHeader(String),

    #[error("failed to encode request body: {0}")]
    Encode(serde_json::Error),

    #[error("failed to decode response body: {0}")]
    Decode(serde_json::Error),
}

/// A request body: one of the typed payloads or an untyped JSON value.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Order(OrderPayload),
    StatusUpdate(StatusUpdate),
    Raw(Value),
}

impl RequestBody {
    /// The JSON sent on the wire. Raw values pass through unchanged.
    pub fn into_wire(self) -> Result<Value, ClientError> {
        match self {
            RequestBody::Order(payload) => {
                serde_json::to_value(payload).map_err(ClientError::Encode)
            }
            RequestBody::StatusUpdate(update) => {
                serde_json::to_value(update).map_err(ClientError::Encode)
            }
            RequestBody::Raw(value) => Ok(value),
        }
    }
}

impl From<OrderPayload> for RequestBody {
    fn from(payload: OrderPayload) -> Self {
        RequestBody::Order(payload)
    }
}

impl From<StatusUpdate> for RequestBody {
    fn from(update: StatusUpdate) -> Self {
        RequestBody::StatusUpdate(update)
    }
}

impl From<Value> for RequestBody {
    fn from(value: Value) -> Self {
        RequestBody::Raw(value)
    }
}

/// A fully read HTTP response.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    url: Url,
    status: StatusCode,
    headers: HeaderMap,
    body: String,
}

impl ApiResponse {
    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn reason(&self) -> &'static str {
        self.status.canonical_reason().unwrap_or("")
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn text(&self) -> &str {
        &self.body
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ClientError> {
        serde_json::from_str(&self.body).map_err(ClientError::Decode)
    }
}

#[derive(Clone)]
pub struct ApiClientBuilder {
    base: String,
    headers: HeaderMap,
    timeout: Option<Duration>,
    client: Option<reqwest::Client>,
}

#[derive(Clone)]
pub struct ApiClient {
    base: String,
    client: reqwest::Client,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        Self::builder(base_url)?.build()
    }

    pub fn builder(base_url: &str) -> Result<ApiClientBuilder, ClientError> {
        Url::parse(base_url).map_err(|e| ClientError::InvalidUrl(format!("{base_url}: {e}")))?;
        Ok(ApiClientBuilder {
            base: base_url.trim_end_matches('/').to_string(),
            headers: HeaderMap::new(),
            timeout: None,
            client: None,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base
    }

    /// Base URL and endpoint concatenated, so a base path prefix is kept.
    pub fn url(&self, endpoint: &str) -> Result<Url, ClientError> {
        let raw = if endpoint.starts_with('/') {
            format!("{}{}", self.base, endpoint)
        } else {
            format!("{}/{}", self.base, endpoint)
        };
        Url::parse(&raw).map_err(|e| ClientError::InvalidUrl(format!("{raw}: {e}")))
    }

    pub async fn post(
        &self,
        endpoint: &str,
        body: impl Into<RequestBody>,
    ) -> Result<ApiResponse, ClientError> {
        self.request(Method::POST, endpoint, Some(body.into())).await
    }

    pub async fn get(&self, endpoint: &str) -> Result<ApiResponse, ClientError> {
        self.request(Method::GET, endpoint, None).await
    }

    pub async fn put(
        &self,
        endpoint: &str,
        body: impl Into<RequestBody>,
    ) -> Result<ApiResponse, ClientError> {
        self.request(Method::PUT, endpoint, Some(body.into())).await
    }

    pub async fn delete(&self, endpoint: &str) -> Result<ApiResponse, ClientError> {
        self.request(Method::DELETE, endpoint, None).await
    }

    pub async fn request(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<RequestBody>,
    ) -> Result<ApiResponse, ClientError> {
        let url = self.url(endpoint)?;
        let json = body.map(RequestBody::into_wire).transpose()?;
        log_request(&method, &url, json.as_ref());

        let mut req = self.client.request(method, url);
        if let Some(json) = &json {
            req = req.json(json);
        }
        let res = req.send().await?;

        let response = ApiResponse {
            url: res.url().clone(),
            status: res.status(),
            headers: res.headers().clone(),
            body: res.text().await?,
        };
        log_response(&response);
        Ok(response)
    }
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

fn log_request(method: &Method, url: &Url, body: Option<&Value>) {
    tracing::info!("REQUEST: {method} {url}");
    if let Some(body) = body {
        tracing::info!("PAYLOAD: {}", pretty(body));
    }
}

fn log_response(response: &ApiResponse) {
    tracing::info!(
        "RESPONSE: {} {}",
        response.status.as_u16(),
        response.reason()
    );
    let content = match serde_json::from_str::<Value>(&response.body) {
        Ok(value) => pretty(&value),
        Err(_) => response.body.clone(),
    };
    if !content.is_empty() {
        tracing::info!("BODY: {content}");
    }
}

impl ApiClientBuilder {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_header(
        mut self,
        key: impl AsRef<str>,
        value: impl AsRef<str>,
    ) -> Result<Self, ClientError> {
        let header_name = HeaderName::from_bytes(key.as_ref().as_bytes())
            .map_err(|e| ClientError::InvalidHeader(format!("name: {e}")))?;
        let header_value = HeaderValue::from_str(value.as_ref())
            .map_err(|e| ClientError::InvalidHeader(format!("value: {e}")))?;
        self.headers.insert(header_name, header_value);
        Ok(self)
    }

    pub fn with_reqwest_client(mut self, client: reqwest::Client) -> Self {
        self.client = Some(client);
        self
    }

    pub fn build(self) -> Result<ApiClient, ClientError> {
        if let Some(client) = self.client {
            return Ok(ApiClient {
                base: self.base,
                client,
            });
        }

        let mut builder = reqwest::Client::builder();
        if !self.headers.is_empty() {
            builder = builder.default_headers(self.headers);
        }
        if let Some(t) = self.timeout {
            builder = builder.timeout(t);
        }
        let client = builder.build()?;
        Ok(ApiClient {
            base: self.base,
            client,
        })
    }
}
