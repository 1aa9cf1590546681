//! HTTP transport used by the Redmine client.
//!
//! [`RedmineClient`](super::RedmineClient) only ever talks to an
//! [`HttpTransport`]. The production implementation wraps `reqwest`; tests
//! substitute a scripted in-memory transport.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Method;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use serde_json::Value;
use tracing::debug;
use url::Url;

use super::error::{ClientError, ClientResult, TransportFailure};
use crate::core::config::{AuthConfig, RedmineConfig};

const API_KEY_HEADER: &str = "x-redmine-api-key";

/// A single outbound call, relative to the configured Redmine base URL.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl RemoteRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self::new(Method::POST, path).with_body(body)
    }

    pub fn put(path: impl Into<String>, body: Value) -> Self {
        Self::new(Method::PUT, path).with_body(body)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Append query parameters in order.
    pub fn with_query<I, K, V>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.query
            .extend(params.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Whether the method has no side effects on the server.
    pub fn is_safe(&self) -> bool {
        self.method == Method::GET || self.method == Method::HEAD
    }

    /// Path with the encoded query string, e.g. `/issues.json?limit=5`.
    pub fn path_and_query(&self) -> ClientResult<String> {
        if self.query.is_empty() {
            return Ok(self.path.clone());
        }
        let query = serde_urlencoded::to_string(&self.query)
            .map_err(|e| ClientError::setup(format!("invalid query parameters: {}", e)))?;
        let separator = if self.path.contains('?') { '&' } else { '?' };
        Ok(format!("{}{}{}", self.path, separator, query))
    }
}

/// Raw response as received from Redmine.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteResponse {
    pub status: u16,
    pub body: String,
}

impl RemoteResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_server_error(&self) -> bool {
        (500..600).contains(&self.status)
    }
}

/// Sends [`RemoteRequest`]s to the tracker.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn send(&self, request: &RemoteRequest) -> Result<RemoteResponse, TransportFailure>;
}

/// `reqwest`-backed transport with authentication and TLS configured once.
pub struct ReqwestTransport {
    http: reqwest::Client,
    base_url: Url,
    auth: AuthConfig,
}

impl ReqwestTransport {
    /// Build the HTTP client from the Redmine section of the configuration.
    pub fn new(config: &RedmineConfig) -> ClientResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if let AuthConfig::ApiKey(key) = &config.auth {
            let mut value = HeaderValue::from_str(key)
                .map_err(|_| ClientError::setup("API key contains invalid header characters"))?;
            value.set_sensitive(true);
            headers.insert(HeaderName::from_static(API_KEY_HEADER), value);
        }

        let mut builder = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(concat!("mcp-server-redmine/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .danger_accept_invalid_certs(!config.ssl_verify);

        if let Some(path) = &config.ca_cert {
            let pem = std::fs::read(path).map_err(|e| {
                ClientError::setup(format!("failed to read CA bundle {}: {}", path.display(), e))
            })?;
            let certificate = reqwest::Certificate::from_pem(&pem)
                .map_err(|e| ClientError::setup(format!("invalid CA bundle: {}", e)))?;
            builder = builder.add_root_certificate(certificate);
        }

        let http = builder
            .build()
            .map_err(|e| ClientError::setup(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: config.url.clone(),
            auth: config.auth.clone(),
        })
    }

    /// Resolve a request against the base URL, keeping any base path prefix
    /// (Redmine is often served below `/redmine`).
    fn url_for(&self, request: &RemoteRequest) -> ClientResult<Url> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let path_and_query = request.path_and_query()?;
        let joined = if path_and_query.starts_with('/') {
            format!("{}{}", base, path_and_query)
        } else {
            format!("{}/{}", base, path_and_query)
        };
        Url::parse(&joined).map_err(|e| ClientError::setup(format!("invalid URL {}: {}", joined, e)))
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: &RemoteRequest) -> Result<RemoteResponse, TransportFailure> {
        let url = self
            .url_for(request)
            .map_err(|e| TransportFailure::Setup(e.to_string()))?;

        debug!("{} {}", request.method, url.path());

        let mut builder = self.http.request(request.method.clone(), url);
        if let AuthConfig::Basic { username, password } = &self.auth {
            builder = builder.basic_auth(username, Some(password));
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(classify)?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(classify)?;

        Ok(RemoteResponse { status, body })
    }
}

fn classify(err: reqwest::Error) -> TransportFailure {
    if err.is_timeout() {
        TransportFailure::Timeout
    } else if err.is_builder() {
        TransportFailure::Setup(err.to_string())
    } else {
        TransportFailure::Connection(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn config(url: &str) -> RedmineConfig {
        RedmineConfig::new(
            Url::parse(url).unwrap(),
            AuthConfig::ApiKey("secret".to_string()),
        )
    }

    #[test]
    fn test_path_and_query_encodes_parameters() {
        let request = RemoteRequest::get("/issues.json")
            .with_query([("project_id", "demo"), ("subject", "~login page")]);
        assert_eq!(
            request.path_and_query().unwrap(),
            "/issues.json?project_id=demo&subject=%7Elogin+page"
        );
    }

    #[test]
    fn test_only_get_and_head_are_safe() {
        assert!(RemoteRequest::get("/issues.json").is_safe());
        assert!(!RemoteRequest::post("/issues.json", json!({})).is_safe());
        assert!(!RemoteRequest::put("/issues/1.json", json!({})).is_safe());
        assert!(!RemoteRequest::delete("/issues/1.json").is_safe());
    }

    #[test]
    fn test_url_keeps_base_path_prefix() {
        let transport = ReqwestTransport::new(&config("https://example.com/redmine/")).unwrap();
        let url = transport
            .url_for(&RemoteRequest::get("/issues.json").with_query([("limit", "5")]))
            .unwrap();
        assert_eq!(url.as_str(), "https://example.com/redmine/issues.json?limit=5");
    }

    #[test]
    fn test_missing_ca_bundle_is_setup_error() {
        let mut cfg = config("https://example.com");
        cfg.ca_cert = Some("/nonexistent/ca.pem".into());
        let err = ReqwestTransport::new(&cfg).err().unwrap();
        assert!(matches!(err, ClientError::RequestSetup(_)));
    }

    #[test]
    fn test_server_error_classification() {
        let response = RemoteResponse {
            status: 503,
            body: String::new(),
        };
        assert!(response.is_server_error());
        assert!(!response.is_success());
    }

    /// Accept one connection, answer `200 {}` and return the raw request
    /// lowercased.
    async fn capture_request(listener: TcpListener) -> String {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut raw = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            raw.extend_from_slice(&chunk[..n]);

            let text = String::from_utf8_lossy(&raw).to_ascii_lowercase();
            if let Some(end) = text.find("\r\n\r\n") {
                let length = text[..end]
                    .lines()
                    .find_map(|line| line.strip_prefix("content-length:"))
                    .and_then(|v| v.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if raw.len() >= end + 4 + length {
                    break;
                }
            }
        }
        socket
            .write_all(
                b"HTTP/1.1 200 OK\r\ncontent-type: application/json\r\n\
                  content-length: 2\r\nconnection: close\r\n\r\n{}",
            )
            .await
            .unwrap();
        String::from_utf8_lossy(&raw).to_ascii_lowercase()
    }

    async fn local_listener() -> (TcpListener, String) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        (listener, url)
    }

    #[tokio::test]
    async fn test_sends_api_key_and_json_content_type() {
        let (listener, url) = local_listener().await;
        let server = tokio::spawn(capture_request(listener));

        let transport = ReqwestTransport::new(&config(&url)).unwrap();
        let response = transport
            .send(&RemoteRequest::get("/issues.json").with_query([("limit", "5")]))
            .await
            .unwrap();
        assert_eq!(response.status, 200);
        assert_eq!(response.body, "{}");

        let request = server.await.unwrap();
        assert!(request.starts_with("get /issues.json?limit=5 http/1.1\r\n"));
        assert!(request.contains("\r\nx-redmine-api-key: secret\r\n"));
        assert!(request.contains("\r\ncontent-type: application/json\r\n"));
        assert!(!request.contains("\r\nauthorization:"));
    }

    #[tokio::test]
    async fn test_sends_basic_auth_with_body() {
        let (listener, url) = local_listener().await;
        let server = tokio::spawn(capture_request(listener));

        let cfg = RedmineConfig::new(
            Url::parse(&url).unwrap(),
            AuthConfig::Basic {
                username: "alice".to_string(),
                password: "s3cret".to_string(),
            },
        );
        let transport = ReqwestTransport::new(&cfg).unwrap();
        transport
            .send(&RemoteRequest::post(
                "/issues.json",
                json!({"issue": {"subject": "Hi"}}),
            ))
            .await
            .unwrap();

        let request = server.await.unwrap();
        assert!(request.starts_with("post /issues.json http/1.1\r\n"));
        assert!(request.contains("\r\nauthorization: basic ywxpy2u6cznjcmv0\r\n"));
        assert!(request.contains("\r\ncontent-type: application/json\r\n"));
        assert!(!request.contains("x-redmine-api-key"));
        assert!(request.ends_with(r#"{"issue":{"subject":"hi"}}"#));
    }
}
