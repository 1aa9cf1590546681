//! Redmine client error types.

use serde_json::Value;
use thiserror::Error;

use super::transport::RemoteResponse;

/// Result type for Redmine client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Failure reported by an [`HttpTransport`](super::HttpTransport) before any
/// HTTP status was obtained.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportFailure {
    /// The request did not complete within the configured timeout.
    #[error("request timed out")]
    Timeout,

    /// The connection could not be established or was aborted.
    #[error("connection failed: {0}")]
    Connection(String),

    /// The request could not be built (bad URL, bad header value, ...).
    #[error("{0}")]
    Setup(String),
}

impl TransportFailure {
    /// Whether no response was received from the server.
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Timeout | Self::Connection(_))
    }
}

/// Errors surfaced by [`RedmineClient`](super::RedmineClient).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClientError {
    /// Redmine answered with a non-2xx status.
    #[error("{}", api_message(.status, .errors))]
    Api { status: u16, errors: Vec<String> },

    /// The request was sent but no response came back.
    #[error("No response from Redmine server. Please check the server URL and network connection.")]
    NoResponse { detail: String },

    /// The request could not be constructed locally.
    #[error("Request setup error: {0}")]
    RequestSetup(String),

    /// The response body did not have the expected shape.
    #[error("Unexpected response from Redmine: {0}")]
    Decode(String),
}

fn api_message(status: &u16, errors: &[String]) -> String {
    if errors.is_empty() {
        format!("Redmine API error ({})", status)
    } else {
        format!("Redmine API error ({}): {}", status, errors.join(", "))
    }
}

impl ClientError {
    /// Create a request setup error.
    pub fn setup(msg: impl Into<String>) -> Self {
        Self::RequestSetup(msg.into())
    }

    /// Create a decode error.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// HTTP status carried by an API error.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Build an API error from a non-success response.
    ///
    /// Redmine reports failures as `{"errors": [...]}`; some endpoints and
    /// proxies use `{"error": "..."}` or a plain text body instead.
    pub fn from_response(response: &RemoteResponse) -> Self {
        let errors = match serde_json::from_str::<Value>(&response.body) {
            Ok(Value::Object(map)) => match (map.get("errors"), map.get("error")) {
                (Some(Value::Array(items)), _) => items.iter().map(value_text).collect(),
                (Some(other), _) => vec![value_text(other)],
                (None, Some(error)) => vec![value_text(error)],
                (None, None) => Vec::new(),
            },
            Ok(Value::String(text)) => vec![text],
            _ => {
                let text = response.body.trim();
                if text.is_empty() || text.starts_with('<') {
                    Vec::new()
                } else {
                    vec![text.to_string()]
                }
            }
        };

        Self::Api {
            status: response.status,
            errors,
        }
    }
}

impl From<TransportFailure> for ClientError {
    fn from(failure: TransportFailure) -> Self {
        match failure {
            TransportFailure::Setup(msg) => Self::RequestSetup(msg),
            other => Self::NoResponse {
                detail: other.to_string(),
            },
        }
    }
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(status: u16, body: &str) -> RemoteResponse {
        RemoteResponse {
            status,
            body: body.to_string(),
        }
    }

    #[test]
    fn test_api_error_lists_remote_messages() {
        let err = ClientError::from_response(&response(
            422,
            r#"{"errors":["Subject cannot be blank","Tracker is not included in the list"]}"#,
        ));
        assert_eq!(err.status(), Some(422));
        assert_eq!(
            err.to_string(),
            "Redmine API error (422): Subject cannot be blank, Tracker is not included in the list"
        );
    }

    #[test]
    fn test_api_error_single_error_field() {
        let err = ClientError::from_response(&response(403, r#"{"error":"Forbidden"}"#));
        assert_eq!(err.to_string(), "Redmine API error (403): Forbidden");
    }

    #[test]
    fn test_api_error_plain_text_and_html_bodies() {
        let err = ClientError::from_response(&response(502, "Bad Gateway"));
        assert_eq!(err.to_string(), "Redmine API error (502): Bad Gateway");

        let err = ClientError::from_response(&response(404, "<html>Not Found</html>"));
        assert_eq!(err.to_string(), "Redmine API error (404)");
    }

    #[test]
    fn test_transport_failures_map_to_client_errors() {
        let err: ClientError = TransportFailure::Timeout.into();
        assert!(matches!(err, ClientError::NoResponse { .. }));
        assert!(err.to_string().starts_with("No response from Redmine server"));

        let err: ClientError = TransportFailure::Setup("bad url".into()).into();
        assert_eq!(err.to_string(), "Request setup error: bad url");
    }
}
