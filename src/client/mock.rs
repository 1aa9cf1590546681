//! Scripted in-memory transport for tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;

use super::error::TransportFailure;
use super::redmine::RedmineClient;
use super::retry::RetryPolicy;
use super::transport::{HttpTransport, RemoteRequest, RemoteResponse};

type Outcome = Result<RemoteResponse, TransportFailure>;

struct Route {
    method: Method,
    path: String,
    outcomes: VecDeque<Outcome>,
}

/// Answers requests from per-route queues. The last queued outcome of a
/// route is repeated; unscripted routes answer 404.
#[derive(Default)]
pub(crate) struct MockTransport {
    routes: Mutex<Vec<Route>>,
    requests: Mutex<Vec<RemoteRequest>>,
}

impl MockTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Queue a response. `Value::Null` produces an empty body.
    pub fn on(&self, method: Method, path: &str, status: u16, body: Value) -> &Self {
        let body = match body {
            Value::Null => String::new(),
            other => other.to_string(),
        };
        self.push(method, path, Ok(RemoteResponse { status, body }))
    }

    /// Queue a transport-level failure.
    pub fn fail(&self, method: Method, path: &str, failure: TransportFailure) -> &Self {
        self.push(method, path, Err(failure))
    }

    fn push(&self, method: Method, path: &str, outcome: Outcome) -> &Self {
        let mut routes = self.routes.lock().unwrap();
        match routes
            .iter_mut()
            .find(|r| r.method == method && r.path == path)
        {
            Some(route) => route.outcomes.push_back(outcome),
            None => routes.push(Route {
                method,
                path: path.to_string(),
                outcomes: VecDeque::from([outcome]),
            }),
        }
        drop(routes);
        self
    }

    /// Every request received, in order.
    pub fn requests(&self) -> Vec<RemoteRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// A client over this transport with three instant retries.
    pub fn client(self: &Arc<Self>) -> RedmineClient {
        RedmineClient::with_transport(
            self.clone(),
            RetryPolicy::new(3).with_base_delay(Duration::ZERO),
        )
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn send(&self, request: &RemoteRequest) -> Result<RemoteResponse, TransportFailure> {
        self.requests.lock().unwrap().push(request.clone());

        let mut routes = self.routes.lock().unwrap();
        let route = routes
            .iter_mut()
            .find(|r| r.method == request.method && r.path == request.path);

        match route {
            Some(route) if route.outcomes.len() > 1 => route.outcomes.pop_front().unwrap(),
            Some(route) => route.outcomes.front().cloned().unwrap(),
            None => Ok(RemoteResponse {
                status: 404,
                body: r#"{"errors":["Not mocked"]}"#.to_string(),
            }),
        }
    }
}
