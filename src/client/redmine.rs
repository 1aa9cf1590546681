//! Redmine REST client.
//!
//! One method per resource and verb. Every call goes through [`RedmineClient::send`],
//! which applies the retry policy and turns non-2xx responses into
//! [`ClientError::Api`].

use std::sync::Arc;

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};
use url::form_urlencoded;

use super::error::{ClientError, ClientResult};
use super::retry::{RetryPolicy, is_transient};
use super::transport::{HttpTransport, RemoteRequest, RemoteResponse, ReqwestTransport};
use super::types::*;
use crate::core::config::RedmineConfig;

/// Ordered query-string parameters.
pub type Query = Vec<(String, String)>;

/// Client for the Redmine REST API.
#[derive(Clone)]
pub struct RedmineClient {
    transport: Arc<dyn HttpTransport>,
    retry: RetryPolicy,
}

impl RedmineClient {
    /// Create a client backed by `reqwest` from configuration.
    pub fn new(config: &RedmineConfig) -> ClientResult<Self> {
        let transport = ReqwestTransport::new(config)?;
        Ok(Self::with_transport(
            Arc::new(transport),
            RetryPolicy::from_config(config),
        ))
    }

    /// Create a client over an arbitrary transport.
    pub fn with_transport(transport: Arc<dyn HttpTransport>, retry: RetryPolicy) -> Self {
        Self { transport, retry }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    /// Send a request with retries and map error statuses to [`ClientError`].
    pub async fn send(&self, request: RemoteRequest) -> ClientResult<RemoteResponse> {
        debug!("Redmine request: {} {}", request.method, request.path);

        let policy = self.retry.for_request(&request);
        let outcome = policy
            .run(|| self.transport.send(&request), is_transient)
            .await;

        let response = outcome.map_err(|failure| {
            warn!("Redmine request {} {} failed: {}", request.method, request.path, failure);
            ClientError::from(failure)
        })?;

        if response.is_success() {
            Ok(response)
        } else {
            let err = ClientError::from_response(&response);
            warn!("Redmine request {} {} rejected: {}", request.method, request.path, err);
            Err(err)
        }
    }

    async fn fetch<T: DeserializeOwned>(&self, request: RemoteRequest) -> ClientResult<T> {
        let response = self.send(request).await?;
        serde_json::from_str(&response.body).map_err(|e| ClientError::decode(e.to_string()))
    }

    async fn execute(&self, request: RemoteRequest) -> ClientResult<()> {
        self.send(request).await.map(|_| ())
    }

    // ========================================================================
    // Projects
    // ========================================================================

    pub async fn list_projects(&self, query: Query) -> ClientResult<Page<Project>> {
        let list: ProjectList = self
            .fetch(RemoteRequest::get("/projects.json").with_query(query))
            .await?;
        Ok(Page::new(list.projects, list.total_count, list.offset))
    }

    pub async fn get_project(&self, id: &str, include: &[String]) -> ClientResult<Project> {
        let request = RemoteRequest::get(format!("/projects/{}.json", segment(id)))
            .with_query(include_param(include));
        let envelope: ProjectEnvelope = self.fetch(request).await?;
        Ok(envelope.project)
    }

    pub async fn list_versions(&self, project_id: &str) -> ClientResult<Vec<Version>> {
        let list: VersionList = self
            .fetch(RemoteRequest::get(format!(
                "/projects/{}/versions.json",
                segment(project_id)
            )))
            .await?;
        Ok(list.versions)
    }

    // ========================================================================
    // Issues
    // ========================================================================

    pub async fn list_issues(&self, query: Query) -> ClientResult<Page<Issue>> {
        let list: IssueList = self
            .fetch(RemoteRequest::get("/issues.json").with_query(query))
            .await?;
        Ok(Page::new(list.issues, list.total_count, list.offset))
    }

    pub async fn get_issue(&self, id: u64, include: &[String]) -> ClientResult<Issue> {
        let request =
            RemoteRequest::get(format!("/issues/{}.json", id)).with_query(include_param(include));
        let envelope: IssueEnvelope = self.fetch(request).await?;
        Ok(envelope.issue)
    }

    pub async fn create_issue(&self, issue: Value) -> ClientResult<Issue> {
        let envelope: IssueEnvelope = self
            .fetch(RemoteRequest::post(
                "/issues.json",
                serde_json::json!({ "issue": issue }),
            ))
            .await?;
        Ok(envelope.issue)
    }

    pub async fn update_issue(&self, id: u64, issue: Value) -> ClientResult<()> {
        self.execute(RemoteRequest::put(
            format!("/issues/{}.json", id),
            serde_json::json!({ "issue": issue }),
        ))
        .await
    }

    pub async fn delete_issue(&self, id: u64) -> ClientResult<()> {
        self.execute(RemoteRequest::delete(format!("/issues/{}.json", id)))
            .await
    }

    // ========================================================================
    // Time entries
    // ========================================================================

    pub async fn list_time_entries(&self, query: Query) -> ClientResult<Page<TimeEntry>> {
        let list: TimeEntryList = self
            .fetch(RemoteRequest::get("/time_entries.json").with_query(query))
            .await?;
        Ok(Page::new(list.time_entries, list.total_count, list.offset))
    }

    pub async fn get_time_entry(&self, id: u64) -> ClientResult<TimeEntry> {
        let envelope: TimeEntryEnvelope = self
            .fetch(RemoteRequest::get(format!("/time_entries/{}.json", id)))
            .await?;
        Ok(envelope.time_entry)
    }

    pub async fn create_time_entry(&self, entry: Value) -> ClientResult<TimeEntry> {
        let envelope: TimeEntryEnvelope = self
            .fetch(RemoteRequest::post(
                "/time_entries.json",
                serde_json::json!({ "time_entry": entry }),
            ))
            .await?;
        Ok(envelope.time_entry)
    }

    pub async fn update_time_entry(&self, id: u64, entry: Value) -> ClientResult<()> {
        self.execute(RemoteRequest::put(
            format!("/time_entries/{}.json", id),
            serde_json::json!({ "time_entry": entry }),
        ))
        .await
    }

    pub async fn delete_time_entry(&self, id: u64) -> ClientResult<()> {
        self.execute(RemoteRequest::delete(format!("/time_entries/{}.json", id)))
            .await
    }

    pub async fn list_time_entry_activities(&self) -> ClientResult<Vec<Enumeration>> {
        let list: ActivityList = self
            .fetch(RemoteRequest::get(
                "/enumerations/time_entry_activities.json",
            ))
            .await?;
        Ok(list.time_entry_activities)
    }

    // ========================================================================
    // Users
    // ========================================================================

    pub async fn list_users(&self, query: Query) -> ClientResult<Page<User>> {
        let list: UserList = self
            .fetch(RemoteRequest::get("/users.json").with_query(query))
            .await?;
        Ok(Page::new(list.users, list.total_count, list.offset))
    }

    pub async fn get_current_user(&self) -> ClientResult<User> {
        let envelope: UserEnvelope = self.fetch(RemoteRequest::get("/users/current.json")).await?;
        Ok(envelope.user)
    }

    pub async fn get_user(&self, id: u64, include: &[String]) -> ClientResult<User> {
        let request =
            RemoteRequest::get(format!("/users/{}.json", id)).with_query(include_param(include));
        let envelope: UserEnvelope = self.fetch(request).await?;
        Ok(envelope.user)
    }

    // ========================================================================
    // Wiki
    // ========================================================================

    pub async fn list_wiki_pages(&self, project_id: &str) -> ClientResult<Vec<WikiPage>> {
        let list: WikiPageList = self
            .fetch(RemoteRequest::get(format!(
                "/projects/{}/wiki/index.json",
                segment(project_id)
            )))
            .await?;
        Ok(list.wiki_pages)
    }

    pub async fn get_wiki_page(
        &self,
        project_id: &str,
        title: &str,
        version: Option<u64>,
    ) -> ClientResult<WikiPage> {
        let path = match version {
            Some(version) => format!(
                "/projects/{}/wiki/{}/{}.json",
                segment(project_id),
                segment(title),
                version
            ),
            None => format!("/projects/{}/wiki/{}.json", segment(project_id), segment(title)),
        };
        let envelope: WikiPageEnvelope = self.fetch(RemoteRequest::get(path)).await?;
        Ok(envelope.wiki_page)
    }

    pub async fn put_wiki_page(&self, project_id: &str, title: &str, page: Value) -> ClientResult<()> {
        self.execute(RemoteRequest::put(
            format!("/projects/{}/wiki/{}.json", segment(project_id), segment(title)),
            serde_json::json!({ "wiki_page": page }),
        ))
        .await
    }

    pub async fn delete_wiki_page(&self, project_id: &str, title: &str) -> ClientResult<()> {
        self.execute(RemoteRequest::delete(format!(
            "/projects/{}/wiki/{}.json",
            segment(project_id),
            segment(title)
        )))
        .await
    }

    // ========================================================================
    // Enumerations and search
    // ========================================================================

    pub async fn list_issue_statuses(&self) -> ClientResult<Vec<IssueStatus>> {
        let list: IssueStatusList = self.fetch(RemoteRequest::get("/issue_statuses.json")).await?;
        Ok(list.issue_statuses)
    }

    pub async fn list_issue_priorities(&self) -> ClientResult<Vec<Enumeration>> {
        let list: PriorityList = self
            .fetch(RemoteRequest::get("/enumerations/issue_priorities.json"))
            .await?;
        Ok(list.issue_priorities)
    }

    pub async fn list_trackers(&self) -> ClientResult<Vec<Tracker>> {
        let list: TrackerList = self.fetch(RemoteRequest::get("/trackers.json")).await?;
        Ok(list.trackers)
    }

    pub async fn search(&self, query: Query) -> ClientResult<Page<SearchResult>> {
        let list: SearchList = self
            .fetch(RemoteRequest::get("/search.json").with_query(query))
            .await?;
        Ok(Page::new(list.results, list.total_count, list.offset))
    }

    // ========================================================================
    // Arbitrary requests
    // ========================================================================

    /// Issue any request against the API. Returns the decoded body, or `None`
    /// when Redmine answered with an empty body. Non-JSON bodies come back as
    /// a JSON string.
    pub async fn custom_request(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        query: Query,
    ) -> ClientResult<(u16, Option<Value>)> {
        let mut request = RemoteRequest::new(method, path).with_query(query);
        request.body = body;

        let response = self.send(request).await?;
        if response.body.trim().is_empty() {
            return Ok((response.status, None));
        }
        let value = serde_json::from_str(&response.body)
            .unwrap_or_else(|_| Value::String(response.body.clone()));
        Ok((response.status, Some(value)))
    }
}

/// Percent-encode one path segment taken from user input.
fn segment(raw: &str) -> String {
    form_urlencoded::byte_serialize(raw.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

fn include_param(include: &[String]) -> Option<(String, String)> {
    if include.is_empty() {
        None
    } else {
        Some(("include".to_string(), include.join(",")))
    }
}
