//! Issue tools: list, get, create, update and delete.

use std::collections::BTreeMap;

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::common::{QueryParams, request_body, with_include};
use crate::client::RedmineClient;
use crate::domains::tools::error::ToolResult;
use crate::domains::tools::format::{
    format_issue, format_issue_summary, format_list, page_summary,
};
use crate::domains::tools::handlers::RedmineTool;
use crate::domains::tools::validation::{IdArg, Validate, Validator};

// ============================================================================
// List
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct ListIssuesParams {
    #[schemars(description = "Project ID or identifier")]
    pub project_id: Option<IdArg>,

    #[schemars(description = "Subproject filter (e.g. \"!*\" to exclude subprojects)")]
    pub subproject_id: Option<String>,

    #[schemars(description = "Status ID or \"open\"/\"closed\"/\"*\"")]
    pub status_id: Option<IdArg>,

    #[schemars(description = "User ID, \"me\", or group ID")]
    pub assigned_to_id: Option<IdArg>,

    #[schemars(description = "Tracker ID")]
    pub tracker_id: Option<i64>,

    #[schemars(description = "Parent issue ID")]
    pub parent_id: Option<i64>,

    #[schemars(description = "Issue category ID")]
    pub category_id: Option<i64>,

    #[schemars(description = "Target version ID")]
    pub fixed_version_id: Option<IdArg>,

    #[schemars(description = "Filter by subject (e.g. \"~crash\" for partial match)")]
    pub subject: Option<String>,

    #[schemars(description = "Created date filter (e.g. \"><2024-01-01|2024-12-31\")")]
    pub created_on: Option<String>,

    #[schemars(description = "Updated date filter")]
    pub updated_on: Option<String>,

    #[schemars(description = "Closed date filter")]
    pub closed_on: Option<String>,

    #[schemars(description = "Start date filter")]
    pub start_date: Option<String>,

    #[schemars(description = "Due date filter")]
    pub due_date: Option<String>,

    #[schemars(description = "Sort order (e.g. \"priority:desc,updated_on:desc\")")]
    pub sort: Option<String>,

    #[schemars(description = "Maximum number of issues to return (1-100, default: 25)")]
    pub limit: Option<i64>,

    #[schemars(description = "Number of issues to skip")]
    pub offset: Option<i64>,
}

impl Validate for ListIssuesParams {
    fn validate(&self, v: &mut Validator) {
        v.positive_int("tracker_id", self.tracker_id);
        v.positive_int("parent_id", self.parent_id);
        v.positive_int("category_id", self.category_id);
        v.pagination(self.limit, self.offset);
    }
}

pub struct ListIssuesTool;

#[async_trait]
impl RedmineTool for ListIssuesTool {
    const NAME: &'static str = "redmine_list_issues";
    const DESCRIPTION: &'static str = "List issues from Redmine with optional filters";
    type Params = ListIssuesParams;

    async fn execute(client: &RedmineClient, params: Self::Params) -> ToolResult<String> {
        let (query, offset) = QueryParams::new()
            .opt("project_id", params.project_id)
            .opt("subproject_id", params.subproject_id)
            .opt("status_id", params.status_id)
            .opt("assigned_to_id", params.assigned_to_id)
            .opt("tracker_id", params.tracker_id)
            .opt("parent_id", params.parent_id)
            .opt("category_id", params.category_id)
            .opt("fixed_version_id", params.fixed_version_id)
            .opt("subject", params.subject)
            .opt("created_on", params.created_on)
            .opt("updated_on", params.updated_on)
            .opt("closed_on", params.closed_on)
            .opt("start_date", params.start_date)
            .opt("due_date", params.due_date)
            .opt("sort", params.sort)
            .page(params.limit, params.offset);

        let page = client.list_issues(query.build()).await?;

        let mut out = page_summary(&page, "issue(s)", offset);
        out.push_str("\n\n");
        if page.items.is_empty() {
            out.push_str("No issues found matching the criteria.");
        } else {
            out.push_str(&format_list(&page.items, format_issue_summary));
        }
        Ok(out)
    }
}

// ============================================================================
// Get
// ============================================================================

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct GetIssueParams {
    #[schemars(description = "Issue ID")]
    pub id: IdArg,

    #[schemars(
        description = "Additional data to include: journals, watchers, relations, children, attachments, changesets"
    )]
    pub include: Option<Vec<String>>,
}

impl Validate for GetIssueParams {
    fn validate(&self, v: &mut Validator) {
        v.id("id", &self.id);
    }
}

pub struct GetIssueTool;

#[async_trait]
impl RedmineTool for GetIssueTool {
    const NAME: &'static str = "redmine_get_issue";
    const DESCRIPTION: &'static str = "Get detailed information about a specific issue";
    type Params = GetIssueParams;

    async fn execute(client: &RedmineClient, params: Self::Params) -> ToolResult<String> {
        let id = params.id.require("id")?;
        // Comments are always shown.
        let include = with_include(params.include, "journals");
        let issue = client.get_issue(id, &include).await?;
        Ok(format_issue(&issue))
    }
}

// ============================================================================
// Create
// ============================================================================

#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
pub struct CreateIssueParams {
    #[schemars(description = "Project ID")]
    pub project_id: IdArg,

    #[schemars(description = "Issue subject/title")]
    pub subject: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[schemars(description = "Issue description")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[schemars(description = "Tracker ID (e.g. Bug, Feature, Task)")]
    pub tracker_id: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[schemars(description = "Status ID")]
    pub status_id: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[schemars(description = "Priority ID")]
    pub priority_id: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[schemars(description = "Assigned user ID")]
    pub assigned_to_id: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[schemars(description = "Category ID")]
    pub category_id: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[schemars(description = "Target version ID")]
    pub fixed_version_id: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[schemars(description = "Parent issue ID")]
    pub parent_issue_id: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[schemars(description = "Start date (YYYY-MM-DD)")]
    pub start_date: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[schemars(description = "Due date (YYYY-MM-DD)")]
    pub due_date: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[schemars(description = "Estimated hours")]
    pub estimated_hours: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[schemars(description = "Completion percentage (0-100)")]
    pub done_ratio: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[schemars(description = "Whether the issue is private")]
    pub is_private: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[schemars(description = "User IDs to add as watchers")]
    pub watcher_user_ids: Option<Vec<i64>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[schemars(description = "Custom field values keyed by custom field ID")]
    pub custom_field_values: Option<BTreeMap<String, String>>,
}

/// Field checks shared by create and update.
fn validate_issue_fields(
    v: &mut Validator,
    ids: [(&str, Option<i64>); 7],
    start_date: Option<&str>,
    due_date: Option<&str>,
    estimated_hours: Option<f64>,
    done_ratio: Option<f64>,
) {
    for (field, value) in ids {
        v.positive_int(field, value);
    }
    v.date("start_date", start_date);
    v.date("due_date", due_date);
    v.positive("estimated_hours", estimated_hours);
    v.range("done_ratio", done_ratio, 0.0, 100.0);
}

impl Validate for CreateIssueParams {
    fn validate(&self, v: &mut Validator) {
        v.id("project_id", &self.project_id);
        v.length("subject", Some(&self.subject), 1, 255);
        validate_issue_fields(
            v,
            [
                ("tracker_id", self.tracker_id),
                ("status_id", self.status_id),
                ("priority_id", self.priority_id),
                ("assigned_to_id", self.assigned_to_id),
                ("category_id", self.category_id),
                ("fixed_version_id", self.fixed_version_id),
                ("parent_issue_id", self.parent_issue_id),
            ],
            self.start_date.as_deref(),
            self.due_date.as_deref(),
            self.estimated_hours,
            self.done_ratio,
        );
        for watcher in self.watcher_user_ids.iter().flatten() {
            v.positive_int("watcher_user_ids", Some(*watcher));
        }
    }
}

pub struct CreateIssueTool;

#[async_trait]
impl RedmineTool for CreateIssueTool {
    const NAME: &'static str = "redmine_create_issue";
    const DESCRIPTION: &'static str = "Create a new issue in Redmine";
    type Params = CreateIssueParams;

    async fn execute(client: &RedmineClient, params: Self::Params) -> ToolResult<String> {
        let project_id = params.project_id.require("project_id")?;
        let mut body = request_body(&params)?;
        body["project_id"] = project_id.into();

        let issue = client.create_issue(body).await?;
        info!("Created issue #{}", issue.id.unwrap_or_default());
        Ok(format!(
            "Issue created successfully!\n\n{}",
            format_issue(&issue)
        ))
    }
}

// ============================================================================
// Update
// ============================================================================

#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
pub struct UpdateIssueParams {
    #[serde(skip_serializing)]
    #[schemars(description = "Issue ID to update")]
    pub id: IdArg,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[schemars(description = "Issue subject/title")]
    pub subject: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[schemars(description = "Issue description")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[schemars(description = "Update notes/comment")]
    pub notes: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[schemars(description = "Whether the notes are private")]
    pub private_notes: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[schemars(description = "Project ID (moves the issue)")]
    pub project_id: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[schemars(description = "Tracker ID")]
    pub tracker_id: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[schemars(description = "Status ID")]
    pub status_id: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[schemars(description = "Priority ID")]
    pub priority_id: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[schemars(description = "Assigned user ID")]
    pub assigned_to_id: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[schemars(description = "Category ID")]
    pub category_id: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[schemars(description = "Target version ID")]
    pub fixed_version_id: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[schemars(description = "Parent issue ID")]
    pub parent_issue_id: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[schemars(description = "Start date (YYYY-MM-DD)")]
    pub start_date: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[schemars(description = "Due date (YYYY-MM-DD)")]
    pub due_date: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[schemars(description = "Estimated hours")]
    pub estimated_hours: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[schemars(description = "Completion percentage (0-100)")]
    pub done_ratio: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[schemars(description = "Whether the issue is private")]
    pub is_private: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[schemars(description = "Custom field values keyed by custom field ID")]
    pub custom_field_values: Option<BTreeMap<String, String>>,
}

impl Validate for UpdateIssueParams {
    fn validate(&self, v: &mut Validator) {
        v.id("id", &self.id);
        v.positive_int("project_id", self.project_id);
        v.length("subject", self.subject.as_deref(), 1, 255);
        validate_issue_fields(
            v,
            [
                ("tracker_id", self.tracker_id),
                ("status_id", self.status_id),
                ("priority_id", self.priority_id),
                ("assigned_to_id", self.assigned_to_id),
                ("category_id", self.category_id),
                ("fixed_version_id", self.fixed_version_id),
                ("parent_issue_id", self.parent_issue_id),
            ],
            self.start_date.as_deref(),
            self.due_date.as_deref(),
            self.estimated_hours,
            self.done_ratio,
        );
    }
}

pub struct UpdateIssueTool;

#[async_trait]
impl RedmineTool for UpdateIssueTool {
    const NAME: &'static str = "redmine_update_issue";
    const DESCRIPTION: &'static str = "Update an existing issue in Redmine";
    type Params = UpdateIssueParams;

    async fn execute(client: &RedmineClient, params: Self::Params) -> ToolResult<String> {
        let id = params.id.require("id")?;
        client.update_issue(id, request_body(&params)?).await?;

        // Redmine answers updates with an empty body; show the current state.
        let issue = client.get_issue(id, &[]).await?;
        Ok(format!(
            "Issue updated successfully!\n\n{}",
            format_issue(&issue)
        ))
    }
}

// ============================================================================
// Delete
// ============================================================================

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct DeleteIssueParams {
    #[schemars(description = "Issue ID to delete")]
    pub id: IdArg,
}

impl Validate for DeleteIssueParams {
    fn validate(&self, v: &mut Validator) {
        v.id("id", &self.id);
    }
}

pub struct DeleteIssueTool;

#[async_trait]
impl RedmineTool for DeleteIssueTool {
    const NAME: &'static str = "redmine_delete_issue";
    const DESCRIPTION: &'static str = "Delete an issue from Redmine";
    type Params = DeleteIssueParams;

    async fn execute(client: &RedmineClient, params: Self::Params) -> ToolResult<String> {
        let id = params.id.require("id")?;
        client.delete_issue(id).await?;
        Ok(format!("Issue #{} deleted successfully.", id))
    }
}

// ============================================================================
// Tests
// ============================================================================
