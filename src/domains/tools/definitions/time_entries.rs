//! Time entry tools.

use std::collections::BTreeMap;

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::common::{NoParams, QueryParams, request_body};
use crate::client::RedmineClient;
use crate::domains::tools::error::ToolResult;
use crate::domains::tools::format::{
    format_enumerations, format_list, format_time_entry, page_summary, total_hours,
};
use crate::domains::tools::handlers::RedmineTool;
use crate::domains::tools::validation::{IdArg, Validate, Validator};

/// Longest accepted work description.
pub const MAX_COMMENTS_LEN: usize = 1024;

// ============================================================================
// List
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct ListTimeEntriesParams {
    #[schemars(description = "Project ID or identifier")]
    pub project_id: Option<IdArg>,

    #[schemars(description = "Issue ID")]
    pub issue_id: Option<i64>,

    #[schemars(description = "User ID or \"me\"")]
    pub user_id: Option<IdArg>,

    #[schemars(description = "Specific date (YYYY-MM-DD)")]
    pub spent_on: Option<String>,

    #[schemars(description = "Start date for range (YYYY-MM-DD)")]
    pub from: Option<String>,

    #[schemars(description = "End date for range (YYYY-MM-DD)")]
    pub to: Option<String>,

    #[schemars(description = "Time entry activity ID")]
    pub activity_id: Option<i64>,

    #[schemars(description = "Maximum number of entries to return (1-100, default: 25)")]
    pub limit: Option<i64>,

    #[schemars(description = "Number of entries to skip")]
    pub offset: Option<i64>,
}

impl Validate for ListTimeEntriesParams {
    fn validate(&self, v: &mut Validator) {
        v.positive_int("issue_id", self.issue_id);
        v.positive_int("activity_id", self.activity_id);
        v.date("spent_on", self.spent_on.as_deref());
        v.date("from", self.from.as_deref());
        v.date("to", self.to.as_deref());
        v.pagination(self.limit, self.offset);
    }
}

pub struct ListTimeEntriesTool;

#[async_trait]
impl RedmineTool for ListTimeEntriesTool {
    const NAME: &'static str = "redmine_list_time_entries";
    const DESCRIPTION: &'static str = "List time entries with optional filters";
    type Params = ListTimeEntriesParams;

    async fn execute(client: &RedmineClient, params: Self::Params) -> ToolResult<String> {
        let (query, offset) = QueryParams::new()
            .opt("project_id", params.project_id)
            .opt("issue_id", params.issue_id)
            .opt("user_id", params.user_id)
            .opt("spent_on", params.spent_on)
            .opt("from", params.from)
            .opt("to", params.to)
            .opt("activity_id", params.activity_id)
            .page(params.limit, params.offset);
        let page = client.list_time_entries(query.build()).await?;

        let mut out = page_summary(&page, "time entry(ies)", offset);
        out.push_str(&format!("\nTotal hours: {:.2}\n\n", total_hours(&page.items)));
        if page.items.is_empty() {
            out.push_str("No time entries found matching the criteria.");
        } else {
            out.push_str(&format_list(&page.items, format_time_entry));
        }
        Ok(out)
    }
}

// ============================================================================
// Get
// ============================================================================

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct TimeEntryIdParams {
    #[schemars(description = "Time entry ID")]
    pub id: IdArg,
}

impl Validate for TimeEntryIdParams {
    fn validate(&self, v: &mut Validator) {
        v.id("id", &self.id);
    }
}

pub struct GetTimeEntryTool;

#[async_trait]
impl RedmineTool for GetTimeEntryTool {
    const NAME: &'static str = "redmine_get_time_entry";
    const DESCRIPTION: &'static str = "Get detailed information about a specific time entry";
    type Params = TimeEntryIdParams;

    async fn execute(client: &RedmineClient, params: Self::Params) -> ToolResult<String> {
        let entry = client.get_time_entry(params.id.require("id")?).await?;
        Ok(format_time_entry(&entry))
    }
}

// ============================================================================
// Create / update
// ============================================================================

#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
pub struct CreateTimeEntryParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schemars(description = "Issue ID (either issue_id or project_id is required)")]
    pub issue_id: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[schemars(description = "Project ID (either issue_id or project_id is required)")]
    pub project_id: Option<i64>,

    #[schemars(description = "Time spent in hours")]
    pub hours: f64,

    #[schemars(description = "Activity ID")]
    pub activity_id: i64,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[schemars(description = "Date when time was spent (YYYY-MM-DD, defaults to today)")]
    pub spent_on: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[schemars(description = "Description of work done")]
    pub comments: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[schemars(description = "User ID (admin only, defaults to current user)")]
    pub user_id: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[schemars(description = "Custom field values as key-value pairs")]
    pub custom_field_values: Option<BTreeMap<String, String>>,
}

/// Checks shared by create and update.
struct EntryFields<'a> {
    issue_id: Option<i64>,
    project_id: Option<i64>,
    hours: Option<f64>,
    activity_id: Option<i64>,
    spent_on: Option<&'a str>,
    comments: Option<&'a str>,
}

impl EntryFields<'_> {
    fn validate(&self, v: &mut Validator) {
        v.positive_int("issue_id", self.issue_id);
        v.positive_int("project_id", self.project_id);
        v.positive("hours", self.hours);
        v.positive_int("activity_id", self.activity_id);
        v.date("spent_on", self.spent_on);
        v.length("comments", self.comments, 0, MAX_COMMENTS_LEN);
        if self.issue_id.is_none() && self.project_id.is_none() {
            v.error("issue_id", "Either issue_id or project_id must be provided");
        }
    }
}

impl Validate for CreateTimeEntryParams {
    fn validate(&self, v: &mut Validator) {
        EntryFields {
            issue_id: self.issue_id,
            project_id: self.project_id,
            hours: Some(self.hours),
            activity_id: Some(self.activity_id),
            spent_on: self.spent_on.as_deref(),
            comments: self.comments.as_deref(),
        }
        .validate(v);
        v.positive_int("user_id", self.user_id);
    }
}

pub struct CreateTimeEntryTool;

#[async_trait]
impl RedmineTool for CreateTimeEntryTool {
    const NAME: &'static str = "redmine_create_time_entry";
    const DESCRIPTION: &'static str = "Create a new time entry";
    type Params = CreateTimeEntryParams;

    async fn execute(client: &RedmineClient, params: Self::Params) -> ToolResult<String> {
        let entry = client.create_time_entry(request_body(&params)?).await?;
        info!("Created time entry #{}", entry.id.unwrap_or_default());
        Ok(format!(
            "Time entry created successfully!\n\n{}",
            format_time_entry(&entry)
        ))
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
pub struct UpdateTimeEntryParams {
    #[serde(skip_serializing)]
    #[schemars(description = "Time entry ID to update")]
    pub id: IdArg,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[schemars(description = "Issue ID")]
    pub issue_id: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[schemars(description = "Project ID")]
    pub project_id: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[schemars(description = "Time spent in hours")]
    pub hours: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[schemars(description = "Activity ID")]
    pub activity_id: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[schemars(description = "Date when time was spent (YYYY-MM-DD)")]
    pub spent_on: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[schemars(description = "Description of work done")]
    pub comments: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[schemars(description = "Custom field values as key-value pairs")]
    pub custom_field_values: Option<BTreeMap<String, String>>,
}

impl Validate for UpdateTimeEntryParams {
    fn validate(&self, v: &mut Validator) {
        v.id("id", &self.id);
        EntryFields {
            issue_id: self.issue_id,
            project_id: self.project_id,
            hours: self.hours,
            activity_id: self.activity_id,
            spent_on: self.spent_on.as_deref(),
            comments: self.comments.as_deref(),
        }
        .validate(v);
    }
}

pub struct UpdateTimeEntryTool;

#[async_trait]
impl RedmineTool for UpdateTimeEntryTool {
    const NAME: &'static str = "redmine_update_time_entry";
    const DESCRIPTION: &'static str = "Update an existing time entry";
    type Params = UpdateTimeEntryParams;

    async fn execute(client: &RedmineClient, params: Self::Params) -> ToolResult<String> {
        let id = params.id.require("id")?;
        client.update_time_entry(id, request_body(&params)?).await?;

        let entry = client.get_time_entry(id).await?;
        Ok(format!(
            "Time entry updated successfully!\n\n{}",
            format_time_entry(&entry)
        ))
    }
}

// ============================================================================
// Delete
// ============================================================================

pub struct DeleteTimeEntryTool;

#[async_trait]
impl RedmineTool for DeleteTimeEntryTool {
    const NAME: &'static str = "redmine_delete_time_entry";
    const DESCRIPTION: &'static str = "Delete a time entry";
    type Params = TimeEntryIdParams;

    async fn execute(client: &RedmineClient, params: Self::Params) -> ToolResult<String> {
        let id = params.id.require("id")?;
        client.delete_time_entry(id).await?;
        Ok(format!("Time entry #{} deleted successfully.", id))
    }
}

// ============================================================================
// Activities
// ============================================================================

pub struct ListTimeEntryActivitiesTool;

#[async_trait]
impl RedmineTool for ListTimeEntryActivitiesTool {
    const NAME: &'static str = "redmine_list_time_entry_activities";
    const DESCRIPTION: &'static str = "List available time entry activities";
    type Params = NoParams;

    async fn execute(client: &RedmineClient, _params: Self::Params) -> ToolResult<String> {
        let activities = client.list_time_entry_activities().await?;
        Ok(format_enumerations(
            "Available Time Entry Activities",
            "No time entry activities found.",
            &activities,
        ))
    }
}
