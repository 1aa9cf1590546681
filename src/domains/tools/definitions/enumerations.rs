//! Lookup tools for statuses, priorities and trackers.

use async_trait::async_trait;

use super::common::NoParams;
use crate::client::RedmineClient;
use crate::domains::tools::error::ToolResult;
use crate::domains::tools::format::{format_enumerations, format_issue_statuses, format_trackers};
use crate::domains::tools::handlers::RedmineTool;

pub struct ListStatusesTool;

#[async_trait]
impl RedmineTool for ListStatusesTool {
    const NAME: &'static str = "redmine_list_statuses";
    const DESCRIPTION: &'static str = "List all available issue statuses";
    type Params = NoParams;

    async fn execute(client: &RedmineClient, _params: Self::Params) -> ToolResult<String> {
        let statuses = client.list_issue_statuses().await?;
        Ok(format_issue_statuses(&statuses))
    }
}

pub struct ListPrioritiesTool;

#[async_trait]
impl RedmineTool for ListPrioritiesTool {
    const NAME: &'static str = "redmine_list_priorities";
    const DESCRIPTION: &'static str = "List all available issue priorities";
    type Params = NoParams;

    async fn execute(client: &RedmineClient, _params: Self::Params) -> ToolResult<String> {
        let priorities = client.list_issue_priorities().await?;
        Ok(format_enumerations(
            "Available Issue Priorities",
            "No issue priorities found.",
            &priorities,
        ))
    }
}

pub struct ListTrackersTool;

#[async_trait]
impl RedmineTool for ListTrackersTool {
    const NAME: &'static str = "redmine_list_trackers";
    const DESCRIPTION: &'static str = "List all available issue trackers";
    type Params = NoParams;

    async fn execute(client: &RedmineClient, _params: Self::Params) -> ToolResult<String> {
        let trackers = client.list_trackers().await?;
        Ok(format_trackers(&trackers))
    }
}
