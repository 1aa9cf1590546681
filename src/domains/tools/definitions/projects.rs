//! Project tools.

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;

use super::common::QueryParams;
use crate::client::RedmineClient;
use crate::domains::tools::error::ToolResult;
use crate::domains::tools::format::{
    format_list, format_project, format_project_detail, format_versions, page_summary,
};
use crate::domains::tools::handlers::RedmineTool;
use crate::domains::tools::validation::{IdArg, Validate, Validator};

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct ListProjectsParams {
    #[schemars(description = "Maximum number of projects to return (1-100, default: 25)")]
    pub limit: Option<i64>,

    #[schemars(description = "Number of projects to skip")]
    pub offset: Option<i64>,
}

impl Validate for ListProjectsParams {
    fn validate(&self, v: &mut Validator) {
        v.pagination(self.limit, self.offset);
    }
}

pub struct ListProjectsTool;

#[async_trait]
impl RedmineTool for ListProjectsTool {
    const NAME: &'static str = "redmine_list_projects";
    const DESCRIPTION: &'static str = "List all available Redmine projects";
    type Params = ListProjectsParams;

    async fn execute(client: &RedmineClient, params: Self::Params) -> ToolResult<String> {
        let (query, offset) = QueryParams::new().page(params.limit, params.offset);
        let page = client.list_projects(query.build()).await?;

        let mut out = page_summary(&page, "project(s)", offset);
        out.push_str("\n\n");
        if page.items.is_empty() {
            out.push_str("No projects found.");
        } else {
            out.push_str(&format_list(&page.items, format_project));
        }
        Ok(out)
    }
}

/// Project ID or identifier, used as a path segment.
pub(crate) fn project_ref(id: &IdArg, field: &str, v: &mut Validator) {
    match id {
        IdArg::Number(_) => v.id(field, id),
        IdArg::Text(text) => v.not_blank(field, text),
    }
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct GetProjectParams {
    #[schemars(description = "Project ID or identifier")]
    pub id: IdArg,

    #[schemars(
        description = "Additional data to include: trackers, issue_categories, enabled_modules, time_entry_activities"
    )]
    pub include: Option<Vec<String>>,
}

impl Validate for GetProjectParams {
    fn validate(&self, v: &mut Validator) {
        project_ref(&self.id, "id", v);
    }
}

pub struct GetProjectTool;

#[async_trait]
impl RedmineTool for GetProjectTool {
    const NAME: &'static str = "redmine_get_project";
    const DESCRIPTION: &'static str = "Get detailed information about a specific project";
    type Params = GetProjectParams;

    async fn execute(client: &RedmineClient, params: Self::Params) -> ToolResult<String> {
        let include = params.include.unwrap_or_default();
        let project = client.get_project(&params.id.to_string(), &include).await?;
        Ok(format_project_detail(&project, &include))
    }
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct GetProjectVersionsParams {
    #[schemars(description = "Project ID or identifier")]
    pub project_id: IdArg,
}

impl Validate for GetProjectVersionsParams {
    fn validate(&self, v: &mut Validator) {
        project_ref(&self.project_id, "project_id", v);
    }
}

pub struct GetProjectVersionsTool;

#[async_trait]
impl RedmineTool for GetProjectVersionsTool {
    const NAME: &'static str = "redmine_get_project_versions";
    const DESCRIPTION: &'static str = "Get versions/milestones for a specific project";
    type Params = GetProjectVersionsParams;

    async fn execute(client: &RedmineClient, params: Self::Params) -> ToolResult<String> {
        let versions = client
            .list_versions(&params.project_id.to_string())
            .await?;
        Ok(format_versions(&versions))
    }
}
