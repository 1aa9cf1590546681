//! Wiki tools.

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::common::request_body;
use super::projects::project_ref;
use crate::client::RedmineClient;
use crate::domains::tools::error::ToolResult;
use crate::domains::tools::format::{format_wiki_index, format_wiki_page};
use crate::domains::tools::handlers::RedmineTool;
use crate::domains::tools::validation::{IdArg, Validate, Validator};

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ListWikiPagesParams {
    #[schemars(description = "Project ID or identifier")]
    pub project_id: IdArg,
}

impl Validate for ListWikiPagesParams {
    fn validate(&self, v: &mut Validator) {
        project_ref(&self.project_id, "project_id", v);
    }
}

pub struct ListWikiPagesTool;

#[async_trait]
impl RedmineTool for ListWikiPagesTool {
    const NAME: &'static str = "redmine_list_wiki_pages";
    const DESCRIPTION: &'static str = "List all wiki pages in a project";
    type Params = ListWikiPagesParams;

    async fn execute(client: &RedmineClient, params: Self::Params) -> ToolResult<String> {
        let pages = client
            .list_wiki_pages(&params.project_id.to_string())
            .await?;
        Ok(format_wiki_index(&pages))
    }
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct GetWikiPageParams {
    #[schemars(description = "Project ID or identifier")]
    pub project_id: IdArg,

    #[schemars(description = "Wiki page title")]
    pub title: String,

    #[schemars(description = "Specific version number (optional)")]
    pub version: Option<i64>,
}

impl Validate for GetWikiPageParams {
    fn validate(&self, v: &mut Validator) {
        project_ref(&self.project_id, "project_id", v);
        v.not_blank("title", &self.title);
        v.positive_int("version", self.version);
    }
}

pub struct GetWikiPageTool;

#[async_trait]
impl RedmineTool for GetWikiPageTool {
    const NAME: &'static str = "redmine_get_wiki_page";
    const DESCRIPTION: &'static str = "Get content of a specific wiki page";
    type Params = GetWikiPageParams;

    async fn execute(client: &RedmineClient, params: Self::Params) -> ToolResult<String> {
        let version = params.version.and_then(|v| u64::try_from(v).ok());
        let page = client
            .get_wiki_page(&params.project_id.to_string(), &params.title, version)
            .await?;
        Ok(format_wiki_page(&page))
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
pub struct SaveWikiPageParams {
    #[serde(skip_serializing)]
    #[schemars(description = "Project ID or identifier")]
    pub project_id: IdArg,

    #[serde(skip_serializing)]
    #[schemars(description = "Wiki page title")]
    pub title: String,

    #[schemars(description = "Wiki page content (in Textile or Markdown format)")]
    pub text: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[schemars(description = "Comments about this change")]
    pub comments: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[schemars(description = "Parent page title (for creating sub-pages)")]
    pub parent_title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[schemars(description = "Version the edit is based on; rejected by Redmine if stale")]
    pub version: Option<i64>,
}

impl Validate for SaveWikiPageParams {
    fn validate(&self, v: &mut Validator) {
        project_ref(&self.project_id, "project_id", v);
        v.not_blank("title", &self.title);
        v.positive_int("version", self.version);
    }
}

pub struct SaveWikiPageTool;

#[async_trait]
impl RedmineTool for SaveWikiPageTool {
    const NAME: &'static str = "redmine_create_or_update_wiki_page";
    const DESCRIPTION: &'static str = "Create a new wiki page or update existing one";
    type Params = SaveWikiPageParams;

    async fn execute(client: &RedmineClient, params: Self::Params) -> ToolResult<String> {
        let project_id = params.project_id.to_string();
        client
            .put_wiki_page(&project_id, &params.title, request_body(&params)?)
            .await?;

        let page = client.get_wiki_page(&project_id, &params.title, None).await?;
        Ok(format!(
            "Wiki page saved successfully!\n\n{}",
            format_wiki_page(&page)
        ))
    }
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct DeleteWikiPageParams {
    #[schemars(description = "Project ID or identifier")]
    pub project_id: IdArg,

    #[schemars(description = "Wiki page title to delete")]
    pub title: String,
}

impl Validate for DeleteWikiPageParams {
    fn validate(&self, v: &mut Validator) {
        project_ref(&self.project_id, "project_id", v);
        v.not_blank("title", &self.title);
    }
}

pub struct DeleteWikiPageTool;

#[async_trait]
impl RedmineTool for DeleteWikiPageTool {
    const NAME: &'static str = "redmine_delete_wiki_page";
    const DESCRIPTION: &'static str = "Delete a wiki page";
    type Params = DeleteWikiPageParams;

    async fn execute(client: &RedmineClient, params: Self::Params) -> ToolResult<String> {
        client
            .delete_wiki_page(&params.project_id.to_string(), &params.title)
            .await?;
        Ok(format!(
            "Wiki page \"{}\" deleted successfully from project.",
            params.title
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::mock::MockTransport;
    use crate::domains::tools::definitions::common::testing::call;
    use reqwest::Method;
    use serde_json::{Value, json};

    #[tokio::test]
    async fn test_list_wiki_pages() {
        let mock = MockTransport::new();
        mock.on(
            Method::GET,
            "/projects/demo/wiki/index.json",
            200,
            json!({"wiki_pages": [
                {"title": "Wiki", "version": 2},
                {"title": "Setup", "version": 1, "parent": {"title": "Wiki"}}
            ]}),
        );

        let text = call::<ListWikiPagesTool>(&mock, json!({"project_id": "demo"}))
            .await
            .unwrap();
        assert_eq!(
            text,
            "Found 2 wiki page(s) in project\n\nWiki Pages:\n\n- Wiki (v2)\n  - Setup (v1)\n"
        );
    }

    #[tokio::test]
    async fn test_get_wiki_page_version() {
        let mock = MockTransport::new();
        mock.on(
            Method::GET,
            "/projects/demo/wiki/Setup/1.json",
            200,
            json!({"wiki_page": {
                "title": "Setup", "version": 1, "updated_on": "2024-05-01T10:00:00Z",
                "author": {"id": 5, "name": "Jane Doe"}, "text": "h1. Setup"
            }}),
        );

        let text = call::<GetWikiPageTool>(
            &mock,
            json!({"project_id": "demo", "title": "Setup", "version": 1}),
        )
        .await
        .unwrap();
        assert_eq!(
            text,
            "Wiki Page: Setup\nVersion: 1\nUpdated: 2024-05-01T10:00:00Z\n\
             Author: Jane Doe\n\nContent:\nh1. Setup"
        );
    }

    #[tokio::test]
    async fn test_save_puts_then_refetches() {
        let mock = MockTransport::new();
        mock.on(Method::PUT, "/projects/demo/wiki/Release%20Notes.json", 201, Value::Null);
        mock.on(
            Method::GET,
            "/projects/demo/wiki/Release%20Notes.json",
            200,
            json!({"wiki_page": {"title": "Release Notes", "version": 1, "text": "Notes"}}),
        );

        let text = call::<SaveWikiPageTool>(
            &mock,
            json!({"project_id": "demo", "title": "Release Notes", "text": "Notes", "comments": "first"}),
        )
        .await
        .unwrap();

        assert!(text.starts_with("Wiki page saved successfully!\n\nWiki Page: Release Notes\n"));
        assert_eq!(
            mock.requests()[0].body,
            Some(json!({"wiki_page": {"text": "Notes", "comments": "first"}}))
        );
    }

    #[tokio::test]
    async fn test_save_requires_text() {
        let mock = MockTransport::new();
        let err = call::<SaveWikiPageTool>(&mock, json!({"project_id": "demo", "title": "A"}))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Validation error: text: is required");
    }

    #[tokio::test]
    async fn test_delete_wiki_page() {
        let mock = MockTransport::new();
        mock.on(Method::DELETE, "/projects/demo/wiki/Old.json", 200, Value::Null);

        let text = call::<DeleteWikiPageTool>(&mock, json!({"project_id": "demo", "title": "Old"}))
            .await
            .unwrap();
        assert_eq!(text, "Wiki page \"Old\" deleted successfully from project.");
    }
}
