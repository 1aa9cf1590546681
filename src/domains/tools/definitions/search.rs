//! Full-text search across Redmine.

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;

use super::common::QueryParams;
use crate::client::RedmineClient;
use crate::domains::tools::error::ToolResult;
use crate::domains::tools::format::format_search_results;
use crate::domains::tools::handlers::RedmineTool;
use crate::domains::tools::validation::{Validate, Validator};

const SCOPES: &[&str] = &["all", "my_project", "subprojects"];
const ATTACHMENT_MODES: &[&str] = &["0", "1", "only"];

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct SearchParams {
    #[schemars(description = "Query string (space-separated for multiple keywords)")]
    pub q: String,

    #[schemars(description = "Number of results to skip (optional)")]
    pub offset: Option<i64>,

    #[schemars(description = "Number of results to return (optional)")]
    pub limit: Option<i64>,

    #[schemars(description = "Search scope: all, my_project or subprojects (optional)")]
    pub scope: Option<String>,

    #[schemars(description = "Match all query words (optional)")]
    pub all_words: Option<bool>,

    #[schemars(description = "Match only in titles (optional)")]
    pub titles_only: Option<bool>,

    #[schemars(description = "Include issues in search (optional)")]
    pub issues: Option<bool>,

    #[schemars(description = "Include news in search (optional)")]
    pub news: Option<bool>,

    #[schemars(description = "Include documents in search (optional)")]
    pub documents: Option<bool>,

    #[schemars(description = "Include changesets in search (optional)")]
    pub changesets: Option<bool>,

    #[schemars(description = "Include wiki pages in search (optional)")]
    pub wiki_pages: Option<bool>,

    #[schemars(description = "Include messages in search (optional)")]
    pub messages: Option<bool>,

    #[schemars(description = "Include projects in search (optional)")]
    pub projects: Option<bool>,

    #[schemars(description = "Filter by open issues (optional)")]
    pub open_issues: Option<bool>,

    #[schemars(description = "Search in description/attachment: \"0\", \"1\" or \"only\" (optional)")]
    pub attachments: Option<String>,
}

impl Validate for SearchParams {
    fn validate(&self, v: &mut Validator) {
        v.not_blank("q", &self.q);
        v.pagination(self.limit, self.offset);
        v.one_of("scope", self.scope.as_deref(), SCOPES);
        v.one_of("attachments", self.attachments.as_deref(), ATTACHMENT_MODES);
    }
}

pub struct SearchTool;

#[async_trait]
impl RedmineTool for SearchTool {
    const NAME: &'static str = "redmine_search";
    const DESCRIPTION: &'static str = "Search Redmine for issues, wiki pages, and more";
    type Params = SearchParams;

    async fn execute(client: &RedmineClient, params: Self::Params) -> ToolResult<String> {
        let query = QueryParams::new()
            .push("q", &params.q)
            .opt("offset", params.offset)
            .opt("limit", params.limit)
            .opt("scope", params.scope)
            .flag("all_words", params.all_words)
            .flag("titles_only", params.titles_only)
            .flag("issues", params.issues)
            .flag("news", params.news)
            .flag("documents", params.documents)
            .flag("changesets", params.changesets)
            .flag("wiki_pages", params.wiki_pages)
            .flag("messages", params.messages)
            .flag("projects", params.projects)
            .flag("open_issues", params.open_issues)
            .opt("attachments", params.attachments)
            .build();

        let page = client.search(query).await?;
        Ok(format_search_results(&params.q, &page))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::mock::MockTransport;
    use crate::domains::tools::definitions::common::testing::call;
    use reqwest::Method;
    use serde_json::json;

    #[tokio::test]
    async fn test_search_sends_flags() {
        let mock = MockTransport::new();
        mock.on(
            Method::GET,
            "/search.json",
            200,
            json!({
                "results": [{
                    "id": 1, "title": "Bug #1: Crash", "type": "issue",
                    "url": "https://redmine.example.com/issues/1",
                    "description": "Crash on login", "datetime": "2024-05-01T10:00:00Z"
                }],
                "total_count": 1
            }),
        );

        let text = call::<SearchTool>(
            &mock,
            json!({"q": "crash", "titles_only": true, "news": false, "scope": "all"}),
        )
        .await
        .unwrap();

        assert_eq!(
            text,
            "Found 1 result(s) for \"crash\"\n\n\
             1. [issue] Bug #1: Crash\n\
             \x20  URL: https://redmine.example.com/issues/1\n\
             \x20  Description: Crash on login\n\
             \x20  Date: 2024-05-01T10:00:00Z\n\n"
        );
        assert_eq!(
            mock.requests()[0].query,
            vec![
                ("q".to_string(), "crash".to_string()),
                ("scope".to_string(), "all".to_string()),
                ("titles_only".to_string(), "1".to_string()),
                ("news".to_string(), String::new()),
            ]
        );
    }

    #[tokio::test]
    async fn test_search_validation() {
        let mock = MockTransport::new();
        let err = call::<SearchTool>(
            &mock,
            json!({"q": "  ", "scope": "everywhere", "attachments": "2"}),
        )
        .await
        .unwrap_err();

        assert_eq!(
            err.to_string(),
            "Validation error: q: must not be empty, \
             scope: must be one of: all, my_project, subprojects, \
             attachments: must be one of: 0, 1, only"
        );
        assert!(mock.requests().is_empty());
    }

    #[tokio::test]
    async fn test_search_requires_query() {
        let mock = MockTransport::new();
        let err = call::<SearchTool>(&mock, json!({})).await.unwrap_err();
        assert_eq!(err.to_string(), "Validation error: q: is required");
    }
}
