//! User tools.

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;

use super::common::{NoParams, QueryParams};
use crate::client::RedmineClient;
use crate::domains::tools::error::ToolResult;
use crate::domains::tools::format::{format_list, format_user, format_user_detail, page_summary};
use crate::domains::tools::handlers::RedmineTool;
use crate::domains::tools::validation::{IdArg, Validate, Validator};

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct ListUsersParams {
    #[schemars(description = "Filter by name (first name, last name, or login)")]
    pub name: Option<String>,

    #[schemars(description = "Filter by group ID")]
    pub group_id: Option<i64>,

    #[schemars(description = "Maximum number of users to return (1-100, default: 25)")]
    pub limit: Option<i64>,

    #[schemars(description = "Number of users to skip")]
    pub offset: Option<i64>,
}

impl Validate for ListUsersParams {
    fn validate(&self, v: &mut Validator) {
        v.positive_int("group_id", self.group_id);
        v.pagination(self.limit, self.offset);
    }
}

pub struct ListUsersTool;

#[async_trait]
impl RedmineTool for ListUsersTool {
    const NAME: &'static str = "redmine_list_users";
    const DESCRIPTION: &'static str = "List users in Redmine";
    type Params = ListUsersParams;

    async fn execute(client: &RedmineClient, params: Self::Params) -> ToolResult<String> {
        let noun = match &params.name {
            Some(name) => format!("user(s) matching \"{}\"", name),
            None => "user(s)".to_string(),
        };
        let (query, offset) = QueryParams::new()
            .opt("name", params.name)
            .opt("group_id", params.group_id)
            .page(params.limit, params.offset);
        let page = client.list_users(query.build()).await?;

        let mut out = page_summary(&page, &noun, offset);
        out.push_str("\n\n");
        if page.items.is_empty() {
            out.push_str("No users found matching the criteria.");
        } else {
            out.push_str(&format_list(&page.items, format_user));
        }
        Ok(out)
    }
}

pub struct GetCurrentUserTool;

#[async_trait]
impl RedmineTool for GetCurrentUserTool {
    const NAME: &'static str = "redmine_get_current_user";
    const DESCRIPTION: &'static str = "Get information about the currently authenticated user";
    type Params = NoParams;

    async fn execute(client: &RedmineClient, _params: Self::Params) -> ToolResult<String> {
        let user = client.get_current_user().await?;
        Ok(format!("Current User:\n\n{}", format_user(&user)))
    }
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct GetUserParams {
    #[schemars(description = "User ID")]
    pub id: IdArg,

    #[schemars(description = "Additional data to include: memberships, groups")]
    pub include: Option<Vec<String>>,
}

impl Validate for GetUserParams {
    fn validate(&self, v: &mut Validator) {
        v.id("id", &self.id);
    }
}

pub struct GetUserTool;

#[async_trait]
impl RedmineTool for GetUserTool {
    const NAME: &'static str = "redmine_get_user";
    const DESCRIPTION: &'static str = "Get detailed information about a specific user";
    type Params = GetUserParams;

    async fn execute(client: &RedmineClient, params: Self::Params) -> ToolResult<String> {
        let id = params.id.require("id")?;
        let include = params.include.unwrap_or_default();
        let user = client.get_user(id, &include).await?;
        Ok(format_user_detail(&user, &include))
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
    async fn test_current_user() {
        let mock = MockTransport::new();
        mock.on(
            Method::GET,
            "/users/current.json",
            200,
            json!({"user": {"id": 1, "firstname": "Test", "lastname": "User", "login": "t.user"}}),
        );

        let text = call::<GetCurrentUserTool>(&mock, json!({})).await.unwrap();
        assert!(text.starts_with("Current User:\n\n"));
        assert!(text.contains("Test User (t.user)"));
        assert!(text.contains("ID: 1"));
    }

    #[tokio::test]
    async fn test_list_users_by_name() {
        let mock = MockTransport::new();
        mock.on(
            Method::GET,
            "/users.json",
            200,
            json!({
                "users": [
                    {"id": 5, "firstname": "Jane", "lastname": "Doe", "login": "jdoe", "mail": "jane@example.com"}
                ],
                "total_count": 1
            }),
        );

        let text = call::<ListUsersTool>(&mock, json!({"name": "jane"}))
            .await
            .unwrap();
        assert_eq!(
            text,
            "Found 1 user(s) matching \"jane\"\n\nJane Doe (jdoe)\nID: 5\nEmail: jane@example.com"
        );
        assert_eq!(
            mock.requests()[0].query,
            vec![
                ("name".to_string(), "jane".to_string()),
                ("offset".to_string(), "0".to_string()),
                ("limit".to_string(), "25".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_list_users_empty() {
        let mock = MockTransport::new();
        mock.on(Method::GET, "/users.json", 200, json!({"users": [], "total_count": 0}));

        let text = call::<ListUsersTool>(&mock, json!({})).await.unwrap();
        assert_eq!(text, "Found 0 user(s)\n\nNo users found matching the criteria.");
    }

    #[tokio::test]
    async fn test_get_user_memberships() {
        let mock = MockTransport::new();
        mock.on(
            Method::GET,
            "/users/5.json",
            200,
            json!({"user": {
                "id": 5, "firstname": "Jane", "lastname": "Doe", "login": "jdoe",
                "memberships": [{"project": {"id": 1, "name": "Demo"}, "roles": [{"id": 3, "name": "Developer"}]}]
            }}),
        );

        let text = call::<GetUserTool>(&mock, json!({"id": "5", "include": ["memberships"]}))
            .await
            .unwrap();
        assert!(text.ends_with("\n\nMemberships:\n  - Demo (Developer)"));
    }

    #[tokio::test]
    async fn test_get_user_rejects_zero_id() {
        let mock = MockTransport::new();
        let err = call::<GetUserTool>(&mock, json!({"id": 0})).await.unwrap_err();
        assert_eq!(err.to_string(), "Validation error: id: must be a positive integer");
        assert!(mock.requests().is_empty());
    }
}
