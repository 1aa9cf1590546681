//! Tool definitions, one file per Redmine resource.
//!
//! Each tool is a unit struct implementing
//! [`RedmineTool`](super::handlers::RedmineTool) with its own parameter type.

pub mod common;
pub mod custom_request;
pub mod enumerations;
pub mod issues;
pub mod projects;
pub mod search;
pub mod time_entries;
pub mod users;
pub mod wiki;

pub use custom_request::CustomRequestTool;
pub use enumerations::{ListPrioritiesTool, ListStatusesTool, ListTrackersTool};
pub use issues::{CreateIssueTool, DeleteIssueTool, GetIssueTool, ListIssuesTool, UpdateIssueTool};
pub use projects::{GetProjectTool, GetProjectVersionsTool, ListProjectsTool};
pub use search::SearchTool;
pub use time_entries::{
    CreateTimeEntryTool, DeleteTimeEntryTool, GetTimeEntryTool, ListTimeEntriesTool,
    ListTimeEntryActivitiesTool, UpdateTimeEntryTool,
};
pub use users::{GetCurrentUserTool, GetUserTool, ListUsersTool};
pub use wiki::{DeleteWikiPageTool, GetWikiPageTool, ListWikiPagesTool, SaveWikiPageTool};
