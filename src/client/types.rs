//! Redmine REST resource shapes.
//!
//! Every field is optional: the formatters print what Redmine returned and
//! skip what it did not. Unknown keys are ignored.

use serde::{Deserialize, Serialize};

/// `{id, name}` reference embedded in most resources.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NamedRef {
    pub id: Option<u64>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Issue {
    pub id: Option<u64>,
    pub subject: Option<String>,
    pub description: Option<String>,
    pub project: Option<NamedRef>,
    pub tracker: Option<NamedRef>,
    pub status: Option<NamedRef>,
    pub priority: Option<NamedRef>,
    pub author: Option<NamedRef>,
    pub assigned_to: Option<NamedRef>,
    pub fixed_version: Option<NamedRef>,
    pub start_date: Option<String>,
    pub due_date: Option<String>,
    pub done_ratio: Option<f64>,
    pub estimated_hours: Option<f64>,
    pub created_on: Option<String>,
    pub updated_on: Option<String>,
    pub journals: Vec<Journal>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Journal {
    pub id: Option<u64>,
    pub user: Option<NamedRef>,
    pub notes: Option<String>,
    pub created_on: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Project {
    pub id: Option<u64>,
    pub name: Option<String>,
    pub identifier: Option<String>,
    pub description: Option<String>,
    pub status: Option<i64>,
    pub is_public: Option<bool>,
    pub parent: Option<NamedRef>,
    pub trackers: Vec<NamedRef>,
    pub issue_categories: Vec<IssueCategory>,
    pub enabled_modules: Vec<NamedRef>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IssueCategory {
    pub id: Option<u64>,
    pub name: Option<String>,
    pub assigned_to: Option<NamedRef>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Version {
    pub id: Option<u64>,
    pub name: Option<String>,
    pub status: Option<String>,
    pub due_date: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct User {
    pub id: Option<u64>,
    pub login: Option<String>,
    pub firstname: Option<String>,
    pub lastname: Option<String>,
    pub mail: Option<String>,
    pub admin: Option<bool>,
    pub last_login_on: Option<String>,
    pub memberships: Vec<Membership>,
    pub groups: Vec<NamedRef>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Membership {
    pub project: Option<NamedRef>,
    pub roles: Vec<NamedRef>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeEntry {
    pub id: Option<u64>,
    pub project: Option<NamedRef>,
    pub issue: Option<NamedRef>,
    pub user: Option<NamedRef>,
    pub activity: Option<NamedRef>,
    pub hours: Option<f64>,
    pub comments: Option<String>,
    pub spent_on: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WikiPage {
    pub title: Option<String>,
    pub parent: Option<WikiParent>,
    pub text: Option<String>,
    pub version: Option<u64>,
    pub author: Option<NamedRef>,
    pub comments: Option<String>,
    pub created_on: Option<String>,
    pub updated_on: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WikiParent {
    pub title: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IssueStatus {
    pub id: Option<u64>,
    pub name: Option<String>,
    pub is_closed: Option<bool>,
    pub is_default: Option<bool>,
}

/// Issue priorities and time entry activities share this shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Enumeration {
    pub id: Option<u64>,
    pub name: Option<String>,
    pub is_default: Option<bool>,
    pub active: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tracker {
    pub id: Option<u64>,
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchResult {
    pub id: Option<u64>,
    pub title: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub url: Option<String>,
    pub description: Option<String>,
    pub datetime: Option<String>,
}

/// One page of a paginated collection.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total_count: Option<u64>,
    pub offset: Option<u64>,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total_count: Option<u64>, offset: Option<u64>) -> Self {
        Self {
            items,
            total_count,
            offset,
        }
    }

    /// Total reported by Redmine, or the page length when absent.
    pub fn total(&self) -> u64 {
        self.total_count.unwrap_or(self.items.len() as u64)
    }
}

// ============================================================================
// Response envelopes
// ============================================================================

#[derive(Debug, Deserialize)]
pub(crate) struct IssueEnvelope {
    pub issue: Issue,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ProjectEnvelope {
    pub project: Project,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UserEnvelope {
    pub user: User,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TimeEntryEnvelope {
    pub time_entry: TimeEntry,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WikiPageEnvelope {
    pub wiki_page: WikiPage,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct IssueList {
    pub issues: Vec<Issue>,
    pub total_count: Option<u64>,
    pub offset: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct ProjectList {
    pub projects: Vec<Project>,
    pub total_count: Option<u64>,
    pub offset: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct UserList {
    pub users: Vec<User>,
    pub total_count: Option<u64>,
    pub offset: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct TimeEntryList {
    pub time_entries: Vec<TimeEntry>,
    pub total_count: Option<u64>,
    pub offset: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct SearchList {
    pub results: Vec<SearchResult>,
    pub total_count: Option<u64>,
    pub offset: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct VersionList {
    pub versions: Vec<Version>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct WikiPageList {
    pub wiki_pages: Vec<WikiPage>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct IssueStatusList {
    pub issue_statuses: Vec<IssueStatus>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct PriorityList {
    pub issue_priorities: Vec<Enumeration>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct ActivityList {
    pub time_entry_activities: Vec<Enumeration>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct TrackerList {
    pub trackers: Vec<Tracker>,
}
