//! Plain-text rendering of Redmine resources.
//!
//! Each resource renders as fixed labeled lines, optional lines only when
//! Redmine returned the field, and free text last after a blank line.

use crate::client::types::*;

/// Longest issue description shown in list output, in characters.
pub const LIST_DESCRIPTION_LIMIT: usize = 200;

/// Longest search excerpt, in characters.
pub const SEARCH_EXCERPT_LIMIT: usize = 200;

fn name_of(reference: &Option<NamedRef>) -> Option<&str> {
    reference.as_ref().and_then(|r| r.name.as_deref())
}

fn id_text(id: Option<u64>) -> String {
    id.map(|id| id.to_string()).unwrap_or_else(|| "?".to_string())
}

fn text_or_empty(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("")
}

/// Whole numbers print without a fractional part.
pub fn number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

/// Cut `text` to `max` characters, ending in `...` when shortened.
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let kept: String = text.chars().take(max.saturating_sub(3)).collect();
    format!("{}...", kept)
}

/// Join rendered items with a blank line.
pub fn format_list<T>(items: &[T], render: impl Fn(&T) -> String) -> String {
    items.iter().map(render).collect::<Vec<_>>().join("\n\n")
}

/// `Found <total> <noun>` plus the returned window when it is partial.
pub fn page_summary<T>(page: &Page<T>, noun: &str, requested_offset: u64) -> String {
    let total = page.total();
    let offset = page.offset.unwrap_or(requested_offset);
    let shown = page.items.len() as u64;

    let mut line = format!("Found {} {}", total, noun);
    if shown > 0 && (offset > 0 || offset + shown < total) {
        line.push_str(&format!(" (showing {}-{})", offset + 1, offset + shown));
    }
    line
}

// ============================================================================
// Issues
// ============================================================================

fn issue_header(issue: &Issue) -> Vec<String> {
    let mut parts = vec![format!(
        "#{} - {}",
        id_text(issue.id),
        text_or_empty(&issue.subject)
    )];

    let labeled = [
        ("Project", &issue.project),
        ("Tracker", &issue.tracker),
        ("Status", &issue.status),
        ("Priority", &issue.priority),
        ("Author", &issue.author),
        ("Assigned to", &issue.assigned_to),
    ];
    for (label, reference) in labeled {
        if let Some(name) = name_of(reference) {
            parts.push(format!("{}: {}", label, name));
        }
    }

    if let Some(ratio) = issue.done_ratio.filter(|r| *r > 0.0) {
        parts.push(format!("Progress: {}%", number(ratio)));
    }
    if let Some(start) = &issue.start_date {
        parts.push(format!("Start date: {}", start));
    }
    if let Some(due) = &issue.due_date {
        parts.push(format!("Due date: {}", due));
    }
    if let Some(hours) = issue.estimated_hours {
        parts.push(format!("Estimated hours: {}", number(hours)));
    }
    if let Some(version) = name_of(&issue.fixed_version) {
        parts.push(format!("Version: {}", version));
    }
    parts
}

fn push_comments(parts: &mut Vec<String>, journals: &[Journal]) {
    let notes: Vec<String> = journals
        .iter()
        .filter_map(|journal| {
            let note = journal.notes.as_deref().filter(|n| !n.trim().is_empty())?;
            Some(format!(
                "- {} ({}): {}",
                name_of(&journal.user).unwrap_or("Unknown"),
                text_or_empty(&journal.created_on),
                note
            ))
        })
        .collect();

    if !notes.is_empty() {
        parts.push("\nComments:".to_string());
        parts.extend(notes);
    }
}

/// Full issue view with description and comments.
pub fn format_issue(issue: &Issue) -> String {
    let mut parts = issue_header(issue);
    if let Some(description) = issue.description.as_deref().filter(|d| !d.is_empty()) {
        parts.push(format!("\nDescription:\n{}", description));
    }
    push_comments(&mut parts, &issue.journals);
    parts.join("\n")
}

/// Issue as shown in list output: long descriptions are shortened.
pub fn format_issue_summary(issue: &Issue) -> String {
    let mut parts = issue_header(issue);
    if let Some(description) = issue.description.as_deref().filter(|d| !d.is_empty()) {
        parts.push(format!(
            "\nDescription:\n{}",
            truncate(description, LIST_DESCRIPTION_LIMIT)
        ));
    }
    push_comments(&mut parts, &issue.journals);
    parts.join("\n")
}

// ============================================================================
// Projects
// ============================================================================

pub fn format_project(project: &Project) -> String {
    let mut parts = vec![
        format!(
            "{} ({})",
            text_or_empty(&project.name),
            text_or_empty(&project.identifier)
        ),
        format!("ID: {}", id_text(project.id)),
        format!(
            "Status: {}",
            if project.status == Some(1) { "Active" } else { "Closed" }
        ),
        format!(
            "Public: {}",
            if project.is_public == Some(true) { "Yes" } else { "No" }
        ),
    ];

    if let Some(parent) = name_of(&project.parent) {
        parts.push(format!("Parent: {}", parent));
    }
    if let Some(description) = project.description.as_deref().filter(|d| !d.is_empty()) {
        parts.push(format!("\nDescription:\n{}", description));
    }
    parts.join("\n")
}

/// Project view with the requested `include` sections appended.
pub fn format_project_detail(project: &Project, include: &[String]) -> String {
    let wants = |section: &str| include.iter().any(|i| i == section);
    let mut out = format_project(project);

    if wants("trackers") && !project.trackers.is_empty() {
        out.push_str("\n\nTrackers:");
        for tracker in &project.trackers {
            out.push_str(&format!(
                "\n  - {} (ID: {})",
                text_or_empty(&tracker.name),
                id_text(tracker.id)
            ));
        }
    }

    if wants("issue_categories") && !project.issue_categories.is_empty() {
        out.push_str("\n\nIssue Categories:");
        for category in &project.issue_categories {
            out.push_str(&format!(
                "\n  - {} (ID: {})",
                text_or_empty(&category.name),
                id_text(category.id)
            ));
            if let Some(assignee) = name_of(&category.assigned_to) {
                out.push_str(&format!(" - Assigned to: {}", assignee));
            }
        }
    }

    if wants("enabled_modules") && !project.enabled_modules.is_empty() {
        out.push_str("\n\nEnabled Modules:");
        for module in &project.enabled_modules {
            out.push_str(&format!("\n  - {}", text_or_empty(&module.name)));
        }
    }

    out
}

pub fn format_versions(versions: &[Version]) -> String {
    let mut out = format!("Found {} version(s) for project\n\n", versions.len());
    if versions.is_empty() {
        out.push_str("No versions found for this project.");
        return out;
    }

    for version in versions {
        out.push_str(&format!(
            "Version: {} (ID: {})\n",
            text_or_empty(&version.name),
            id_text(version.id)
        ));
        out.push_str(&format!("  Status: {}\n", text_or_empty(&version.status)));
        if let Some(due) = &version.due_date {
            out.push_str(&format!("  Due date: {}\n", due));
        }
        if let Some(description) = version.description.as_deref().filter(|d| !d.is_empty()) {
            out.push_str(&format!("  Description: {}\n", description));
        }
        out.push('\n');
    }
    out
}

// ============================================================================
// Users
// ============================================================================

pub fn format_user(user: &User) -> String {
    let mut parts = vec![
        format!(
            "{} {} ({})",
            text_or_empty(&user.firstname),
            text_or_empty(&user.lastname),
            text_or_empty(&user.login)
        ),
        format!("ID: {}", id_text(user.id)),
    ];

    if let Some(mail) = &user.mail {
        parts.push(format!("Email: {}", mail));
    }
    if user.admin == Some(true) {
        parts.push("Role: Administrator".to_string());
    }
    if let Some(last_login) = &user.last_login_on {
        parts.push(format!("Last login: {}", last_login));
    }
    parts.join("\n")
}

/// User view with the requested `include` sections appended.
pub fn format_user_detail(user: &User, include: &[String]) -> String {
    let wants = |section: &str| include.iter().any(|i| i == section);
    let mut out = format_user(user);

    if wants("memberships") && !user.memberships.is_empty() {
        out.push_str("\n\nMemberships:");
        for membership in &user.memberships {
            out.push_str(&format!(
                "\n  - {}",
                name_of(&membership.project).unwrap_or("Unknown project")
            ));
            if !membership.roles.is_empty() {
                let roles: Vec<&str> = membership
                    .roles
                    .iter()
                    .filter_map(|r| r.name.as_deref())
                    .collect();
                out.push_str(&format!(" ({})", roles.join(", ")));
            }
        }
    }

    if wants("groups") && !user.groups.is_empty() {
        out.push_str("\n\nGroups:");
        for group in &user.groups {
            out.push_str(&format!(
                "\n  - {} (ID: {})",
                text_or_empty(&group.name),
                id_text(group.id)
            ));
        }
    }

    out
}

// ============================================================================
// Time entries
// ============================================================================

pub fn format_time_entry(entry: &TimeEntry) -> String {
    let mut parts = vec![
        format!("Time Entry #{}", id_text(entry.id)),
        format!("Hours: {}", entry.hours.map(number).unwrap_or_default()),
        format!("Date: {}", text_or_empty(&entry.spent_on)),
    ];

    for (label, reference) in [
        ("Project", &entry.project),
        ("Activity", &entry.activity),
        ("User", &entry.user),
    ] {
        if let Some(name) = name_of(reference) {
            parts.push(format!("{}: {}", label, name));
        }
    }

    if let Some(issue) = entry.issue.as_ref().and_then(|i| i.id) {
        parts.push(format!("Issue: #{}", issue));
    }
    if let Some(comments) = entry.comments.as_deref().filter(|c| !c.is_empty()) {
        parts.push(format!("Comments: {}", comments));
    }
    parts.join("\n")
}

/// Hours summed over the returned page only.
pub fn total_hours(entries: &[TimeEntry]) -> f64 {
    entries
        .iter()
        .filter_map(|e| e.hours)
        .fold(0.0, |total, hours| total + hours)
}

// ============================================================================
// Wiki
// ============================================================================

pub fn format_wiki_page(page: &WikiPage) -> String {
    let mut parts = vec![
        format!("Wiki Page: {}", text_or_empty(&page.title)),
        format!(
            "Version: {}",
            page.version.map(|v| v.to_string()).unwrap_or_default()
        ),
        format!("Updated: {}", text_or_empty(&page.updated_on)),
    ];

    if let Some(author) = name_of(&page.author) {
        parts.push(format!("Author: {}", author));
    }
    if let Some(parent) = page.parent.as_ref().and_then(|p| p.title.as_deref()) {
        parts.push(format!("Parent: {}", parent));
    }
    if let Some(text) = page.text.as_deref().filter(|t| !t.is_empty()) {
        parts.push(format!("\nContent:\n{}", text));
    }
    parts.join("\n")
}

fn parent_title(page: &WikiPage) -> Option<&str> {
    page.parent.as_ref().and_then(|p| p.title.as_deref())
}

fn wiki_entry(page: &WikiPage) -> String {
    match page.version {
        Some(version) => format!("{} (v{})", text_or_empty(&page.title), version),
        None => text_or_empty(&page.title).to_string(),
    }
}

/// Wiki index as a two-level tree. Pages whose parent is not a top-level
/// page are listed separately.
pub fn format_wiki_index(pages: &[WikiPage]) -> String {
    let mut out = format!("Found {} wiki page(s) in project\n\n", pages.len());
    if pages.is_empty() {
        out.push_str("No wiki pages found for this project.");
        return out;
    }

    let roots: Vec<&WikiPage> = pages.iter().filter(|p| parent_title(p).is_none()).collect();
    let children: Vec<&WikiPage> = pages.iter().filter(|p| parent_title(p).is_some()).collect();

    out.push_str("Wiki Pages:\n");
    for root in &roots {
        out.push_str(&format!("\n- {}\n", wiki_entry(root)));
        for child in children
            .iter()
            .filter(|c| parent_title(c) == root.title.as_deref())
        {
            out.push_str(&format!("  - {}\n", wiki_entry(child)));
        }
    }

    let orphans: Vec<&&WikiPage> = children
        .iter()
        .filter(|c| !roots.iter().any(|r| r.title.as_deref() == parent_title(c)))
        .collect();
    if !orphans.is_empty() {
        out.push_str("\nOrphaned pages:\n");
        for page in orphans {
            out.push_str(&format!(
                "- {} (parent: {})\n",
                text_or_empty(&page.title),
                parent_title(page).unwrap_or("")
            ));
        }
    }
    out
}

// ============================================================================
// Enumerations
// ============================================================================

pub fn format_issue_statuses(statuses: &[IssueStatus]) -> String {
    let mut out = String::from("Available Issue Statuses:\n\n");
    if statuses.is_empty() {
        out.push_str("No issue statuses found.");
    }
    for status in statuses {
        out.push_str(&format!(
            "- {} (ID: {})",
            text_or_empty(&status.name),
            id_text(status.id)
        ));
        if status.is_closed == Some(true) {
            out.push_str(" [CLOSED]");
        }
        if status.is_default == Some(true) {
            out.push_str(" [DEFAULT]");
        }
        out.push('\n');
    }
    out
}

/// Priorities and time entry activities. `title` names the collection,
/// `empty` is shown when there are none.
pub fn format_enumerations(title: &str, empty: &str, values: &[Enumeration]) -> String {
    let mut out = format!("{}:\n\n", title);
    if values.is_empty() {
        out.push_str(empty);
    }
    for value in values {
        out.push_str(&format!(
            "- {} (ID: {})",
            text_or_empty(&value.name),
            id_text(value.id)
        ));
        if value.is_default == Some(true) {
            out.push_str(" [DEFAULT]");
        }
        if value.active == Some(false) {
            out.push_str(" [INACTIVE]");
        }
        out.push('\n');
    }
    out
}

pub fn format_trackers(trackers: &[Tracker]) -> String {
    let mut out = String::from("Available Issue Trackers:\n\n");
    if trackers.is_empty() {
        out.push_str("No trackers found.");
    }
    for tracker in trackers {
        out.push_str(&format!(
            "- {} (ID: {})",
            text_or_empty(&tracker.name),
            id_text(tracker.id)
        ));
        if let Some(description) = tracker.description.as_deref().filter(|d| !d.is_empty()) {
            out.push_str(&format!("\n  Description: {}", description));
        }
        out.push('\n');
    }
    out
}

// ============================================================================
// Search
// ============================================================================

pub fn format_search_results(query: &str, page: &Page<SearchResult>) -> String {
    let mut out = format!("Found {} result(s) for \"{}\"\n\n", page.total(), query);
    if page.items.is_empty() {
        out.push_str("No results found.");
        return out;
    }

    for (index, item) in page.items.iter().enumerate() {
        out.push_str(&format!(
            "{}. [{}] {}\n",
            index + 1,
            text_or_empty(&item.kind),
            text_or_empty(&item.title)
        ));
        if let Some(url) = &item.url {
            out.push_str(&format!("   URL: {}\n", url));
        }
        let excerpt: String = text_or_empty(&item.description)
            .chars()
            .take(SEARCH_EXCERPT_LIMIT)
            .collect();
        out.push_str(&format!("   Description: {}\n", excerpt));
        if let Some(date) = &item.datetime {
            out.push_str(&format!("   Date: {}\n", date));
        }
        out.push('\n');
    }
    out
}
