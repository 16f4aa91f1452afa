//! Plain-text replies posted back to Slack.

use common::clients::jira::{IssueDetails, Subtask, TicketSummary};

pub const EMAIL_UNAVAILABLE: &str = "⚠️ Could not fetch your Slack email.";
pub const NO_TICKETS: &str = "No tickets assigned to you.";
pub const TYPING: &str = "_Bot is typing..._";

pub fn worklog_logged(time_spent: &str, issue_key: &str, message: &str) -> String {
    format!("✅ Logged {time_spent} to {issue_key} with comment: {message}")
}

pub fn worklog_failed(err: &impl std::fmt::Display) -> String {
    format!("❌ Failed to log work: {err}")
}

pub fn worklog_parse_failed(err: &impl std::fmt::Display) -> String {
    format!("❌ Error parsing or logging work: {err}")
}

pub fn ticket_list(tickets: &[TicketSummary]) -> String {
    if tickets.is_empty() {
        return NO_TICKETS.to_string();
    }

    tickets
        .iter()
        .enumerate()
        .map(|(i, ticket)| format!("{}. {}: {}", i + 1, ticket.key, ticket.summary))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn description_updated(issue_key: &str) -> String {
    format!("✅ Updated {issue_key}")
}

pub fn description_update_failed(issue_key: &str, err: &impl std::fmt::Display) -> String {
    format!("❌ Failed to update {issue_key}: {err}")
}

pub fn description_enhanced(issue_key: &str, text: &str) -> String {
    format!("✅ AI-enhanced {issue_key}\n{text}")
}

pub fn description_enhance_failed(issue_key: &str, err: &impl std::fmt::Display) -> String {
    format!("❌ Failed to enhance {issue_key}: {err}")
}

pub fn comment_added(issue_key: &str) -> String {
    format!("✅ Comment added to {issue_key}")
}

pub fn comment_failed(issue_key: &str, err: &impl std::fmt::Display) -> String {
    format!("❌ Failed to add comment to {issue_key}: {err}")
}

pub fn subtask_list(issue_key: &str, subtasks: &[Subtask]) -> String {
    if subtasks.is_empty() {
        return format!("No subtasks for {issue_key}");
    }

    subtasks
        .iter()
        .map(|subtask| format!("- {}: {} ({})", subtask.key, subtask.summary, subtask.status))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn issue_details(issue_key: &str, details: &IssueDetails) -> String {
    format!(
        "{issue_key}: {}\nStatus: {}\nAssignee: {}\nReporter: {}\nDue date: {}\nDescription: {}",
        details.summary,
        details.status,
        details.assignee,
        details.reporter,
        details.due_date,
        details.description_preview(),
    )
}

pub fn details_unavailable(issue_key: &str) -> String {
    format!("❌ Could not fetch details for {issue_key}")
}

pub fn jira_command_failed(err: &impl std::fmt::Display) -> String {
    format!("❌ Error processing Jira command: {err}")
}

pub fn answer_failed(err: &impl std::fmt::Display) -> String {
    format!("❌ Could not fetch Confluence answer: {err}")
}
