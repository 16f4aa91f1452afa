//! Parsing of Slack message text into bot commands.
//!
//! The first word selects the command, case-insensitively:
//! - `worklog ISSUE-KEY - comment - TIME` (TIME is optional)
//! - `tickets`
//! - `desc ISSUE-KEY text`, `descai ISSUE-KEY text`, `comment ISSUE-KEY text`
//! - `subtasks ISSUE-KEY`, `details ISSUE-KEY`
//!
//! Anything else is a documentation question.

use common::error::AppError;
use thiserror::Error;

const WORKLOG_USAGE: &str =
    "expected `worklog ISSUE-KEY - comment - TIME`, e.g. `worklog OPS-12 - Fixed login - 1h 30m`";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlackCommand {
    Worklog {
        issue_key: String,
        message: String,
        time_spent: String,
    },
    Jira(JiraCommand),
    Question(String),
}

/// Commands that act on Jira on behalf of the sender.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JiraCommand {
    Tickets,
    Describe { issue_key: String, text: String },
    DescribeWithAi { issue_key: String, text: String },
    Comment { issue_key: String, text: String },
    Subtasks { issue_key: String },
    Details { issue_key: String },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("{0}")]
    Worklog(String),
    #[error("{0}")]
    Jira(String),
}

impl From<CommandError> for AppError {
    fn from(err: CommandError) -> Self {
        Self::Validation(err.to_string())
    }
}

/// Parses a message. Blank messages yield `Ok(None)`.
pub fn parse_command(
    text: &str,
    default_time_spent: &str,
) -> Result<Option<SlackCommand>, CommandError> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(None);
    }

    let (keyword, rest) = split_first_word(text);
    let command = match keyword.to_lowercase().as_str() {
        "worklog" => parse_worklog(rest, default_time_spent)?,
        "tickets" if rest.is_empty() => SlackCommand::Jira(JiraCommand::Tickets),
        "desc" => {
            let (issue_key, text) = issue_and_text("desc", rest)?;
            SlackCommand::Jira(JiraCommand::Describe { issue_key, text })
        }
        "descai" => {
            let (issue_key, text) = issue_and_text("descai", rest)?;
            SlackCommand::Jira(JiraCommand::DescribeWithAi { issue_key, text })
        }
        "comment" => {
            let (issue_key, text) = issue_and_text("comment", rest)?;
            SlackCommand::Jira(JiraCommand::Comment { issue_key, text })
        }
        "subtasks" => SlackCommand::Jira(JiraCommand::Subtasks {
            issue_key: issue_only("subtasks", rest)?,
        }),
        "details" => SlackCommand::Jira(JiraCommand::Details {
            issue_key: issue_only("details", rest)?,
        }),
        _ => SlackCommand::Question(text.to_string()),
    };

    Ok(Some(command))
}

fn split_first_word(text: &str) -> (&str, &str) {
    match text.split_once(char::is_whitespace) {
        Some((first, rest)) => (first, rest.trim()),
        None => (text, ""),
    }
}

fn parse_worklog(rest: &str, default_time_spent: &str) -> Result<SlackCommand, CommandError> {
    let parts: Vec<&str> = rest.split(" - ").map(str::trim).collect();
    let Some((issue_key, tail)) = parts.split_first() else {
        return Err(CommandError::Worklog(WORKLOG_USAGE.to_string()));
    };

    if !is_issue_key(issue_key) {
        return Err(CommandError::Worklog(format!(
            "`{issue_key}` is not an issue key; {WORKLOG_USAGE}"
        )));
    }

    let (message_parts, time_spent) = match tail.split_last() {
        Some((last, init)) if !init.is_empty() && is_time_spent(last) => (init, *last),
        _ => (tail, default_time_spent),
    };

    let message = message_parts.join(" - ");
    if message.trim().is_empty() {
        return Err(CommandError::Worklog(WORKLOG_USAGE.to_string()));
    }

    Ok(SlackCommand::Worklog {
        issue_key: (*issue_key).to_string(),
        message,
        time_spent: time_spent.to_string(),
    })
}

fn issue_and_text(keyword: &str, rest: &str) -> Result<(String, String), CommandError> {
    let (issue_key, text) = split_first_word(rest);
    if !is_issue_key(issue_key) || text.is_empty() {
        return Err(CommandError::Jira(format!(
            "expected `{keyword} ISSUE-KEY text`"
        )));
    }
    Ok((issue_key.to_string(), text.to_string()))
}

fn issue_only(keyword: &str, rest: &str) -> Result<String, CommandError> {
    if is_issue_key(rest) {
        Ok(rest.to_string())
    } else {
        Err(CommandError::Jira(format!("expected `{keyword} ISSUE-KEY`")))
    }
}

/// `PROJ-123` style keys: a project part starting with a letter, a dash and a
/// number.
pub fn is_issue_key(candidate: &str) -> bool {
    let Some((project, number)) = candidate.split_once('-') else {
        return false;
    };

    project.chars().next().is_some_and(|c| c.is_ascii_alphabetic())
        && project
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !number.is_empty()
        && number.chars().all(|c| c.is_ascii_digit())
}

/// Jira duration syntax: one or more of `<digits><w|d|h|m>`, space separated.
pub fn is_time_spent(candidate: &str) -> bool {
    let mut units = candidate.split_whitespace().peekable();
    if units.peek().is_none() {
        return false;
    }

    units.all(|unit| {
        let Some(suffix) = unit.chars().last() else {
            return false;
        };
        let digits = unit.trim_end_matches(suffix);
        matches!(suffix, 'w' | 'd' | 'h' | 'm')
            && !digits.is_empty()
            && digits.chars().all(|c| c.is_ascii_digit())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Result<Option<SlackCommand>, CommandError> {
        parse_command(text, "30m")
    }

    #[test]
    fn blank_messages_are_ignored() {
        assert_eq!(parse("   \n"), Ok(None));
    }

    #[test]
    fn worklog_with_explicit_time() {
        assert_eq!(
            parse("worklog OPS-12 - Fixed the login bug - 1h 30m"),
            Ok(Some(SlackCommand::Worklog {
                issue_key: "OPS-12".into(),
                message: "Fixed the login bug".into(),
                time_spent: "1h 30m".into(),
            }))
        );
    }

    #[test]
    fn worklog_defaults_time_and_keeps_dashes_in_message() {
        assert_eq!(
            parse("Worklog OPS-12 - Pairing - reviewed PR"),
            Ok(Some(SlackCommand::Worklog {
                issue_key: "OPS-12".into(),
                message: "Pairing - reviewed PR".into(),
                time_spent: "30m".into(),
            }))
        );
    }

    #[test]
    fn worklog_requires_key_and_message() {
        assert!(matches!(parse("worklog"), Err(CommandError::Worklog(_))));
        assert!(matches!(
            parse("worklog login fix - 1h"),
            Err(CommandError::Worklog(_))
        ));
        assert!(matches!(
            parse("worklog OPS-1 -  - 1h"),
            Err(CommandError::Worklog(_))
        ));
    }

    fn jira(command: JiraCommand) -> Result<Option<SlackCommand>, CommandError> {
        Ok(Some(SlackCommand::Jira(command)))
    }

    #[test]
    fn jira_commands_parse_key_and_text() {
        assert_eq!(
            parse("desc OPS-3 New description text"),
            jira(JiraCommand::Describe {
                issue_key: "OPS-3".into(),
                text: "New description text".into(),
            })
        );
        assert_eq!(
            parse("DESCAI OPS-3 login broke pls fix"),
            jira(JiraCommand::DescribeWithAi {
                issue_key: "OPS-3".into(),
                text: "login broke pls fix".into(),
            })
        );
        assert_eq!(
            parse("comment OPS-3 Looks good"),
            jira(JiraCommand::Comment {
                issue_key: "OPS-3".into(),
                text: "Looks good".into(),
            })
        );
        assert_eq!(
            parse("subtasks OPS-3"),
            jira(JiraCommand::Subtasks {
                issue_key: "OPS-3".into()
            })
        );
        assert_eq!(
            parse("details OPS-3"),
            jira(JiraCommand::Details {
                issue_key: "OPS-3".into()
            })
        );
        assert_eq!(parse("tickets"), jira(JiraCommand::Tickets));
    }

    #[test]
    fn malformed_jira_commands_are_errors() {
        assert!(matches!(parse("desc OPS-3"), Err(CommandError::Jira(_))));
        assert!(matches!(parse("comment"), Err(CommandError::Jira(_))));
        assert!(matches!(
            parse("details OPS-3 extra"),
            Err(CommandError::Jira(_))
        ));
    }

    #[test]
    fn other_text_is_a_question() {
        assert_eq!(
            parse("How do I install the CLI?"),
            Ok(Some(SlackCommand::Question("How do I install the CLI?".into())))
        );
        assert_eq!(
            parse("tickets for the release?"),
            Ok(Some(SlackCommand::Question(
                "tickets for the release?".into()
            )))
        );
    }

    #[test]
    fn parse_errors_become_validation_errors() {
        let err = parse("desc OPS-3").expect_err("missing text");
        assert!(matches!(AppError::from(err), AppError::Validation(msg) if msg.contains("desc ISSUE-KEY text")));
    }

    #[test]
    fn issue_key_and_duration_syntax() {
        assert!(is_issue_key("OPS-12"));
        assert!(is_issue_key("A1_B-7"));
        assert!(!is_issue_key("12-OPS"));
        assert!(!is_issue_key("OPS-"));
        assert!(!is_issue_key("OPS"));

        assert!(is_time_spent("1h"));
        assert!(is_time_spent("2d 4h 15m"));
        assert!(is_time_spent("1w"));
        assert!(!is_time_spent("soon"));
        assert!(!is_time_spent("h"));
        assert!(!is_time_spent(""));
    }
}
