use common::{error::AppError, utils::generation::enhance_description};
use tracing::{debug, info, instrument, warn};

use crate::{
    api_state::ApiState,
    commands::{parse_command, CommandError, JiraCommand, SlackCommand},
    messages,
};

/// A user-authored Slack message that passed event filtering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingMessage {
    pub channel: String,
    pub user: String,
    pub text: String,
}

/// Runs the command in `message` and posts the outcome to its channel. Only
/// failures to reach Slack itself are returned; command failures become
/// replies.
#[instrument(skip_all, fields(channel = %message.channel, user = %message.user))]
pub async fn handle_message(state: &ApiState, message: IncomingMessage) -> Result<(), AppError> {
    let command = match parse_command(&message.text, &state.config.default_time_spent) {
        Ok(Some(command)) => command,
        Ok(None) => {
            debug!("Ignoring blank message");
            return Ok(());
        }
        Err(err @ CommandError::Worklog(_)) => {
            let err = AppError::from(err);
            return reply(state, &message, &messages::worklog_parse_failed(&err)).await;
        }
        Err(err @ CommandError::Jira(_)) => {
            // Jira commands, well-formed or not, are only answered for a known sender.
            if state.slack.user_email(&message.user).await.is_none() {
                return reply(state, &message, messages::EMAIL_UNAVAILABLE).await;
            }
            let err = AppError::from(err);
            return reply(state, &message, &messages::jira_command_failed(&err)).await;
        }
    };

    match command {
        SlackCommand::Worklog {
            issue_key,
            message: comment,
            time_spent,
        } => {
            let text = match state
                .jira
                .log_worklog(&issue_key, &comment, &time_spent)
                .await
            {
                Ok(()) => {
                    info!(%issue_key, %time_spent, "Logged work");
                    messages::worklog_logged(&time_spent, &issue_key, &comment)
                }
                Err(e) => messages::worklog_failed(&e),
            };
            reply(state, &message, &text).await
        }
        SlackCommand::Question(question) => {
            reply(state, &message, messages::TYPING).await?;
            let text = match state.answers.answer(&question).await {
                Ok(answer) => answer,
                Err(e) => {
                    warn!(error = %e, "Answer composition failed");
                    messages::answer_failed(&e)
                }
            };
            reply(state, &message, &text).await
        }
        SlackCommand::Jira(jira_command) => {
            let Some(email) = state.slack.user_email(&message.user).await else {
                return reply(state, &message, messages::EMAIL_UNAVAILABLE).await;
            };
            let text = run_jira_command(state, &email, jira_command).await;
            reply(state, &message, &text).await
        }
    }
}

async fn run_jira_command(state: &ApiState, email: &str, command: JiraCommand) -> String {
    match command {
        JiraCommand::Tickets => match state.jira.fetch_user_tickets(email).await {
            Ok(tickets) => messages::ticket_list(&tickets),
            Err(e) => messages::jira_command_failed(&e),
        },
        JiraCommand::Describe { issue_key, text } => {
            match state.jira.update_description(&issue_key, &text).await {
                Ok(()) => messages::description_updated(&issue_key),
                Err(e) => messages::description_update_failed(&issue_key, &e),
            }
        }
        JiraCommand::DescribeWithAi { issue_key, text } => {
            let enhanced = match enhance_description(state.generator.as_ref(), &text).await {
                Ok(enhanced) => enhanced,
                Err(e) => {
                    warn!(error = %e, %issue_key, "Description rewrite failed; using raw text");
                    text
                }
            };
            match state.jira.update_description(&issue_key, &enhanced).await {
                Ok(()) => messages::description_enhanced(&issue_key, &enhanced),
                Err(e) => messages::description_enhance_failed(&issue_key, &e),
            }
        }
        JiraCommand::Comment { issue_key, text } => {
            match state.jira.add_comment(&issue_key, &text).await {
                Ok(()) => messages::comment_added(&issue_key),
                Err(e) => messages::comment_failed(&issue_key, &e),
            }
        }
        JiraCommand::Subtasks { issue_key } => match state.jira.fetch_subtasks(&issue_key).await {
            Ok(subtasks) => messages::subtask_list(&issue_key, &subtasks),
            Err(e) => messages::jira_command_failed(&e),
        },
        JiraCommand::Details { issue_key } => {
            match state.jira.fetch_issue_details(&issue_key).await {
                Ok(details) => messages::issue_details(&issue_key, &details),
                Err(e) => {
                    warn!(error = %e, %issue_key, "Issue details unavailable");
                    messages::details_unavailable(&issue_key)
                }
            }
        }
    }
}

async fn reply(state: &ApiState, message: &IncomingMessage, text: &str) -> Result<(), AppError> {
    state.slack.post_message(&message.channel, text).await
}
