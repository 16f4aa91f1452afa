use chrono::Utc;
use reqwest::{Client, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::{json, Value};
use tracing::{debug, instrument};

use crate::{clients::adf, error::AppError, utils::config::AppConfig};

const SEARCH_MAX_RESULTS: u32 = 5;
const DESCRIPTION_PREVIEW_CHARS: usize = 200;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketSummary {
    pub key: String,
    pub summary: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subtask {
    pub key: String,
    pub summary: String,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueDetails {
    pub summary: String,
    pub status: String,
    pub assignee: String,
    pub reporter: String,
    pub due_date: String,
    pub description: String,
}

impl IssueDetails {
    /// First characters of the flattened description, always followed by `...`.
    pub fn description_preview(&self) -> String {
        let preview: String = self
            .description
            .chars()
            .take(DESCRIPTION_PREVIEW_CHARS)
            .collect();
        format!("{preview}...")
    }
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    issues: Vec<IssueRecord>,
}

#[derive(Deserialize)]
struct IssueRecord {
    key: String,
    fields: IssueFields,
}

#[derive(Deserialize, Default)]
struct IssueFields {
    #[serde(default)]
    summary: String,
    status: Option<NamedField>,
    assignee: Option<PersonField>,
    reporter: Option<PersonField>,
    duedate: Option<String>,
    #[serde(default)]
    description: Value,
    #[serde(default)]
    subtasks: Vec<IssueRecord>,
}

#[derive(Deserialize)]
struct NamedField {
    name: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PersonField {
    display_name: String,
}

#[derive(Deserialize)]
struct IssueEnvelope {
    #[serde(default)]
    fields: IssueFields,
}

/// Jira Cloud REST v3 client authenticated with an account email and API token.
pub struct JiraClient {
    http: Client,
    base_url: String,
    email: String,
    api_token: String,
}

impl JiraClient {
    pub fn new(
        http: Client,
        base_url: impl Into<String>,
        email: impl Into<String>,
        api_token: impl Into<String>,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            email: email.into(),
            api_token: api_token.into(),
        }
    }

    pub fn from_config(config: &AppConfig, http: Client) -> Self {
        Self::new(
            http,
            &config.jira_domain,
            &config.jira_email,
            &config.jira_api_token,
        )
    }

    fn issue_url(&self, issue_key: &str) -> String {
        format!("{}/rest/api/3/issue/{issue_key}", self.base_url)
    }

    fn authed(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .basic_auth(&self.email, Some(&self.api_token))
            .header("Accept", "application/json")
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, AppError> {
        let response = self.authed(request).send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(AppError::Jira {
            status: status.as_u16(),
            body,
        })
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, AppError> {
        Ok(self.send(request).await?.json::<T>().await?)
    }

    #[instrument(skip(self, message))]
    pub async fn log_worklog(
        &self,
        issue_key: &str,
        message: &str,
        time_spent: &str,
    ) -> Result<(), AppError> {
        let payload = json!({
            "comment": adf::paragraph_document(message),
            "timeSpent": time_spent,
            "started": Utc::now().format("%Y-%m-%dT%H:%M:%S.000+0000").to_string(),
        });

        self.send(
            self.http
                .post(format!("{}/worklog", self.issue_url(issue_key)))
                .json(&payload),
        )
        .await?;
        debug!("Worklog recorded");
        Ok(())
    }

    /// Most recently updated unresolved issues assigned to `assignee_email`.
    #[instrument(skip(self))]
    pub async fn fetch_user_tickets(
        &self,
        assignee_email: &str,
    ) -> Result<Vec<TicketSummary>, AppError> {
        let jql = format!(
            "assignee = \"{assignee_email}\" AND resolution = Unresolved ORDER BY updated DESC"
        );
        let max_results = SEARCH_MAX_RESULTS.to_string();

        let response: SearchResponse = self
            .send_json(
                self.http
                    .get(format!("{}/rest/api/3/search", self.base_url))
                    .query(&[("jql", jql.as_str()), ("maxResults", max_results.as_str())]),
            )
            .await?;

        Ok(response
            .issues
            .into_iter()
            .map(|issue| TicketSummary {
                key: issue.key,
                summary: issue.fields.summary,
            })
            .collect())
    }

    /// Replaces the issue description.
    #[instrument(skip(self, text))]
    pub async fn update_description(&self, issue_key: &str, text: &str) -> Result<(), AppError> {
        let payload = json!({ "fields": { "description": adf::paragraph_document(text) } });
        self.send(self.http.put(self.issue_url(issue_key)).json(&payload))
            .await?;
        Ok(())
    }

    #[instrument(skip(self, comment))]
    pub async fn add_comment(&self, issue_key: &str, comment: &str) -> Result<(), AppError> {
        let payload = json!({ "body": adf::paragraph_document(comment) });
        self.send(
            self.http
                .post(format!("{}/comment", self.issue_url(issue_key)))
                .json(&payload),
        )
        .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn fetch_subtasks(&self, issue_key: &str) -> Result<Vec<Subtask>, AppError> {
        let issue: IssueEnvelope = self
            .send_json(
                self.http
                    .get(self.issue_url(issue_key))
                    .query(&[("fields", "subtasks")]),
            )
            .await?;

        Ok(issue
            .fields
            .subtasks
            .into_iter()
            .map(|subtask| Subtask {
                key: subtask.key,
                summary: subtask.fields.summary,
                status: subtask
                    .fields
                    .status
                    .map(|status| status.name)
                    .unwrap_or_default(),
            })
            .collect())
    }

    #[instrument(skip(self))]
    pub async fn fetch_issue_details(&self, issue_key: &str) -> Result<IssueDetails, AppError> {
        let issue: IssueEnvelope = self.send_json(self.http.get(self.issue_url(issue_key))).await?;
        let fields = issue.fields;

        Ok(IssueDetails {
            summary: fields.summary,
            status: fields.status.map(|s| s.name).unwrap_or_default(),
            assignee: fields
                .assignee
                .map_or_else(|| "Unassigned".to_string(), |p| p.display_name),
            reporter: fields
                .reporter
                .map_or_else(|| "Unknown".to_string(), |p| p.display_name),
            due_date: fields.duedate.unwrap_or_else(|| "None".to_string()),
            description: adf::plain_text(&fields.description),
        })
    }
}
