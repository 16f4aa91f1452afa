use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::{error, instrument};

use crate::{error::AppError, utils::config::AppConfig};

/// Envelope shared by every Slack Web API response.
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(flatten)]
    payload: T,
}

#[derive(Debug, Deserialize, Default)]
struct Empty {}

#[derive(Debug, Deserialize)]
struct UserInfo {
    user: Option<User>,
}

#[derive(Debug, Deserialize)]
struct User {
    #[serde(default)]
    profile: Profile,
}

#[derive(Debug, Deserialize, Default)]
struct Profile {
    email: Option<String>,
}

pub struct SlackClient {
    http: Client,
    base_url: String,
    bot_token: String,
}

impl SlackClient {
    pub fn new(http: Client, base_url: impl Into<String>, bot_token: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            bot_token: bot_token.into(),
        }
    }

    pub fn from_config(config: &AppConfig, http: Client) -> Self {
        Self::new(http, &config.slack_api_base, &config.slack_bot_token)
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/{method}", self.base_url)
    }

    /// Posts a plain-text message to a channel.
    #[instrument(skip(self, text), fields(text_bytes = text.len()))]
    pub async fn post_message(&self, channel: &str, text: &str) -> Result<(), AppError> {
        let response: ApiResponse<Empty> = self
            .http
            .post(self.method_url("chat.postMessage"))
            .bearer_auth(&self.bot_token)
            .json(&json!({ "channel": channel, "text": text }))
            .send()
            .await?
            .json()
            .await?;

        if response.ok {
            Ok(())
        } else {
            Err(AppError::Slack(
                response.error.unwrap_or_else(|| "unknown".to_string()),
            ))
        }
    }

    /// Looks up the profile email of a workspace member. Lookup failures are
    /// logged and reported as `None`.
    #[instrument(skip(self))]
    pub async fn user_email(&self, user_id: &str) -> Option<String> {
        match self.fetch_user_info(user_id).await {
            Ok(email) => email,
            Err(e) => {
                error!("Slack API error: {}", e);
                None
            }
        }
    }

    async fn fetch_user_info(&self, user_id: &str) -> Result<Option<String>, AppError> {
        let response: ApiResponse<UserInfo> = self
            .http
            .get(self.method_url("users.info"))
            .bearer_auth(&self.bot_token)
            .query(&[("user", user_id)])
            .send()
            .await?
            .json()
            .await?;

        if !response.ok {
            return Err(AppError::Slack(
                response.error.unwrap_or_else(|| "unknown".to_string()),
            ));
        }

        Ok(response.payload.user.and_then(|user| user.profile.email))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> SlackClient {
        SlackClient::new(reqwest::Client::new(), server.uri(), "xoxb-test")
    }

    #[tokio::test]
    async fn post_message_sends_channel_and_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat.postMessage"))
            .and(header("authorization", "Bearer xoxb-test"))
            .and(body_json(json!({ "channel": "C123", "text": "hello" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
            .expect(1)
            .mount(&server)
            .await;

        client_for(&server)
            .post_message("C123", "hello")
            .await
            .expect("message should post");
    }

    #[tokio::test]
    async fn post_message_reports_api_error_code() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat.postMessage"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "ok": false, "error": "channel_not_found" })),
            )
            .mount(&server)
            .await;

        let err = client_for(&server)
            .post_message("C404", "hello")
            .await
            .expect_err("not ok must be an error");
        assert!(matches!(err, AppError::Slack(code) if code == "channel_not_found"));
    }

    #[tokio::test]
    async fn user_email_reads_profile() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users.info"))
            .and(query_param("user", "U42"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "ok": true,
                "user": { "id": "U42", "profile": { "email": "dev@example.com" } }
            })))
            .mount(&server)
            .await;

        assert_eq!(
            client_for(&server).user_email("U42").await,
            Some("dev@example.com".to_string())
        );
    }

    #[tokio::test]
    async fn user_email_is_none_on_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users.info"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "ok": false, "error": "user_not_found" })),
            )
            .mount(&server)
            .await;

        assert_eq!(client_for(&server).user_email("U404").await, None);
    }
}
