use axum::{extract::State, response::IntoResponse, Json};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, error, info};

use crate::{
    api_state::ApiState,
    dispatch::{handle_message, IncomingMessage},
};

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SlackEnvelope {
    UrlVerification {
        challenge: String,
    },
    EventCallback {
        #[serde(default)]
        event_id: Option<String>,
        #[serde(default)]
        event: MessageEvent,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Default, Deserialize)]
pub struct MessageEvent {
    #[serde(rename = "type", default)]
    pub kind: String,
    pub channel: Option<String>,
    pub user: Option<String>,
    pub text: Option<String>,
    pub bot_id: Option<String>,
    pub subtype: Option<String>,
    pub client_msg_id: Option<String>,
}

impl MessageEvent {
    fn is_from_bot(&self) -> bool {
        self.bot_id.is_some() || self.subtype.as_deref() == Some("bot_message")
    }

    /// The message a user wrote, if this event carries one.
    fn into_incoming(self) -> Option<IncomingMessage> {
        if self.kind != "message" || self.is_from_bot() {
            return None;
        }

        Some(IncomingMessage {
            channel: self.channel?,
            user: self.user?,
            text: self.text?,
        })
    }
}

/// Slack Events API endpoint. Messages are acknowledged immediately and
/// handled on a background task.
pub async fn slack_events(
    State(state): State<ApiState>,
    Json(envelope): Json<SlackEnvelope>,
) -> impl IntoResponse {
    let (event_id, event) = match envelope {
        SlackEnvelope::UrlVerification { challenge } => {
            info!("Answering Slack URL verification");
            return Json(json!({ "challenge": challenge }));
        }
        SlackEnvelope::EventCallback { event_id, event } => (event_id, event),
        SlackEnvelope::Other => return Json(json!({ "ok": true })),
    };

    let Some(event_id) = event_id.or_else(|| event.client_msg_id.clone()) else {
        debug!("Dropping event without an id");
        return Json(json!({ "ok": true }));
    };

    if !state.processed_events.first_sighting(&event_id) {
        debug!(%event_id, "Dropping duplicate event");
        return Json(json!({ "ok": true }));
    }

    if let Some(message) = event.into_incoming() {
        tokio::spawn(async move {
            if let Err(e) = handle_message(&state, message).await {
                error!(%event_id, error = %e, "Failed to reply in Slack");
            }
        });
    }

    Json(json!({ "ok": true }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: serde_json::Value) -> SlackEnvelope {
        serde_json::from_value(value).expect("valid envelope")
    }

    #[test]
    fn url_verification_is_recognised() {
        let envelope = parse(json!({ "type": "url_verification", "challenge": "abc", "token": "t" }));
        assert!(matches!(envelope, SlackEnvelope::UrlVerification { challenge } if challenge == "abc"));
    }

    #[test]
    fn unknown_envelopes_are_tolerated() {
        assert!(matches!(
            parse(json!({ "type": "app_rate_limited" })),
            SlackEnvelope::Other
        ));
    }

    #[test]
    fn user_messages_become_incoming() {
        let SlackEnvelope::EventCallback { event_id, event } = parse(json!({
            "type": "event_callback",
            "event_id": "Ev1",
            "event": { "type": "message", "channel": "C1", "user": "U1", "text": "tickets" }
        })) else {
            panic!("expected an event callback");
        };

        assert_eq!(event_id.as_deref(), Some("Ev1"));
        assert_eq!(
            event.into_incoming(),
            Some(IncomingMessage {
                channel: "C1".into(),
                user: "U1".into(),
                text: "tickets".into(),
            })
        );
    }

    #[test]
    fn bot_and_non_message_events_are_skipped() {
        let bot = MessageEvent {
            kind: "message".into(),
            channel: Some("C1".into()),
            user: Some("U1".into()),
            text: Some("hello".into()),
            bot_id: Some("B1".into()),
            ..Default::default()
        };
        assert_eq!(bot.into_incoming(), None);

        let bot_subtype = MessageEvent {
            kind: "message".into(),
            channel: Some("C1".into()),
            text: Some("hello".into()),
            subtype: Some("bot_message".into()),
            ..Default::default()
        };
        assert_eq!(bot_subtype.into_incoming(), None);

        let reaction = MessageEvent {
            kind: "reaction_added".into(),
            user: Some("U1".into()),
            ..Default::default()
        };
        assert_eq!(reaction.into_incoming(), None);
    }
}
