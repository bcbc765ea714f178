//! Outbound Slack messages that are independent of the slash-command reply.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;
use tracing::{info, warn};

use crate::blocks::Reply;

#[derive(Clone, Debug)]
pub enum NotifyTarget {
    /// A fixed channel, posted to as the bot user.
    Channel { channel_id: String, bot_token: SecretString },
    /// The per-request `response_url` Slack hands out for deferred replies.
    Callback { url: String },
}

#[derive(Clone, Debug)]
pub struct Notification {
    pub target: NotifyTarget,
    pub reply: Reply,
}

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("notification transport failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("slack rejected notification: {0}")]
    Rejected(String),
    #[error("notification target is missing: {0}")]
    MissingTarget(&'static str),
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, notification: &Notification) -> Result<(), NotifyError>;
}

#[async_trait]
impl<T> Notifier for Arc<T>
where
    T: Notifier + ?Sized,
{
    async fn notify(&self, notification: &Notification) -> Result<(), NotifyError> {
        (**self).notify(notification).await
    }
}

#[derive(Clone, Debug)]
pub struct SlackNotifier {
    client: Client,
    api_base_url: String,
}

#[derive(Debug, Deserialize)]
struct PostMessageResponse {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    channel: Option<String>,
    #[serde(default)]
    ts: Option<String>,
}

impl SlackNotifier {
    pub fn new(client: Client, api_base_url: impl Into<String>) -> Self {
        Self { client, api_base_url: api_base_url.into() }
    }

    async fn post_message(
        &self,
        channel_id: &str,
        bot_token: &SecretString,
        reply: &Reply,
    ) -> Result<(), NotifyError> {
        if channel_id.trim().is_empty() {
            return Err(NotifyError::MissingTarget("channel id"));
        }

        let url = format!("{}/chat.postMessage", self.api_base_url.trim_end_matches('/'));
        let response: PostMessageResponse = self
            .client
            .post(&url)
            .bearer_auth(bot_token.expose_secret())
            .json(&json!({ "channel": channel_id, "text": reply.text }))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if !response.ok {
            return Err(NotifyError::Rejected(
                response.error.unwrap_or_else(|| "unknown_error".to_owned()),
            ));
        }

        info!(
            event_name = "slack.notify.posted",
            channel = response.channel.as_deref().unwrap_or(channel_id),
            ts = response.ts.as_deref().unwrap_or("unknown"),
            "message posted to channel"
        );
        Ok(())
    }

    async fn post_callback(&self, url: &str, reply: &Reply) -> Result<(), NotifyError> {
        if url.trim().is_empty() {
            return Err(NotifyError::MissingTarget("response url"));
        }

        self.client.post(url).json(reply).send().await?.error_for_status()?;
        Ok(())
    }
}

#[async_trait]
impl Notifier for SlackNotifier {
    async fn notify(&self, notification: &Notification) -> Result<(), NotifyError> {
        match &notification.target {
            NotifyTarget::Channel { channel_id, bot_token } => {
                self.post_message(channel_id, bot_token, &notification.reply).await
            }
            NotifyTarget::Callback { url } => self.post_callback(url, &notification.reply).await,
        }
    }
}

/// Sends the notification and logs the outcome. Failures never reach the caller.
pub async fn notify_logged<N>(notifier: &N, notification: &Notification, correlation_id: &str)
where
    N: Notifier + ?Sized,
{
    let notify_target = match &notification.target {
        NotifyTarget::Channel { .. } => "channel",
        NotifyTarget::Callback { .. } => "callback",
    };

    match notifier.notify(notification).await {
        Ok(()) => info!(
            event_name = "slack.notify.sent",
            correlation_id,
            notify_target,
            "notification delivered"
        ),
        Err(error) => warn!(
            event_name = "slack.notify.failed",
            correlation_id,
            notify_target,
            error = %error,
            "notification failed"
        ),
    }
}

/// Text posted to the product channel for `/feature`.
pub fn feature_request_text(user_id: &str, text: &str) -> String {
    format!("<@{user_id}> requests: {text}")
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use reqwest::Client;

    use super::{
        feature_request_text, notify_logged, Notification, Notifier, NotifyError, NotifyTarget,
        SlackNotifier,
    };
    use crate::blocks::Reply;

    struct FailingNotifier {
        attempts: Mutex<u32>,
    }

    #[async_trait]
    impl Notifier for FailingNotifier {
        async fn notify(&self, _notification: &Notification) -> Result<(), NotifyError> {
            *self.attempts.lock().expect("lock") += 1;
            Err(NotifyError::Rejected("channel_not_found".to_owned()))
        }
    }

    #[tokio::test]
    async fn notify_logged_swallows_failures() {
        let notifier = FailingNotifier { attempts: Mutex::new(0) };
        let notification = Notification {
            target: NotifyTarget::Callback { url: "https://hooks.slack.test/1".to_owned() },
            reply: Reply::in_channel("checklist"),
        };

        notify_logged(&notifier, &notification, "req-1").await;

        assert_eq!(*notifier.attempts.lock().expect("lock"), 1);
    }

    #[tokio::test]
    async fn blank_targets_fail_before_any_request() {
        let notifier = SlackNotifier::new(Client::new(), "https://slack.test/api");

        let callback = notifier
            .notify(&Notification {
                target: NotifyTarget::Callback { url: " ".to_owned() },
                reply: Reply::in_channel("checklist"),
            })
            .await;
        assert!(matches!(callback, Err(NotifyError::MissingTarget("response url"))));

        let channel = notifier
            .notify(&Notification {
                target: NotifyTarget::Channel {
                    channel_id: String::new(),
                    bot_token: "xoxb-test".to_owned().into(),
                },
                reply: Reply::in_channel("feature"),
            })
            .await;
        assert!(matches!(channel, Err(NotifyError::MissingTarget("channel id"))));
    }

    #[test]
    fn feature_request_text_tags_the_requester() {
        assert_eq!(feature_request_text("U123", "dark mode"), "<@U123> requests: dark mode");
    }
}
