//! Outbound Slack Web API calls.
//!
//! Only the two methods the feedback flow needs are modelled: `views.open`
//! for modals and `chat.postMessage` for direct messages. Both authenticate
//! with the workspace bot token and report failure through `{"ok": false}`.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::info;

use crate::blocks::{Block, MessageTemplate, View};

pub const VIEWS_OPEN: &str = "views.open";
pub const CHAT_POST_MESSAGE: &str = "chat.postMessage";

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ChatClientError {
    #[error("transport failure calling `{method}`: {message}")]
    Transport { method: &'static str, message: String },
    #[error("slack api `{method}` returned `{error}`")]
    Api { method: &'static str, error: String },
}

#[async_trait]
pub trait ChatClient: Send + Sync {
    async fn open_view(
        &self,
        token: &SecretString,
        trigger_id: &str,
        view: &View,
    ) -> Result<(), ChatClientError>;

    async fn post_message(
        &self,
        token: &SecretString,
        channel: &str,
        message: &MessageTemplate,
    ) -> Result<(), ChatClientError>;
}

#[derive(Serialize)]
struct OpenViewBody<'a> {
    trigger_id: &'a str,
    view: &'a View,
}

#[derive(Serialize)]
struct PostMessageBody<'a> {
    channel: &'a str,
    text: &'a str,
    blocks: &'a [Block],
}

#[derive(Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Clone)]
pub struct WebApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl WebApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_http_client(reqwest::Client::new(), base_url)
    }

    pub fn with_http_client(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_owned();
        Self { http, base_url }
    }

    pub fn method_url(&self, method: &str) -> String {
        format!("{}/{method}", self.base_url)
    }

    async fn call<B>(
        &self,
        method: &'static str,
        token: &SecretString,
        body: &B,
    ) -> Result<(), ChatClientError>
    where
        B: Serialize + Sync,
    {
        let transport = |error: reqwest::Error| ChatClientError::Transport {
            method,
            message: error.to_string(),
        };

        let response = self
            .http
            .post(self.method_url(method))
            .bearer_auth(token.expose_secret())
            .json(body)
            .send()
            .await
            .map_err(transport)?;
        let decoded: ApiResponse = response.json().await.map_err(transport)?;

        if !decoded.ok {
            return Err(ChatClientError::Api {
                method,
                error: decoded.error.unwrap_or_else(|| "unknown_error".to_owned()),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl ChatClient for WebApiClient {
    async fn open_view(
        &self,
        token: &SecretString,
        trigger_id: &str,
        view: &View,
    ) -> Result<(), ChatClientError> {
        self.call(VIEWS_OPEN, token, &OpenViewBody { trigger_id, view }).await?;
        info!(event_name = "egress.slack.view_opened", trigger_id, "opened modal view");
        Ok(())
    }

    async fn post_message(
        &self,
        token: &SecretString,
        channel: &str,
        message: &MessageTemplate,
    ) -> Result<(), ChatClientError> {
        let body = PostMessageBody {
            channel,
            text: &message.fallback_text,
            blocks: &message.blocks,
        };
        self.call(CHAT_POST_MESSAGE, token, &body).await?;
        info!(event_name = "egress.slack.message_posted", channel, "posted message");
        Ok(())
    }
}

/// One call observed by [`RecordingChatClient`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChatCall {
    OpenView { token: String, trigger_id: String, view: View },
    PostMessage { token: String, channel: String, message: MessageTemplate },
}

/// Chat client that records calls instead of sending them.
///
/// Channels registered through [`RecordingChatClient::fail_channel`] answer
/// with an API error, which lets callers exercise partial delivery.
#[derive(Default)]
pub struct RecordingChatClient {
    calls: Mutex<Vec<ChatCall>>,
    failing_channels: Mutex<Vec<String>>,
}

impl RecordingChatClient {
    pub async fn fail_channel(&self, channel: impl Into<String>) {
        self.failing_channels.lock().await.push(channel.into());
    }

    pub async fn calls(&self) -> Vec<ChatCall> {
        self.calls.lock().await.clone()
    }

    pub async fn opened_views(&self) -> Vec<View> {
        self.calls
            .lock()
            .await
            .iter()
            .filter_map(|call| match call {
                ChatCall::OpenView { view, .. } => Some(view.clone()),
                ChatCall::PostMessage { .. } => None,
            })
            .collect()
    }

    pub async fn posted_messages(&self) -> Vec<(String, MessageTemplate)> {
        self.calls
            .lock()
            .await
            .iter()
            .filter_map(|call| match call {
                ChatCall::PostMessage { channel, message, .. } => {
                    Some((channel.clone(), message.clone()))
                }
                ChatCall::OpenView { .. } => None,
            })
            .collect()
    }
}

#[async_trait]
impl ChatClient for RecordingChatClient {
    async fn open_view(
        &self,
        token: &SecretString,
        trigger_id: &str,
        view: &View,
    ) -> Result<(), ChatClientError> {
        self.calls.lock().await.push(ChatCall::OpenView {
            token: token.expose_secret().to_owned(),
            trigger_id: trigger_id.to_owned(),
            view: view.clone(),
        });
        Ok(())
    }

    async fn post_message(
        &self,
        token: &SecretString,
        channel: &str,
        message: &MessageTemplate,
    ) -> Result<(), ChatClientError> {
        if self.failing_channels.lock().await.iter().any(|failing| failing == channel) {
            return Err(ChatClientError::Api {
                method: CHAT_POST_MESSAGE,
                error: "channel_not_found".to_owned(),
            });
        }
        self.calls.lock().await.push(ChatCall::PostMessage {
            token: token.expose_secret().to_owned(),
            channel: channel.to_owned(),
            message: message.clone(),
        });
        Ok(())
    }
}
