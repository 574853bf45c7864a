//! Slack-facing half of the feedback workflow.
//!
//! [`SlackPlatform`] owns the outbound operations (modals and direct
//! messages), the OAuth installation flow, and dispatch of classified
//! inbound interactions onto [`FeedbackService`].

use std::collections::BTreeMap;
use std::sync::Arc;

use secrecy::SecretString;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use scs_core::domain::feedback::Feedback;
use scs_core::domain::request::Request;
use scs_core::domain::team::{Team, TeamId};
use scs_core::errors::{ApplicationError, DomainError, InterfaceError};
use scs_db::repositories::TeamRepository;
use scs_db::FeedbackService;

use crate::blocks::{self, MessageTemplate, REQUEST_FROM_BLOCK};
use crate::client::{ChatClient, ChatClientError};
use crate::commands::{parse_feedback_command, FeedbackCommand, SlashCommandPayload};
use crate::interactions::{
    classify, FeedbackTarget, GiveAction, GiveSubmission, Interaction, PayloadError,
    RequestSubmission, Unrecognized,
};
use crate::oauth::{OAuthError, OAuthExchange};

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum PlatformError {
    #[error(transparent)]
    Payload(#[from] PayloadError),
    #[error(transparent)]
    Application(#[from] ApplicationError),
    #[error(transparent)]
    Chat(#[from] ChatClientError),
    #[error(transparent)]
    OAuth(#[from] OAuthError),
}

impl PlatformError {
    pub fn into_interface(self, correlation_id: impl Into<String>) -> InterfaceError {
        let correlation_id = correlation_id.into();
        match self {
            Self::Application(error) => error.into_interface(correlation_id),
            Self::Payload(error) => {
                InterfaceError::BadRequest { message: error.to_string(), correlation_id }
            }
            Self::Chat(error) => {
                InterfaceError::BadGateway { message: error.to_string(), correlation_id }
            }
            Self::OAuth(error @ OAuthError::InvalidUrl(_)) => {
                InterfaceError::Internal { message: error.to_string(), correlation_id }
            }
            Self::OAuth(error) => {
                InterfaceError::BadGateway { message: error.to_string(), correlation_id }
            }
        }
    }
}

/// What happened to an inbound interaction payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InteractionOutcome {
    Processed,
    Ignored,
    Unrecognized,
    /// Submission rejected with per-block messages shown inside the modal.
    ViewErrors(BTreeMap<String, String>),
}

impl InteractionOutcome {
    /// Body Slack expects in the HTTP response, if any.
    pub fn response_body(&self) -> Option<Value> {
        match self {
            Self::ViewErrors(errors) => Some(json!({"response_action": "errors", "errors": errors})),
            Self::Processed | Self::Ignored | Self::Unrecognized => None,
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Self::Unrecognized => 0,
            Self::Ignored => 1,
            Self::Processed => 2,
            Self::ViewErrors(_) => 3,
        }
    }

    fn merge(self, other: Self) -> Self {
        if other.rank() > self.rank() {
            other
        } else {
            self
        }
    }
}

pub struct SlackPlatform {
    feedback: FeedbackService,
    teams: Arc<dyn TeamRepository>,
    chat: Arc<dyn ChatClient>,
    oauth: Arc<dyn OAuthExchange>,
}

impl SlackPlatform {
    pub fn new(
        feedback: FeedbackService,
        teams: Arc<dyn TeamRepository>,
        chat: Arc<dyn ChatClient>,
        oauth: Arc<dyn OAuthExchange>,
    ) -> Self {
        Self { feedback, teams, chat, oauth }
    }

    pub fn feedback(&self) -> &FeedbackService {
        &self.feedback
    }

    pub fn authorization_url(&self, redirect_url: &str) -> Result<String, PlatformError> {
        Ok(self.oauth.authorization_url(redirect_url)?)
    }

    /// Completes an installation: trades `code` for a bot token and stores it
    /// against the workspace, replacing the token of a previous install.
    pub async fn register_team(&self, code: &str) -> Result<Team, PlatformError> {
        let installation = match self.oauth.exchange_code(code).await?.into_installation() {
            Ok(installation) => installation,
            Err(error) => {
                warn!(event_name = "slack.oauth.rejected", error = %error, "oauth exchange failed");
                return Err(error.into());
            }
        };

        let team = self
            .teams
            .upsert(
                &TeamId(installation.team_id),
                &installation.team_name,
                &installation.bot_token,
            )
            .await
            .map_err(ApplicationError::from)?;

        info!(
            event_name = "slack.team.registered",
            team_id = %team.id.as_str(),
            team_name = %team.name,
            "registered slack workspace"
        );
        Ok(team)
    }

    async fn bot_token(&self, team_id: &str) -> Result<SecretString, PlatformError> {
        let id = TeamId(team_id.to_owned());
        let team = self
            .teams
            .find_by_id(&id)
            .await
            .map_err(ApplicationError::from)?
            .ok_or_else(|| ApplicationError::not_found("team", team_id))?;
        Ok(team.bot_token)
    }

    pub async fn request_feedback(
        &self,
        team_id: &str,
        trigger_id: &str,
    ) -> Result<(), PlatformError> {
        let token = self.bot_token(team_id).await?;
        self.chat.open_view(&token, trigger_id, &blocks::request_feedback_modal()).await?;
        Ok(())
    }

    pub async fn ask_feedback(
        &self,
        request: &Request,
        user_id: &str,
    ) -> Result<(), PlatformError> {
        let token = self.bot_token(&request.sender.team_id).await?;
        self.chat.post_message(&token, user_id, &blocks::ask_feedback_message(request)).await?;
        Ok(())
    }

    pub async fn give_feedback(
        &self,
        team_id: &str,
        trigger_id: &str,
        request: Option<&Request>,
    ) -> Result<(), PlatformError> {
        let token = self.bot_token(team_id).await?;
        self.chat.open_view(&token, trigger_id, &blocks::give_feedback_modal(request)).await?;
        Ok(())
    }

    pub async fn send_feedback(&self, feedback: &Feedback) -> Result<(), PlatformError> {
        let token = self.bot_token(&feedback.author.team_id).await?;
        self.chat
            .post_message(&token, &feedback.recipient.user_id, &blocks::feedback_message(feedback))
            .await?;
        Ok(())
    }

    pub async fn handle_interaction(
        &self,
        payload: &Value,
        correlation_id: &str,
    ) -> Result<InteractionOutcome, PlatformError> {
        let interactions = classify(payload)?;

        let mut outcome = InteractionOutcome::Unrecognized;
        for interaction in interactions {
            let handled = match interaction {
                Interaction::RequestSubmission(submission) => {
                    self.handle_request_submission(submission, correlation_id).await?
                }
                Interaction::GiveSubmission(submission) => {
                    self.handle_give_submission(submission, correlation_id).await?
                }
                Interaction::GiveAction(action) => {
                    self.handle_give_action(action, correlation_id).await?
                }
                Interaction::IgnoreAction { user_id } => {
                    debug!(
                        event_name = "slack.interaction.ignored",
                        correlation_id,
                        user_id = %user_id,
                        "feedback request ignored"
                    );
                    InteractionOutcome::Ignored
                }
                Interaction::Unrecognized(unrecognized) => {
                    log_unrecognized(&unrecognized, correlation_id);
                    InteractionOutcome::Unrecognized
                }
            };
            outcome = outcome.merge(handled);
        }
        Ok(outcome)
    }

    async fn handle_request_submission(
        &self,
        submission: RequestSubmission,
        correlation_id: &str,
    ) -> Result<InteractionOutcome, PlatformError> {
        if submission.recipient_ids.iter().any(|recipient| *recipient == submission.user_id) {
            return Ok(view_error("You can't request feedback from yourself."));
        }
        if submission.recipient_ids.is_empty() {
            return Ok(view_error("Select at least one person."));
        }

        let team_id = submission.team_id.as_str();
        let sender = self.feedback.get_or_create_user(team_id, &submission.user_id).await?;
        let mut recipients = Vec::with_capacity(submission.recipient_ids.len());
        for recipient_id in &submission.recipient_ids {
            recipients.push(self.feedback.get_or_create_user(team_id, recipient_id).await?);
        }

        let request = match self.feedback.create_request(&sender, recipients).await {
            Ok(request) => request,
            Err(ApplicationError::Domain(DomainError::SelfRequest { .. })) => {
                return Ok(view_error("You can't request feedback from yourself."));
            }
            Err(ApplicationError::Domain(DomainError::EmptyRecipients)) => {
                return Ok(view_error("Select at least one person."));
            }
            Err(error) => return Err(error.into()),
        };

        info!(
            event_name = "feedback.request.created",
            correlation_id,
            request_id = %request.id,
            sender = %sender.user_id,
            recipient_count = request.recipients.len(),
            "feedback request created"
        );

        for recipient in &request.recipients {
            if let Err(error) = self.ask_feedback(&request, &recipient.user_id).await {
                warn!(
                    event_name = "feedback.request.delivery_failed",
                    correlation_id,
                    request_id = %request.id,
                    recipient = %recipient.user_id,
                    error = %error,
                    "could not deliver feedback request"
                );
                return Err(error);
            }
        }
        Ok(InteractionOutcome::Processed)
    }

    async fn handle_give_submission(
        &self,
        submission: GiveSubmission,
        correlation_id: &str,
    ) -> Result<InteractionOutcome, PlatformError> {
        let author =
            self.feedback.get_or_create_user(&submission.team_id, &submission.user_id).await?;

        let (recipient, request) = match submission.target {
            FeedbackTarget::Member(member) => {
                (self.feedback.get_or_create_user(&submission.team_id, &member).await?, None)
            }
            FeedbackTarget::Request(request_id) => {
                let request = self.feedback.get_request(request_id).await?;
                (request.sender.clone(), Some(request))
            }
        };

        let feedback = self
            .feedback
            .create_feedback(&author, &recipient, submission.body, request.as_ref())
            .await?;

        info!(
            event_name = "feedback.feedback.created",
            correlation_id,
            feedback_id = feedback.id.0,
            solicited = feedback.is_solicited(),
            "feedback stored"
        );

        self.send_feedback(&feedback).await?;
        Ok(InteractionOutcome::Processed)
    }

    async fn handle_give_action(
        &self,
        action: GiveAction,
        correlation_id: &str,
    ) -> Result<InteractionOutcome, PlatformError> {
        let request = self.feedback.get_request(action.request_id).await?;
        self.give_feedback(&action.team_id, &action.trigger_id, Some(&request)).await?;

        debug!(
            event_name = "slack.interaction.give_opened",
            correlation_id,
            request_id = %request.id,
            user_id = %action.user_id,
            "opened feedback modal for request"
        );
        Ok(InteractionOutcome::Processed)
    }

    /// Routes a slash command; returns an ephemeral reply when one is due.
    pub async fn handle_command(
        &self,
        payload: &SlashCommandPayload,
        correlation_id: &str,
    ) -> Result<Option<MessageTemplate>, PlatformError> {
        let command = parse_feedback_command(&payload.text);
        debug!(
            event_name = "ingress.slack.command_received",
            correlation_id,
            command = %payload.command,
            ?command,
            "slash command received"
        );

        match command {
            FeedbackCommand::Request => {
                self.request_feedback(&payload.team_id, &payload.trigger_id).await?;
                Ok(None)
            }
            FeedbackCommand::Give => {
                self.give_feedback(&payload.team_id, &payload.trigger_id, None).await?;
                Ok(None)
            }
            FeedbackCommand::Help => Ok(Some(blocks::help_message(&payload.command))),
            FeedbackCommand::Unknown { verb } => {
                Ok(Some(blocks::unsupported_command_message(&payload.command, &verb)))
            }
        }
    }
}

fn view_error(message: &str) -> InteractionOutcome {
    let mut errors = BTreeMap::new();
    errors.insert(REQUEST_FROM_BLOCK.to_owned(), message.to_owned());
    InteractionOutcome::ViewErrors(errors)
}

fn log_unrecognized(unrecognized: &Unrecognized, correlation_id: &str) {
    match unrecognized {
        Unrecognized::Submission { block_ids } => error!(
            event_name = "ingress.slack.unrecognized",
            correlation_id,
            ?block_ids,
            "unrecognized view submission"
        ),
        Unrecognized::Action { action_id } => error!(
            event_name = "ingress.slack.unrecognized",
            correlation_id,
            action_id = %action_id,
            "unrecognized block action"
        ),
        Unrecognized::PayloadType { kind } => error!(
            event_name = "ingress.slack.unrecognized",
            correlation_id,
            kind = %kind,
            "unrecognized interaction payload type"
        ),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use secrecy::SecretString;
    use serde_json::{json, Value};

    use scs_core::domain::request::RequestId;
    use scs_core::domain::team::TeamId;
    use scs_core::errors::{ApplicationError, InterfaceError};
    use scs_db::repositories::{
        InMemoryFeedbackRepository, InMemoryRequestRepository, InMemoryTeamRepository,
        InMemoryUserRepository, TeamRepository,
    };
    use scs_db::FeedbackService;

    use super::{InteractionOutcome, PlatformError, SlackPlatform};
    use crate::blocks::{Block, ButtonElement, GIVE_TO_BLOCK, REQUEST_FROM_BLOCK};
    use crate::client::{ChatCall, ChatClientError, RecordingChatClient};
    use crate::commands::SlashCommandPayload;
    use crate::oauth::{OAuthError, StaticOAuthExchange};

    struct Harness {
        platform: SlackPlatform,
        chat: Arc<RecordingChatClient>,
        teams: Arc<InMemoryTeamRepository>,
        users: Arc<InMemoryUserRepository>,
        requests: Arc<InMemoryRequestRepository>,
        feedback: Arc<InMemoryFeedbackRepository>,
    }

    async fn harness_with(oauth: StaticOAuthExchange) -> Harness {
        let chat = Arc::new(RecordingChatClient::default());
        let teams = Arc::new(InMemoryTeamRepository::default());
        let users = Arc::new(InMemoryUserRepository::default());
        let requests = Arc::new(InMemoryRequestRepository::default());
        let feedback = Arc::new(InMemoryFeedbackRepository::default());
        let service = FeedbackService::new(
            users.clone(),
            requests.clone(),
            feedback.clone(),
        );

        teams
            .upsert(&TeamId("T1".to_owned()), "Acme", &SecretString::from("xoxb-T1".to_owned()))
            .await
            .expect("seed team");

        let platform = SlackPlatform::new(service, teams.clone(), chat.clone(), Arc::new(oauth));
        Harness { platform, chat, teams, users, requests, feedback }
    }

    async fn harness() -> Harness {
        harness_with(StaticOAuthExchange::granting("T2", "Globex", "xoxb-T2")).await
    }

    fn request_submission(user: &str, recipients: &[&str]) -> Value {
        json!({
            "type": "view_submission",
            "user": {"id": user, "team_id": "T1"},
            "team": {"id": "T1"},
            "view": {
                "callback_id": "",
                "state": {"values": {
                    "requestFrom": {"actionFrom": {
                        "type": "multi_users_select",
                        "selected_users": recipients
                    }}
                }}
            }
        })
    }

    fn give_submission(user: &str, callback_id: &str, give_to: Option<&str>) -> Value {
        let mut values = json!({
            "giveStart": {"actionStart": {"type": "plain_text_input", "value": "X"}},
            "giveContinue": {"actionContinue": {"type": "plain_text_input", "value": "Y"}},
            "giveStop": {"actionStop": {"type": "plain_text_input", "value": "Z"}}
        });
        if let Some(member) = give_to {
            values["giveTo"] = json!({"actionTo": {"type": "users_select", "selected_user": member}});
        }
        json!({
            "type": "view_submission",
            "user": {"id": user, "team_id": "T1"},
            "team": {"id": "T1"},
            "view": {"callback_id": callback_id, "state": {"values": values}}
        })
    }

    fn block_action(user: &str, action_id: &str, value: Option<&str>) -> Value {
        json!({
            "type": "block_actions",
            "user": {"id": user, "team_id": "T1"},
            "team": {"id": "T1"},
            "trigger_id": "trigger-give",
            "actions": [{"action_id": action_id, "value": value}]
        })
    }

    fn give_button(message: &crate::blocks::MessageTemplate) -> ButtonElement {
        message
            .blocks
            .iter()
            .find_map(|block| match block {
                Block::Actions { elements, .. } => {
                    elements.iter().find(|button| button.action_id == "give").cloned()
                }
                _ => None,
            })
            .expect("give button")
    }

    #[tokio::test]
    async fn register_team_upserts_one_row_per_workspace() {
        let harness = harness().await;

        harness.platform.register_team("code-1").await.expect("first install");
        let team = harness.platform.register_team("code-2").await.expect("reinstall");

        assert_eq!(team.id, TeamId("T2".to_owned()));
        assert_eq!(team.name, "Globex");
        assert_eq!(harness.teams.count().await.expect("count"), 2);
    }

    #[tokio::test]
    async fn rejected_oauth_exchange_stores_nothing() {
        let harness = harness_with(StaticOAuthExchange::rejecting("invalid_code")).await;

        let error = harness.platform.register_team("bad").await.expect_err("rejected");

        assert_eq!(error, PlatformError::OAuth(OAuthError::Rejected("invalid_code".to_owned())));
        assert_eq!(harness.teams.count().await.expect("count"), 1);
        assert!(matches!(error.into_interface("req-1"), InterfaceError::BadGateway { .. }));
    }

    #[tokio::test]
    async fn request_feedback_opens_modal_with_team_token() {
        let harness = harness().await;

        harness.platform.request_feedback("T1", "trigger-1").await.expect("open");

        let calls = harness.chat.calls().await;
        assert!(matches!(
            calls.as_slice(),
            [ChatCall::OpenView { token, trigger_id, view }]
                if token == "xoxb-T1" && trigger_id == "trigger-1" && view.has_block(REQUEST_FROM_BLOCK)
        ));
    }

    #[tokio::test]
    async fn unknown_team_is_not_found() {
        let harness = harness().await;

        let error =
            harness.platform.request_feedback("T404", "trigger-1").await.expect_err("no team");

        assert_eq!(error, PlatformError::Application(ApplicationError::not_found("team", "T404")));
        assert!(harness.chat.calls().await.is_empty());
    }

    #[tokio::test]
    async fn request_submission_asks_every_recipient() {
        let harness = harness().await;

        let outcome = harness
            .platform
            .handle_interaction(&request_submission("S", &["R1", "R2"]), "req-1")
            .await
            .expect("handle");

        assert_eq!(outcome, InteractionOutcome::Processed);
        assert_eq!(harness.requests.len().await, 1);
        let request = harness.platform.feedback().get_request(RequestId(1)).await.expect("request");
        assert_eq!(request.sender.user_id, "S");
        assert_eq!(request.recipients.len(), 2);

        let messages = harness.chat.posted_messages().await;
        let channels: Vec<&str> = messages.iter().map(|(channel, _)| channel.as_str()).collect();
        assert_eq!(channels, vec!["R1", "R2"]);
        for (_, message) in &messages {
            assert_eq!(message.fallback_text, "<@S> requested your feedback");
            assert_eq!(give_button(message).value.as_deref(), Some("1"));
        }
    }

    #[tokio::test]
    async fn self_request_returns_view_errors_and_persists_nothing() {
        let harness = harness().await;

        let outcome = harness
            .platform
            .handle_interaction(&request_submission("S", &["R1", "R2", "S"]), "req-1")
            .await
            .expect("handle");

        let body = outcome.response_body().expect("errors body");
        assert_eq!(body["response_action"], "errors");
        assert_eq!(body["errors"]["requestFrom"], "You can't request feedback from yourself.");
        assert!(harness.users.is_empty().await);
        assert!(harness.requests.is_empty().await);
        assert!(harness.chat.calls().await.is_empty());
    }

    #[tokio::test]
    async fn empty_selection_returns_view_errors_and_persists_nothing() {
        let harness = harness().await;

        let outcome = harness
            .platform
            .handle_interaction(&request_submission("S", &[]), "req-1")
            .await
            .expect("handle");

        let body = outcome.response_body().expect("errors body");
        assert_eq!(body["errors"]["requestFrom"], "Select at least one person.");
        assert!(harness.users.is_empty().await);
        assert!(harness.requests.is_empty().await);
    }

    #[tokio::test]
    async fn delivery_failure_keeps_request_and_earlier_messages() {
        let harness = harness().await;
        harness.chat.fail_channel("R2").await;

        let error = harness
            .platform
            .handle_interaction(&request_submission("S", &["R1", "R2", "R3"]), "req-1")
            .await
            .expect_err("delivery failure");

        assert!(matches!(error, PlatformError::Chat(ChatClientError::Api { .. })));
        assert_eq!(harness.requests.len().await, 1);
        let channels: Vec<String> =
            harness.chat.posted_messages().await.into_iter().map(|(channel, _)| channel).collect();
        assert_eq!(channels, vec!["R1".to_owned()]);
    }

    #[tokio::test]
    async fn give_button_to_submission_delivers_linked_feedback() {
        let harness = harness().await;
        harness
            .platform
            .handle_interaction(&request_submission("S", &["R1"]), "req-1")
            .await
            .expect("request");

        let outcome = harness
            .platform
            .handle_interaction(&block_action("R1", "give", Some("1")), "req-2")
            .await
            .expect("give action");
        assert_eq!(outcome, InteractionOutcome::Processed);

        let views = harness.chat.opened_views().await;
        let view = views.last().expect("give modal");
        assert_eq!(view.callback_id.as_deref(), Some("1"));
        assert!(!view.has_block(GIVE_TO_BLOCK));

        harness
            .platform
            .handle_interaction(&give_submission("R1", "1", None), "req-3")
            .await
            .expect("give submission");

        let stored = harness.feedback.all().await;
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].author.user_id, "R1");
        assert_eq!(stored[0].recipient.user_id, "S");
        assert_eq!(stored[0].request_id, Some(RequestId(1)));

        let messages = harness.chat.posted_messages().await;
        let (channel, message) = messages.last().expect("feedback message");
        assert_eq!(channel, "S");
        assert_eq!(message.fallback_text, "New feedback from <@R1>");
        assert_eq!(messages.len(), 2);
    }

    #[tokio::test]
    async fn unsolicited_feedback_goes_to_selected_member() {
        let harness = harness().await;

        harness
            .platform
            .handle_interaction(&give_submission("R1", "", Some("U9")), "req-1")
            .await
            .expect("give submission");

        let stored = harness.feedback.all().await;
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].recipient.user_id, "U9");
        assert_eq!(stored[0].request_id, None);
        let messages = harness.chat.posted_messages().await;
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].0, "U9");
    }

    #[tokio::test]
    async fn give_action_for_missing_request_is_not_found() {
        let harness = harness().await;

        let error = harness
            .platform
            .handle_interaction(&block_action("R1", "give", Some("99")), "req-1")
            .await
            .expect_err("missing request");

        assert!(matches!(
            error,
            PlatformError::Application(ApplicationError::NotFound { entity: "request", .. })
        ));
        assert!(harness.chat.calls().await.is_empty());
    }

    #[tokio::test]
    async fn ignore_and_unknown_actions_have_no_side_effects() {
        let harness = harness().await;

        let ignored = harness
            .platform
            .handle_interaction(&block_action("R1", "ignore", None), "req-1")
            .await
            .expect("ignore");
        let unknown = harness
            .platform
            .handle_interaction(&block_action("R1", "mystery", None), "req-2")
            .await
            .expect("unknown");
        let other_type = harness
            .platform
            .handle_interaction(&json!({"type": "message_action"}), "req-3")
            .await
            .expect("other type");

        assert_eq!(ignored, InteractionOutcome::Ignored);
        assert_eq!(unknown, InteractionOutcome::Unrecognized);
        assert_eq!(other_type, InteractionOutcome::Unrecognized);
        assert!(harness.chat.calls().await.is_empty());
        assert!(harness.requests.is_empty().await);
        assert!(harness.feedback.all().await.is_empty());
    }

    #[tokio::test]
    async fn malformed_payload_maps_to_bad_request() {
        let harness = harness().await;

        let error = harness
            .platform
            .handle_interaction(&give_submission("R1", "abc", None), "req-1")
            .await
            .expect_err("bad callback id");

        assert!(matches!(error.into_interface("req-1"), InterfaceError::BadRequest { .. }));
        assert!(harness.feedback.all().await.is_empty());
    }

    #[tokio::test]
    async fn slash_commands_open_modals_or_reply() {
        let harness = harness().await;
        let payload = |text: &str| SlashCommandPayload {
            command: "/feedback".to_owned(),
            text: text.to_owned(),
            team_id: "T1".to_owned(),
            user_id: "U1".to_owned(),
            trigger_id: "trigger-cmd".to_owned(),
        };

        assert_eq!(harness.platform.handle_command(&payload("request"), "req-1").await, Ok(None));
        assert_eq!(harness.platform.handle_command(&payload(""), "req-2").await, Ok(None));
        let help = harness
            .platform
            .handle_command(&payload("help"), "req-3")
            .await
            .expect("help")
            .expect("help message");
        let unknown = harness
            .platform
            .handle_command(&payload("dance"), "req-4")
            .await
            .expect("unknown")
            .expect("unsupported message");

        let views = harness.chat.opened_views().await;
        assert_eq!(views.len(), 2);
        assert!(views[0].has_block(REQUEST_FROM_BLOCK));
        assert!(views[1].has_block(GIVE_TO_BLOCK));
        assert_eq!(help.fallback_text, "Feedback command help");
        assert!(unknown.fallback_text.contains("/feedback dance"));
    }
}
