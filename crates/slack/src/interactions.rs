//! Classification of inbound interaction payloads.
//!
//! Slack posts every modal submission and button click to the same endpoint.
//! [`classify`] turns the raw JSON into a list of [`Interaction`]s before any
//! side effect happens, so malformed payloads are rejected up front.

use std::collections::HashMap;

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use scs_core::domain::feedback::FeedbackBody;
use scs_core::domain::request::RequestId;

use crate::blocks::{
    GIVE_ACTION, GIVE_CONTINUE_ACTION, GIVE_CONTINUE_BLOCK, GIVE_START_ACTION, GIVE_START_BLOCK,
    GIVE_STOP_ACTION, GIVE_STOP_BLOCK, GIVE_TO_ACTION, GIVE_TO_BLOCK, IGNORE_ACTION,
    REQUEST_FROM_ACTION, REQUEST_FROM_BLOCK,
};

pub const VIEW_SUBMISSION: &str = "view_submission";
pub const BLOCK_ACTIONS: &str = "block_actions";

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum PayloadError {
    #[error("interaction payload is malformed: {0}")]
    Malformed(String),
    #[error("interaction payload is missing `{0}`")]
    MissingField(String),
    #[error("`{field}` is not a feedback request id: `{value}`")]
    InvalidRequestId { field: &'static str, value: String },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Interaction {
    RequestSubmission(RequestSubmission),
    GiveSubmission(GiveSubmission),
    GiveAction(GiveAction),
    IgnoreAction { user_id: String },
    Unrecognized(Unrecognized),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RequestSubmission {
    pub team_id: String,
    pub user_id: String,
    pub recipient_ids: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FeedbackTarget {
    /// Unsolicited feedback for a member picked in the modal.
    Member(String),
    /// Feedback answering a request; goes to the request's sender.
    Request(RequestId),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GiveSubmission {
    pub team_id: String,
    pub user_id: String,
    pub target: FeedbackTarget,
    pub body: FeedbackBody,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GiveAction {
    pub team_id: String,
    pub user_id: String,
    pub trigger_id: String,
    pub request_id: RequestId,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Unrecognized {
    Submission { block_ids: Vec<String> },
    Action { action_id: String },
    PayloadType { kind: String },
}

#[derive(Deserialize)]
struct PayloadUser {
    id: String,
    #[serde(default)]
    team_id: Option<String>,
}

#[derive(Deserialize)]
struct PayloadTeam {
    id: String,
}

#[derive(Deserialize)]
struct ElementState {
    #[serde(default)]
    value: Option<String>,
    #[serde(default)]
    selected_user: Option<String>,
    #[serde(default)]
    selected_users: Option<Vec<String>>,
}

#[derive(Deserialize)]
struct ViewState {
    #[serde(default)]
    values: HashMap<String, HashMap<String, ElementState>>,
}

#[derive(Deserialize)]
struct SubmittedView {
    #[serde(default)]
    callback_id: Option<String>,
    state: ViewState,
}

#[derive(Deserialize)]
struct ViewSubmissionPayload {
    user: PayloadUser,
    #[serde(default)]
    team: Option<PayloadTeam>,
    view: SubmittedView,
}

#[derive(Deserialize)]
struct PayloadAction {
    action_id: String,
    #[serde(default)]
    value: Option<String>,
}

#[derive(Deserialize)]
struct BlockActionsPayload {
    user: PayloadUser,
    #[serde(default)]
    team: Option<PayloadTeam>,
    #[serde(default)]
    trigger_id: Option<String>,
    #[serde(default)]
    actions: Vec<PayloadAction>,
}

/// Parses the `payload` form field posted by Slack.
pub fn parse_payload(raw: &str) -> Result<Value, PayloadError> {
    serde_json::from_str(raw).map_err(|error| PayloadError::Malformed(error.to_string()))
}

pub fn classify(payload: &Value) -> Result<Vec<Interaction>, PayloadError> {
    let kind = payload
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| PayloadError::MissingField("type".to_owned()))?;

    match kind {
        VIEW_SUBMISSION => {
            let submission: ViewSubmissionPayload = decode(payload)?;
            classify_submission(submission).map(|interaction| vec![interaction])
        }
        BLOCK_ACTIONS => {
            let actions: BlockActionsPayload = decode(payload)?;
            classify_actions(actions)
        }
        other => Ok(vec![Interaction::Unrecognized(Unrecognized::PayloadType {
            kind: other.to_owned(),
        })]),
    }
}

fn decode<T>(payload: &Value) -> Result<T, PayloadError>
where
    T: for<'de> Deserialize<'de>,
{
    T::deserialize(payload).map_err(|error| PayloadError::Malformed(error.to_string()))
}

fn team_of(user: &PayloadUser, team: Option<&PayloadTeam>) -> Result<String, PayloadError> {
    user.team_id
        .clone()
        .or_else(|| team.map(|team| team.id.clone()))
        .ok_or_else(|| PayloadError::MissingField("user.team_id".to_owned()))
}

fn classify_submission(payload: ViewSubmissionPayload) -> Result<Interaction, PayloadError> {
    let team_id = team_of(&payload.user, payload.team.as_ref())?;
    let user_id = payload.user.id;
    let values = &payload.view.state.values;

    if values.contains_key(REQUEST_FROM_BLOCK) {
        let recipient_ids = element(values, REQUEST_FROM_BLOCK, REQUEST_FROM_ACTION)?
            .selected_users
            .clone()
            .ok_or_else(|| missing(REQUEST_FROM_BLOCK, REQUEST_FROM_ACTION))?;
        return Ok(Interaction::RequestSubmission(RequestSubmission {
            team_id,
            user_id,
            recipient_ids,
        }));
    }

    if values.contains_key(GIVE_START_BLOCK) {
        let target = if values.contains_key(GIVE_TO_BLOCK) {
            let member = element(values, GIVE_TO_BLOCK, GIVE_TO_ACTION)?
                .selected_user
                .clone()
                .ok_or_else(|| missing(GIVE_TO_BLOCK, GIVE_TO_ACTION))?;
            FeedbackTarget::Member(member)
        } else {
            FeedbackTarget::Request(request_id(
                "view.callback_id",
                payload.view.callback_id.as_deref(),
            )?)
        };

        let body = FeedbackBody {
            start_doing: text_value(values, GIVE_START_BLOCK, GIVE_START_ACTION)?,
            continue_doing: text_value(values, GIVE_CONTINUE_BLOCK, GIVE_CONTINUE_ACTION)?,
            stop_doing: text_value(values, GIVE_STOP_BLOCK, GIVE_STOP_ACTION)?,
        };
        return Ok(Interaction::GiveSubmission(GiveSubmission { team_id, user_id, target, body }));
    }

    let mut block_ids: Vec<String> = values.keys().cloned().collect();
    block_ids.sort();
    Ok(Interaction::Unrecognized(Unrecognized::Submission { block_ids }))
}

fn classify_actions(payload: BlockActionsPayload) -> Result<Vec<Interaction>, PayloadError> {
    let team_id = payload
        .team
        .as_ref()
        .map(|team| team.id.clone())
        .or_else(|| payload.user.team_id.clone())
        .ok_or_else(|| PayloadError::MissingField("team.id".to_owned()))?;

    payload
        .actions
        .into_iter()
        .map(|action| -> Result<Interaction, PayloadError> {
            match action.action_id.as_str() {
                GIVE_ACTION => {
                    let trigger_id = payload
                        .trigger_id
                        .clone()
                        .ok_or_else(|| PayloadError::MissingField("trigger_id".to_owned()))?;
                    Ok(Interaction::GiveAction(GiveAction {
                        team_id: team_id.clone(),
                        user_id: payload.user.id.clone(),
                        trigger_id,
                        request_id: request_id("actions.value", action.value.as_deref())?,
                    }))
                }
                IGNORE_ACTION => {
                    Ok(Interaction::IgnoreAction { user_id: payload.user.id.clone() })
                }
                other => Ok(Interaction::Unrecognized(Unrecognized::Action {
                    action_id: other.to_owned(),
                })),
            }
        })
        .collect()
}

fn missing(block_id: &str, action_id: &str) -> PayloadError {
    PayloadError::MissingField(format!("{block_id}.{action_id}"))
}

fn element<'a>(
    values: &'a HashMap<String, HashMap<String, ElementState>>,
    block_id: &str,
    action_id: &str,
) -> Result<&'a ElementState, PayloadError> {
    values
        .get(block_id)
        .and_then(|block| block.get(action_id))
        .ok_or_else(|| missing(block_id, action_id))
}

// An emptied text input arrives as `"value": null`; it is still present.
fn text_value(
    values: &HashMap<String, HashMap<String, ElementState>>,
    block_id: &str,
    action_id: &str,
) -> Result<String, PayloadError> {
    Ok(element(values, block_id, action_id)?.value.clone().unwrap_or_default())
}

fn request_id(field: &'static str, raw: Option<&str>) -> Result<RequestId, PayloadError> {
    let raw = raw
        .filter(|raw| !raw.trim().is_empty())
        .ok_or_else(|| PayloadError::MissingField(field.to_owned()))?;
    raw.parse().map_err(|_| PayloadError::InvalidRequestId { field, value: raw.to_owned() })
}
