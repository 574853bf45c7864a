//! Slack webhook routes.
//!
//! - `POST /slack/interactions`    modal submissions and button clicks (`payload` form field)
//! - `POST /slack/commands`        slash commands
//! - `GET  /slack/install`         redirect to the Slack authorization page
//! - `GET  /slack/oauth/callback`  finish installation and store the bot token

use std::sync::Arc;

use axum::{
    extract::{rejection::FormRejection, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Json, Router,
};
use scs_core::errors::InterfaceError;
use scs_slack::commands::SlashCommandPayload;
use scs_slack::interactions::parse_payload;
use scs_slack::{PlatformError, SlackPlatform};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, info, warn};
use uuid::Uuid;

#[derive(Clone)]
pub struct SlackState {
    platform: Arc<SlackPlatform>,
    redirect_url: Option<String>,
}

impl SlackState {
    pub fn new(platform: Arc<SlackPlatform>, redirect_url: Option<String>) -> Self {
        Self { platform, redirect_url }
    }
}

pub fn router(state: SlackState) -> Router {
    Router::new()
        .route("/slack/interactions", post(interactions))
        .route("/slack/commands", post(commands))
        .route("/slack/install", get(install))
        .route("/slack/oauth/callback", get(oauth_callback))
        .with_state(state)
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    pub detail: String,
    pub correlation_id: String,
}

pub struct ApiError(InterfaceError);

impl ApiError {
    fn bad_request(message: impl Into<String>, correlation_id: &str) -> Self {
        Self(InterfaceError::BadRequest {
            message: message.into(),
            correlation_id: correlation_id.to_owned(),
        })
    }

    fn platform(error: PlatformError, correlation_id: &str) -> Self {
        Self(error.into_interface(correlation_id))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match &self.0 {
            InterfaceError::BadRequest { message, .. } => (StatusCode::BAD_REQUEST, message),
            InterfaceError::NotFound { message, .. } => (StatusCode::NOT_FOUND, message),
            InterfaceError::BadGateway { message, .. } => (StatusCode::BAD_GATEWAY, message),
            InterfaceError::ServiceUnavailable { message, .. } => {
                (StatusCode::SERVICE_UNAVAILABLE, message)
            }
            InterfaceError::Internal { message, .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, message)
            }
        };

        if status.is_server_error() {
            error!(
                event_name = "ingress.slack.request_failed",
                correlation_id = %self.0.correlation_id(),
                status = status.as_u16(),
                detail = %detail,
                "slack request failed"
            );
        } else {
            warn!(
                event_name = "ingress.slack.request_rejected",
                correlation_id = %self.0.correlation_id(),
                status = status.as_u16(),
                detail = %detail,
                "slack request rejected"
            );
        }

        let body = ErrorBody {
            error: self.0.user_message(),
            detail: detail.clone(),
            correlation_id: self.0.correlation_id().to_owned(),
        };
        (status, Json(body)).into_response()
    }
}

#[derive(Debug, Deserialize)]
pub struct InteractionForm {
    pub payload: String,
}

async fn interactions(
    State(state): State<SlackState>,
    form: Result<Form<InteractionForm>, FormRejection>,
) -> Result<Response, ApiError> {
    let correlation_id = Uuid::new_v4().to_string();
    let Form(form) = form
        .map_err(|rejection| ApiError::bad_request(rejection.body_text(), &correlation_id))?;
    let payload = parse_payload(&form.payload)
        .map_err(|error| ApiError::platform(error.into(), &correlation_id))?;

    info!(
        event_name = "ingress.slack.interaction_received",
        correlation_id = %correlation_id,
        kind = payload.get("type").and_then(|kind| kind.as_str()).unwrap_or("unknown"),
        "interaction payload received"
    );

    let outcome = state
        .platform
        .handle_interaction(&payload, &correlation_id)
        .await
        .map_err(|error| ApiError::platform(error, &correlation_id))?;

    Ok(match outcome.response_body() {
        Some(body) => (StatusCode::OK, Json(body)).into_response(),
        None => StatusCode::OK.into_response(),
    })
}

async fn commands(
    State(state): State<SlackState>,
    form: Result<Form<SlashCommandPayload>, FormRejection>,
) -> Result<Response, ApiError> {
    let correlation_id = Uuid::new_v4().to_string();
    let Form(payload) = form
        .map_err(|rejection| ApiError::bad_request(rejection.body_text(), &correlation_id))?;

    info!(
        event_name = "ingress.slack.command_received",
        correlation_id = %correlation_id,
        command = %payload.command,
        team_id = %payload.team_id,
        "slash command received"
    );

    let reply = state
        .platform
        .handle_command(&payload, &correlation_id)
        .await
        .map_err(|error| ApiError::platform(error, &correlation_id))?;

    Ok(match reply {
        Some(message) => Json(json!({
            "response_type": "ephemeral",
            "text": message.fallback_text,
            "blocks": message.blocks,
        }))
        .into_response(),
        None => StatusCode::OK.into_response(),
    })
}

async fn install(State(state): State<SlackState>) -> Result<Redirect, ApiError> {
    let correlation_id = Uuid::new_v4().to_string();
    let Some(redirect_url) = state.redirect_url.as_deref() else {
        return Err(ApiError(InterfaceError::Internal {
            message: "slack.redirect_url is not configured".to_owned(),
            correlation_id,
        }));
    };

    let url = state
        .platform
        .authorization_url(redirect_url)
        .map_err(|error| ApiError::platform(error, &correlation_id))?;
    Ok(Redirect::to(&url))
}

#[derive(Debug, Default, Deserialize)]
pub struct OAuthCallbackQuery {
    pub code: Option<String>,
    pub error: Option<String>,
}

async fn oauth_callback(
    State(state): State<SlackState>,
    Query(query): Query<OAuthCallbackQuery>,
) -> Result<(StatusCode, String), ApiError> {
    let correlation_id = Uuid::new_v4().to_string();

    if let Some(error) = query.error {
        let message = format!("installation was declined: {error}");
        return Err(ApiError::bad_request(message, &correlation_id));
    }
    let Some(code) = query.code.filter(|code| !code.trim().is_empty()) else {
        return Err(ApiError::bad_request("missing `code` query parameter", &correlation_id));
    };

    let team = state
        .platform
        .register_team(&code)
        .await
        .map_err(|error| ApiError::platform(error, &correlation_id))?;

    Ok((StatusCode::OK, format!("Feedback bot installed for {}.", team.name)))
}
