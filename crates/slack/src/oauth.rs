use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use thiserror::Error;

use scs_core::config::SlackConfig;

pub const AUTHORIZE_URL: &str = "https://slack.com/oauth/v2/authorize";
pub const ACCESS_TOKEN_METHOD: &str = "oauth.v2.access";
pub const SCOPES: [&str; 3] = ["chat:write.public", "chat:write", "commands"];

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum OAuthError {
    #[error("invalid authorization url: {0}")]
    InvalidUrl(String),
    #[error("oauth transport failure: {0}")]
    Transport(String),
    #[error("oauth exchange rejected: {0}")]
    Rejected(String),
    #[error("oauth response is missing `{0}`")]
    MissingField(&'static str),
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct OAuthTeam {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

/// Decoded `oauth.v2.access` response. Callers must check `ok` themselves.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct OAuthAccessResponse {
    pub ok: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub team: Option<OAuthTeam>,
}

#[derive(Debug)]
pub struct Installation {
    pub team_id: String,
    pub team_name: String,
    pub bot_token: SecretString,
}

impl OAuthAccessResponse {
    pub fn into_installation(self) -> Result<Installation, OAuthError> {
        if !self.ok {
            return Err(OAuthError::Rejected(
                self.error.unwrap_or_else(|| "unknown_error".to_owned()),
            ));
        }
        let token = self.access_token.ok_or(OAuthError::MissingField("access_token"))?;
        let team = self.team.ok_or(OAuthError::MissingField("team"))?;

        Ok(Installation {
            team_id: team.id,
            team_name: team.name,
            bot_token: SecretString::from(token),
        })
    }
}

#[async_trait]
pub trait OAuthExchange: Send + Sync {
    fn authorization_url(&self, redirect_url: &str) -> Result<String, OAuthError>;

    async fn exchange_code(&self, code: &str) -> Result<OAuthAccessResponse, OAuthError>;
}

pub struct SlackOAuthService {
    http: reqwest::Client,
    client_id: String,
    client_secret: SecretString,
    access_token_url: String,
}

impl SlackOAuthService {
    pub fn new(
        client_id: impl Into<String>,
        client_secret: SecretString,
        api_base_url: &str,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            client_id: client_id.into(),
            client_secret,
            access_token_url: format!(
                "{}/{ACCESS_TOKEN_METHOD}",
                api_base_url.trim_end_matches('/')
            ),
        }
    }

    pub fn from_config(config: &SlackConfig) -> Self {
        Self::new(config.client_id.clone(), config.client_secret.clone(), &config.api_base_url)
    }

    pub fn access_token_url(&self) -> &str {
        &self.access_token_url
    }
}

#[async_trait]
impl OAuthExchange for SlackOAuthService {
    fn authorization_url(&self, redirect_url: &str) -> Result<String, OAuthError> {
        let scope = SCOPES.join(",");
        reqwest::Url::parse_with_params(
            AUTHORIZE_URL,
            &[
                ("client_id", self.client_id.as_str()),
                ("scope", scope.as_str()),
                ("redirect_uri", redirect_url),
            ],
        )
        .map(String::from)
        .map_err(|error| OAuthError::InvalidUrl(error.to_string()))
    }

    async fn exchange_code(&self, code: &str) -> Result<OAuthAccessResponse, OAuthError> {
        let form = [
            ("code", code),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.expose_secret()),
        ];

        let response = self
            .http
            .post(&self.access_token_url)
            .form(&form)
            .send()
            .await
            .map_err(|error| OAuthError::Transport(error.to_string()))?;

        response.json().await.map_err(|error| OAuthError::Transport(error.to_string()))
    }
}

/// Fixed-response exchange for tests and local runs without Slack access.
pub struct StaticOAuthExchange {
    response: OAuthAccessResponse,
}

impl StaticOAuthExchange {
    pub fn new(response: OAuthAccessResponse) -> Self {
        Self { response }
    }

    pub fn granting(team_id: &str, team_name: &str, token: &str) -> Self {
        Self::new(OAuthAccessResponse {
            ok: true,
            error: None,
            access_token: Some(token.to_owned()),
            team: Some(OAuthTeam { id: team_id.to_owned(), name: team_name.to_owned() }),
        })
    }

    pub fn rejecting(error: &str) -> Self {
        Self::new(OAuthAccessResponse {
            ok: false,
            error: Some(error.to_owned()),
            access_token: None,
            team: None,
        })
    }
}

#[async_trait]
impl OAuthExchange for StaticOAuthExchange {
    fn authorization_url(&self, redirect_url: &str) -> Result<String, OAuthError> {
        reqwest::Url::parse_with_params(AUTHORIZE_URL, &[("redirect_uri", redirect_url)])
            .map(String::from)
            .map_err(|error| OAuthError::InvalidUrl(error.to_string()))
    }

    async fn exchange_code(&self, _code: &str) -> Result<OAuthAccessResponse, OAuthError> {
        Ok(self.response.clone())
    }
}
