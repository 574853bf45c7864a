use async_trait::async_trait;
use chrono::{DateTime, Utc};
use secrecy::SecretString;
use thiserror::Error;

use scs_core::domain::feedback::{Feedback, FeedbackId, NewFeedback};
use scs_core::domain::request::{Request, RequestId};
use scs_core::domain::team::{Team, TeamId};
use scs_core::domain::user::{User, UserId};
use scs_core::errors::ApplicationError;

pub mod feedback;
pub mod memory;
pub mod request;
pub mod team;
pub mod user;

pub use feedback::SqlFeedbackRepository;
pub use memory::{
    InMemoryFeedbackRepository, InMemoryRequestRepository, InMemoryTeamRepository,
    InMemoryUserRepository,
};
pub use request::SqlRequestRepository;
pub use team::SqlTeamRepository;
pub use user::SqlUserRepository;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
}

impl From<RepositoryError> for ApplicationError {
    fn from(value: RepositoryError) -> Self {
        ApplicationError::Persistence(value.to_string())
    }
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Returns the user for the member pair, inserting it first when absent.
    async fn get_or_create(&self, team_id: &str, user_id: &str) -> Result<User, RepositoryError>;

    async fn find_by_member(
        &self,
        team_id: &str,
        user_id: &str,
    ) -> Result<Option<User>, RepositoryError>;

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError>;
}

#[async_trait]
pub trait RequestRepository: Send + Sync {
    /// Persists the request row and its recipient links as one unit.
    async fn create(&self, sender: &User, recipients: &[User]) -> Result<Request, RepositoryError>;

    async fn find_by_id(&self, id: RequestId) -> Result<Option<Request>, RepositoryError>;
}

#[async_trait]
pub trait FeedbackRepository: Send + Sync {
    async fn create(&self, feedback: NewFeedback) -> Result<Feedback, RepositoryError>;

    async fn find_by_id(&self, id: FeedbackId) -> Result<Option<Feedback>, RepositoryError>;
}

#[async_trait]
pub trait TeamRepository: Send + Sync {
    /// Inserts the team or refreshes its name and bot token.
    async fn upsert(
        &self,
        id: &TeamId,
        name: &str,
        bot_token: &SecretString,
    ) -> Result<Team, RepositoryError>;

    async fn find_by_id(&self, id: &TeamId) -> Result<Option<Team>, RepositoryError>;

    /// Number of installed workspaces.
    async fn count(&self) -> Result<i64, RepositoryError>;
}

pub(crate) fn decode_error(error: sqlx::Error) -> RepositoryError {
    RepositoryError::Decode(error.to_string())
}

pub(crate) fn parse_timestamp(column: &str, value: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(value)
        .map(|timestamp| timestamp.with_timezone(&Utc))
        .map_err(|error| RepositoryError::Decode(format!("invalid `{column}` timestamp: {error}")))
}
