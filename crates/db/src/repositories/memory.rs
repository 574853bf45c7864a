use std::collections::HashMap;

use chrono::Utc;
use secrecy::SecretString;
use tokio::sync::RwLock;

use scs_core::domain::feedback::{Feedback, FeedbackId, NewFeedback};
use scs_core::domain::request::{Request, RequestId};
use scs_core::domain::team::{Team, TeamId};
use scs_core::domain::user::{User, UserId};

use super::{
    FeedbackRepository, RepositoryError, RequestRepository, TeamRepository, UserRepository,
};

#[derive(Default)]
pub struct InMemoryUserRepository {
    users: RwLock<Vec<User>>,
}

impl InMemoryUserRepository {
    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }
}

#[async_trait::async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn get_or_create(&self, team_id: &str, user_id: &str) -> Result<User, RepositoryError> {
        let mut users = self.users.write().await;
        if let Some(existing) =
            users.iter().find(|user| user.team_id == team_id && user.user_id == user_id)
        {
            return Ok(existing.clone());
        }

        let user = User {
            id: UserId(users.len() as i64 + 1),
            team_id: team_id.to_string(),
            user_id: user_id.to_string(),
        };
        users.push(user.clone());
        Ok(user)
    }

    async fn find_by_member(
        &self,
        team_id: &str,
        user_id: &str,
    ) -> Result<Option<User>, RepositoryError> {
        let users = self.users.read().await;
        Ok(users.iter().find(|user| user.team_id == team_id && user.user_id == user_id).cloned())
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let users = self.users.read().await;
        Ok(users.iter().find(|user| user.id == id).cloned())
    }
}

#[derive(Default)]
pub struct InMemoryRequestRepository {
    requests: RwLock<HashMap<RequestId, Request>>,
}

impl InMemoryRequestRepository {
    pub async fn len(&self) -> usize {
        self.requests.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.requests.read().await.is_empty()
    }
}

#[async_trait::async_trait]
impl RequestRepository for InMemoryRequestRepository {
    async fn create(&self, sender: &User, recipients: &[User]) -> Result<Request, RepositoryError> {
        let mut requests = self.requests.write().await;
        let request = Request {
            id: RequestId(requests.len() as i64 + 1),
            sender: sender.clone(),
            recipients: recipients.to_vec(),
            created_at: Utc::now(),
        };
        requests.insert(request.id, request.clone());
        Ok(request)
    }

    async fn find_by_id(&self, id: RequestId) -> Result<Option<Request>, RepositoryError> {
        let requests = self.requests.read().await;
        Ok(requests.get(&id).cloned())
    }
}

#[derive(Default)]
pub struct InMemoryFeedbackRepository {
    entries: RwLock<HashMap<FeedbackId, Feedback>>,
}

impl InMemoryFeedbackRepository {
    pub async fn all(&self) -> Vec<Feedback> {
        let entries = self.entries.read().await;
        let mut all: Vec<Feedback> = entries.values().cloned().collect();
        all.sort_by_key(|feedback| feedback.id);
        all
    }
}

#[async_trait::async_trait]
impl FeedbackRepository for InMemoryFeedbackRepository {
    async fn create(&self, feedback: NewFeedback) -> Result<Feedback, RepositoryError> {
        let mut entries = self.entries.write().await;
        let stored = Feedback {
            id: FeedbackId(entries.len() as i64 + 1),
            author: feedback.author,
            recipient: feedback.recipient,
            request_id: feedback.request_id,
            body: feedback.body,
            created_at: Utc::now(),
        };
        entries.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn find_by_id(&self, id: FeedbackId) -> Result<Option<Feedback>, RepositoryError> {
        let entries = self.entries.read().await;
        Ok(entries.get(&id).cloned())
    }
}

#[derive(Default)]
pub struct InMemoryTeamRepository {
    teams: RwLock<HashMap<TeamId, Team>>,
}

#[async_trait::async_trait]
impl TeamRepository for InMemoryTeamRepository {
    async fn upsert(
        &self,
        id: &TeamId,
        name: &str,
        bot_token: &SecretString,
    ) -> Result<Team, RepositoryError> {
        let mut teams = self.teams.write().await;
        let now = Utc::now();
        let team = match teams.get(id) {
            Some(existing) => Team {
                name: name.to_string(),
                bot_token: bot_token.clone(),
                updated_at: now,
                ..existing.clone()
            },
            None => Team {
                id: id.clone(),
                name: name.to_string(),
                bot_token: bot_token.clone(),
                created_at: now,
                updated_at: now,
            },
        };
        teams.insert(id.clone(), team.clone());
        Ok(team)
    }

    async fn find_by_id(&self, id: &TeamId) -> Result<Option<Team>, RepositoryError> {
        let teams = self.teams.read().await;
        Ok(teams.get(id).cloned())
    }

    async fn count(&self) -> Result<i64, RepositoryError> {
        Ok(self.teams.read().await.len() as i64)
    }
}
