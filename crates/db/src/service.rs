//! Data-access façade used by the chat adapters.
//!
//! Every operation maps to one repository call (plus lookup-or-fail), so the
//! service holds no state of its own and is cheap to clone into handlers.

use std::sync::Arc;

use scs_core::domain::feedback::{Feedback, FeedbackBody, FeedbackId, NewFeedback};
use scs_core::domain::request::{normalize_recipients, Request, RequestId};
use scs_core::domain::user::User;
use scs_core::errors::{ApplicationError, DomainError};

use crate::repositories::{
    FeedbackRepository, InMemoryFeedbackRepository, InMemoryRequestRepository,
    InMemoryUserRepository, RequestRepository, SqlFeedbackRepository, SqlRequestRepository,
    SqlUserRepository, UserRepository,
};
use crate::DbPool;

#[derive(Clone)]
pub struct FeedbackService {
    users: Arc<dyn UserRepository>,
    requests: Arc<dyn RequestRepository>,
    feedback: Arc<dyn FeedbackRepository>,
}

impl FeedbackService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        requests: Arc<dyn RequestRepository>,
        feedback: Arc<dyn FeedbackRepository>,
    ) -> Self {
        Self { users, requests, feedback }
    }

    pub fn sql(pool: DbPool) -> Self {
        Self::new(
            Arc::new(SqlUserRepository::new(pool.clone())),
            Arc::new(SqlRequestRepository::new(pool.clone())),
            Arc::new(SqlFeedbackRepository::new(pool)),
        )
    }

    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(InMemoryUserRepository::default()),
            Arc::new(InMemoryRequestRepository::default()),
            Arc::new(InMemoryFeedbackRepository::default()),
        )
    }

    pub async fn get_or_create_user(
        &self,
        team_id: &str,
        user_id: &str,
    ) -> Result<User, ApplicationError> {
        Ok(self.users.get_or_create(team_id, user_id).await?)
    }

    pub async fn get_user(&self, user_id: &str, team_id: &str) -> Result<User, ApplicationError> {
        self.users
            .find_by_member(team_id, user_id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("user", format!("{team_id}/{user_id}")))
    }

    pub async fn get_request(&self, id: RequestId) -> Result<Request, ApplicationError> {
        self.requests.find_by_id(id).await?.ok_or_else(|| ApplicationError::not_found("request", id))
    }

    /// Stores a request from `sender` to every distinct recipient.
    ///
    /// A sender listed among their own recipients is rejected.
    pub async fn create_request(
        &self,
        sender: &User,
        recipients: Vec<User>,
    ) -> Result<Request, ApplicationError> {
        if recipients.iter().any(|recipient| recipient.id == sender.id) {
            return Err(DomainError::SelfRequest { user_id: sender.user_id.clone() }.into());
        }
        let recipients = normalize_recipients(recipients)?;

        Ok(self.requests.create(sender, &recipients).await?)
    }

    pub async fn create_feedback(
        &self,
        author: &User,
        recipient: &User,
        body: FeedbackBody,
        request: Option<&Request>,
    ) -> Result<Feedback, ApplicationError> {
        if let Some(request) = request {
            if request.sender.id != recipient.id {
                return Err(DomainError::InvariantViolation(format!(
                    "feedback for request {} must be addressed to its sender",
                    request.id
                ))
                .into());
            }
        }

        let feedback = NewFeedback {
            author: author.clone(),
            recipient: recipient.clone(),
            request_id: request.map(|request| request.id),
            body,
        };
        Ok(self.feedback.create(feedback).await?)
    }

    pub async fn get_feedback(&self, id: FeedbackId) -> Result<Feedback, ApplicationError> {
        self.feedback
            .find_by_id(id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("feedback", id.0))
    }
}

#[cfg(test)]
mod tests {
    use scs_core::domain::feedback::FeedbackBody;
    use scs_core::domain::request::RequestId;
    use scs_core::errors::{ApplicationError, DomainError};

    use super::FeedbackService;
    use crate::repositories::test_support::migrated_pool;

    fn body(start: &str, cont: &str, stop: &str) -> FeedbackBody {
        FeedbackBody {
            start_doing: start.to_string(),
            continue_doing: cont.to_string(),
            stop_doing: stop.to_string(),
        }
    }

    #[tokio::test]
    async fn get_or_create_user_returns_same_identity() {
        let pool = migrated_pool().await;
        let service = FeedbackService::sql(pool.clone());

        let first = service.get_or_create_user("T1", "U1").await.expect("first");
        let second = service.get_or_create_user("T1", "U1").await.expect("second");

        assert_eq!(first.id, second.id);
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM feedback_user")
            .fetch_one(&pool)
            .await
            .expect("count users");
        assert_eq!(count, 1);

        pool.close().await;
    }

    #[tokio::test]
    async fn get_user_fails_with_not_found_for_unknown_member() {
        let service = FeedbackService::in_memory();

        let error = service.get_user("U404", "T1").await.expect_err("unknown user");
        assert_eq!(error, ApplicationError::not_found("user", "T1/U404"));
    }

    #[tokio::test]
    async fn create_request_keeps_exact_recipient_set() {
        let pool = migrated_pool().await;
        let service = FeedbackService::sql(pool.clone());

        let sender = service.get_or_create_user("T1", "S").await.expect("sender");
        let a = service.get_or_create_user("T1", "A").await.expect("a");
        let b = service.get_or_create_user("T1", "B").await.expect("b");

        let first =
            service.create_request(&sender, vec![a.clone(), b.clone()]).await.expect("first");
        let second =
            service.create_request(&sender, vec![a.clone(), b.clone()]).await.expect("second");
        let stored = service.get_request(first.id).await.expect("stored");

        assert_ne!(first.id, second.id);
        assert_eq!(stored.sender, sender);
        let mut recipient_ids: Vec<_> = stored.recipients.iter().map(|user| user.id).collect();
        recipient_ids.sort();
        assert_eq!(recipient_ids, vec![a.id, b.id]);

        pool.close().await;
    }

    #[tokio::test]
    async fn create_request_rejects_empty_and_self_requests() {
        let service = FeedbackService::in_memory();
        let sender = service.get_or_create_user("T1", "S").await.expect("sender");
        let other = service.get_or_create_user("T1", "O").await.expect("other");

        let empty = service.create_request(&sender, Vec::new()).await.expect_err("empty");
        assert_eq!(empty, ApplicationError::Domain(DomainError::EmptyRecipients));

        let own = service
            .create_request(&sender, vec![other, sender.clone()])
            .await
            .expect_err("self request");
        assert!(matches!(own, ApplicationError::Domain(DomainError::SelfRequest { .. })));
    }

    #[tokio::test]
    async fn get_request_fails_with_not_found() {
        let service = FeedbackService::in_memory();

        let error = service.get_request(RequestId(42)).await.expect_err("missing");
        assert!(matches!(error, ApplicationError::NotFound { entity: "request", .. }));
    }

    #[tokio::test]
    async fn feedback_request_link_round_trips() {
        let pool = migrated_pool().await;
        let service = FeedbackService::sql(pool.clone());

        let sender = service.get_or_create_user("T1", "S").await.expect("sender");
        let author = service.get_or_create_user("T1", "R1").await.expect("author");
        let request = service.create_request(&sender, vec![author.clone()]).await.expect("request");

        let unsolicited = service
            .create_feedback(&author, &sender, body("a", "b", "c"), None)
            .await
            .expect("unsolicited");
        let solicited = service
            .create_feedback(&author, &sender, body("X", "Y", "Z"), Some(&request))
            .await
            .expect("solicited");

        assert_eq!(service.get_feedback(unsolicited.id).await.expect("load").request_id, None);
        let stored = service.get_feedback(solicited.id).await.expect("load");
        let linked = service
            .get_request(stored.request_id.expect("request link"))
            .await
            .expect("linked request");
        assert_eq!(linked, request);
        assert_eq!(stored.body, body("X", "Y", "Z"));

        pool.close().await;
    }

    #[tokio::test]
    async fn solicited_feedback_must_target_request_sender() {
        let service = FeedbackService::in_memory();
        let sender = service.get_or_create_user("T1", "S").await.expect("sender");
        let author = service.get_or_create_user("T1", "R1").await.expect("author");
        let bystander = service.get_or_create_user("T1", "B").await.expect("bystander");
        let request = service.create_request(&sender, vec![author.clone()]).await.expect("request");

        let error = service
            .create_feedback(&author, &bystander, body("", "", ""), Some(&request))
            .await
            .expect_err("wrong recipient");
        assert!(matches!(error, ApplicationError::Domain(DomainError::InvariantViolation(_))));
    }
}
