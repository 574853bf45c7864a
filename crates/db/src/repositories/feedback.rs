use chrono::Utc;
use sqlx::Row;

use scs_core::domain::feedback::{Feedback, FeedbackBody, FeedbackId, NewFeedback};
use scs_core::domain::request::RequestId;
use scs_core::domain::user::{User, UserId};

use super::{decode_error, parse_timestamp, FeedbackRepository, RepositoryError};
use crate::DbPool;

pub struct SqlFeedbackRepository {
    pool: DbPool,
}

impl SqlFeedbackRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_user(row: &sqlx::sqlite::SqliteRow, prefix: &str) -> Result<User, RepositoryError> {
    Ok(User {
        id: UserId(row.try_get(format!("{prefix}_pk").as_str()).map_err(decode_error)?),
        team_id: row.try_get(format!("{prefix}_team_id").as_str()).map_err(decode_error)?,
        user_id: row.try_get(format!("{prefix}_user_id").as_str()).map_err(decode_error)?,
    })
}

fn row_to_feedback(row: &sqlx::sqlite::SqliteRow) -> Result<Feedback, RepositoryError> {
    let id: i64 = row.try_get("id").map_err(decode_error)?;
    let request_id: Option<i64> = row.try_get("request_id").map_err(decode_error)?;
    let created_at: String = row.try_get("created_at").map_err(decode_error)?;

    Ok(Feedback {
        id: FeedbackId(id),
        author: row_to_user(row, "author")?,
        recipient: row_to_user(row, "recipient")?,
        request_id: request_id.map(RequestId),
        body: FeedbackBody {
            start_doing: row.try_get("start_doing").map_err(decode_error)?,
            continue_doing: row.try_get("continue_doing").map_err(decode_error)?,
            stop_doing: row.try_get("stop_doing").map_err(decode_error)?,
        },
        created_at: parse_timestamp("created_at", &created_at)?,
    })
}

#[async_trait::async_trait]
impl FeedbackRepository for SqlFeedbackRepository {
    async fn create(&self, feedback: NewFeedback) -> Result<Feedback, RepositoryError> {
        let created_at = Utc::now();

        let id = sqlx::query(
            "INSERT INTO feedback (author_id, recipient_id, request_id, start_doing,
                                   continue_doing, stop_doing, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(feedback.author.id.0)
        .bind(feedback.recipient.id.0)
        .bind(feedback.request_id.map(|id| id.0))
        .bind(&feedback.body.start_doing)
        .bind(&feedback.body.continue_doing)
        .bind(&feedback.body.stop_doing)
        .bind(created_at.to_rfc3339())
        .execute(&self.pool)
        .await?
        .last_insert_rowid();

        Ok(Feedback {
            id: FeedbackId(id),
            author: feedback.author,
            recipient: feedback.recipient,
            request_id: feedback.request_id,
            body: feedback.body,
            created_at,
        })
    }

    async fn find_by_id(&self, id: FeedbackId) -> Result<Option<Feedback>, RepositoryError> {
        let row = sqlx::query(
            "SELECT f.id, f.request_id, f.start_doing, f.continue_doing, f.stop_doing, f.created_at,
                    a.id AS author_pk, a.team_id AS author_team_id, a.user_id AS author_user_id,
                    r.id AS recipient_pk, r.team_id AS recipient_team_id,
                    r.user_id AS recipient_user_id
             FROM feedback f
             JOIN feedback_user a ON a.id = f.author_id
             JOIN feedback_user r ON r.id = f.recipient_id
             WHERE f.id = ?",
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(row_to_feedback).transpose()
    }
}
