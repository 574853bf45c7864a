use chrono::Utc;
use sqlx::Row;

use scs_core::domain::request::{Request, RequestId};
use scs_core::domain::user::{User, UserId};

use super::{decode_error, parse_timestamp, RepositoryError, RequestRepository};
use crate::DbPool;

pub struct SqlRequestRepository {
    pool: DbPool,
}

impl SqlRequestRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn recipients_for(&self, request_id: RequestId) -> Result<Vec<User>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT u.id, u.team_id, u.user_id
             FROM feedback_request_recipient rr
             JOIN feedback_user u ON u.id = rr.user_id
             WHERE rr.request_id = ?
             ORDER BY u.id ASC",
        )
        .bind(request_id.0)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| -> Result<User, RepositoryError> {
                Ok(User {
                    id: UserId(row.try_get("id").map_err(decode_error)?),
                    team_id: row.try_get("team_id").map_err(decode_error)?,
                    user_id: row.try_get("user_id").map_err(decode_error)?,
                })
            })
            .collect()
    }
}

#[async_trait::async_trait]
impl RequestRepository for SqlRequestRepository {
    async fn create(&self, sender: &User, recipients: &[User]) -> Result<Request, RepositoryError> {
        let created_at = Utc::now();
        let mut tx = self.pool.begin().await?;

        let id = sqlx::query("INSERT INTO feedback_request (sender_id, created_at) VALUES (?, ?)")
            .bind(sender.id.0)
            .bind(created_at.to_rfc3339())
            .execute(&mut *tx)
            .await?
            .last_insert_rowid();

        for recipient in recipients {
            sqlx::query(
                "INSERT INTO feedback_request_recipient (request_id, user_id) VALUES (?, ?)
                 ON CONFLICT DO NOTHING",
            )
            .bind(id)
            .bind(recipient.id.0)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(Request {
            id: RequestId(id),
            sender: sender.clone(),
            recipients: recipients.to_vec(),
            created_at,
        })
    }

    async fn find_by_id(&self, id: RequestId) -> Result<Option<Request>, RepositoryError> {
        let row = sqlx::query(
            "SELECT r.id, r.created_at,
                    u.id AS sender_pk, u.team_id AS sender_team_id, u.user_id AS sender_user_id
             FROM feedback_request r
             JOIN feedback_user u ON u.id = r.sender_id
             WHERE r.id = ?",
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let sender = User {
            id: UserId(row.try_get("sender_pk").map_err(decode_error)?),
            team_id: row.try_get("sender_team_id").map_err(decode_error)?,
            user_id: row.try_get("sender_user_id").map_err(decode_error)?,
        };
        let created_at: String = row.try_get("created_at").map_err(decode_error)?;

        Ok(Some(Request {
            id,
            sender,
            recipients: self.recipients_for(id).await?,
            created_at: parse_timestamp("created_at", &created_at)?,
        }))
    }
}
