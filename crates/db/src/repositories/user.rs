use sqlx::Row;

use scs_core::domain::user::{User, UserId};

use super::{decode_error, RepositoryError, UserRepository};
use crate::DbPool;

pub struct SqlUserRepository {
    pool: DbPool,
}

impl SqlUserRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_user(row: &sqlx::sqlite::SqliteRow) -> Result<User, RepositoryError> {
    let id: i64 = row.try_get("id").map_err(decode_error)?;
    let team_id: String = row.try_get("team_id").map_err(decode_error)?;
    let user_id: String = row.try_get("user_id").map_err(decode_error)?;

    Ok(User { id: UserId(id), team_id, user_id })
}

#[async_trait::async_trait]
impl UserRepository for SqlUserRepository {
    async fn get_or_create(&self, team_id: &str, user_id: &str) -> Result<User, RepositoryError> {
        // Losing a concurrent insert race is fine: the unique index keeps one row
        // and the select below returns it.
        sqlx::query(
            "INSERT INTO feedback_user (team_id, user_id) VALUES (?, ?)
             ON CONFLICT(team_id, user_id) DO NOTHING",
        )
        .bind(team_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        self.find_by_member(team_id, user_id).await?.ok_or_else(|| {
            RepositoryError::Decode(format!("user `{team_id}/{user_id}` vanished after upsert"))
        })
    }

    async fn find_by_member(
        &self,
        team_id: &str,
        user_id: &str,
    ) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query(
            "SELECT id, team_id, user_id FROM feedback_user WHERE team_id = ? AND user_id = ?",
        )
        .bind(team_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(row_to_user).transpose()
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query("SELECT id, team_id, user_id FROM feedback_user WHERE id = ?")
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(row_to_user).transpose()
    }
}
