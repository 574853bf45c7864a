use chrono::Utc;
use secrecy::{ExposeSecret, SecretString};
use sqlx::Row;

use scs_core::domain::team::{Team, TeamId};

use super::{decode_error, parse_timestamp, RepositoryError, TeamRepository};
use crate::DbPool;

pub struct SqlTeamRepository {
    pool: DbPool,
}

impl SqlTeamRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_team(row: &sqlx::sqlite::SqliteRow) -> Result<Team, RepositoryError> {
    let id: String = row.try_get("id").map_err(decode_error)?;
    let name: String = row.try_get("name").map_err(decode_error)?;
    let bot_token: String = row.try_get("bot_token").map_err(decode_error)?;
    let created_at: String = row.try_get("created_at").map_err(decode_error)?;
    let updated_at: String = row.try_get("updated_at").map_err(decode_error)?;

    Ok(Team {
        id: TeamId(id),
        name,
        bot_token: bot_token.into(),
        created_at: parse_timestamp("created_at", &created_at)?,
        updated_at: parse_timestamp("updated_at", &updated_at)?,
    })
}

#[async_trait::async_trait]
impl TeamRepository for SqlTeamRepository {
    async fn upsert(
        &self,
        id: &TeamId,
        name: &str,
        bot_token: &SecretString,
    ) -> Result<Team, RepositoryError> {
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            "INSERT INTO slack_team (id, name, bot_token, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET
                 name = excluded.name,
                 bot_token = excluded.bot_token,
                 updated_at = excluded.updated_at",
        )
        .bind(id.as_str())
        .bind(name)
        .bind(bot_token.expose_secret())
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| RepositoryError::Decode(format!("team `{}` vanished after upsert", id.0)))
    }

    async fn find_by_id(&self, id: &TeamId) -> Result<Option<Team>, RepositoryError> {
        let row = sqlx::query(
            "SELECT id, name, bot_token, created_at, updated_at FROM slack_team WHERE id = ?",
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(row_to_team).transpose()
    }

    async fn count(&self) -> Result<i64, RepositoryError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM slack_team")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use secrecy::{ExposeSecret, SecretString};

    use scs_core::domain::team::TeamId;

    use super::SqlTeamRepository;
    use crate::repositories::test_support::{migrated_file_pool, migrated_pool};
    use crate::repositories::TeamRepository;

    #[tokio::test]
    async fn repeated_upsert_keeps_one_row_with_latest_token() {
        let pool = migrated_pool().await;
        let repo = SqlTeamRepository::new(pool.clone());
        let id = TeamId("T1".to_string());

        let first = repo
            .upsert(&id, "Acme", &SecretString::from("xoxb-old".to_string()))
            .await
            .expect("first install");
        let second = repo
            .upsert(&id, "Acme Corp", &SecretString::from("xoxb-new".to_string()))
            .await
            .expect("reinstall");

        assert_eq!(second.created_at, first.created_at);
        assert_eq!(second.name, "Acme Corp");
        assert_eq!(second.bot_token.expose_secret(), "xoxb-new");

        assert_eq!(repo.count().await.expect("count teams"), 1);

        pool.close().await;
    }

    #[tokio::test]
    async fn unknown_team_is_none() {
        let pool = migrated_pool().await;
        let repo = SqlTeamRepository::new(pool.clone());

        let found = repo.find_by_id(&TeamId("T404".to_string())).await.expect("lookup");
        assert!(found.is_none());

        pool.close().await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_installs_of_one_team_keep_one_row() {
        let (_dir, pool) = migrated_file_pool(8).await;
        let repo = Arc::new(SqlTeamRepository::new(pool.clone()));

        let handles: Vec<_> = (0..16)
            .map(|attempt| {
                let repo = repo.clone();
                tokio::spawn(async move {
                    let token = SecretString::from(format!("xoxb-{attempt}"));
                    repo.upsert(&TeamId("T1".to_string()), "Acme", &token).await
                })
            })
            .collect();

        let mut tokens = Vec::new();
        for handle in handles {
            let team = handle.await.expect("task joined").expect("upsert");
            tokens.push(team.bot_token.expose_secret().to_string());
        }

        assert_eq!(repo.count().await.expect("count teams"), 1);
        let stored = repo
            .find_by_id(&TeamId("T1".to_string()))
            .await
            .expect("lookup")
            .expect("team exists");
        assert!(tokens.contains(&stored.bot_token.expose_secret().to_string()));

        pool.close().await;
    }
}
