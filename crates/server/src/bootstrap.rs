use std::sync::Arc;

use scs_core::config::{AppConfig, ConfigError};
use scs_db::repositories::SqlTeamRepository;
use scs_db::{connect_with_config, migrations, DbPool, FeedbackService};
use scs_slack::{SlackOAuthService, SlackPlatform, WebApiClient};
use thiserror::Error;
use tracing::info;

pub struct Application {
    pub config: AppConfig,
    pub db_pool: DbPool,
    pub platform: Arc<SlackPlatform>,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("database connection failed: {0}")]
    DatabaseConnect(#[source] sqlx::Error),
    #[error("database migration failed: {0}")]
    Migration(#[source] sqlx::migrate::MigrateError),
}

pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        "starting application bootstrap"
    );

    let db_pool =
        connect_with_config(&config.database).await.map_err(BootstrapError::DatabaseConnect)?;
    info!(
        event_name = "system.bootstrap.database_connected",
        correlation_id = "bootstrap",
        "database connection established"
    );

    migrations::run_pending(&db_pool).await.map_err(BootstrapError::Migration)?;
    info!(
        event_name = "system.bootstrap.migrations_applied",
        correlation_id = "bootstrap",
        "database migrations applied"
    );

    let platform = SlackPlatform::new(
        FeedbackService::sql(db_pool.clone()),
        Arc::new(SqlTeamRepository::new(db_pool.clone())),
        Arc::new(WebApiClient::new(config.slack.api_base_url.clone())),
        Arc::new(SlackOAuthService::from_config(&config.slack)),
    );

    Ok(Application { config, db_pool, platform: Arc::new(platform) })
}
