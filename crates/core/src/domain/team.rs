use chrono::{DateTime, Utc};
use secrecy::SecretString;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TeamId(pub String);

impl TeamId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// An installed workspace and the bot token granted to it.
#[derive(Clone, Debug)]
pub struct Team {
    pub id: TeamId,
    pub name: String,
    pub bot_token: SecretString,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
